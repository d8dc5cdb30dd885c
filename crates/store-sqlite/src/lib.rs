mod open;
mod models;
mod insert;
mod query;
mod schema;
mod swap;
mod adapter;
mod csv_io;

pub use open::Db;
pub use insert::{SourceBatch, SourceCounts};
pub use swap::SnapshotSwap;
pub use csv_io::*;
