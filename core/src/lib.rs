//! Core data model and shared policy for the hostwatch engine.

pub mod model;
pub mod settings;
pub mod store;
pub mod threshold;
pub mod timestamp;

pub use model::{GroupStatus, HostInventoryRecord, SignalRecord, Tier, UnifiedHostRecord};
pub use settings::Settings;
pub use store::{HostScope, RecordStore, StoreError};
pub use threshold::{ThresholdDays, DEFAULT_THRESHOLD_DAYS};
pub use timestamp::{format_timestamp, now_local, parse_timestamp};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
