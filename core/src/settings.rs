use serde::Serialize;
use std::path::PathBuf;

use crate::threshold::ThresholdDays;

pub const DEFAULT_STORE_LOCATION: &str = "dashboard.db";

/// Explicit configuration handed to each component when it is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Where host, signal and snapshot records are read and written.
    pub store_location: PathBuf,
    /// Used whenever a caller-supplied threshold is missing or invalid.
    pub default_threshold_days: ThresholdDays,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            store_location: PathBuf::from(DEFAULT_STORE_LOCATION),
            default_threshold_days: ThresholdDays::default(),
        }
    }
}

impl Settings {
    pub fn new(store_location: impl Into<PathBuf>, default_threshold_days: i64) -> Self {
        Settings {
            store_location: store_location.into(),
            default_threshold_days: ThresholdDays::or_fallback(default_threshold_days, ThresholdDays::default()),
        }
    }

    /// Normalize a raw threshold from a request against this configuration's default.
    pub fn threshold(&self, raw: Option<&str>) -> ThresholdDays {
        ThresholdDays::parse_or(raw, self.default_threshold_days)
    }
}
