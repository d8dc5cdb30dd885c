//! Recency threshold policy: a positive count of days, with a fallback for bad input.

use serde::Serialize;
use std::fmt;
use std::num::IntErrorKind;
use time::Duration;

pub const DEFAULT_THRESHOLD_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ThresholdDays(u32);

impl Default for ThresholdDays {
    fn default() -> Self {
        ThresholdDays(DEFAULT_THRESHOLD_DAYS)
    }
}

impl ThresholdDays {
    /// Accept `days` when it is positive, otherwise use `fallback`.
    /// Values past `u32::MAX` are clamped to it.
    pub fn or_fallback(days: i64, fallback: ThresholdDays) -> Self {
        if days <= 0 {
            return fallback;
        }
        ThresholdDays(u32::try_from(days).unwrap_or(u32::MAX))
    }

    /// Normalize caller input. Missing, non-numeric, zero or negative values all become `fallback`;
    /// a positive number too large for any integer type is clamped like any other large value.
    pub fn parse_or(raw: Option<&str>, fallback: ThresholdDays) -> Self {
        let Some(raw) = raw else { return fallback };
        match raw.trim().parse::<i64>() {
            Ok(days) => Self::or_fallback(days, fallback),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => ThresholdDays(u32::MAX),
            Err(_) => fallback,
        }
    }

    pub fn days(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::days(i64::from(self.0))
    }
}

impl From<u32> for ThresholdDays {
    fn from(days: u32) -> Self {
        Self::or_fallback(i64::from(days), ThresholdDays::default())
    }
}

impl fmt::Display for ThresholdDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_falls_back_to_default() {
        for raw in ["abc", "-3", "0", "", "7.5", "-99999999999999999999"] {
            assert_eq!(ThresholdDays::parse_or(Some(raw), ThresholdDays::default()).days(), 7, "input {raw:?}");
        }
        assert_eq!(ThresholdDays::parse_or(None, ThresholdDays::default()).days(), 7);
    }

    #[test]
    fn valid_input_is_kept() {
        assert_eq!(ThresholdDays::parse_or(Some("30"), ThresholdDays::default()).days(), 30);
        assert_eq!(ThresholdDays::parse_or(Some(" 1 "), ThresholdDays::default()).days(), 1);
    }

    #[test]
    fn oversized_input_is_clamped() {
        let fallback = ThresholdDays::default();
        assert_eq!(ThresholdDays::parse_or(Some("4294967295"), fallback).days(), u32::MAX);
        assert_eq!(ThresholdDays::parse_or(Some("5000000000"), fallback).days(), u32::MAX);
        assert_eq!(ThresholdDays::parse_or(Some("99999999999999999999"), fallback).days(), u32::MAX);
        assert_eq!(ThresholdDays::or_fallback(i64::MAX, fallback).days(), u32::MAX);
        assert_eq!(ThresholdDays::parse_or(Some("4294967294"), fallback).days(), u32::MAX - 1);
    }

    #[test]
    fn fallback_is_caller_supplied() {
        let fallback = ThresholdDays::from(14);
        assert_eq!(ThresholdDays::parse_or(Some("nope"), fallback).days(), 14);
        assert_eq!(ThresholdDays::from(0).days(), 7);
    }
}
