//! Boundary codec for the `YYYY-MM-DD HH:MM:SS` naive local timestamps used by every store table.

use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, Time};

/// Parse a stored timestamp. Anything that does not match the fixed layout yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")).ok()
}

pub fn format_timestamp(ts: PrimitiveDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| String::new())
}

/// Current wall-clock time as a naive local timestamp, truncated to whole seconds.
///
/// Falls back to UTC, with a warning, when the local offset cannot be determined.
pub fn now_local() -> PrimitiveDateTime {
    local_or_utc(OffsetDateTime::now_local().ok(), OffsetDateTime::now_utc())
}

fn local_or_utc(local: Option<OffsetDateTime>, utc: OffsetDateTime) -> PrimitiveDateTime {
    let now = local.unwrap_or_else(|| {
        tracing::warn!("local UTC offset is indeterminate, using UTC as local time");
        utc
    });
    let time = Time::from_hms(now.hour(), now.minute(), now.second()).unwrap_or(now.time());
    PrimitiveDateTime::new(now.date(), time)
}
