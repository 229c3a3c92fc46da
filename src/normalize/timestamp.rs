//! Timestamp parsing and priority-ordered field selection.
//!
//! The upstream API populates an arbitrary subset of timestamp fields per
//! record, in epoch seconds, epoch milliseconds, numeric strings, or ISO
//! text. Selection walks a fixed priority table and takes the first field
//! that is *present*; if that field then fails to parse, the record falls
//! back to "now" rather than failing the import.

use crate::domain::DateSource;
use crate::lnmarkets::records::RawTimestamp;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

/// Epoch values below this are seconds, at or above it milliseconds.
/// The cutoff is 2100-01-01 in seconds, i.e. any plausible seconds value.
const EPOCH_SECONDS_CUTOFF: i64 = 4_102_444_800;

/// An ordered list of named field accessors, evaluated in sequence.
pub type Priority<T> = &'static [(&'static str, fn(&T) -> Option<&RawTimestamp>)];

/// Walk `priority` over `record` and resolve one UTC instant.
///
/// The first present field wins, parseable or not; an unparseable winner
/// resolves to now with [`DateSource::Fallback`] so the substitution stays
/// visible downstream.
pub fn pick_timestamp<T>(record: &T, priority: Priority<T>) -> (DateTime<Utc>, DateSource) {
    for (field, accessor) in priority {
        if let Some(raw) = accessor(record) {
            match parse_timestamp(raw) {
                Some(at) => return (at, DateSource::Field),
                None => {
                    debug!(field, value = ?raw, "unparseable timestamp, using import time");
                    return (Utc::now(), DateSource::Fallback);
                }
            }
        }
    }
    debug!("no timestamp field present, using import time");
    (Utc::now(), DateSource::Fallback)
}

/// Parse a raw timestamp into a UTC instant, or None if malformed.
pub fn parse_timestamp(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Int(n) => epoch_to_utc(*n),
        RawTimestamp::Float(f) if f.is_finite() && *f > 0.0 => {
            if *f < EPOCH_SECONDS_CUTOFF as f64 {
                Utc.timestamp_millis_opt((*f * 1000.0) as i64).single()
            } else {
                Utc.timestamp_millis_opt(*f as i64).single()
            }
        }
        RawTimestamp::Float(_) => None,
        RawTimestamp::Text(s) => parse_text(s.trim()),
    }
}

fn epoch_to_utc(value: i64) -> Option<DateTime<Utc>> {
    if value <= 0 {
        return None;
    }
    let millis = if value < EPOCH_SECONDS_CUTOFF {
        value.checked_mul(1000)?
    } else {
        value
    };
    Utc.timestamp_millis_opt(millis).single()
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    // Numeric strings carry epoch values in either precision.
    if let Ok(n) = s.parse::<i64>() {
        return epoch_to_utc(n);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?));
    }
    None
}
