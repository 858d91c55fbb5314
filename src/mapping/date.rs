//! Date normalization
//!
//! Bridge dates without an explicit offset are wall-clock times in Paris.
//! Everything is converted to a UTC instant before reaching Algoan.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Europe::Paris, Tz};

/// Reference timezone for offset-less Bridge dates
pub const REFERENCE_TIMEZONE: Tz = Paris;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Convert a Bridge date into an instant.
///
/// Absent, empty and unparseable values yield the current instant.
pub fn to_instant(value: Option<&str>) -> DateTime<Utc> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Utc::now();
    };

    parse_in_reference_zone(raw).unwrap_or_else(|| {
        tracing::warn!(value = raw, "Unparseable Bridge date, substituting current time");
        Utc::now()
    })
}

fn parse_in_reference_zone(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    localize(naive)
}

/// Resolve a Paris wall-clock time, taking the earlier instant on DST
/// overlap and skipping forward over a DST gap.
fn localize(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    REFERENCE_TIMEZONE
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            REFERENCE_TIMEZONE
                .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|local| local.with_timezone(&Utc))
}
