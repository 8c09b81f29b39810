//! Resolving the local time for aggregation.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of a canonical timezone, e.g. "Pacific/Auckland".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current time in `canonical_timezone`, or in the system's local
/// timezone if none is given.
///
/// Falls back to UTC when the system's offset cannot be determined.
///
/// # Errors
///
/// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known timezone.
pub fn now_in_timezone(canonical_timezone: Option<&str>) -> Result<OffsetDateTime, Error> {
    let offset = match canonical_timezone {
        Some(name) => {
            get_local_offset(name).ok_or_else(|| Error::InvalidTimezone(name.to_owned()))?
        }
        None => UtcOffset::current_local_offset().unwrap_or_else(|error| {
            tracing::debug!("could not get the local offset, using UTC: {error}");
            UtcOffset::UTC
        }),
    };

    Ok(OffsetDateTime::now_utc().to_offset(offset))
}
