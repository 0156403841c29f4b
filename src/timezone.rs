//! Converting timestamps to a configured local timezone for display.

use time::{OffsetDateTime, UtcOffset, macros::format_description};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of a canonical timezone, e.g. "Asia/Dhaka".
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a known timezone.
pub fn local_offset(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    offset_at(canonical_timezone, OffsetDateTime::now_utc())
}

fn offset_at(canonical_timezone: &str, instant: OffsetDateTime) -> Result<UtcOffset, Error> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&instant).to_utc())
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
}

/// Format `date` in `canonical_timezone`, e.g. "1 Jan 2024, 06:00:00 AM".
///
/// The offset in effect at `date` is used, so dates on either side of a
/// daylight saving change both show the wall clock time of that day.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidTimezone] if the name is not a known timezone,
/// - or [Error::InvalidDate] if the date cannot be formatted.
pub fn format_local_datetime(
    date: OffsetDateTime,
    canonical_timezone: &str,
) -> Result<String, Error> {
    let offset = offset_at(canonical_timezone, date)?;

    date.to_offset(offset)
        .format(format_description!(
            "[day padding:none] [month repr:short] [year], [hour repr:12]:[minute]:[second] [period]"
        ))
        .map_err(|_| Error::InvalidDate(date.to_string()))
}
