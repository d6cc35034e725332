use crate::takeoutfix_core::error::{Result, TakeoutError};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Date format used in EXIF date-time tags.
pub const EXIF_DATE_FORMAT: &[FormatItem] =
    format_description!("[year]:[month]:[day] [hour]:[minute]:[second]");

/// Date format used in log lines and reports.
pub const DISPLAY_DATE_FORMAT: &[FormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Date format accepted from the operator during manual repair.
pub const MANUAL_DATE_FORMAT: &[FormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Get the local timezone offset for a given instant, falling back to UTC.
///
/// The `time` crate refuses to read the local offset once the process has
/// spawned threads, so test binaries usually land on UTC.
pub fn get_local_tz_at(instant: OffsetDateTime) -> UtcOffset {
    UtcOffset::local_offset_at(instant).unwrap_or_else(|_| {
        log::debug!("Failed to get local offset, using UTC instead.");
        UtcOffset::UTC
    })
}

/// Convert epoch seconds to a date-time in the local timezone.
pub fn local_datetime(epoch: i64) -> Result<OffsetDateTime> {
    let utc = OffsetDateTime::from_unix_timestamp(epoch)
        .map_err(|e| TakeoutError::InvalidDateFormat(e.to_string()))?;
    Ok(utc.to_offset(get_local_tz_at(utc)))
}

/// Format epoch seconds as an EXIF date-time string in local time.
pub fn exif_date_string(epoch: i64) -> Result<String> {
    local_datetime(epoch)?
        .format(EXIF_DATE_FORMAT)
        .map_err(|e| TakeoutError::InvalidDateFormat(e.to_string()))
}

/// Format epoch seconds for humans, in local time.
pub fn display_date_string(epoch: i64) -> String {
    local_datetime(epoch)
        .and_then(|dt| {
            dt.format(DISPLAY_DATE_FORMAT)
                .map_err(|e| TakeoutError::InvalidDateFormat(e.to_string()))
        })
        .unwrap_or_else(|_| epoch.to_string())
}

/// Parse an operator-supplied `YYYY-MM-DD HH:MM` string as local time.
pub fn parse_manual_date(input: &str) -> Result<i64> {
    let naive = PrimitiveDateTime::parse(input.trim(), MANUAL_DATE_FORMAT)
        .map_err(|e| TakeoutError::InvalidDateFormat(e.to_string()))?;
    let offset = get_local_tz_at(naive.assume_utc());
    Ok(naive.assume_offset(offset).unix_timestamp())
}
