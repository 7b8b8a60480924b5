use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset of the timezone named `canonical_timezone`, e.g. "Pacific/Auckland".
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current wall-clock time in `canonical_timezone`, truncated to whole seconds.
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if `canonical_timezone` is not a known timezone.
pub fn local_now(canonical_timezone: &str) -> Result<PrimitiveDateTime, Error> {
    let offset = get_local_offset(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezoneError(canonical_timezone.to_owned())
    })?;

    let now = OffsetDateTime::now_utc().to_offset(offset);
    let now = PrimitiveDateTime::new(now.date(), now.time());

    Ok(now.replace_nanosecond(0).unwrap_or(now))
}

#[cfg(test)]
mod tests {
    use crate::{Error, timezone::local_now};

    #[test]
    fn local_now_has_no_subseconds() {
        let now = local_now("Etc/UTC").expect("UTC should be a valid timezone");

        assert_eq!(now.nanosecond(), 0);
    }

    #[test]
    fn local_now_rejects_unknown_timezone() {
        assert_eq!(
            local_now("Middle/Earth"),
            Err(Error::InvalidTimezoneError("Middle/Earth".to_owned()))
        );
    }
}
