//! Timestamp rendering in the configured display timezone.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// Naive layouts seen in legacy records; these carry no offset and are read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Renders `raw` in `tz`. Strings that do not parse are returned unchanged.
#[must_use]
pub fn format_timestamp(raw: &str, tz: Tz) -> String {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt.with_timezone(&tz).format(DISPLAY_FORMAT).to_string();
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map_or_else(
            || raw.to_string(),
            |naive| {
                naive
                    .and_utc()
                    .with_timezone(&tz)
                    .format(DISPLAY_FORMAT)
                    .to_string()
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_is_converted_to_target_zone() {
        assert_eq!(
            format_timestamp("2025-05-28T14:30:00Z", chrono_tz::America::Chicago),
            "2025-05-28 09:30 CDT"
        );
        assert_eq!(
            format_timestamp("2025-05-28T14:30:00+02:00", Tz::UTC),
            "2025-05-28 12:30 UTC"
        );
    }

    #[test]
    fn naive_legacy_timestamps_are_read_as_utc() {
        assert_eq!(
            format_timestamp("2025-01-10 08:05", chrono_tz::Europe::Berlin),
            "2025-01-10 09:05 CET"
        );
    }

    #[test]
    fn unparseable_strings_pass_through() {
        assert_eq!(format_timestamp("yesterday-ish", Tz::UTC), "yesterday-ish");
        assert_eq!(format_timestamp("", Tz::UTC), "");
    }
}
