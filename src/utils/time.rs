//! Helpers for the service's timestamp strings.
//!
//! The service formats timestamps as `YYYY-MM-DD HH:MM:SS` local strings.
//! They are treated as opaque on the wire; the only interpretation this
//! crate performs is extracting the calendar day to group the session list.

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DAY_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses the calendar day out of a service timestamp, if it has one.
pub fn service_day(timestamp: &str) -> Option<Date> {
    let day = timestamp.get(..10)?;
    Date::parse(day, DAY_FORMAT).ok()
}

/// Human label for the day a timestamp falls on, relative to `today`:
/// "Today", "Yesterday", or the date itself. `None` when the timestamp does
/// not start with a parseable day.
pub fn day_label(timestamp: &str, today: Date) -> Option<String> {
    let day = service_day(timestamp)?;
    if day == today {
        Some("Today".to_string())
    } else if today.previous_day() == Some(day) {
        Some("Yesterday".to_string())
    } else {
        Some(day.to_string())
    }
}

/// The current calendar day in UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_day_prefix() {
        assert_eq!(
            service_day("2026-08-06 10:15:00"),
            Some(date!(2026 - 08 - 06))
        );
        assert_eq!(service_day("not a date"), None);
        assert_eq!(service_day(""), None);
    }

    #[test]
    fn labels_relative_days() {
        let today = date!(2026 - 08 - 06);
        assert_eq!(
            day_label("2026-08-06 09:00:00", today).as_deref(),
            Some("Today")
        );
        assert_eq!(
            day_label("2026-08-05 23:59:59", today).as_deref(),
            Some("Yesterday")
        );
        assert_eq!(
            day_label("2026-07-01 00:00:00", today).as_deref(),
            Some("2026-07-01")
        );
        assert_eq!(day_label("???", today), None);
    }
}
