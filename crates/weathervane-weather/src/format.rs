//! Display formatting for timestamps and temperatures.
//!
//! All times are rendered in UTC so output does not depend on the host
//! timezone.

use chrono::{DateTime, Utc};

/// Output layouts used by the projector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayFormat {
    /// `11:49 AM`
    HourMinute,
    /// `12 PM`
    Hour,
    /// `Tue Jul 09 2024 11 AM`
    FullDateWithTime,
    /// `Tue`
    DayOfWeekShort,
}

impl DisplayFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::HourMinute => "%-I:%M %p",
            Self::Hour => "%-I %p",
            Self::FullDateWithTime => "%a %b %d %Y %-I %p",
            Self::DayOfWeekShort => "%a",
        }
    }
}

/// Parse an ISO-8601 timestamp as sent by the API (`2024-07-09T11:49:00Z`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Reformat an API timestamp; unparseable input yields an empty string.
pub fn format_time(raw: &str, format: DisplayFormat) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format(format.pattern()).to_string(),
        None => {
            if !raw.is_empty() {
                tracing::debug!("Unparseable timestamp: {:?}", raw);
            }
            String::new()
        }
    }
}

/// Reformat a stored timestamp for display; text that is not a timestamp
/// is returned unchanged.
pub fn display_time(raw: &str, format: DisplayFormat) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format(format.pattern()).to_string(),
        None => raw.to_string(),
    }
}

/// Render a stored unit-less reading in Celsius; anything else is returned
/// unchanged.
pub fn display_celsius(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) => celsius(value),
        Err(_) => raw.to_string(),
    }
}

/// One decimal place, no unit.
pub fn temperature(value: f64) -> String {
    format!("{:.1}", value)
}

/// One decimal place with a Celsius suffix.
pub fn celsius(value: f64) -> String {
    format!("{:.1}°C", value)
}

/// Title-case each word: first letter upper, the rest lower.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            // apostrophes stay inside a word ("o'hare" -> "O'hare")
            at_word_start = c != '\'';
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_minute() {
        assert_eq!(
            format_time("2024-07-09T11:49:00Z", DisplayFormat::HourMinute),
            "11:49 AM"
        );
        assert_eq!(
            format_time("2024-07-09T15:05:00Z", DisplayFormat::HourMinute),
            "3:05 PM"
        );
    }

    #[test]
    fn test_hour() {
        assert_eq!(format_time("2024-07-09T12:00:00Z", DisplayFormat::Hour), "12 PM");
        assert_eq!(format_time("2024-07-09T00:00:00Z", DisplayFormat::Hour), "12 AM");
    }

    #[test]
    fn test_full_date_with_time() {
        assert_eq!(
            format_time("2024-07-09T11:49:00Z", DisplayFormat::FullDateWithTime),
            "Tue Jul 09 2024 11 AM"
        );
    }

    #[test]
    fn test_day_of_week_short() {
        assert_eq!(
            format_time("2024-07-10T00:00:00Z", DisplayFormat::DayOfWeekShort),
            "Wed"
        );
    }

    #[test]
    fn test_offset_is_normalized_to_utc() {
        assert_eq!(
            format_time("2024-07-09T13:49:00+02:00", DisplayFormat::HourMinute),
            "11:49 AM"
        );
    }

    #[test]
    fn test_unparseable_time_is_empty() {
        assert_eq!(format_time("", DisplayFormat::Hour), "");
        assert_eq!(format_time("yesterday", DisplayFormat::Hour), "");
    }

    #[test]
    fn test_temperature_formatting() {
        assert_eq!(temperature(20.19), "20.2");
        assert_eq!(temperature(21.0), "21.0");
        assert_eq!(celsius(20.19), "20.2°C");
        assert_eq!(celsius(-3.0), "-3.0°C");
    }

    #[test]
    fn test_display_time_keeps_non_timestamps() {
        assert_eq!(
            display_time("2024-07-09T11:49:00Z", DisplayFormat::FullDateWithTime),
            "Tue Jul 09 2024 11 AM"
        );
        assert_eq!(display_time("12 PM", DisplayFormat::Hour), "12 PM");
    }

    #[test]
    fn test_display_celsius() {
        assert_eq!(display_celsius("20.19"), "20.2°C");
        assert_eq!(display_celsius("-3"), "-3.0°C");
        assert_eq!(display_celsius("20.2°C"), "20.2°C");
        assert_eq!(display_celsius(""), "");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("new york"), "New York");
        assert_eq!(capitalize_words("NEW YORK"), "New York");
        assert_eq!(capitalize_words("winston-salem"), "Winston-Salem");
        assert_eq!(capitalize_words("  london "), "  London ");
        assert_eq!(capitalize_words(""), "");
    }
}
