//! Pickup-window strings, e.g. "10:00-13:00". The end time of the window is
//! applied to the current date to produce the pickup deadline of a paid lot.

use lazy_static::lazy_static;
use regex::Regex;
use time::{OffsetDateTime, Time};

lazy_static! {
    static ref WINDOW_RE: Regex =
        Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)\s*-\s*([01]\d|2[0-3]):([0-5]\d)$").unwrap();
}

pub fn is_valid_window(window: &str) -> bool {
    WINDOW_RE.is_match(window.trim())
}

/// End time of the window, `None` for malformed strings.
pub fn parse_window_end(window: &str) -> Option<Time> {
    let caps = WINDOW_RE.captures(window.trim())?;
    let hour: u8 = caps[3].parse().ok()?;
    let minute: u8 = caps[4].parse().ok()?;
    Time::from_hms(hour, minute, 0).ok()
}

/// Pickup deadline: today's date at the window's end time.
pub fn deadline_from_window(window: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    parse_window_end(window).map(|end| now.replace_time(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn accepts_plain_windows() {
        assert!(is_valid_window("10:00-13:00"));
        assert!(is_valid_window("09:30 - 21:45"));
        assert!(is_valid_window(" 00:00-23:59 "));
    }

    #[test]
    fn rejects_malformed_windows() {
        assert!(!is_valid_window("10-13"));
        assert!(!is_valid_window("25:00-26:00"));
        assert!(!is_valid_window("10:00"));
        assert!(!is_valid_window("mañana"));
        assert!(!is_valid_window(""));
    }

    #[test]
    fn parses_window_end() {
        assert_eq!(
            parse_window_end("10:00-13:00"),
            Some(Time::from_hms(13, 0, 0).unwrap())
        );
        assert_eq!(
            parse_window_end("08:15 - 20:45"),
            Some(Time::from_hms(20, 45, 0).unwrap())
        );
        assert_eq!(parse_window_end("not a window"), None);
    }

    #[test]
    fn deadline_lands_on_same_date() {
        let now = datetime!(2026-03-14 09:26:53 UTC);
        let deadline = deadline_from_window("10:00-13:00", now).unwrap();
        assert_eq!(deadline, datetime!(2026-03-14 13:00:00 UTC));
    }
}
