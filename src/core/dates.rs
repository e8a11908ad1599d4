//! Date phrase resolution.
//!
//! Turns phrases like "2026-03-01 14:00", "3 февраля", "March 3rd" or
//! "завтра в 15:30" into a timestamp in the configured offset. Resolution
//! never fails: anything unrecognized lands on tomorrow at 10:00.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

/// Time of day used when the phrase carries no clock time
pub const DEFAULT_HOUR: u32 = 10;

/// Relative keywords and their day offsets.
///
/// Order matters: "послезавтра" contains "завтра" and "day after tomorrow"
/// contains "tomorrow".
const RELATIVE: &[(&str, i64)] = &[
    ("послезавтра", 2),
    ("day after tomorrow", 2),
    ("завтра", 1),
    ("tomorrow", 1),
    ("сегодня", 0),
    ("today", 0),
    ("через неделю", 7),
    ("in a week", 7),
    ("через месяц", 30),
    ("in a month", 30),
];

const MONTHS: &[(&str, u32)] = &[
    ("январь", 1),
    ("января", 1),
    ("февраль", 2),
    ("февраля", 2),
    ("март", 3),
    ("марта", 3),
    ("апрель", 4),
    ("апреля", 4),
    ("май", 5),
    ("мая", 5),
    ("июнь", 6),
    ("июня", 6),
    ("июль", 7),
    ("июля", 7),
    ("август", 8),
    ("августа", 8),
    ("сентябрь", 9),
    ("сентября", 9),
    ("октябрь", 10),
    ("октября", 10),
    ("ноябрь", 11),
    ("ноября", 11),
    ("декабрь", 12),
    ("декабря", 12),
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Resolves date phrases against a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateResolver {
    offset: FixedOffset,
}

impl DateResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Current local time in the configured offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Resolve a phrase relative to the current time
    pub fn resolve(&self, phrase: &str) -> DateTime<FixedOffset> {
        self.resolve_at(phrase, self.now())
    }

    /// Resolve a phrase relative to `now`.
    ///
    /// First match wins: leading ISO date (with or without time), day and
    /// month name, relative keyword, then tomorrow. A clock time found
    /// anywhere in the phrase replaces the 10:00 default.
    pub fn resolve_at(&self, phrase: &str, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        let text = phrase.trim().to_lowercase();
        let today = now.with_timezone(&self.offset).date_naive();

        let date = leading_iso_date(&text)
            .or_else(|| day_and_month(&text, today))
            .unwrap_or_else(|| relative_date(&text, today));

        let time = find_clock(&text)
            .or_else(|| NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0))
            .unwrap_or_default();

        let resolved = self.at_local(date.and_time(time));
        debug!(phrase, resolved = %resolved, "Resolved date phrase");
        resolved
    }

    fn at_local(&self, local: NaiveDateTime) -> DateTime<FixedOffset> {
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, self.offset)
    }
}

/// `YYYY-MM-DD` at the very start of the phrase; invalid dates fall through
fn leading_iso_date(text: &str) -> Option<NaiveDate> {
    let head = text.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// "3 февраля", "3 march 2027" or "march 3rd".
///
/// Returns `None` when no day/month pair is present. A pair that does not
/// form a real date resolves to tomorrow.
fn day_and_month(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let (day, month, year) = tokens.windows(2).enumerate().find_map(|(i, pair)| {
        let year = tokens.get(i + 2).and_then(|t| parse_year(t));
        if let (Some(day), Some(month)) = (parse_day(pair[0]), month_number(pair[1])) {
            return Some((day, month, year));
        }
        if let (Some(month), Some(day)) = (month_number(pair[0]), parse_day(pair[1])) {
            return Some((day, month, year));
        }
        None
    })?;

    let tomorrow = today + Duration::days(1);
    let resolved = match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => NaiveDate::from_ymd_opt(today.year(), month, day).and_then(|candidate| {
            if candidate < today {
                NaiveDate::from_ymd_opt(today.year() + 1, month, day)
            } else {
                Some(candidate)
            }
        }),
    };

    Some(resolved.unwrap_or(tomorrow))
}

fn relative_date(text: &str, today: NaiveDate) -> NaiveDate {
    let days = RELATIVE
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, days)| *days)
        .unwrap_or(1);
    today + Duration::days(days)
}

/// Day of month with an optional English ordinal suffix ("3", "3rd")
fn parse_day(token: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|day| (1..=31).contains(day))
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        token.parse().ok()
    } else {
        None
    }
}

fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, month)| *month)
}

/// First `H:MM` or `HH:MM` in the text that is a valid time of day
pub fn find_clock(text: &str) -> Option<NaiveTime> {
    let chars: Vec<char> = text.chars().collect();

    for (i, _) in chars.iter().enumerate().filter(|(_, c)| **c == ':') {
        let mut start = i;
        while start > 0 && chars[start - 1].is_ascii_digit() {
            start -= 1;
        }
        let hour_len = i - start;
        if !(1..=2).contains(&hour_len) {
            continue;
        }

        let minutes: String = chars.iter().skip(i + 1).take(2).collect();
        if minutes.len() != 2 || !minutes.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if chars.get(i + 3).is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }

        let hour: String = chars[start..i].iter().collect();
        let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minutes.parse::<u32>()) else {
            continue;
        };
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            return Some(time);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn resolver() -> DateResolver {
        DateResolver::new(FixedOffset::east_opt(3 * 3600).unwrap())
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        resolver().offset().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_find_clock() {
        assert_eq!(find_clock("завтра в 9:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(find_clock("at 15:30 sharp"), NaiveTime::from_hms_opt(15, 30, 0));
        assert_eq!(find_clock("25:00"), None);
        assert_eq!(find_clock("123:45"), None);
        assert_eq!(find_clock("12:345"), None);
        assert_eq!(find_clock("no time here"), None);
    }

    #[test]
    fn test_iso_with_time() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("2026-03-01 14:45", now), at(2026, 3, 1, 14, 45));
    }

    #[test]
    fn test_iso_without_time_defaults_to_ten() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("2026-03-01", now), at(2026, 3, 1, 10, 0));
    }

    #[test]
    fn test_invalid_iso_falls_through_to_tomorrow() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("2026-02-30", now), at(2026, 1, 11, 10, 0));
    }

    #[test]
    fn test_english_month_first_with_ordinal() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("March 3rd at 9:15", now), at(2026, 3, 3, 9, 15));
    }

    #[test]
    fn test_explicit_year_is_kept() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("5 мая 2027", now), at(2027, 5, 5, 10, 0));
    }

    #[test]
    fn test_today_is_not_elapsed() {
        let now = at(2026, 2, 3, 18, 0);
        assert_eq!(resolver().resolve_at("3 февраля", now), at(2026, 2, 3, 10, 0));
    }

    #[test]
    fn test_day_after_tomorrow_beats_tomorrow() {
        let now = at(2026, 1, 10, 12, 0);
        assert_eq!(resolver().resolve_at("послезавтра", now), at(2026, 1, 12, 10, 0));
        assert_eq!(resolver().resolve_at("the day after tomorrow", now), at(2026, 1, 12, 10, 0));
    }

    #[test]
    fn test_relative_offsets() {
        let now = at(2026, 1, 10, 12, 0);
        let r = resolver();
        assert_eq!(r.resolve_at("сегодня в 18:00", now), at(2026, 1, 10, 18, 0));
        assert_eq!(r.resolve_at("через неделю", now), at(2026, 1, 17, 10, 0));
        assert_eq!(r.resolve_at("in a month", now), at(2026, 2, 9, 10, 0));
        assert_eq!(r.resolve_at("someday", now), at(2026, 1, 11, 10, 0));
    }

    #[test]
    fn test_now_is_converted_to_configured_offset() {
        // 23:30 UTC on Jan 10 is already Jan 11 in UTC+3
        let utc_now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 10, 23, 30, 0)
            .unwrap();
        let resolved = resolver().resolve_at("today", utc_now);
        assert_eq!(resolved.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 11).unwrap());
        assert_eq!(resolved.hour(), 10);
        assert_eq!(resolved.offset(), &resolver().offset());
    }
}
