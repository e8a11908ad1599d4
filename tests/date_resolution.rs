//! Date Resolution Integration Tests
//!
//! Phrase resolution against a fixed "now" in UTC+3.

use chrono::{DateTime, FixedOffset, TimeZone};
use voice_notes::DateResolver;

fn moscow() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    moscow().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn test_iso_date_time_is_taken_verbatim() {
    let resolver = DateResolver::new(moscow());
    let resolved = resolver.resolve_at("2026-03-01 10:00", at(2025, 12, 1, 9, 0));

    assert_eq!(resolved, at(2026, 3, 1, 10, 0));
    assert_eq!(resolved.offset().local_minus_utc(), 3 * 3600);
}

#[test]
fn test_tomorrow_defaults_to_ten() {
    let resolver = DateResolver::new(moscow());
    assert_eq!(resolver.resolve_at("завтра", at(2025, 1, 10, 17, 45)), at(2025, 1, 11, 10, 0));
}

#[test]
fn test_day_month_keeps_current_year_when_ahead() {
    let resolver = DateResolver::new(moscow());
    assert_eq!(resolver.resolve_at("3 февраля", at(2025, 1, 10, 12, 0)), at(2025, 2, 3, 10, 0));
}

#[test]
fn test_day_month_rolls_over_when_passed() {
    let resolver = DateResolver::new(moscow());
    assert_eq!(resolver.resolve_at("3 февраля", at(2025, 3, 10, 12, 0)), at(2026, 2, 3, 10, 0));
}

#[test]
fn test_impossible_date_falls_back_to_tomorrow() {
    let resolver = DateResolver::new(moscow());
    let now = at(2025, 1, 10, 12, 0);

    assert_eq!(
        resolver.resolve_at("31 февраля", now),
        resolver.resolve_at("завтра", now)
    );
}

#[test]
fn test_embedded_clock_overrides_default_hour() {
    let resolver = DateResolver::new(moscow());
    let now = at(2025, 1, 10, 12, 0);

    assert_eq!(resolver.resolve_at("3 февраля в 15:30", now), at(2025, 2, 3, 15, 30));
    assert_eq!(resolver.resolve_at("завтра в 9:00", now), at(2025, 1, 11, 9, 0));
}
