//! Calendar event types.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::core::ActionError;

/// Default event length when the caller gives neither an end nor a duration
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Longest accepted event: one week
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// An event to be created in the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,

    /// IANA timezone name sent alongside the timestamps
    pub timezone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Length of the event in minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// An existing event as returned by the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Compute the end of an event.
///
/// An explicit end wins; otherwise start + duration (60 minutes by default).
/// An end outside the representable range is `InvalidDate`.
pub fn event_end(
    start: DateTime<FixedOffset>,
    duration_minutes: Option<i64>,
    explicit_end: Option<DateTime<FixedOffset>>,
) -> Result<DateTime<FixedOffset>, ActionError> {
    if let Some(end) = explicit_end {
        return Ok(end);
    }

    let minutes = duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);
    Duration::try_minutes(minutes)
        .and_then(|duration| start.checked_add_signed(duration))
        .ok_or_else(|| ActionError::InvalidDate(format!("{} + {} min", start.to_rfc3339(), minutes)))
}
