//! Facade over one calendar identity.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, instrument};

use super::error::ActionError;
use crate::adapters::CalendarBackend;
use crate::domain::{CalendarEvent, UpcomingEvent};

/// Creates and lists events on a single calendar
#[derive(Clone)]
pub struct CalendarGateway {
    backend: Arc<dyn CalendarBackend>,
    calendar_id: String,

    /// IANA name attached to created events
    timezone: String,

    offset: FixedOffset,
}

impl CalendarGateway {
    pub fn new(
        backend: Arc<dyn CalendarBackend>,
        calendar_id: impl Into<String>,
        timezone: impl Into<String>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            backend,
            calendar_id: calendar_id.into(),
            timezone: timezone.into(),
            offset,
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Create an event and return the provider's id
    #[instrument(skip(self, description, location))]
    pub async fn create_event(
        &self,
        title: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
        description: Option<&str>,
        location: Option<&str>,
    ) -> Result<String, ActionError> {
        let event = CalendarEvent {
            title: title.to_string(),
            start: start.with_timezone(&self.offset),
            end: end.with_timezone(&self.offset),
            timezone: self.timezone.clone(),
            location: location.map(str::to_string),
            description: description.map(str::to_string),
        };

        let id = self.backend.insert(&self.calendar_id, &event).await?;
        info!(event_id = %id, "Created calendar event");
        Ok(id)
    }

    /// Upcoming events from now on, earliest first
    pub async fn list_upcoming(&self, limit: usize) -> Result<Vec<UpcomingEvent>, ActionError> {
        self.list_upcoming_at(limit, Utc::now()).await
    }

    /// Upcoming events from `now` on, earliest first, at most `limit`
    pub async fn list_upcoming_at(&self, limit: usize, now: DateTime<Utc>) -> Result<Vec<UpcomingEvent>, ActionError> {
        let mut events: Vec<UpcomingEvent> = self
            .backend
            .list_from(&self.calendar_id, now, limit)
            .await?
            .into_iter()
            .filter(|event| event.start >= now)
            .collect();

        events.sort_by_key(|event| event.start);
        events.truncate(limit);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::adapters::MemoryCalendar;

    fn offset() -> FixedOffset {
        FixedOffset::east_opt(3 * 3600).unwrap()
    }

    fn event(id: &str, start: DateTime<FixedOffset>) -> UpcomingEvent {
        UpcomingEvent {
            id: id.to_string(),
            title: id.to_string(),
            start,
            end: start + Duration::minutes(30),
        }
    }

    #[tokio::test]
    async fn test_list_upcoming_sorts_and_filters() {
        let backend = Arc::new(MemoryCalendar::new());
        let base = offset().with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        backend.push(event("later", base + Duration::days(2)));
        backend.push(event("past", base - Duration::days(1)));
        backend.push(event("soon", base + Duration::hours(1)));

        let gateway = CalendarGateway::new(backend, "primary", "Europe/Moscow", offset());
        let events = gateway
            .list_upcoming_at(5, base.with_timezone(&Utc))
            .await
            .unwrap();

        let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "later"]);
    }

    #[tokio::test]
    async fn test_list_upcoming_truncates_after_ordering() {
        let backend = Arc::new(MemoryCalendar::new());
        let base = offset().with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        backend.push(event("later", base + Duration::days(2)));
        backend.push(event("soon", base + Duration::hours(1)));
        backend.push(event("middle", base + Duration::days(1)));

        let gateway = CalendarGateway::new(backend, "primary", "Europe/Moscow", offset());
        let now = base.with_timezone(&Utc);

        let first = gateway.list_upcoming_at(1, now).await.unwrap();
        assert_eq!(first.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["soon"]);

        let two = gateway.list_upcoming_at(2, now).await.unwrap();
        assert_eq!(two.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(), vec!["soon", "middle"]);
    }

    #[tokio::test]
    async fn test_create_event_attaches_timezone() {
        let backend = Arc::new(MemoryCalendar::new());
        let gateway = CalendarGateway::new(backend.clone(), "primary", "Europe/Moscow", offset());
        let start = offset().with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        let id = gateway
            .create_event("Dentist", start, start + Duration::minutes(45), None, Some("Clinic"))
            .await
            .unwrap();

        assert_eq!(id, "evt-1");
        let created = backend.created();
        assert_eq!(created[0].timezone, "Europe/Moscow");
        assert_eq!(created[0].duration_minutes(), 45);
        assert_eq!(created[0].location.as_deref(), Some("Clinic"));
    }
}
