//! Google Calendar REST client.
//!
//! Endpoints: POST/GET {api_base}/calendars/{calendarId}/events
//! Auth: Bearer OAuth access token

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, TimeZone, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::CalendarBackend;
use crate::config::CalendarSettings;
use crate::core::ActionError;
use crate::domain::{CalendarEvent, UpcomingEvent};

/// Public Google Calendar v3 endpoint
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

const SERVICE: &str = "Google Calendar";

/// Extra events requested because `timeMin` also matches events already in progress
const IN_PROGRESS_ALLOWANCE: usize = 20;

/// Largest page the events list endpoint accepts
const MAX_PAGE_SIZE: usize = 2500;

/// Calendar backend over the Google Calendar v3 API
pub struct GoogleCalendarClient {
    api_base: String,
    token: String,
    /// Offset used to place all-day events at local midnight
    offset: FixedOffset,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    start: EventTimeBody<'a>,
    end: EventTimeBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeBody<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Debug, Deserialize)]
struct InsertedEvent {
    id: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    start: EventTime,
    end: EventTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<String>,
    /// All-day events carry only a date
    #[serde(default)]
    date: Option<String>,
}

impl GoogleCalendarClient {
    pub fn new(token: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            api_base: GOOGLE_CALENDAR_API.to_string(),
            token: token.into(),
            offset,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Create from resolved settings
    pub fn from_settings(settings: &CalendarSettings, offset: FixedOffset) -> Self {
        Self::new(settings.token.clone(), offset).with_api_base(settings.api_base.clone())
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, ActionError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| ActionError::upstream(SERVICE, e))?;
        url.path_segments_mut()
            .map_err(|_| ActionError::upstream(SERVICE, "API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }

    fn parse_time(&self, time: &EventTime) -> Option<DateTime<FixedOffset>> {
        if let Some(date_time) = &time.date_time {
            return DateTime::parse_from_rfc3339(date_time).ok();
        }
        let date = NaiveDate::parse_from_str(time.date.as_deref()?, "%Y-%m-%d").ok()?;
        self.offset
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single()
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        format!("{} {}", status, text.trim())
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendarClient {
    fn name(&self) -> &str {
        "google"
    }

    async fn insert(&self, calendar_id: &str, event: &CalendarEvent) -> Result<String, ActionError> {
        let body = EventBody {
            summary: &event.title,
            start: EventTimeBody {
                date_time: event.start.to_rfc3339_opts(SecondsFormat::Secs, false),
                time_zone: &event.timezone,
            },
            end: EventTimeBody {
                date_time: event.end.to_rfc3339_opts(SecondsFormat::Secs, false),
                time_zone: &event.timezone,
            },
            description: event.description.as_deref(),
            location: event.location.as_deref(),
        };

        let response = self
            .client
            .post(self.events_url(calendar_id)?)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(ActionError::upstream(SERVICE, Self::error_body(response).await));
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;
        debug!(event_id = %inserted.id, "Calendar event inserted");
        Ok(inserted.id)
    }

    async fn list_from(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<UpcomingEvent>, ActionError> {
        let response = self
            .client
            .get(self.events_url(calendar_id)?)
            .header("Authorization", format!("Bearer {}", self.token))
            .query(&[
                ("timeMin", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("maxResults", page_size(limit).to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(ActionError::upstream(SERVICE, Self::error_body(response).await));
        }

        let list: EventList = response
            .json()
            .await
            .map_err(|e| ActionError::upstream(SERVICE, e))?;

        let mut events = Vec::with_capacity(list.items.len());
        for item in list.items {
            let (Some(start), Some(end)) = (self.parse_time(&item.start), self.parse_time(&item.end)) else {
                warn!(event_id = %item.id, "Skipping event with unreadable start or end");
                continue;
            };
            if start < from {
                continue;
            }
            events.push(UpcomingEvent {
                id: item.id,
                title: item.summary.unwrap_or_else(|| "(untitled)".to_string()),
                start,
                end,
            });
        }

        events.truncate(limit);
        Ok(events)
    }
}

fn page_size(limit: usize) -> usize {
    limit.saturating_add(IN_PROGRESS_ALLOWANCE).min(MAX_PAGE_SIZE)
}
