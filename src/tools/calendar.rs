//! Calendar provider client and event date normalization for the
//! `schedule_event` tool.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::config::schema::CalendarConfig;
use crate::errors::ProviderError;

/// A calendar event ready to persist, with its date already normalized.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Calendar write capability, injected into the tool registry.
#[async_trait]
pub trait CalendarPort: Send + Sync {
    async fn create_event(&self, event: &CalendarEvent) -> Result<()>;
}

/// Calendar client that POSTs events to a REST calendar API.
pub struct HttpCalendarClient {
    config: CalendarConfig,
    client: Client,
}

impl HttpCalendarClient {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CalendarPort for HttpCalendarClient {
    async fn create_event(&self, event: &CalendarEvent) -> Result<()> {
        if self.config.api_url.is_empty() {
            anyhow::bail!("Calendar API not configured");
        }

        let url = format!(
            "{}/calendars/{}/events",
            self.config.api_url.trim_end_matches('/'),
            self.config.calendar_id
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(event)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.config.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        debug!("Event '{}' created on {}", event.title, event.date);
        Ok(())
    }
}

/// Resolve a `DD-MM` date lacking an explicit year against `today`.
///
/// The current year is assumed; if that date has already passed, the event
/// rolls forward one year. Dates already carrying a year, and strings that
/// don't look like `DD-MM` at all, pass through unchanged — this runs after
/// validation, right before the event is persisted.
pub fn normalize_event_date(date: &str, today: NaiveDate) -> String {
    // Already a full date.
    if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok() {
        return date.to_string();
    }

    let mut parts = date.splitn(2, '-');
    let (day, month) = match (
        parts.next().and_then(|s| s.trim().parse::<u32>().ok()),
        parts.next().and_then(|s| s.trim().parse::<u32>().ok()),
    ) {
        (Some(d), Some(m)) => (d, m),
        _ => return date.to_string(),
    };

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(d) if d >= today => d.format("%Y-%m-%d").to_string(),
        Some(_) => match NaiveDate::from_ymd_opt(today.year() + 1, month, day) {
            Some(next) => next.format("%Y-%m-%d").to_string(),
            None => date.to_string(),
        },
        None => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_month_before_date_uses_current_year() {
        // Dec 25 has not yet passed on Jun 1.
        assert_eq!(normalize_event_date("25-12", day(2026, 6, 1)), "2026-12-25");
    }

    #[test]
    fn test_day_month_after_date_rolls_forward() {
        // Dec 25 already passed on Dec 26.
        assert_eq!(
            normalize_event_date("25-12", day(2026, 12, 26)),
            "2027-12-25"
        );
    }

    #[test]
    fn test_same_day_stays_in_current_year() {
        assert_eq!(
            normalize_event_date("25-12", day(2026, 12, 25)),
            "2026-12-25"
        );
    }

    #[test]
    fn test_full_date_passes_through() {
        assert_eq!(
            normalize_event_date("2027-03-14", day(2026, 6, 1)),
            "2027-03-14"
        );
    }

    #[test]
    fn test_unrecognized_format_passes_through() {
        assert_eq!(
            normalize_event_date("next tuesday", day(2026, 6, 1)),
            "next tuesday"
        );
    }

    #[test]
    fn test_invalid_day_month_passes_through() {
        assert_eq!(normalize_event_date("40-13", day(2026, 6, 1)), "40-13");
    }

    #[tokio::test]
    async fn test_create_event_fails_unconfigured() {
        let client = HttpCalendarClient::new(CalendarConfig::default());
        let event = CalendarEvent {
            title: "Standup".into(),
            date: "2026-09-01".into(),
            time: "09:00".into(),
            end_time: None,
            location: None,
            description: None,
        };
        let result = client.create_event(&event).await;
        assert!(result.is_err());
    }
}
