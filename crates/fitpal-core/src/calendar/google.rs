//! Google Calendar v3 implementation of [`CalendarProvider`].

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::provider::{
    CalendarError, CalendarPage, CalendarProvider, CalendarSummary, Credentials, EventRequest,
    NewCalendar, Reminder,
};

const API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarSummary>,
    next_page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalendarBody<'a> {
    summary: &'a str,
    description: &'a str,
    time_zone: &'a str,
}

#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    description: &'a str,
    start: EventTime<'a>,
    end: EventTime<'a>,
    reminders: Reminders<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime<'a> {
    date_time: String,
    time_zone: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Reminders<'a> {
    use_default: bool,
    overrides: &'a [Reminder],
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl<'a> EventBody<'a> {
    fn from_request(event: &'a EventRequest) -> Self {
        Self {
            summary: &event.summary,
            description: &event.description,
            start: EventTime {
                date_time: event.start.format(DATE_TIME_FORMAT).to_string(),
                time_zone: &event.time_zone,
            },
            end: EventTime {
                date_time: event.end.format(DATE_TIME_FORMAT).to_string(),
                time_zone: &event.time_zone,
            },
            reminders: Reminders {
                use_default: false,
                overrides: &event.reminders,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: API_BASE_URL.to_owned(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// `base_url` plus percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, CalendarError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CalendarError::Transport(format!("invalid base URL {:?}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| CalendarError::Transport(format!("base URL {:?} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, credentials: &Credentials) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&credentials.access_token)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, CalendarError> {
        let response = builder
            .send()
            .await
            .map_err(|e| CalendarError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        warn!(status = %status, %message, "Google Calendar API error");
        Err(match status {
            StatusCode::NOT_FOUND | StatusCode::GONE => CalendarError::NotFound(message),
            StatusCode::UNAUTHORIZED => CalendarError::Unauthorized(message),
            _ => CalendarError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, CalendarError> {
        response
            .json::<T>()
            .await
            .map_err(|e| CalendarError::Transport(format!("unexpected response shape: {e}")))
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    fn name(&self) -> &str {
        "google"
    }

    #[instrument(skip(self, credentials))]
    async fn list_calendars(
        &self,
        credentials: &Credentials,
        page_token: Option<&str>,
    ) -> Result<CalendarPage, CalendarError> {
        let mut url = self.url(&["users", "me", "calendarList"])?;
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }

        let response = Self::send(self.request(Method::GET, url, credentials)).await?;
        let list: CalendarListResponse = Self::json(response).await?;
        debug!(count = list.items.len(), more = list.next_page_token.is_some(), "calendar list page");
        Ok(CalendarPage {
            items: list.items,
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    #[instrument(skip(self, credentials, calendar), fields(summary = %calendar.summary))]
    async fn create_calendar(
        &self,
        credentials: &Credentials,
        calendar: &NewCalendar,
    ) -> Result<String, CalendarError> {
        let url = self.url(&["calendars"])?;
        let body = CalendarBody {
            summary: &calendar.summary,
            description: &calendar.description,
            time_zone: &calendar.time_zone,
        };
        let response = Self::send(self.request(Method::POST, url, credentials).json(&body)).await?;
        let created: Created = Self::json(response).await?;
        Ok(created.id)
    }

    #[instrument(skip(self, credentials, event), fields(summary = %event.summary))]
    async fn create_event(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        event: &EventRequest,
    ) -> Result<String, CalendarError> {
        let url = self.url(&["calendars", calendar_id, "events"])?;
        let body = EventBody::from_request(event);
        let response = Self::send(self.request(Method::POST, url, credentials).json(&body)).await?;
        let created: Created = Self::json(response).await?;
        Ok(created.id)
    }

    #[instrument(skip(self, credentials))]
    async fn delete_event(
        &self,
        credentials: &Credentials,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let url = self.url(&["calendars", calendar_id, "events", event_id])?;
        Self::send(self.request(Method::DELETE, url, credentials)).await?;
        Ok(())
    }

    #[instrument(skip(self, credentials))]
    async fn delete_calendar(&self, credentials: &Credentials, calendar_id: &str) -> Result<(), CalendarError> {
        let url = self.url(&["calendars", calendar_id])?;
        Self::send(self.request(Method::DELETE, url, credentials)).await?;
        Ok(())
    }
}
