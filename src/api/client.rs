/// Blocking HTTP client for the coaching backend.
///
/// Uses the synchronous `ureq` client. Every operation funnels through
/// [`HttpClient::request`], which owns the whole error policy:
///
/// - **Non-2xx**: the body is parsed as JSON and its `detail` field becomes
///   the message; otherwise the transport's status text is used.
/// - **2xx**: the body is decoded into the schema type and validated; a body
///   that fails either step is reported as an [`ApiError`] too.
/// - **No response**: [`ClientError::Transport`].
use std::time::Instant;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ClientError};
use super::CoachApi;
use crate::config::CoachConfig;
use crate::journal::{Journal, JournalEntry, Outcome};
use crate::schema::{
    AnalyticsResponse, DailyMetricsUpdate, DashboardResponse, MetricsUpdated, ProfileUpdate,
    SessionInput, SessionLogged, TrainingPrescription, UserId, UserProfile, Validate,
};

// ---------------------------------------------------------------------------
// Request description
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method, extra headers and body of one call.
///
/// Extra headers are applied after the JSON content type, so a caller can
/// override it.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestInit {
    pub fn get() -> Self {
        Self::default()
    }

    /// A write with a JSON-encoded body.
    pub fn json<B: Serialize>(method: Method, payload: &B) -> Result<Self, ClientError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| ClientError::Transport(format!("failed to encode request body: {e}")))?;
        Ok(Self {
            method,
            headers: Vec::new(),
            body: Some(body),
        })
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client rooted at a fixed API base URL.
#[derive(Debug)]
pub struct HttpClient {
    agent: ureq::Agent,
    base_url: String,
    journal: Option<Journal>,
}

impl HttpClient {
    /// Client for `base_url` (e.g. `http://127.0.0.1:8000/api`), without a
    /// journal.
    pub fn new(base_url: &str) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.trim_end_matches('/').to_string(),
            journal: None,
        }
    }

    /// Build a client from the resolved config, journaling when
    /// `[logging] enabled = true`.
    pub fn from_config(config: &CoachConfig) -> Self {
        let client = Self::new(&config.api.base_url);
        if !config.logging.enabled {
            return client;
        }
        match Journal::for_config(&config.logging) {
            Some(journal) => client.with_journal(journal),
            None => client,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one call to `{base_url}{path}` and decode the response as `T`.
    pub fn request<T>(&self, path: &str, init: RequestInit) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Validate,
    {
        let start = Instant::now();
        let result = self.send(path, &init);
        let latency_ms = start.elapsed().as_millis() as u64;

        if let Some(journal) = &self.journal {
            journal.record(&journal_entry(init.method, path, &result, latency_ms));
        }

        let (status, body) = result?;
        Ok(decode_success(status, &body)?)
    }

    /// Perform the HTTP exchange. Returns the status and body of a 2xx
    /// response; every other outcome is already an error.
    fn send(&self, path: &str, init: &RequestInit) -> Result<(u16, String), ClientError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .agent
            .request(init.method.as_str(), &url)
            .set("Content-Type", "application/json");
        for (name, value) in &init.headers {
            request = request.set(name, value);
        }

        let outcome = match &init.body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };

        match outcome {
            Ok(response) => {
                let status = response.status();
                let status_text = response.status_text().to_string();
                let body = response.into_string().map_err(|e| {
                    ClientError::Transport(format!("failed to read response body: {e}"))
                })?;
                if (200..300).contains(&status) {
                    Ok((status, body))
                } else {
                    Err(error_from_body(status, &status_text, &body).into())
                }
            }
            Err(ureq::Error::Status(status, response)) => {
                let status_text = response.status_text().to_string();
                let body = response.into_string().unwrap_or_default();
                Err(error_from_body(status, &status_text, &body).into())
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(ClientError::Transport(transport.to_string()))
            }
        }
    }
}

impl CoachApi for HttpClient {
    fn get_profile(&self) -> Result<UserProfile, ClientError> {
        self.request("/profile", RequestInit::get())
    }

    fn update_profile(&self, payload: &ProfileUpdate) -> Result<UserProfile, ClientError> {
        self.request("/profile", RequestInit::json(Method::Put, payload)?)
    }

    fn log_session(&self, payload: &SessionInput) -> Result<SessionLogged, ClientError> {
        self.request("/log-session", RequestInit::json(Method::Post, payload)?)
    }

    fn update_metrics(&self, payload: &DailyMetricsUpdate) -> Result<MetricsUpdated, ClientError> {
        self.request("/update-metrics", RequestInit::json(Method::Post, payload)?)
    }

    fn get_next_workout(&self, user_id: UserId) -> Result<TrainingPrescription, ClientError> {
        self.request(&format!("/next-workout?user_id={user_id}"), RequestInit::get())
    }

    fn get_analytics(
        &self,
        user_id: UserId,
        exercise: &str,
    ) -> Result<AnalyticsResponse, ClientError> {
        let path = format!(
            "/analytics?user_id={user_id}&exercise={}",
            encode_query_value(exercise)
        );
        self.request(&path, RequestInit::get())
    }

    fn get_dashboard(&self, user_id: UserId) -> Result<DashboardResponse, ClientError> {
        self.request(&format!("/dashboard?user_id={user_id}"), RequestInit::get())
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Build the typed error for a non-2xx response.
///
/// A string `detail` is used verbatim. A list `detail` (request validation
/// errors) is flattened to its `msg` entries. Anything else falls back to
/// the status text.
pub fn error_from_body(status: u16, status_text: &str, body: &str) -> ApiError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(detail_message));

    let message = match detail {
        Some(detail) => detail,
        None if status_text.is_empty() => format!("HTTP {status}"),
        None => status_text.to_string(),
    };

    ApiError::new(status, message)
}

fn detail_message(detail: &serde_json::Value) -> Option<String> {
    match detail {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

/// Decode and validate a 2xx body.
pub fn decode_success<T>(status: u16, body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body)
        .map_err(|e| ApiError::new(status, format!("malformed response: {e}")))?;

    if let Err(violations) = value.validate() {
        let reasons: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
        return Err(ApiError::new(
            status,
            format!("invalid response: {}", reasons.join(", ")),
        ));
    }

    Ok(value)
}

/// Percent-encode a single query-string value.
pub fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn journal_entry(
    method: Method,
    path: &str,
    result: &Result<(u16, String), ClientError>,
    latency_ms: u64,
) -> JournalEntry {
    match result {
        Ok((status, _)) => {
            JournalEntry::now(method.as_str(), path, Outcome::Ok, latency_ms).with_status(*status)
        }
        Err(ClientError::Api(err)) => {
            JournalEntry::now(method.as_str(), path, Outcome::ApiError, latency_ms)
                .with_status(err.status)
                .with_message(err.message.clone())
        }
        Err(ClientError::Transport(reason)) => {
            JournalEntry::now(method.as_str(), path, Outcome::TransportError, latency_ms)
                .with_message(reason.clone())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
