//! Page controllers, one per screen.
//!
//! Two shapes:
//!
//! - **Read-then-display** ([`DashboardPage`], [`AnalyticsPage`]): mounting
//!   emits exactly one fetch; the page is *loading*, *loaded* or *failed*.
//! - **Draft-then-submit** ([`LogSessionPage`], [`MetricsPage`],
//!   [`ProfilePage`]): edits change a local draft only; submitting emits one
//!   write and records a terminal message. Nothing resets afterwards.
//!
//! Pages never touch the network. They emit [`Call`]s and are handed the
//! matching results back, which keeps every controller a plain state machine.

mod analytics;
mod call;
mod dashboard;
mod log_session;
mod metrics;
mod profile;

pub use analytics::{AnalyticsPage, WeeklyRow};
pub use call::{Call, Reply};
pub use dashboard::{DashboardPage, prescription_lines};
pub use log_session::LogSessionPage;
pub use metrics::MetricsPage;
pub use profile::ProfilePage;

use thiserror::Error;

use crate::api::ClientError;
use crate::form::{FormError, FormRecord, render_form};

// ---------------------------------------------------------------------------
// View lines
// ---------------------------------------------------------------------------

/// One rendered line of a page. The terminal decides how each kind looks.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Heading(String),
    Text(String),
    /// Status and outcome messages.
    Notice(String),
    Error(String),
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Self::Heading(s) | Self::Text(s) | Self::Notice(s) | Self::Error(s) => s,
        }
    }
}

/// Render a record's form as one line per input.
pub(crate) fn form_lines<R: FormRecord>(record: &R) -> Vec<Line> {
    render_form(record)
        .into_iter()
        .map(|input| {
            Line::Text(format!(
                "{:<20} {:<22} [{}] {}",
                input.name,
                input.label,
                input.input_type.as_str(),
                input.value
            ))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Read-then-display state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Apply a fetch result: data replaces the state wholesale, a failure
    /// becomes the API error's message or `fallback`.
    pub(crate) fn settle(&mut self, result: Result<T, ClientError>, fallback: &str) {
        *self = match result {
            Ok(data) => Self::Loaded(data),
            Err(err) => Self::Failed(err.user_message(fallback)),
        };
    }
}

// ---------------------------------------------------------------------------
// Draft-then-submit state
// ---------------------------------------------------------------------------

/// Request lifecycle of a draft page.
///
/// `Idle → Submitting → {Succeeded, Failed}`. The terminal states fall back
/// to `Idle` on the next edit or submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("a request is already in flight")]
    InFlight,

    #[error("draft has {} invalid field(s)", .0.len())]
    Invalid(Vec<FormError>),

    #[error("the stored record has not loaded yet")]
    NotLoaded,
}

/// Submission bookkeeping shared by the draft pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    state: SubmitState,
    message: Option<String>,
    field_errors: Vec<FormError>,
}

impl Submission {
    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Last outcome message. Overwritten by the next one, never cleared.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn field_errors(&self) -> &[FormError] {
        &self.field_errors
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    /// A field was edited.
    pub(crate) fn touch(&mut self) {
        if matches!(self.state, SubmitState::Succeeded | SubmitState::Failed) {
            self.state = SubmitState::Idle;
        }
    }

    /// Enter `Submitting` unless a request is in flight or the draft has
    /// errors. Errors are kept for display.
    pub(crate) fn begin(&mut self, errors: Vec<FormError>) -> Result<(), SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }
        self.state = SubmitState::Idle;
        if !errors.is_empty() {
            self.field_errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }
        self.field_errors.clear();
        self.state = SubmitState::Submitting;
        Ok(())
    }

    /// Record the outcome of the write.
    pub(crate) fn finish<T>(
        &mut self,
        result: Result<T, ClientError>,
        on_success: impl FnOnce(T) -> String,
        fallback: &str,
    ) {
        match result {
            Ok(value) => {
                self.state = SubmitState::Succeeded;
                self.message = Some(on_success(value));
            }
            Err(err) => {
                self.state = SubmitState::Failed;
                self.message = Some(err.user_message(fallback));
            }
        }
    }

    /// Set the message without touching the request state.
    pub(crate) fn note(&mut self, message: String) {
        self.message = Some(message);
    }

    pub(crate) fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        if self.is_submitting() {
            lines.push(Line::Notice("Submitting...".to_string()));
        }
        lines.extend(self.field_errors.iter().map(|e| Line::Error(e.to_string())));
        if let Some(message) = &self.message {
            let line = match self.state {
                SubmitState::Failed => Line::Error(message.clone()),
                _ => Line::Notice(message.clone()),
            };
            lines.push(line);
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
