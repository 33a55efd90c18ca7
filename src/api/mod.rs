//! Typed access to the coaching backend.
//!
//! [`CoachApi`] is the seam between pages and the network: one method per
//! backend operation, each returning either the decoded schema type or a
//! [`ClientError`]. [`HttpClient`] is the real implementation; tests swap in
//! an in-memory fake.
//!
//! | Operation          | Method | Path                                   |
//! |--------------------|--------|----------------------------------------|
//! | `get_profile`      | GET    | `/profile`                             |
//! | `update_profile`   | PUT    | `/profile`                             |
//! | `log_session`      | POST   | `/log-session`                         |
//! | `update_metrics`   | POST   | `/update-metrics`                      |
//! | `get_next_workout` | GET    | `/next-workout?user_id={id}`           |
//! | `get_analytics`    | GET    | `/analytics?user_id={id}&exercise={e}` |
//! | `get_dashboard`    | GET    | `/dashboard?user_id={id}`              |

pub mod client;
pub mod error;

pub use client::{HttpClient, Method, RequestInit};
pub use error::{ApiError, ClientError};

use crate::schema::{
    AnalyticsResponse, DailyMetricsUpdate, DashboardResponse, MetricsUpdated, ProfileUpdate,
    SessionInput, SessionLogged, TrainingPrescription, UserId, UserProfile,
};

/// One method per backend operation.
///
/// Every call is fire-once: no retries, no timeout, no cancellation once the
/// request has been sent.
pub trait CoachApi {
    fn get_profile(&self) -> Result<UserProfile, ClientError>;

    fn update_profile(&self, payload: &ProfileUpdate) -> Result<UserProfile, ClientError>;

    fn log_session(&self, payload: &SessionInput) -> Result<SessionLogged, ClientError>;

    fn update_metrics(&self, payload: &DailyMetricsUpdate) -> Result<MetricsUpdated, ClientError>;

    fn get_next_workout(&self, user_id: UserId) -> Result<TrainingPrescription, ClientError>;

    /// Analytics for a user; `exercise` filters the e1RM series.
    fn get_analytics(&self, user_id: UserId, exercise: &str)
    -> Result<AnalyticsResponse, ClientError>;

    fn get_dashboard(&self, user_id: UserId) -> Result<DashboardResponse, ClientError>;
}
