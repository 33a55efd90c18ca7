//! Wire schema shared with the coaching backend.
//!
//! Every type here maps one-to-one onto a JSON payload of the backend API.
//! Field names are the wire names; nothing is renamed on the way in or out,
//! so a decoded response re-serializes to the same JSON document.
//!
//! Records are plain data. Pages never mutate a fetched record in place: they
//! either replace it wholesale or edit a local draft copy (see
//! [`crate::pages`]).

pub mod validate;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use validate::{Validate, Violation};

/// Server-assigned user identifier.
pub type UserId = u64;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Athlete profile as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub age: u32,
    pub bodyweight_kg: f64,
    pub training_age_years: f64,
    /// Free-text goal such as `"hypertrophy"` or `"strength"`.
    pub goal: String,
    /// Baseline maximum recoverable volume, in weekly sets.
    pub mrv_baseline_sets: u32,
}

/// Mutable profile fields sent with `PUT /profile`.
///
/// The identifier is omitted: the backend resolves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub age: u32,
    pub bodyweight_kg: f64,
    pub training_age_years: f64,
    pub goal: String,
    pub mrv_baseline_sets: u32,
}

impl Default for ProfileUpdate {
    fn default() -> Self {
        Self {
            age: 30,
            bodyweight_kg: 80.0,
            training_age_years: 2.0,
            goal: "hypertrophy".to_string(),
            mrv_baseline_sets: 14,
        }
    }
}

impl From<&UserProfile> for ProfileUpdate {
    fn from(profile: &UserProfile) -> Self {
        Self {
            age: profile.age,
            bodyweight_kg: profile.bodyweight_kg,
            training_age_years: profile.training_age_years,
            goal: profile.goal.clone(),
            mrv_baseline_sets: profile.mrv_baseline_sets,
        }
    }
}

// ---------------------------------------------------------------------------
// Session logging
// ---------------------------------------------------------------------------

/// Readiness and session-level metrics for one calendar day.
///
/// The 0–10 scales (`soreness`, `motivation`, `rpe_session`) are carried as
/// numbers because the backend stores and returns them as floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub date: NaiveDate,
    pub sleep_hours: f64,
    pub resting_hr: u32,
    pub hrv_rmssd: f64,
    pub soreness: f64,
    pub motivation: f64,
    pub rpe_session: f64,
    pub duration_min: u32,
}

impl SessionMetrics {
    /// Default draft values for a given day.
    pub fn defaults_for(date: NaiveDate) -> Self {
        Self {
            date,
            sleep_hours: 7.0,
            resting_hr: 55,
            hrv_rmssd: 55.0,
            soreness: 3.0,
            motivation: 7.0,
            rpe_session: 7.0,
            duration_min: 60,
        }
    }
}

/// One exercise performed in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub load_kg: f64,
    /// Reps in reserve.
    pub rir: f64,
}

impl ExerciseLog {
    /// The row a new session draft starts with.
    pub fn seed() -> Self {
        Self {
            exercise: "Squat".to_string(),
            sets: 4,
            reps: 5,
            load_kg: 100.0,
            rir: 2.0,
        }
    }
}

/// The row appended by "add exercise".
impl Default for ExerciseLog {
    fn default() -> Self {
        Self {
            exercise: String::new(),
            sets: 3,
            reps: 8,
            load_kg: 40.0,
            rir: 2.0,
        }
    }
}

/// Payload for `POST /log-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInput {
    pub user_id: UserId,
    pub metrics: SessionMetrics,
    pub exercises: Vec<ExerciseLog>,
}

/// Payload for `POST /update-metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricsUpdate {
    pub user_id: UserId,
    pub metrics: SessionMetrics,
}

/// Response of `POST /log-session`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLogged {
    pub session_id: u64,
}

/// Response of `POST /update-metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsUpdated {
    pub status: String,
    pub date: String,
}

// ---------------------------------------------------------------------------
// Prescription and dashboard
// ---------------------------------------------------------------------------

/// A single rationale entry: the engine reports both numbers and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RationaleValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for RationaleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Next workout as prescribed by the backend engine. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPrescription {
    pub target_date: NaiveDate,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub load_kg: f64,
    pub deload: bool,
    pub rationale: BTreeMap<String, RationaleValue>,
}

/// Aggregated view of one logged session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub date: NaiveDate,
    pub exercise_count: u32,
    /// Sum of load × reps, computed server-side.
    pub tonnage: f64,
    pub avg_rir: f64,
}

/// Landing-page bundle returned by `GET /dashboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub next_workout: TrainingPrescription,
    pub latest_metrics: SessionMetrics,
    pub recent_sessions: Vec<SessionSummary>,
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyVolumePoint {
    pub week_start: NaiveDate,
    pub muscle: String,
    pub volume: f64,
}

/// Estimated one-rep-max on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct E1rmPoint {
    pub date: NaiveDate,
    pub exercise: String,
    pub e1rm: f64,
}

/// Chart-ready analytics returned by `GET /analytics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub sessions: u32,
    pub fatigue_mean: f64,
    pub stimulus_mean: f64,
    pub readiness_mean: f64,
    pub weekly_volume: Vec<WeeklyVolumePoint>,
    pub e1rm_trend: Vec<E1rmPoint>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
