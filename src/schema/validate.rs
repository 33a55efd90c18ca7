//! Shape checks applied to every decoded response.
//!
//! Serde already guarantees field presence and integer signedness; these
//! checks cover what the type system cannot: floats must be finite and
//! non-negative, and the 0–10 self-report scales must stay on their scale.
//! A response that fails here is reported through the same typed error as a
//! server-side failure (see [`crate::api::ApiError`]).

use super::{
    AnalyticsResponse, DashboardResponse, MetricsUpdated, SessionLogged, SessionMetrics,
    SessionSummary, TrainingPrescription, UserProfile,
};

/// A single failed check, addressed by a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Boundary validation for decoded payloads.
pub trait Validate {
    /// Push every violation found into `out`, prefixing field names with
    /// `prefix` (empty for the top-level record).
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>);

    /// Run all checks and return the violations, if any.
    fn validate(&self) -> Result<(), Vec<Violation>> {
        let mut out = Vec::new();
        self.collect_violations("", &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

fn path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn non_negative(prefix: &str, field: &str, value: f64, out: &mut Vec<Violation>) {
    if !value.is_finite() {
        out.push(Violation {
            field: path(prefix, field),
            reason: "must be a finite number".to_string(),
        });
    } else if value < 0.0 {
        out.push(Violation {
            field: path(prefix, field),
            reason: format!("must not be negative (got {value})"),
        });
    }
}

fn scale(prefix: &str, field: &str, value: f64, out: &mut Vec<Violation>) {
    if !(0.0..=10.0).contains(&value) {
        out.push(Violation {
            field: path(prefix, field),
            reason: format!("must be on the 0-10 scale (got {value})"),
        });
    }
}

impl Validate for UserProfile {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        non_negative(prefix, "bodyweight_kg", self.bodyweight_kg, out);
        non_negative(prefix, "training_age_years", self.training_age_years, out);
    }
}

impl Validate for SessionMetrics {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        non_negative(prefix, "sleep_hours", self.sleep_hours, out);
        non_negative(prefix, "hrv_rmssd", self.hrv_rmssd, out);
        scale(prefix, "soreness", self.soreness, out);
        scale(prefix, "motivation", self.motivation, out);
        scale(prefix, "rpe_session", self.rpe_session, out);
    }
}

impl Validate for TrainingPrescription {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        non_negative(prefix, "load_kg", self.load_kg, out);
    }
}

impl Validate for SessionSummary {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        non_negative(prefix, "tonnage", self.tonnage, out);
        non_negative(prefix, "avg_rir", self.avg_rir, out);
    }
}

impl Validate for DashboardResponse {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        self.next_workout
            .collect_violations(&path(prefix, "next_workout"), out);
        self.latest_metrics
            .collect_violations(&path(prefix, "latest_metrics"), out);
        for (i, session) in self.recent_sessions.iter().enumerate() {
            session.collect_violations(&path(prefix, &format!("recent_sessions[{i}]")), out);
        }
    }
}

impl Validate for AnalyticsResponse {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        non_negative(prefix, "fatigue_mean", self.fatigue_mean, out);
        non_negative(prefix, "stimulus_mean", self.stimulus_mean, out);
        non_negative(prefix, "readiness_mean", self.readiness_mean, out);
        for (i, point) in self.weekly_volume.iter().enumerate() {
            non_negative(prefix, &format!("weekly_volume[{i}].volume"), point.volume, out);
        }
        for (i, point) in self.e1rm_trend.iter().enumerate() {
            non_negative(prefix, &format!("e1rm_trend[{i}].e1rm"), point.e1rm, out);
        }
    }
}

impl Validate for SessionLogged {
    fn collect_violations(&self, _prefix: &str, _out: &mut Vec<Violation>) {}
}

impl Validate for MetricsUpdated {
    fn collect_violations(&self, prefix: &str, out: &mut Vec<Violation>) {
        if chrono::NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            out.push(Violation {
                field: path(prefix, "date"),
                reason: format!("expected an ISO date, got '{}'", self.date),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn metrics() -> SessionMetrics {
        SessionMetrics::defaults_for(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
    }

    #[test]
    fn default_metrics_pass() {
        assert!(metrics().validate().is_ok());
    }

    #[test]
    fn scale_outside_zero_to_ten_is_reported() {
        let mut m = metrics();
        m.soreness = 11.0;
        let violations = m.validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "soreness");
    }

    #[test]
    fn nested_paths_are_prefixed() {
        let mut m = metrics();
        m.sleep_hours = -1.0;
        let mut out = Vec::new();
        m.collect_violations("latest_metrics", &mut out);
        assert_eq!(out[0].field, "latest_metrics.sleep_hours");
        assert!(out[0].to_string().contains("must not be negative"));
    }

    #[test]
    fn non_finite_numbers_are_reported() {
        let mut m = metrics();
        m.hrv_rmssd = f64::NAN;
        let violations = m.validate().unwrap_err();
        assert_eq!(violations[0].reason, "must be a finite number");
    }

    #[test]
    fn metrics_updated_requires_iso_date() {
        let ok = MetricsUpdated {
            status: "updated".to_string(),
            date: "2024-05-01".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = MetricsUpdated {
            status: "updated".to_string(),
            date: "yesterday".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
