use super::{Call, LoadState, Line};
use crate::api::ClientError;
use crate::context::UserContext;
use crate::schema::{DashboardResponse, TrainingPrescription};

const FALLBACK: &str = "Failed to load dashboard";

/// Landing page: next workout, latest metrics and recent sessions.
#[derive(Debug)]
pub struct DashboardPage {
    ctx: UserContext,
    state: LoadState<DashboardResponse>,
}

impl DashboardPage {
    /// Mount the page. The returned call is the page's only fetch.
    pub fn mount(ctx: UserContext) -> (Self, Call) {
        let page = Self {
            ctx,
            state: LoadState::Loading,
        };
        let call = Call::Dashboard {
            user_id: ctx.user_id,
        };
        (page, call)
    }

    pub fn state(&self) -> &LoadState<DashboardResponse> {
        &self.state
    }

    pub fn deliver(&mut self, result: Result<DashboardResponse, ClientError>) {
        self.state.settle(result, FALLBACK);
    }

    pub fn render(&self) -> Vec<Line> {
        let data = match &self.state {
            LoadState::Loading => return vec![Line::Notice("Loading dashboard...".to_string())],
            LoadState::Failed(message) => return vec![Line::Error(message.clone())],
            LoadState::Loaded(data) => data,
        };

        let mut lines = vec![Line::Heading(format!("Next Workout (user #{})", self.ctx.user_id))];
        lines.extend(prescription_lines(&data.next_workout));

        let m = &data.latest_metrics;
        lines.push(Line::Heading("Latest Metrics".to_string()));
        lines.push(Line::Text(format!("Date: {}", m.date)));
        lines.push(Line::Text(format!("Sleep: {}h", m.sleep_hours)));
        lines.push(Line::Text(format!("Resting HR: {}", m.resting_hr)));
        lines.push(Line::Text(format!("HRV: {}", m.hrv_rmssd)));
        lines.push(Line::Text(format!("Soreness: {}/10", m.soreness)));

        lines.push(Line::Heading("Recent Sessions".to_string()));
        if data.recent_sessions.is_empty() {
            lines.push(Line::Text("No sessions logged yet.".to_string()));
        } else {
            lines.push(Line::Text(format!(
                "{:<12} {:>9} {:>10} {:>8}",
                "Date", "Exercises", "Tonnage", "Avg RIR"
            )));
            for session in &data.recent_sessions {
                lines.push(Line::Text(format!(
                    "{:<12} {:>9} {:>10} {:>8}",
                    session.date.to_string(),
                    session.exercise_count,
                    session.tonnage,
                    session.avg_rir
                )));
            }
        }

        lines
    }
}

/// Lines describing a prescription; shared with `repcoach next-workout`.
pub fn prescription_lines(workout: &TrainingPrescription) -> Vec<Line> {
    let mut lines = vec![
        Line::Text(workout.target_date.to_string()),
        Line::Text(workout.exercise.clone()),
        Line::Text(format!(
            "{} sets × {} reps @ {} kg",
            workout.sets, workout.reps, workout.load_kg
        )),
    ];
    if workout.deload {
        lines.push(Line::Notice("Deload prescribed".to_string()));
    }
    for (label, value) in &workout.rationale {
        lines.push(Line::Text(format!("{label}: {value}")));
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::api::ApiError;
    use crate::schema::{RationaleValue, SessionMetrics, SessionSummary};

    fn response() -> DashboardResponse {
        let day = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        DashboardResponse {
            next_workout: TrainingPrescription {
                target_date: day,
                exercise: "Squat".to_string(),
                sets: 4,
                reps: 5,
                load_kg: 100.0,
                deload: false,
                rationale: BTreeMap::from([(
                    "readiness".to_string(),
                    RationaleValue::Number(0.8),
                )]),
            },
            latest_metrics: SessionMetrics::defaults_for(day),
            recent_sessions: vec![SessionSummary {
                date: day,
                exercise_count: 3,
                tonnage: 5400.0,
                avg_rir: 2.0,
            }],
        }
    }

    fn texts(page: &DashboardPage) -> Vec<String> {
        page.render().iter().map(|l| l.text().to_string()).collect()
    }

    #[test]
    fn mount_requests_dashboard_for_context_user() {
        let (page, call) = DashboardPage::mount(UserContext::new(3));
        assert_eq!(call, Call::Dashboard { user_id: 3 });
        assert!(page.state().is_loading());
        assert_eq!(texts(&page), vec!["Loading dashboard..."]);
    }

    #[test]
    fn loaded_page_shows_prescription_line() {
        let (mut page, _) = DashboardPage::mount(UserContext::new(1));
        page.deliver(Ok(response()));

        let lines = texts(&page);
        assert!(lines.contains(&"4 sets × 5 reps @ 100 kg".to_string()));
        assert!(lines.contains(&"Soreness: 3/10".to_string()));
        assert!(lines.contains(&"readiness: 0.8".to_string()));
        assert!(!lines.contains(&"Deload prescribed".to_string()));
    }

    #[test]
    fn api_error_message_is_shown() {
        let (mut page, _) = DashboardPage::mount(UserContext::new(1));
        page.deliver(Err(ApiError::new(400, "Need at least 1 logged session").into()));
        assert_eq!(texts(&page), vec!["Need at least 1 logged session"]);
    }

    #[test]
    fn transport_failure_uses_fallback() {
        let (mut page, _) = DashboardPage::mount(UserContext::new(1));
        page.deliver(Err(ClientError::Transport("refused".to_string())));
        assert_eq!(texts(&page), vec![FALLBACK]);
    }

    #[test]
    fn deload_is_flagged() {
        let mut workout = response().next_workout;
        workout.deload = true;
        let lines = prescription_lines(&workout);
        assert!(lines.contains(&Line::Notice("Deload prescribed".to_string())));
    }
}
