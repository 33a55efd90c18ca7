use chrono::NaiveDate;

use super::{Call, LoadState, Line};
use crate::api::ClientError;
use crate::context::UserContext;
use crate::schema::AnalyticsResponse;

const FALLBACK: &str = "Failed to load analytics";
const BAR_WIDTH: f64 = 30.0;

/// One bar of the weekly volume chart.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRow {
    pub week: NaiveDate,
    pub muscle: String,
    pub volume: f64,
}

/// Longitudinal charts with an editable exercise filter.
#[derive(Debug)]
pub struct AnalyticsPage {
    ctx: UserContext,
    exercise: String,
    state: LoadState<AnalyticsResponse>,
    refreshing: bool,
}

impl AnalyticsPage {
    pub fn mount(ctx: UserContext, exercise: impl Into<String>) -> (Self, Call) {
        let page = Self {
            ctx,
            exercise: exercise.into(),
            state: LoadState::Loading,
            refreshing: false,
        };
        let call = page.call();
        (page, call)
    }

    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    pub fn state(&self) -> &LoadState<AnalyticsResponse> {
        &self.state
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Change the filter. Takes effect on the next refresh.
    pub fn set_exercise(&mut self, exercise: impl Into<String>) {
        self.exercise = exercise.into();
    }

    /// Re-issue the fetch with the current filter. Loaded data stays visible
    /// until the reply lands.
    pub fn refresh(&mut self) -> Call {
        self.refreshing = true;
        self.call()
    }

    fn call(&self) -> Call {
        Call::Analytics {
            user_id: self.ctx.user_id,
            exercise: self.exercise.clone(),
        }
    }

    pub fn deliver(&mut self, result: Result<AnalyticsResponse, ClientError>) {
        self.refreshing = false;
        self.state.settle(result, FALLBACK);
    }

    /// Weekly volume points in chart order: by week, then muscle.
    pub fn weekly_rows(&self) -> Vec<WeeklyRow> {
        let Some(data) = self.state.data() else {
            return Vec::new();
        };
        let mut rows: Vec<WeeklyRow> = data
            .weekly_volume
            .iter()
            .map(|point| WeeklyRow {
                week: point.week_start,
                muscle: point.muscle.clone(),
                volume: point.volume,
            })
            .collect();
        rows.sort_by(|a, b| a.week.cmp(&b.week).then_with(|| a.muscle.cmp(&b.muscle)));
        rows
    }

    pub fn render(&self) -> Vec<Line> {
        let mut lines = vec![Line::Text(format!("Exercise filter: {}", self.exercise))];
        if self.refreshing && !self.state.is_loading() {
            lines.push(Line::Notice("Refreshing...".to_string()));
        }

        let data = match &self.state {
            LoadState::Loading => {
                lines.push(Line::Notice("Loading analytics...".to_string()));
                return lines;
            }
            LoadState::Failed(message) => {
                lines.push(Line::Error(message.clone()));
                return lines;
            }
            LoadState::Loaded(data) => data,
        };

        lines.push(Line::Heading("Summary".to_string()));
        lines.push(Line::Text(format!("Sessions: {}", data.sessions)));
        lines.push(Line::Text(format!("Fatigue (mean): {:.2}", data.fatigue_mean)));
        lines.push(Line::Text(format!("Stimulus (mean): {:.2}", data.stimulus_mean)));
        lines.push(Line::Text(format!("Readiness (mean): {:.2}", data.readiness_mean)));

        lines.push(Line::Heading("Weekly Volume".to_string()));
        let rows = self.weekly_rows();
        let peak = rows.iter().map(|r| r.volume).fold(0.0_f64, f64::max);
        if rows.is_empty() {
            lines.push(Line::Text("No volume recorded.".to_string()));
        }
        for row in &rows {
            lines.push(Line::Text(format!(
                "{} {:<12} {:>8.1} {}",
                row.week,
                row.muscle,
                row.volume,
                bar(row.volume, peak)
            )));
        }

        lines.push(Line::Heading(format!("e1RM Trend ({})", self.exercise)));
        let mut trend: Vec<_> = data.e1rm_trend.iter().collect();
        trend.sort_by_key(|point| point.date);
        if trend.is_empty() {
            lines.push(Line::Text("No e1RM data.".to_string()));
        }
        for point in trend {
            lines.push(Line::Text(format!(
                "{} {:<12} {:>7.1} kg",
                point.date, point.exercise, point.e1rm
            )));
        }

        lines
    }
}

fn bar(value: f64, peak: f64) -> String {
    if peak <= 0.0 {
        return String::new();
    }
    let width = ((value / peak) * BAR_WIDTH).round() as usize;
    "█".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::schema::{E1rmPoint, WeeklyVolumePoint};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn response() -> AnalyticsResponse {
        AnalyticsResponse {
            sessions: 6,
            fatigue_mean: 0.41,
            stimulus_mean: 0.67,
            readiness_mean: 0.72,
            weekly_volume: vec![
                WeeklyVolumePoint {
                    week_start: day(13),
                    muscle: "quads".to_string(),
                    volume: 12.0,
                },
                WeeklyVolumePoint {
                    week_start: day(6),
                    muscle: "quads".to_string(),
                    volume: 24.0,
                },
            ],
            e1rm_trend: vec![E1rmPoint {
                date: day(7),
                exercise: "Squat".to_string(),
                e1rm: 131.5,
            }],
        }
    }

    #[test]
    fn mount_fetches_with_default_exercise() {
        let (page, call) = AnalyticsPage::mount(UserContext::new(2), "Squat");
        assert_eq!(
            call,
            Call::Analytics {
                user_id: 2,
                exercise: "Squat".to_string()
            }
        );
        assert!(page.state().is_loading());
    }

    #[test]
    fn refresh_keeps_stale_data_until_reply() {
        let (mut page, _) = AnalyticsPage::mount(UserContext::new(1), "Squat");
        page.deliver(Ok(response()));

        page.set_exercise("Bench Press");
        let call = page.refresh();
        assert_eq!(
            call,
            Call::Analytics {
                user_id: 1,
                exercise: "Bench Press".to_string()
            }
        );
        assert!(page.is_refreshing());
        assert_eq!(page.state().data(), Some(&response()));
    }

    #[test]
    fn successful_refresh_clears_error() {
        let (mut page, _) = AnalyticsPage::mount(UserContext::new(1), "Squat");
        page.deliver(Err(ApiError::new(404, "no data").into()));
        assert_eq!(page.state().error(), Some("no data"));

        page.refresh();
        page.deliver(Ok(response()));
        assert_eq!(page.state().error(), None);
        assert!(!page.is_refreshing());
    }

    #[test]
    fn weekly_rows_are_sorted_by_week() {
        let (mut page, _) = AnalyticsPage::mount(UserContext::new(1), "Squat");
        page.deliver(Ok(response()));

        let weeks: Vec<NaiveDate> = page.weekly_rows().iter().map(|r| r.week).collect();
        assert_eq!(weeks, vec![day(6), day(13)]);
    }

    #[test]
    fn transport_failure_uses_fallback() {
        let (mut page, _) = AnalyticsPage::mount(UserContext::new(1), "Squat");
        page.deliver(Err(ClientError::Transport("timed out".to_string())));
        assert!(page.render().contains(&Line::Error(FALLBACK.to_string())));
    }

    #[test]
    fn bars_scale_to_peak() {
        assert_eq!(bar(24.0, 24.0).chars().count(), 30);
        assert_eq!(bar(12.0, 24.0).chars().count(), 15);
        assert_eq!(bar(5.0, 0.0), "");
    }
}
