use chrono::NaiveDate;

use super::{Call, Line, SubmitError, Submission, form_lines};
use crate::api::ClientError;
use crate::context::UserContext;
use crate::form::{FormError, apply_edit, validate_record};
use crate::schema::{DailyMetricsUpdate, MetricsUpdated, SessionMetrics};

const FALLBACK: &str = "Failed to update metrics";

/// Daily readiness metrics without a training session.
#[derive(Debug)]
pub struct MetricsPage {
    ctx: UserContext,
    metrics: SessionMetrics,
    submission: Submission,
}

impl MetricsPage {
    pub fn new(ctx: UserContext, today: NaiveDate) -> Self {
        Self {
            ctx,
            metrics: SessionMetrics::defaults_for(today),
            submission: Submission::default(),
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn edit(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        apply_edit(&mut self.metrics, field, raw)?;
        self.submission.touch();
        Ok(())
    }

    pub fn draft(&self) -> DailyMetricsUpdate {
        DailyMetricsUpdate {
            user_id: self.ctx.user_id,
            metrics: self.metrics.clone(),
        }
    }

    pub fn begin_submit(&mut self) -> Result<Call, SubmitError> {
        self.submission.begin(validate_record(&self.metrics, ""))?;
        Ok(Call::UpdateMetrics(self.draft()))
    }

    pub fn finish_submit(&mut self, result: Result<MetricsUpdated, ClientError>) {
        self.submission.finish(
            result,
            |updated| format!("{} for {}", updated.status, updated.date),
            FALLBACK,
        );
    }

    pub fn render(&self) -> Vec<Line> {
        let mut lines = vec![Line::Heading("Daily Metrics".to_string())];
        lines.extend(form_lines(&self.metrics));
        lines.extend(self.submission.lines());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> MetricsPage {
        MetricsPage::new(
            UserContext::new(5),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
    }

    #[test]
    fn submit_sends_user_and_metrics() {
        let mut page = page();
        page.edit("date", "2024-06-01").unwrap();
        page.edit("hrv_rmssd", "61.5").unwrap();

        let Ok(Call::UpdateMetrics(payload)) = page.begin_submit() else {
            panic!("expected an update-metrics call");
        };
        assert_eq!(payload.user_id, 5);
        assert_eq!(payload.metrics.hrv_rmssd, 61.5);
        assert_eq!(payload.metrics.date.to_string(), "2024-06-01");
    }

    #[test]
    fn success_message_combines_status_and_date() {
        let mut page = page();
        page.begin_submit().unwrap();
        page.finish_submit(Ok(MetricsUpdated {
            status: "updated".to_string(),
            date: "2024-06-03".to_string(),
        }));
        assert_eq!(page.submission().message(), Some("updated for 2024-06-03"));
    }

    #[test]
    fn transport_failure_uses_fallback() {
        let mut page = page();
        page.begin_submit().unwrap();
        page.finish_submit(Err(ClientError::Transport("refused".to_string())));
        assert_eq!(page.submission().message(), Some(FALLBACK));
    }

    #[test]
    fn out_of_range_rpe_blocks_submit() {
        let mut page = page();
        page.edit("rpe_session", "0").unwrap();
        assert!(matches!(page.begin_submit(), Err(SubmitError::Invalid(_))));
        assert!(!page.submission().is_submitting());
    }

    #[test]
    fn render_lists_every_field() {
        let lines = page().render();
        // heading plus one line per field
        assert_eq!(lines.len(), 9);
    }
}
