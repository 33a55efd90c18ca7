use std::collections::HashSet;

use chrono::NaiveDate;

use super::{Call, Line, SubmitError, Submission, form_lines};
use crate::api::ClientError;
use crate::context::UserContext;
use crate::form::{FormError, apply_edit, validate_record};
use crate::schema::{ExerciseLog, SessionInput, SessionLogged, SessionMetrics};

const FALLBACK: &str = "Failed to log session";

/// Session draft: one metrics block plus an ordered list of exercise rows.
#[derive(Debug)]
pub struct LogSessionPage {
    ctx: UserContext,
    metrics: SessionMetrics,
    exercises: Vec<ExerciseLog>,
    submission: Submission,
}

impl LogSessionPage {
    /// Fresh draft for `today`, seeded with one exercise row.
    pub fn new(ctx: UserContext, today: NaiveDate) -> Self {
        Self {
            ctx,
            metrics: SessionMetrics::defaults_for(today),
            exercises: vec![ExerciseLog::seed()],
            submission: Submission::default(),
        }
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn exercises(&self) -> &[ExerciseLog] {
        &self.exercises
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn edit_metric(&mut self, field: &str, raw: &str) -> Result<(), FormError> {
        apply_edit(&mut self.metrics, field, raw)?;
        self.submission.touch();
        Ok(())
    }

    /// Replace one field of the row at `index`. Other rows are untouched.
    pub fn edit_row(&mut self, index: usize, field: &str, raw: &str) -> Result<(), FormError> {
        let row = self
            .exercises
            .get_mut(index)
            .ok_or(FormError::NoSuchRow(index))?;
        apply_edit(row, field, raw)?;
        self.submission.touch();
        Ok(())
    }

    /// Append the default row. Returns its index.
    pub fn add_row(&mut self) -> usize {
        self.exercises.push(ExerciseLog::default());
        self.submission.touch();
        self.exercises.len() - 1
    }

    /// The payload a submit would send right now.
    pub fn draft(&self) -> SessionInput {
        SessionInput {
            user_id: self.ctx.user_id,
            metrics: self.metrics.clone(),
            exercises: self.exercises.clone(),
        }
    }

    fn draft_errors(&self) -> Vec<FormError> {
        let mut errors = validate_record(&self.metrics, "metrics");
        if self.exercises.is_empty() {
            errors.push(FormError::NoExercises);
        }
        let mut seen = HashSet::new();
        for (i, row) in self.exercises.iter().enumerate() {
            errors.extend(validate_record(row, &format!("exercises[{i}]")));
            let key = row.exercise.trim().to_lowercase();
            if !key.is_empty() && !seen.insert(key) {
                errors.push(FormError::DuplicateExercise(row.exercise.trim().to_string()));
            }
        }
        errors
    }

    pub fn begin_submit(&mut self) -> Result<Call, SubmitError> {
        let errors = self.draft_errors();
        self.submission.begin(errors)?;
        Ok(Call::LogSession(self.draft()))
    }

    pub fn finish_submit(&mut self, result: Result<SessionLogged, ClientError>) {
        self.submission.finish(
            result,
            |logged| format!("Session logged with ID {}", logged.session_id),
            FALLBACK,
        );
    }

    pub fn render(&self) -> Vec<Line> {
        let mut lines = vec![Line::Heading("Metrics".to_string())];
        lines.extend(form_lines(&self.metrics));
        lines.push(Line::Heading("Exercises".to_string()));
        for (i, row) in self.exercises.iter().enumerate() {
            lines.push(Line::Text(format!(
                "[{i}] {} {}×{} @ {} kg, RIR {}",
                if row.exercise.is_empty() { "(unnamed)" } else { row.exercise.as_str() },
                row.sets,
                row.reps,
                row.load_kg,
                row.rir
            )));
        }
        lines.extend(self.submission.lines());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::pages::SubmitState;

    fn page() -> LogSessionPage {
        LogSessionPage::new(
            UserContext::new(1),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        )
    }

    #[test]
    fn starts_with_one_seeded_row() {
        let page = page();
        assert_eq!(page.exercises(), &[ExerciseLog::seed()]);
        assert_eq!(page.submission().state(), SubmitState::Idle);
    }

    #[test]
    fn editing_a_row_leaves_others_identical() {
        let mut page = page();
        page.add_row();
        page.add_row();
        let before = page.exercises().to_vec();

        page.edit_row(1, "exercise", "Bench Press").unwrap();
        page.edit_row(1, "load_kg", "62.5").unwrap();

        assert_eq!(page.exercises()[0], before[0]);
        assert_eq!(page.exercises()[2], before[2]);
        assert_eq!(page.exercises()[1].exercise, "Bench Press");
        assert_eq!(page.exercises()[1].load_kg, 62.5);
    }

    #[test]
    fn add_row_appends_exactly_one_default_row() {
        let mut page = page();
        let index = page.add_row();
        assert_eq!(index, 1);
        assert_eq!(page.exercises().len(), 2);
        assert_eq!(page.exercises()[1], ExerciseLog::default());
    }

    #[test]
    fn editing_a_missing_row_is_an_error() {
        let mut page = page();
        assert_eq!(
            page.edit_row(3, "sets", "4"),
            Err(FormError::NoSuchRow(3))
        );
    }

    #[test]
    fn submitted_payload_equals_draft() {
        let mut page = page();
        page.edit_metric("sleep_hours", "8").unwrap();
        let expected = page.draft();

        let call = page.begin_submit().unwrap();
        assert_eq!(call, Call::LogSession(expected));
        assert!(page.submission().is_submitting());
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut page = page();
        page.begin_submit().unwrap();
        assert_eq!(page.begin_submit(), Err(SubmitError::InFlight));
    }

    #[test]
    fn invalid_draft_sends_nothing() {
        let mut page = page();
        page.add_row();
        let result = page.begin_submit();

        let Err(SubmitError::Invalid(errors)) = &result else {
            panic!("expected field errors, got {result:?}");
        };
        assert!(matches!(
            &errors[0],
            FormError::OutOfBounds { field, .. } if field == "exercises[1].exercise"
        ));
        assert_eq!(page.submission().state(), SubmitState::Idle);
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let mut page = page();
        page.add_row();
        page.edit_row(1, "exercise", "squat").unwrap();

        assert_eq!(
            page.begin_submit(),
            Err(SubmitError::Invalid(vec![FormError::DuplicateExercise(
                "squat".to_string()
            )]))
        );
    }

    #[test]
    fn success_message_carries_session_id() {
        let mut page = page();
        page.begin_submit().unwrap();
        page.finish_submit(Ok(SessionLogged { session_id: 42 }));

        assert_eq!(page.submission().message(), Some("Session logged with ID 42"));
        // nothing resets
        assert_eq!(page.exercises(), &[ExerciseLog::seed()]);
    }

    #[test]
    fn api_error_message_is_shown_verbatim() {
        let mut page = page();
        page.begin_submit().unwrap();
        page.finish_submit(Err(ApiError::new(422, "sets: too many").into()));
        assert_eq!(page.submission().message(), Some("sets: too many"));
        assert_eq!(page.submission().state(), SubmitState::Failed);
    }
}
