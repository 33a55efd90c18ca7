//! Field lists for the editable schema records.
//!
//! Bounds mirror what the backend accepts, so a draft that validates here is
//! not bounced with a 422.

use chrono::NaiveDate;

use super::{Bounds, FieldDescriptor, FieldKind, FieldValue, FormError, FormRecord};
use super::{number, text, whole};
use crate::schema::{ExerciseLog, ProfileUpdate, SessionMetrics};

const METRICS_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("date", "Date", FieldKind::Date),
    FieldDescriptor::new("sleep_hours", "Sleep (h)", FieldKind::Number)
        .bounded(Bounds::inclusive(0.0, 16.0)),
    FieldDescriptor::new("resting_hr", "Resting HR (bpm)", FieldKind::Integer)
        .bounded(Bounds::inclusive(30.0, 120.0)),
    FieldDescriptor::new("hrv_rmssd", "HRV RMSSD (ms)", FieldKind::Number)
        .bounded(Bounds::inclusive(5.0, 250.0)),
    FieldDescriptor::new("soreness", "Soreness (0-10)", FieldKind::Number)
        .bounded(Bounds::inclusive(0.0, 10.0)),
    FieldDescriptor::new("motivation", "Motivation (0-10)", FieldKind::Number)
        .bounded(Bounds::inclusive(0.0, 10.0)),
    FieldDescriptor::new("rpe_session", "Session RPE (1-10)", FieldKind::Number)
        .bounded(Bounds::inclusive(1.0, 10.0)),
    FieldDescriptor::new("duration_min", "Duration (min)", FieldKind::Integer)
        .bounded(Bounds::inclusive(10.0, 300.0)),
];

impl FormRecord for SessionMetrics {
    fn fields() -> &'static [FieldDescriptor] {
        METRICS_FIELDS
    }

    fn value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "date" => FieldValue::Text(self.date.format("%Y-%m-%d").to_string()),
            "sleep_hours" => FieldValue::Number(self.sleep_hours),
            "resting_hr" => FieldValue::Number(f64::from(self.resting_hr)),
            "hrv_rmssd" => FieldValue::Number(self.hrv_rmssd),
            "soreness" => FieldValue::Number(self.soreness),
            "motivation" => FieldValue::Number(self.motivation),
            "rpe_session" => FieldValue::Number(self.rpe_session),
            "duration_min" => FieldValue::Number(f64::from(self.duration_min)),
            _ => return None,
        };
        Some(value)
    }

    fn store(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        match name {
            "date" => {
                let raw = text(name, value)?;
                self.date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .map_err(|_| FormError::NotADate {
                        field: name.to_string(),
                        raw,
                    })?;
            }
            "sleep_hours" => self.sleep_hours = number(name, &value)?,
            "resting_hr" => self.resting_hr = whole(name, &value)?,
            "hrv_rmssd" => self.hrv_rmssd = number(name, &value)?,
            "soreness" => self.soreness = number(name, &value)?,
            "motivation" => self.motivation = number(name, &value)?,
            "rpe_session" => self.rpe_session = number(name, &value)?,
            "duration_min" => self.duration_min = whole(name, &value)?,
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

const EXERCISE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("exercise", "Exercise", FieldKind::Text).bounded(Bounds::chars(2, 64)),
    FieldDescriptor::new("sets", "Sets", FieldKind::Integer).bounded(Bounds::inclusive(1.0, 20.0)),
    FieldDescriptor::new("reps", "Reps", FieldKind::Integer).bounded(Bounds::inclusive(1.0, 30.0)),
    FieldDescriptor::new("load_kg", "Load (kg)", FieldKind::Number)
        .bounded(Bounds::exclusive(0.0, 600.0)),
    FieldDescriptor::new("rir", "RIR", FieldKind::Number).bounded(Bounds::inclusive(0.0, 6.0)),
];

impl FormRecord for ExerciseLog {
    fn fields() -> &'static [FieldDescriptor] {
        EXERCISE_FIELDS
    }

    fn value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "exercise" => FieldValue::Text(self.exercise.clone()),
            "sets" => FieldValue::Number(f64::from(self.sets)),
            "reps" => FieldValue::Number(f64::from(self.reps)),
            "load_kg" => FieldValue::Number(self.load_kg),
            "rir" => FieldValue::Number(self.rir),
            _ => return None,
        };
        Some(value)
    }

    fn store(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        match name {
            "exercise" => self.exercise = text(name, value)?,
            "sets" => self.sets = whole(name, &value)?,
            "reps" => self.reps = whole(name, &value)?,
            "load_kg" => self.load_kg = number(name, &value)?,
            "rir" => self.rir = number(name, &value)?,
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}

const PROFILE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("age", "Age", FieldKind::Integer).bounded(Bounds::inclusive(14.0, 90.0)),
    FieldDescriptor::new("bodyweight_kg", "Bodyweight (kg)", FieldKind::Number)
        .bounded(Bounds::exclusive(30.0, 300.0)),
    FieldDescriptor::new("training_age_years", "Training age (years)", FieldKind::Number)
        .bounded(Bounds::inclusive(0.0, 50.0)),
    FieldDescriptor::new("goal", "Goal", FieldKind::Text).bounded(Bounds::chars(3, 32)),
    FieldDescriptor::new("mrv_baseline_sets", "MRV baseline sets", FieldKind::Integer)
        .bounded(Bounds::inclusive(6.0, 40.0)),
];

impl FormRecord for ProfileUpdate {
    fn fields() -> &'static [FieldDescriptor] {
        PROFILE_FIELDS
    }

    fn value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "age" => FieldValue::Number(f64::from(self.age)),
            "bodyweight_kg" => FieldValue::Number(self.bodyweight_kg),
            "training_age_years" => FieldValue::Number(self.training_age_years),
            "goal" => FieldValue::Text(self.goal.clone()),
            "mrv_baseline_sets" => FieldValue::Number(f64::from(self.mrv_baseline_sets)),
            _ => return None,
        };
        Some(value)
    }

    fn store(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        match name {
            "age" => self.age = whole(name, &value)?,
            "bodyweight_kg" => self.bodyweight_kg = number(name, &value)?,
            "training_age_years" => self.training_age_years = number(name, &value)?,
            "goal" => self.goal = text(name, value)?,
            "mrv_baseline_sets" => self.mrv_baseline_sets = whole(name, &value)?,
            _ => return Err(FormError::UnknownField(name.to_string())),
        }
        Ok(())
    }
}
