//! Appointment payload validation.
//!
//! The date rule is wall-clock dependent and is re-evaluated on every create
//! and replace. Required-field rules run alongside it so a single response
//! reports every problem with the payload.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::models::{AppointmentDraft, AppointmentForm, TimeRange};

pub const DATE_RANGE_MESSAGE: &str =
    "appointment must start before it ends and both dates must not be in the past";

/// A single rejected field. Object-level rules use the field `appointment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Rejects missing, empty, inverted or past date ranges.
#[derive(Debug, Clone)]
pub struct DateRangeValidator {
    message: String,
}

impl Default for DateRangeValidator {
    fn default() -> Self {
        Self::with_message(DATE_RANGE_MESSAGE)
    }
}

impl DateRangeValidator {
    pub fn with_message(message: impl Into<String>) -> Self {
        DateRangeValidator {
            message: message.into(),
        }
    }

    pub fn is_valid(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> bool {
        match (start, end) {
            (Some(start), Some(end)) => start < end && start >= now && end >= now,
            _ => false,
        }
    }

    pub fn check(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<TimeRange, FieldError> {
        match (start, end) {
            (Some(start), Some(end)) if self.is_valid(Some(start), Some(end), now) => {
                Ok(TimeRange { start, end })
            }
            _ => Err(FieldError::new("appointment", self.message.clone())),
        }
    }
}

fn required(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.push(FieldError::new(field, "must not be blank"));
            None
        }
    }
}

impl AppointmentForm {
    /// Validate the payload against `now`, producing a draft ready to persist.
    pub fn validate(
        &self,
        dates: &DateRangeValidator,
        now: NaiveDateTime,
    ) -> Result<AppointmentDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let doctor = required("doctor", self.doctor.as_deref(), &mut errors);
        let patient = required("patient", self.patient.as_deref(), &mut errors);
        let range = dates
            .check(self.start_date, self.end_date, now)
            .map_err(|e| errors.push(e))
            .ok();

        match (doctor, patient, range) {
            (Some(doctor), Some(patient), Some(range)) => Ok(AppointmentDraft {
                doctor,
                patient,
                range,
            }),
            _ => Err(errors),
        }
    }
}
