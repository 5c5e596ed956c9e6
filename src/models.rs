//! Data models for the appointment booking service.
//!
//! This module defines the core data structures used throughout the system:
//! - TimeRange: The start/end window of an appointment
//! - Appointment: A booked appointment between a doctor and a patient
//! - Doctor: A doctor and the ids of the appointments it owns
//! - DoctorDetails: A doctor with its appointments resolved, as served over HTTP
//! - AppointmentForm: The raw, unvalidated appointment payload
//! - AppointmentDraft: A payload that passed validation

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The time window covered by an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Check if a datetime lies strictly between the two endpoints.
    pub fn strictly_contains(&self, dt: &NaiveDateTime) -> bool {
        &self.start < dt && dt < &self.end
    }

    /// Check if the two ranges share any instant.
    pub fn intersects(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub doctor: String,
    pub patient: String,
    #[serde(with = "crate::datetime::iso")]
    pub start_date: NaiveDateTime,
    #[serde(with = "crate::datetime::iso")]
    pub end_date: NaiveDateTime,
    /// Owning doctor. Internal only, the doctor name is what clients see.
    #[serde(skip)]
    pub doctor_id: Option<Uuid>,
}

impl Appointment {
    /// Create a new appointment from a validated draft.
    pub fn new(draft: AppointmentDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    pub fn with_id(id: Uuid, draft: AppointmentDraft) -> Self {
        Appointment {
            id,
            doctor: draft.doctor,
            patient: draft.patient,
            start_date: draft.range.start,
            end_date: draft.range.end,
            doctor_id: None,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Overwrite every client-editable field.
    pub fn apply(&mut self, draft: AppointmentDraft) {
        self.doctor = draft.doctor;
        self.patient = draft.patient;
        self.start_date = draft.range.start;
        self.end_date = draft.range.end;
    }

    /// An appointment has started once `now` is strictly past its start.
    pub fn has_started(&self, now: NaiveDateTime) -> bool {
        now > self.start_date
    }
}

/// A doctor and its ordered collection of appointment ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    appointments: Vec<Uuid>,
}

impl Doctor {
    pub fn new(name: String) -> Self {
        Doctor {
            id: Uuid::new_v4(),
            name,
            appointments: Vec::new(),
        }
    }

    pub fn appointment_ids(&self) -> &[Uuid] {
        &self.appointments
    }

    pub fn has_appointments(&self) -> bool {
        !self.appointments.is_empty()
    }

    /// Adds an appointment to the collection, keeping it a set.
    pub fn add_appointment(&mut self, appointment_id: Uuid) {
        if !self.appointments.contains(&appointment_id) {
            self.appointments.push(appointment_id);
        }
    }

    pub fn remove_appointment(&mut self, appointment_id: Uuid) -> bool {
        let before = self.appointments.len();
        self.appointments.retain(|id| *id != appointment_id);
        self.appointments.len() != before
    }

    pub fn clear_appointments(&mut self) {
        self.appointments.clear();
    }
}

/// A doctor with its appointments resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorDetails {
    pub id: Uuid,
    pub name: String,
    pub appointments: Vec<Appointment>,
}

/// Appointment payload as received on create and replace.
///
/// Every field is optional so that missing values surface as validation
/// failures rather than body parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentForm {
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub patient: Option<String>,
    #[serde(default, with = "crate::datetime::iso_option")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, with = "crate::datetime::iso_option")]
    pub end_date: Option<NaiveDateTime>,
}

/// A payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentDraft {
    pub doctor: String,
    pub patient: String,
    pub range: TimeRange,
}
