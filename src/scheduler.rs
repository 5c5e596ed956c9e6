//! Appointment booking rules on top of the stores.
//!
//! This module provides the AppointmentScheduler which validates payloads,
//! runs the overlap check on creation, keeps doctors' collections in step
//! with the appointment store and enforces the cancel and delete rules.

use anyhow::anyhow;
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::calendar::{DoctorCalendar, OverlapRule};
use crate::clock::Clock;
use crate::error::SchedulingError;
use crate::models::{Appointment, AppointmentForm, Doctor, DoctorDetails};
use crate::store::{AppointmentStore, DoctorStore};
use crate::validation::DateRangeValidator;

/// Every operation locks the whole store, so the overlap check and the
/// insert that follows it cannot interleave with another booking.
pub struct AppointmentScheduler<S> {
    store: Mutex<S>,
    clock: Arc<dyn Clock>,
    overlap_rule: OverlapRule,
    dates: DateRangeValidator,
}

impl<S> AppointmentScheduler<S>
where
    S: AppointmentStore + DoctorStore,
{
    pub fn new(store: S, clock: Arc<dyn Clock>, overlap_rule: OverlapRule) -> Self {
        AppointmentScheduler {
            store: Mutex::new(store),
            clock,
            overlap_rule,
            dates: DateRangeValidator::default(),
        }
    }

    /// Replace the date-range validator, e.g. to change its rejection message.
    pub fn with_date_validator(mut self, dates: DateRangeValidator) -> Self {
        self.dates = dates;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn store(&self) -> Result<MutexGuard<'_, S>, SchedulingError> {
        self.store
            .lock()
            .map_err(|_| SchedulingError::Unexpected(anyhow!("appointment store lock poisoned")))
    }

    /// All appointments, or only those starting strictly after `after`.
    pub fn appointments(
        &self,
        after: Option<NaiveDateTime>,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let store = self.store()?;
        Ok(match after {
            Some(after) => store.appointments_after(after),
            None => store.all_appointments(),
        })
    }

    pub fn appointment(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.store()?
            .appointment(id)
            .ok_or(SchedulingError::AppointmentNotFound(id))
    }

    /// Validate, check for overlaps with the doctor's bookings and persist.
    pub fn book(&self, form: &AppointmentForm) -> Result<Appointment, SchedulingError> {
        let draft = form
            .validate(&self.dates, self.now())
            .map_err(SchedulingError::Validation)?;

        let mut store = self.store()?;
        let doctor = store.find_or_create_doctor(&draft.doctor);
        let calendar = Self::calendar_of(&*store, &doctor);

        if let Some(existing) = calendar.find_conflict(&draft.range, self.overlap_rule) {
            tracing::warn!(
                doctor = %doctor.name,
                existing = %existing.id,
                "Rejected overlapping appointment"
            );
            return Err(SchedulingError::Overlap {
                doctor: doctor.name,
                existing: existing.id,
            });
        }

        let mut appointment = Appointment::new(draft);
        appointment.doctor_id = Some(doctor.id);
        let appointment = store.save_appointment(appointment);
        store.attach_appointment(doctor.id, appointment.id);
        tracing::info!(
            appointment_id = %appointment.id,
            doctor = %doctor.name,
            "Booked appointment"
        );
        Ok(appointment)
    }

    /// Overwrite an existing appointment, or create one under `id`.
    ///
    /// No overlap check is performed. When the doctor name changes the
    /// appointment moves to that doctor's collection.
    pub fn replace(&self, id: Uuid, form: &AppointmentForm) -> Result<Appointment, SchedulingError> {
        let draft = form
            .validate(&self.dates, self.now())
            .map_err(SchedulingError::Validation)?;

        let mut store = self.store()?;
        let doctor = store.find_or_create_doctor(&draft.doctor);
        let mut appointment = match store.appointment(id) {
            Some(mut existing) => {
                if let Some(previous) = existing.doctor_id.filter(|owner| *owner != doctor.id) {
                    store.detach_appointment(previous, id);
                }
                existing.apply(draft);
                existing
            }
            None => {
                tracing::info!(appointment_id = %id, "Creating appointment under caller-supplied id");
                Appointment::with_id(id, draft)
            }
        };
        appointment.doctor_id = Some(doctor.id);
        let appointment = store.save_appointment(appointment);
        store.attach_appointment(doctor.id, appointment.id);
        Ok(appointment)
    }

    pub fn remove(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let mut store = self.store()?;
        Self::remove_locked(&mut *store, id)
    }

    /// Remove every appointment. Returns the number removed.
    pub fn clear(&self) -> Result<usize, SchedulingError> {
        let mut store = self.store()?;
        let removed = store.clear_appointments();
        store.detach_all();
        tracing::info!(removed, "Removed all appointments");
        Ok(removed)
    }

    /// Remove an appointment that has not started yet.
    pub fn cancel(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let mut store = self.store()?;
        let appointment = store
            .appointment(id)
            .ok_or(SchedulingError::AppointmentNotFound(id))?;
        if appointment.has_started(self.now()) {
            tracing::warn!(appointment_id = %id, "Refused to cancel a started appointment");
            return Err(SchedulingError::AlreadyStarted(id));
        }
        Self::remove_locked(&mut *store, id)
    }

    pub fn doctors(&self) -> Result<Vec<DoctorDetails>, SchedulingError> {
        let store = self.store()?;
        Ok(store
            .all_doctors()
            .into_iter()
            .map(|doctor| Self::details_of(&*store, doctor))
            .collect())
    }

    pub fn doctor(&self, name: &str) -> Result<DoctorDetails, SchedulingError> {
        let store = self.store()?;
        let doctor = store
            .doctor_by_name(name)
            .ok_or_else(|| SchedulingError::DoctorNotFound(name.to_string()))?;
        Ok(Self::details_of(&*store, doctor))
    }

    /// Delete a doctor that owns no appointments.
    pub fn remove_doctor(&self, name: &str) -> Result<DoctorDetails, SchedulingError> {
        let mut store = self.store()?;
        let doctor = store
            .doctor_by_name(name)
            .ok_or_else(|| SchedulingError::DoctorNotFound(name.to_string()))?;
        if doctor.has_appointments() {
            return Err(SchedulingError::DoctorHasAppointments {
                doctor: doctor.name.clone(),
                count: doctor.appointment_ids().len(),
            });
        }
        store.remove_doctor(doctor.id);
        tracing::info!(doctor = %doctor.name, "Removed doctor");
        Ok(Self::details_of(&*store, doctor))
    }

    pub fn doctor_appointments(&self, name: &str) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.doctor(name)?.appointments)
    }

    fn remove_locked(store: &mut S, id: Uuid) -> Result<Appointment, SchedulingError> {
        let removed = store
            .remove_appointment(id)
            .ok_or(SchedulingError::AppointmentNotFound(id))?;
        if let Some(owner) = removed.doctor_id {
            store.detach_appointment(owner, id);
        }
        tracing::info!(appointment_id = %id, "Removed appointment");
        Ok(removed)
    }

    fn resolve(store: &S, doctor: &Doctor) -> Vec<Appointment> {
        doctor
            .appointment_ids()
            .iter()
            .filter_map(|id| store.appointment(*id))
            .collect()
    }

    fn calendar_of(store: &S, doctor: &Doctor) -> DoctorCalendar {
        DoctorCalendar::new(doctor.name.clone(), Self::resolve(store, doctor))
    }

    fn details_of(store: &S, doctor: Doctor) -> DoctorDetails {
        let appointments = Self::resolve(store, &doctor);
        DoctorDetails {
            id: doctor.id,
            name: doctor.name,
            appointments,
        }
    }
}
