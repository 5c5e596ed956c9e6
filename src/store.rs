//! Persistence seams for appointments and doctors, plus the in-memory
//! implementation the service runs on.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Appointment, Doctor};

pub trait AppointmentStore {
    /// Every appointment, sorted by start date.
    fn all_appointments(&self) -> Vec<Appointment>;

    /// Appointments starting strictly after `after`, sorted by start date.
    fn appointments_after(&self, after: NaiveDateTime) -> Vec<Appointment>;

    fn appointment(&self, id: Uuid) -> Option<Appointment>;

    /// Insert or overwrite by id.
    fn save_appointment(&mut self, appointment: Appointment) -> Appointment;

    fn remove_appointment(&mut self, id: Uuid) -> Option<Appointment>;

    /// Remove every appointment, returning how many were removed.
    fn clear_appointments(&mut self) -> usize;
}

pub trait DoctorStore {
    /// Every doctor, sorted by name.
    fn all_doctors(&self) -> Vec<Doctor>;

    fn doctor_by_name(&self, name: &str) -> Option<Doctor>;

    /// Return the doctor called `name`, creating it first if it does not exist.
    fn find_or_create_doctor(&mut self, name: &str) -> Doctor;

    /// Append an appointment to the doctor's collection. Returns `false`
    /// when the doctor does not exist.
    fn attach_appointment(&mut self, doctor_id: Uuid, appointment_id: Uuid) -> bool;

    fn detach_appointment(&mut self, doctor_id: Uuid, appointment_id: Uuid) -> bool;

    /// Empty every doctor's collection.
    fn detach_all(&mut self);

    fn remove_doctor(&mut self, id: Uuid) -> Option<Doctor>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    appointments: HashMap<Uuid, Appointment>,
    doctors: HashMap<Uuid, Doctor>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        appointments
    }
}

impl AppointmentStore for MemoryStore {
    fn all_appointments(&self) -> Vec<Appointment> {
        Self::sorted(self.appointments.values().cloned().collect())
    }

    fn appointments_after(&self, after: NaiveDateTime) -> Vec<Appointment> {
        Self::sorted(
            self.appointments
                .values()
                .filter(|a| a.start_date > after)
                .cloned()
                .collect(),
        )
    }

    fn appointment(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.get(&id).cloned()
    }

    fn save_appointment(&mut self, appointment: Appointment) -> Appointment {
        self.appointments.insert(appointment.id, appointment.clone());
        appointment
    }

    fn remove_appointment(&mut self, id: Uuid) -> Option<Appointment> {
        self.appointments.remove(&id)
    }

    fn clear_appointments(&mut self) -> usize {
        let count = self.appointments.len();
        self.appointments.clear();
        count
    }
}

impl DoctorStore for MemoryStore {
    fn all_doctors(&self) -> Vec<Doctor> {
        let mut doctors: Vec<Doctor> = self.doctors.values().cloned().collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        doctors
    }

    fn doctor_by_name(&self, name: &str) -> Option<Doctor> {
        self.doctors.values().find(|d| d.name == name).cloned()
    }

    fn find_or_create_doctor(&mut self, name: &str) -> Doctor {
        if let Some(doctor) = self.doctor_by_name(name) {
            return doctor;
        }
        let doctor = Doctor::new(name.to_string());
        tracing::info!(doctor = %doctor.name, doctor_id = %doctor.id, "Registered new doctor");
        self.doctors.insert(doctor.id, doctor.clone());
        doctor
    }

    fn attach_appointment(&mut self, doctor_id: Uuid, appointment_id: Uuid) -> bool {
        match self.doctors.get_mut(&doctor_id) {
            Some(doctor) => {
                doctor.add_appointment(appointment_id);
                true
            }
            None => false,
        }
    }

    fn detach_appointment(&mut self, doctor_id: Uuid, appointment_id: Uuid) -> bool {
        self.doctors
            .get_mut(&doctor_id)
            .map(|doctor| doctor.remove_appointment(appointment_id))
            .unwrap_or(false)
    }

    fn detach_all(&mut self) {
        for doctor in self.doctors.values_mut() {
            doctor.clear_appointments();
        }
    }

    fn remove_doctor(&mut self, id: Uuid) -> Option<Doctor> {
        self.doctors.remove(&id)
    }
}
