//! Overlap detection for a doctor's bookings.
//!
//! This module provides the DoctorCalendar which holds the appointments a
//! doctor already owns and decides whether a candidate booking conflicts
//! with any of them.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, TimeRange};

/// How a candidate booking is compared with an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapRule {
    /// Conflict on a shared start, a shared end, or an existing endpoint
    /// strictly inside the candidate. A candidate strictly inside an
    /// existing booking is not a conflict.
    #[default]
    Endpoint,
    /// Conflict whenever the two ranges share any instant.
    Interval,
}

impl OverlapRule {
    pub fn collides(self, candidate: &TimeRange, existing: &TimeRange) -> bool {
        match self {
            OverlapRule::Endpoint => {
                candidate.start == existing.start
                    || candidate.end == existing.end
                    || candidate.strictly_contains(&existing.start)
                    || candidate.strictly_contains(&existing.end)
            }
            OverlapRule::Interval => candidate.intersects(existing),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DoctorCalendar {
    pub doctor_name: String,
    appointments: Vec<Appointment>,
}

impl DoctorCalendar {
    pub fn new(doctor_name: String, appointments: Vec<Appointment>) -> Self {
        DoctorCalendar {
            doctor_name,
            appointments,
        }
    }

    /// First existing appointment the candidate conflicts with, if any.
    pub fn find_conflict(&self, candidate: &TimeRange, rule: OverlapRule) -> Option<&Appointment> {
        self.appointments
            .iter()
            .find(|existing| rule.collides(candidate, &existing.range()))
    }
}

impl std::fmt::Display for DoctorCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DoctorCalendar({}, appointments={})",
            self.doctor_name,
            self.appointments.len()
        )
    }
}
