//! HAL (Hypertext Application Language) representations.
//!
//! Handlers always produce the plain record; when the client asks for
//! `application/hal+json` the same record is wrapped with `_links` (and
//! collections with `_embedded`) by the projections in this module.

use actix_web::dev::Payload;
use actix_web::http::header::ACCEPT;
use actix_web::{FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::models::{Appointment, DoctorDetails};

pub const HAL_JSON: &str = "application/hal+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HalResource<T> {
    #[serde(flatten)]
    pub item: T,
    #[serde(rename = "_links")]
    pub links: BTreeMap<&'static str, Link>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HalCollection<T> {
    #[serde(rename = "_embedded", skip_serializing_if = "BTreeMap::is_empty")]
    pub embedded: BTreeMap<&'static str, Vec<HalResource<T>>>,
    #[serde(rename = "_links")]
    pub links: BTreeMap<&'static str, Link>,
}

impl<T> HalCollection<T> {
    fn new(rel: &'static str, items: Vec<HalResource<T>>, self_link: Link) -> Self {
        let mut embedded = BTreeMap::new();
        if !items.is_empty() {
            embedded.insert(rel, items);
        }
        HalCollection {
            embedded,
            links: BTreeMap::from([("self", self_link)]),
        }
    }
}

/// Absolute link builder rooted at the scheme and host of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Links {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_request(req: &HttpRequest) -> Self {
        let info = req.connection_info();
        Self::new(format!("{}://{}", info.scheme(), info.host()))
    }

    fn link(&self, path: &str) -> Link {
        Link {
            href: format!("{}{}", self.base, path),
        }
    }

    pub fn appointments(&self) -> Link {
        self.link("/api/appointments")
    }

    pub fn appointment(&self, id: Uuid) -> Link {
        self.link(&format!("/api/appointments/{}", id))
    }

    pub fn cancel(&self, id: Uuid) -> Link {
        self.link(&format!("/api/{}/cancel", id))
    }

    pub fn doctors(&self) -> Link {
        self.link("/api/doctors")
    }

    pub fn doctor(&self, name: &str) -> Link {
        self.link(&format!("/api/doctors/{}", urlencoding::encode(name)))
    }

    pub fn doctor_appointments(&self, name: &str) -> Link {
        self.link(&format!("/api/doctors/{}/appointments", urlencoding::encode(name)))
    }

    /// The `cancel` link is only offered while the appointment has not started.
    pub fn appointment_resource(
        &self,
        appointment: Appointment,
        now: NaiveDateTime,
    ) -> HalResource<Appointment> {
        let mut links = BTreeMap::from([
            ("self", self.appointment(appointment.id)),
            ("appointments", self.appointments()),
        ]);
        if !appointment.has_started(now) {
            links.insert("cancel", self.cancel(appointment.id));
        }
        HalResource {
            item: appointment,
            links,
        }
    }

    pub fn appointment_collection(
        &self,
        appointments: Vec<Appointment>,
        self_link: Link,
        now: NaiveDateTime,
    ) -> HalCollection<Appointment> {
        let items = appointments
            .into_iter()
            .map(|a| self.appointment_resource(a, now))
            .collect();
        HalCollection::new("appointmentList", items, self_link)
    }

    pub fn doctor_resource(&self, doctor: DoctorDetails) -> HalResource<DoctorDetails> {
        let links = BTreeMap::from([
            ("self", self.doctor(&doctor.name)),
            ("doctors", self.doctors()),
            ("appointments", self.doctor_appointments(&doctor.name)),
        ]);
        HalResource {
            item: doctor,
            links,
        }
    }

    pub fn doctor_collection(&self, doctors: Vec<DoctorDetails>) -> HalCollection<DoctorDetails> {
        let items = doctors
            .into_iter()
            .map(|d| self.doctor_resource(d))
            .collect();
        HalCollection::new("doctorList", items, self.doctors())
    }
}

/// Response shape negotiated from the `Accept` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Representation {
    Plain,
    Hal(Links),
}

impl Representation {
    pub fn negotiate(req: &HttpRequest) -> Self {
        if accepts_hal(req) {
            Representation::Hal(Links::from_request(req))
        } else {
            Representation::Plain
        }
    }

    /// Serialize `record` as is, or through `hal` when HAL was requested.
    pub fn render<T, H>(
        &self,
        mut response: HttpResponseBuilder,
        record: T,
        hal: impl FnOnce(&Links, T) -> H,
    ) -> HttpResponse
    where
        T: Serialize,
        H: Serialize,
    {
        match self {
            Representation::Plain => response.json(record),
            Representation::Hal(links) => response.content_type(HAL_JSON).json(hal(links, record)),
        }
    }
}

fn accepts_hal(req: &HttpRequest) -> bool {
    req.headers()
        .get_all(ACCEPT)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|range| range.split(';').next())
        .any(|media| media.trim().eq_ignore_ascii_case(HAL_JSON))
}

impl FromRequest for Representation {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::negotiate(req)))
    }
}
