use actix_web::{web, HttpResponse};

use super::SharedScheduler;
use crate::error::SchedulingError;
use crate::hal::Representation;

#[tracing::instrument(name = "Listing doctors", skip(scheduler, representation))]
pub async fn list_doctors(
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let doctors = scheduler.doctors()?;
    Ok(representation.render(HttpResponse::Ok(), doctors, |links, doctors| {
        links.doctor_collection(doctors)
    }))
}

#[tracing::instrument(name = "Fetching a doctor", skip(scheduler, representation))]
pub async fn get_doctor(
    name: web::Path<String>,
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let doctor = scheduler.doctor(&name)?;
    Ok(representation.render(HttpResponse::Ok(), doctor, |links, doctor| {
        links.doctor_resource(doctor)
    }))
}

#[tracing::instrument(name = "Deleting a doctor", skip(scheduler))]
pub async fn delete_doctor(
    name: web::Path<String>,
    scheduler: SharedScheduler,
) -> Result<HttpResponse, SchedulingError> {
    let removed = scheduler.remove_doctor(&name)?;
    Ok(HttpResponse::Ok().json(removed))
}

#[tracing::instrument(name = "Listing a doctor's appointments", skip(scheduler, representation))]
pub async fn get_doctor_appointments(
    name: web::Path<String>,
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let appointments = scheduler.doctor_appointments(&name)?;
    let now = scheduler.now();
    Ok(representation.render(HttpResponse::Ok(), appointments, |links, appointments| {
        links.appointment_collection(appointments, links.doctor_appointments(&name), now)
    }))
}
