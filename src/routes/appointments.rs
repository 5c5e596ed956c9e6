use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::SharedScheduler;
use crate::datetime::parse_local;
use crate::error::SchedulingError;
use crate::hal::{Links, Representation};
use crate::models::AppointmentForm;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
}

#[tracing::instrument(name = "Listing appointments", skip(scheduler, representation))]
pub async fn list_appointments(
    query: web::Query<ListQuery>,
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let after = query
        .date
        .as_deref()
        .map(|raw| {
            parse_local(raw).map_err(|source| SchedulingError::InvalidDate {
                value: raw.to_string(),
                source,
            })
        })
        .transpose()?;

    let appointments = scheduler.appointments(after)?;
    let now = scheduler.now();
    Ok(representation.render(HttpResponse::Ok(), appointments, |links, appointments| {
        links.appointment_collection(appointments, links.appointments(), now)
    }))
}

#[tracing::instrument(name = "Fetching an appointment", skip(scheduler, representation))]
pub async fn get_appointment(
    id: web::Path<Uuid>,
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let appointment = scheduler.appointment(id.into_inner())?;
    let now = scheduler.now();
    Ok(representation.render(HttpResponse::Ok(), appointment, |links, appointment| {
        links.appointment_resource(appointment, now)
    }))
}

#[tracing::instrument(
    name = "Booking a new appointment",
    skip(form, scheduler, representation, request),
    fields(
        doctor = ?form.doctor,
        patient = ?form.patient,
    )
)]
pub async fn book_appointment(
    form: web::Json<AppointmentForm>,
    scheduler: SharedScheduler,
    representation: Representation,
    request: HttpRequest,
) -> Result<HttpResponse, SchedulingError> {
    let appointment = scheduler.book(&form)?;
    let location = Links::from_request(&request).appointment(appointment.id).href;
    let now = scheduler.now();

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, location));
    Ok(representation.render(response, appointment, |links, appointment| {
        links.appointment_resource(appointment, now)
    }))
}

#[tracing::instrument(
    name = "Replacing an appointment",
    skip(form, scheduler, representation),
    fields(doctor = ?form.doctor)
)]
pub async fn replace_appointment(
    id: web::Path<Uuid>,
    form: web::Json<AppointmentForm>,
    scheduler: SharedScheduler,
    representation: Representation,
) -> Result<HttpResponse, SchedulingError> {
    let appointment = scheduler.replace(id.into_inner(), &form)?;
    let now = scheduler.now();
    Ok(representation.render(HttpResponse::Ok(), appointment, |links, appointment| {
        links.appointment_resource(appointment, now)
    }))
}

#[tracing::instrument(name = "Deleting an appointment", skip(scheduler))]
pub async fn delete_appointment(
    id: web::Path<Uuid>,
    scheduler: SharedScheduler,
) -> Result<HttpResponse, SchedulingError> {
    let removed = scheduler.remove(id.into_inner())?;
    Ok(HttpResponse::Ok().json(removed))
}

#[tracing::instrument(name = "Deleting all appointments", skip(scheduler))]
pub async fn delete_all_appointments(
    scheduler: SharedScheduler,
) -> Result<HttpResponse, SchedulingError> {
    scheduler.clear()?;
    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Cancelling an appointment", skip(scheduler))]
pub async fn cancel_appointment(
    id: web::Path<Uuid>,
    scheduler: SharedScheduler,
) -> Result<HttpResponse, SchedulingError> {
    let cancelled = scheduler.cancel(id.into_inner())?;
    Ok(HttpResponse::Ok().json(cancelled))
}
