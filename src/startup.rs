use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::SchedulingError;
use crate::routes::{
    book_appointment, cancel_appointment, delete_all_appointments, delete_appointment,
    delete_doctor, get_appointment, get_doctor, get_doctor_appointments, health_check,
    list_appointments, list_doctors, replace_appointment,
};
use crate::scheduler::AppointmentScheduler;
use crate::store::MemoryStore;
use crate::validation::DateRangeValidator;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub fn build(config: Settings) -> Result<Self, anyhow::Error> {
        Self::build_with_clock(config, Arc::new(SystemClock))
    }

    pub fn build_with_clock(config: Settings, clock: Arc<dyn Clock>) -> Result<Self, anyhow::Error> {
        let address = config.address();
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        let scheduler =
            AppointmentScheduler::new(MemoryStore::new(), clock, config.scheduling.overlap_rule)
                .with_date_validator(DateRangeValidator::with_message(
                    config.scheduling.date_range_message,
                ));
        let server = run(listener, scheduler)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    scheduler: AppointmentScheduler<MemoryStore>,
) -> Result<Server, anyhow::Error> {
    let scheduler = web::Data::new(scheduler);
    let server: Server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                SchedulingError::MalformedRequest(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                SchedulingError::MalformedRequest(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, req| {
                tracing::debug!(error = %err, "Rejected path parameter");
                match req.match_info().get("id") {
                    Some(id) => SchedulingError::InvalidAppointmentId(id.to_string()).into(),
                    None => SchedulingError::MalformedRequest(err.to_string()).into(),
                }
            }))
            .service(
                web::scope("/api")
                    .service(
                        web::resource("/appointments")
                            .route(web::get().to(list_appointments))
                            .route(web::post().to(book_appointment))
                            .route(web::delete().to(delete_all_appointments)),
                    )
                    .service(
                        web::resource("/appointments/{id}")
                            .route(web::get().to(get_appointment))
                            .route(web::put().to(replace_appointment))
                            .route(web::delete().to(delete_appointment)),
                    )
                    .route("/doctors", web::get().to(list_doctors))
                    .service(
                        web::resource("/doctors/{name}")
                            .route(web::get().to(get_doctor))
                            .route(web::delete().to(delete_doctor)),
                    )
                    .route(
                        "/doctors/{name}/appointments",
                        web::get().to(get_doctor_appointments),
                    )
                    .route("/{id}/cancel", web::delete().to(cancel_appointment)),
            )
            .route("/{id}/cancel", web::delete().to(cancel_appointment))
            .route("/health_check", web::get().to(health_check))
            .app_data(scheduler.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
