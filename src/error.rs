use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use uuid::Uuid;

use crate::validation::{FieldError, ValidationErrors};

/// Broad failure categories, each mapped to one status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    BadRequest,
    Unexpected,
}

#[derive(thiserror::Error)]
pub enum SchedulingError {
    #[error("could not find appointment {0}")]
    AppointmentNotFound(Uuid),
    /// An appointment id that is not a UUID can never match a record.
    #[error("could not find appointment {0}")]
    InvalidAppointmentId(String),
    #[error("could not find doctor {0}")]
    DoctorNotFound(String),
    #[error("invalid appointment: {0}")]
    Validation(ValidationErrors),
    #[error("appointment overlaps with appointment {existing} of doctor {doctor}")]
    Overlap { doctor: String, existing: Uuid },
    #[error("doctor {doctor} still has {count} appointment(s)")]
    DoctorHasAppointments { doctor: String, count: usize },
    #[error("appointment {0} has already started")]
    AlreadyStarted(Uuid),
    #[error("invalid date parameter '{value}'")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for SchedulingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SchedulingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchedulingError::AppointmentNotFound(_)
            | SchedulingError::InvalidAppointmentId(_)
            | SchedulingError::DoctorNotFound(_) => ErrorKind::NotFound,
            SchedulingError::Validation(_) => ErrorKind::Validation,
            SchedulingError::Overlap { .. }
            | SchedulingError::DoctorHasAppointments { .. }
            | SchedulingError::AlreadyStarted(_) => ErrorKind::Conflict,
            SchedulingError::InvalidDate { .. } | SchedulingError::MalformedRequest(_) => {
                ErrorKind::BadRequest
            }
            SchedulingError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    status: u16,
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl ResponseError for SchedulingError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation | ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Internal details stay in the logs.
        let message = match self {
            SchedulingError::Unexpected(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        let errors = match self {
            SchedulingError::Validation(errors) => Some(errors.errors()),
            _ => None,
        };
        HttpResponse::build(status).json(ErrorBody {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error"),
            message,
            errors,
        })
    }
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
