use axum::http::StatusCode;
use thiserror::Error;

use crate::types::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulingError {
    #[error("Timeslot is no longer available")]
    SlotUnavailable,
    #[error("You already have an active appointment at this time")]
    Conflict,
    #[error("Cannot {action} an appointment that is {from}")]
    InvalidTransition {
        from: AppointmentStatus,
        action: &'static str,
    },
    #[error("Timeslot or appointment not found")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SchedulingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SlotUnavailable | Self::Conflict => StatusCode::CONFLICT,
            Self::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for SchedulingError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound,
            other => Self::Storage(other.to_string()),
        }
    }
}
