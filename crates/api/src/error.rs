use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use econ_calendar_domain::InvalidCommandError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid command. Error message: `{0}`")]
    InvalidCommand(#[from] InvalidCommandError),
    #[error("The store is unavailable. Error message: `{0}`")]
    StoreUnavailable(String),
    #[error("The calendar feed is unavailable. Error message: `{0}`")]
    FeedUnavailable(String),
    #[error("Failed to notify `{subscriber}` about `{event}`. Error message: `{reason}`")]
    PartialDeliveryFailure {
        event: String,
        subscriber: String,
        reason: String,
    },
    #[error("Unrecognized trigger payload: `{0}`")]
    UnrecognizedTrigger(String),
}

impl actix_web::error::ResponseError for CalendarError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InvalidCommand(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::FeedUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::PartialDeliveryFailure { .. } => StatusCode::BAD_GATEWAY,
            Self::UnrecognizedTrigger(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .body(self.to_string())
    }
}
