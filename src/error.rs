use std::collections::BTreeMap;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, HrError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HrError {
    #[error("attendance cannot be recorded on the weekend")]
    WeekendNotAllowed,

    #[error("employee has already checked in on the date")]
    DuplicateCheckIn,

    #[error("employee has already checked out on the date")]
    DuplicateCheckOut,

    #[error("no check-in data for the date")]
    NoCheckInFound,

    #[error("check-out time is earlier than the check-in time")]
    CheckOutBeforeCheckIn,

    #[error("start date is later than end date")]
    InvalidDateOrder,

    #[error("overlapping date with existing period")]
    PeriodOverlap,

    #[error("the store did not answer in time")]
    StoreTimeout,

    #[error("the store could not complete the request")]
    StoreUnavailable,

    #[error("request failed validation")]
    FailedValidation(BTreeMap<String, String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("the server encountered a problem and could not process your request")]
    Internal,
}

impl From<StoreError> for HrError {
    /// Fallback for violations a component did not classify itself.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => HrError::StoreTimeout,
            _ => HrError::StoreUnavailable,
        }
    }
}

impl ResponseError for HrError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrError::DuplicateCheckIn
            | HrError::DuplicateCheckOut
            | HrError::PeriodOverlap
            | HrError::Conflict(_) => StatusCode::CONFLICT,
            HrError::WeekendNotAllowed
            | HrError::CheckOutBeforeCheckIn
            | HrError::InvalidDateOrder
            | HrError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HrError::NoCheckInFound => StatusCode::NOT_FOUND,
            HrError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HrError::Forbidden(_) => StatusCode::FORBIDDEN,
            HrError::StoreTimeout => StatusCode::GATEWAY_TIMEOUT,
            HrError::StoreUnavailable | HrError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            HrError::FailedValidation(fields) => json!({ "error": fields }),
            other => json!({ "error": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// `JsonConfig` error handler: an unreadable body is reported under `body`.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let mut fields = BTreeMap::new();
    fields.insert("body".to_string(), err.to_string());
    HrError::FailedValidation(fields).into()
}
