//! Route handlers

pub mod auth;
pub mod connections;
pub mod health;
pub mod notifications;
pub mod reports;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use pmms_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn unauthorized(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, error)
}

/// Translate core errors to their HTTP shape
pub fn map_core_error(err: Error) -> RouteError {
    let status = match &err {
        Error::DuplicateConnection(_)
        | Error::DraftAlreadyExists(_)
        | Error::InvalidTransition(_) => StatusCode::CONFLICT,
        Error::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Forbidden(_) => StatusCode::FORBIDDEN,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    route_error(status, err.to_string())
}
