use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

use crate::{status::UnknownStatus, validation::FieldErrors};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "Validation error".to_string(),
            details: Some(errors.into_json()),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden")
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "resource not found")
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        }
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
            details: self.details,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Unique index on `users.email`.
const USER_EMAIL_CONSTRAINT: &str = "users_email_key";

impl From<DieselError> for AppError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => AppError::not_found(),
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                if info.constraint_name() == Some(USER_EMAIL_CONSTRAINT) {
                    AppError::bad_request("Email already in use")
                } else {
                    AppError::bad_request("Record already exists")
                }
            }
            _ => AppError::internal(value),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<UnknownStatus> for AppError {
    fn from(value: UnknownStatus) -> Self {
        let mut errors = FieldErrors::default();
        errors.push("status", value.to_string());
        AppError::validation(errors)
    }
}
