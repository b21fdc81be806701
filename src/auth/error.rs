use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::validation::FieldError;

/// Column protected by a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Username => f.write_str("username"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(UniqueField),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("argon2: {0}")]
    Argon2(String),
    #[error("stored digest is not a recognised password hash")]
    UnrecognizedDigest,
}

/// Everything a signup or login request can end in besides success.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("user not found")]
    UserNotFound,
    #[error("incorrect password")]
    IncorrectPassword,
    #[error("{0} already registered")]
    Conflict(UniqueField),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(field) => AuthError::Conflict(field),
            other => AuthError::Store(other),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MalformedBody(_) | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::IncorrectPassword => StatusCode::UNAUTHORIZED,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::Store(_) | AuthError::Hash(_) | AuthError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AuthError::MalformedBody(detail) => format!("Invalid request body: {detail}"),
            AuthError::Validation(_) => "Validation failed".into(),
            AuthError::UserNotFound => "User not found".into(),
            AuthError::IncorrectPassword => "Incorrect password".into(),
            AuthError::Conflict(UniqueField::Email) => "Email already registered".into(),
            AuthError::Conflict(UniqueField::Username) => "Username already taken".into(),
            AuthError::Store(_) | AuthError::Hash(_) | AuthError::Task(_) => {
                "Internal server error".into()
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            // details stay in the log, the client only sees the generic message
            error!(error = %self, "request failed");
        }
        let message = self.message();
        let errors = match self {
            AuthError::Validation(errors) => errors,
            _ => Vec::new(),
        };
        (status, Json(ErrorBody { message, errors })).into_response()
    }
}
