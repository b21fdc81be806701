use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, SignupRequest, SignupResponse},
        error::AuthError,
        services::{register_user, verify_credentials},
        validation::{validate_login, validate_signup},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/api/signup", post(signup))
        .route("/auth/api/login", post(login))
}

fn malformed(rejection: JsonRejection) -> AuthError {
    warn!(error = %rejection, "rejected request body");
    AuthError::MalformedBody(rejection.body_text())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthError> {
    let Json(payload) = payload.map_err(malformed)?;

    let input = match validate_signup(payload) {
        Ok(input) => input,
        Err(e) => {
            warn!("signup validation failed");
            return Err(e);
        }
    };

    let user = match register_user(&state, input).await {
        Ok(u) => u,
        Err(e @ AuthError::Conflict(_)) => {
            warn!(error = %e, "signup conflict");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".into(),
            user,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let Json(payload) = payload.map_err(malformed)?;
    let input = validate_login(payload)?;
    let email = input.email.clone();

    let user = match verify_credentials(&state, input).await {
        Ok(u) => u,
        Err(AuthError::UserNotFound) => {
            warn!(email = %email, "login unknown email");
            return Err(AuthError::UserNotFound);
        }
        Err(AuthError::IncorrectPassword) => {
            warn!(email = %email, "login invalid password");
            return Err(AuthError::IncorrectPassword);
        }
        Err(e) => return Err(e),
    };

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(MessageResponse {
        message: "Login successful".into(),
    }))
}
