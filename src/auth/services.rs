use std::sync::Arc;

use tracing::debug;

use crate::auth::error::AuthError;
use crate::auth::repo_types::{NewUser, User};
use crate::auth::validation::{LoginInput, SignupInput};
use crate::state::AppState;

/// Hashes the password off the async executor and stores the new user.
pub async fn register_user(state: &AppState, input: SignupInput) -> Result<User, AuthError> {
    let SignupInput {
        username,
        email,
        name_full,
        password,
    } = input;

    let hasher = Arc::clone(&state.hasher);
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    debug!("password hashed");

    let user = state
        .store
        .create(NewUser {
            username,
            email,
            name_full,
            password_hash,
        })
        .await?;
    Ok(user)
}

/// Looks the user up by email and checks the password against the stored digest.
pub async fn verify_credentials(state: &AppState, input: LoginInput) -> Result<User, AuthError> {
    let user = state
        .store
        .find_by_email(&input.email)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let hasher = Arc::clone(&state.hasher);
    let digest = user.password_hash.clone();
    let password = input.password;
    let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest)).await??;

    if !matches {
        return Err(AuthError::IncorrectPassword);
    }
    Ok(user)
}
