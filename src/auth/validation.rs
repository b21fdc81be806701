//! Server-side checks for signup and login payloads.
//!
//! The signup rules follow the registration form so that a request which
//! bypasses the browser is held to the same schema.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::auth::dto::{LoginRequest, SignupRequest};
use crate::auth::error::AuthError;
use crate::auth::password::BCRYPT_MAX_PASSWORD_BYTES;

const USERNAME_MIN: usize = 5;
const USERNAME_MAX: usize = 15;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Signup fields that passed validation. The email is normalized.
#[derive(Debug)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub name_full: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn is_valid_full_name(name: &str) -> bool {
    lazy_static! {
        static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z]+(?: [a-zA-Z]+)*$").unwrap();
    }
    NAME_RE.is_match(name)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_signup(req: SignupRequest) -> Result<SignupInput, AuthError> {
    let mut errors = Vec::new();

    let username_len = req.username.chars().count();
    if username_len < USERNAME_MIN {
        errors.push(FieldError {
            field: "username",
            message: "Username should be at least 5 characters long",
        });
    } else if username_len > USERNAME_MAX {
        errors.push(FieldError {
            field: "username",
            message: "Username should be at most 15 characters long",
        });
    }

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email address",
        });
    }

    if !is_valid_full_name(&req.name_full) {
        errors.push(FieldError {
            field: "nameFull",
            message: "Please enter your full name",
        });
    }

    let password_len = req.password.chars().count();
    if password_len < PASSWORD_MIN {
        errors.push(FieldError {
            field: "password",
            message: "Password should be at least 8 characters long",
        });
    } else if password_len > PASSWORD_MAX {
        errors.push(FieldError {
            field: "password",
            message: "Password should be at most 20 characters long",
        });
    } else if req.password.len() > BCRYPT_MAX_PASSWORD_BYTES {
        errors.push(FieldError {
            field: "password",
            message: "Password is too long",
        });
    }
    if !req.password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError {
            field: "password",
            message: "Password must contain at least one number",
        });
    }

    if let Some(confirm) = &req.confirm_password {
        if *confirm != req.password {
            errors.push(FieldError {
                field: "confirmPassword",
                message: "Passwords do not match",
            });
        }
    }

    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }

    Ok(SignupInput {
        username: req.username,
        email,
        name_full: req.name_full,
        password: req.password,
    })
}

pub fn validate_login(req: LoginRequest) -> Result<LoginInput, AuthError> {
    let mut errors = Vec::new();

    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        errors.push(FieldError {
            field: "email",
            message: "Invalid email address",
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }

    if !errors.is_empty() {
        return Err(AuthError::Validation(errors));
    }
    Ok(LoginInput {
        email,
        password: req.password,
    })
}
