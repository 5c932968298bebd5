//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LoginRequest, RegisterRequest};

const MAX_NAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PASSWORD_LEN: usize = 128;

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "Name must be at most {} characters long",
            MAX_NAME_LEN
        ));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LEN
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
///
/// Only presence and an upper bound are enforced; strength rules are left
/// to the client.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > MAX_PASSWORD_LEN {
        return Err(format!(
            "Password must be at most {} characters long",
            MAX_PASSWORD_LEN
        ));
    }

    Ok(())
}

/// Validate a registration request
pub fn validate_registration(request: &RegisterRequest) -> Result<(), String> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_password(&request.password)
}

/// Validate a login request
pub fn validate_login(request: &LoginRequest) -> Result<(), String> {
    if request.name.trim().is_empty() || request.password.is_empty() {
        return Err("Missing fields".to_string());
    }
    Ok(())
}
