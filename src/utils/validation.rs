//! Input validation utilities
//!
//! Everything here runs before any network call, so a malformed form never
//! costs a round trip.

use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld`, no whitespace
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Email is required");
    }
    if !EMAIL_RE.is_match(email.trim()) {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate that the confirmation matches the password
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), &'static str> {
    if password != confirmation {
        return Err("Passwords do not match");
    }
    Ok(())
}

/// Reject blank required fields, naming the first one missing
pub fn validate_required<'a>(fields: &[(&'a str, &str)]) -> Result<(), &'a str> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(*name),
        None => Ok(()),
    }
}
