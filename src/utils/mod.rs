//! Utility functions

pub mod time;
pub mod validation;

pub use time::{compare_dates, parse_datetime};
pub use validation::{validate_email, validate_password_confirmation};
