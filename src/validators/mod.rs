//! Validation for caller-supplied input.

pub mod email;
pub mod guest_name;

pub use email::validate_email;
pub use guest_name::validate_guest_name;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    GuestNameEmpty,
    GuestNameTooLong,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::GuestNameEmpty => write!(f, "Guest name cannot be empty"),
            Self::GuestNameTooLong => {
                write!(f, "Guest name is too long (max 80 characters)")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
