use super::ValidationError;
use crate::token::sanitize_guest_name;

/// Maximum guest-name length after normalization, in characters.
pub const GUEST_NAME_MAX: usize = 80;

/// Validates and normalizes the display name attached to a shareable link.
///
/// The `:` delimiter is stripped before whitespace is collapsed, so a
/// crafted name cannot inject extra segments into the stored link marker.
/// Returns the normalized name.
pub fn validate_guest_name(name: &str) -> Result<String, ValidationError> {
    let normalized = sanitize_guest_name(name);

    if normalized.is_empty() {
        return Err(ValidationError::GuestNameEmpty);
    }

    if normalized.chars().count() > GUEST_NAME_MAX {
        return Err(ValidationError::GuestNameTooLong);
    }

    Ok(normalized)
}
