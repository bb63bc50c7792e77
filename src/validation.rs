//! Validation module
//!
//! Stateless field checks applied to request payloads before they reach the
//! persistence layer. Errors name the first missing or malformed field.

use crate::error::{AppError, AppResult};

/// Validate a required text field.
///
/// Surrounding whitespace is trimmed away; a value that is empty after
/// trimming counts as missing. The error message follows the service's
/// convention, e.g. `Invalid Account: missing name`.
pub fn required_text(entity: &str, field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!(
            "Invalid {entity}: missing {field}"
        )));
    }
    Ok(trimmed.to_string())
}
