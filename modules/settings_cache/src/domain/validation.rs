//! Client-side validation of settings patches
//!
//! Mirrors the backend write contract so obviously bad input never reaches the
//! store or the network.

use crate::contract::{GatewayError, SettingsPatch};

/// Longest language name accepted locally
pub const MAX_LANGUAGE_LENGTH: usize = 64;

/// Validate a patch before it is applied optimistically
///
/// Accepts:
/// - an absent `language` (the current value is kept)
/// - a `language` that is non-blank and at most `MAX_LANGUAGE_LENGTH` characters
pub fn validate_patch(patch: &SettingsPatch) -> Result<(), GatewayError> {
    if let Some(language) = &patch.language {
        validate_language(language)?;
    }
    Ok(())
}

pub fn validate_language(language: &str) -> Result<(), GatewayError> {
    if language.trim().is_empty() {
        return Err(GatewayError::validation("language", "must not be empty"));
    }

    if language.chars().count() > MAX_LANGUAGE_LENGTH {
        return Err(GatewayError::validation(
            "language",
            format!("exceeds maximum length of {}", MAX_LANGUAGE_LENGTH),
        ));
    }

    Ok(())
}
