//! Conversions between wire DTOs, HTTP statuses and contract types

use super::dto::{ErrorBody, SaveSettingsRequest, SettingsDto};
use crate::contract::{GatewayError, SettingsPatch, SettingsRecord};
use reqwest::StatusCode;

impl TryFrom<SettingsDto> for SettingsRecord {
    type Error = GatewayError;

    fn try_from(dto: SettingsDto) -> Result<Self, Self::Error> {
        if dto.language.trim().is_empty() {
            return Err(GatewayError::malformed("language is empty"));
        }
        let difficulty = dto
            .difficulty
            .parse()
            .map_err(|e| GatewayError::malformed(format!("{}", e)))?;

        Ok(SettingsRecord {
            language: dto.language,
            difficulty,
            display: dto.display,
        })
    }
}

impl TryFrom<&SettingsPatch> for SaveSettingsRequest {
    type Error = GatewayError;

    fn try_from(patch: &SettingsPatch) -> Result<Self, Self::Error> {
        let language = patch
            .language
            .clone()
            .ok_or_else(|| GatewayError::validation("language", "is required"))?;
        let difficulty = patch
            .difficulty
            .ok_or_else(|| GatewayError::validation("difficulty", "is required"))?;

        Ok(Self {
            language,
            difficulty: difficulty.as_str().to_owned(),
            display: patch.display,
        })
    }
}

/// Map a non-success status and its body to a gateway error
pub fn error_for_status(status: StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_owned());

    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthenticated,
        StatusCode::BAD_REQUEST => GatewayError::validation("body", detail),
        _ => GatewayError::transport(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}
