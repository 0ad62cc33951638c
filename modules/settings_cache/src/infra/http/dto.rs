//! Wire DTOs for the settings endpoint

use serde::{Deserialize, Serialize};

/// Settings as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDto {
    pub language: String,

    /// Free text on the wire; parsed into a difficulty level by the mapper
    pub difficulty: String,

    #[serde(default)]
    pub display: Option<bool>,
}

/// Settings write request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSettingsRequest {
    pub language: String,

    pub difficulty: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
}

/// Error body returned by the backend on 4xx/5xx
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
