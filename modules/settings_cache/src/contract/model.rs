//! Contract models for the settings cache
//!
//! These models are transport-agnostic and shared by the cache, its consumers
//! and gateway implementations.
//! NO serde derives - wire shapes live in `infra::http::dto`.

use std::fmt;
use std::str::FromStr;

/// Language used when nothing has been fetched or saved yet
pub const DEFAULT_LANGUAGE: &str = "Japanese";

/// Learner difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Canonical (capitalised) name as stored by the backend
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a difficulty level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}'")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(UnknownDifficulty(s.to_owned())),
        }
    }
}

/// The current user's settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRecord {
    /// Target language, free text validated by the backend
    pub language: String,
    /// Difficulty level
    pub difficulty: Difficulty,
    /// Display preference; `None` means no explicit preference was recorded
    pub display: Option<bool>,
}

impl SettingsRecord {
    pub fn new(language: impl Into<String>, difficulty: Difficulty, display: Option<bool>) -> Self {
        Self {
            language: language.into(),
            difficulty,
            display,
        }
    }

    /// Apply a patch on top of this record. Absent patch fields keep their current value.
    pub fn merge(&self, patch: &SettingsPatch) -> SettingsRecord {
        SettingsRecord {
            language: patch
                .language
                .clone()
                .unwrap_or_else(|| self.language.clone()),
            difficulty: patch.difficulty.unwrap_or(self.difficulty),
            display: patch.display.or(self.display),
        }
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            difficulty: Difficulty::Beginner,
            display: None,
        }
    }
}

/// Partial update for a [`SettingsRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    pub language: Option<String>,
    pub difficulty: Option<Difficulty>,
    /// `None` leaves the stored preference untouched
    pub display: Option<bool>,
}

impl SettingsPatch {
    /// Patch that rewrites every populated field of `record`
    pub fn from_record(record: &SettingsRecord) -> Self {
        Self {
            language: Some(record.language.clone()),
            difficulty: Some(record.difficulty),
            display: record.display,
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn display(mut self, display: bool) -> Self {
        self.display = Some(display);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.difficulty.is_none() && self.display.is_none()
    }
}
