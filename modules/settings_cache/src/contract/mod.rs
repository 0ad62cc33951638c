//! Contract layer - public types for consumers and gateway implementations
//!
//! This layer contains transport-agnostic models, the error taxonomy and the
//! remote gateway trait.

pub mod error;
pub mod gateway;
pub mod model;

pub use error::GatewayError;
pub use gateway::RemoteSettingsGateway;
pub use model::{Difficulty, SettingsPatch, SettingsRecord, UnknownDifficulty, DEFAULT_LANGUAGE};
