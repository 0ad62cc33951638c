//! Remote gateway trait for the durable settings backend
//!
//! This is the only seam between the cache and the network. Implementations
//! carry the authenticated identity out-of-band (session cookie, token).

use super::{
    error::GatewayError,
    model::{SettingsPatch, SettingsRecord},
};
use async_trait::async_trait;

/// Narrow fetch/save contract for the current user's settings
#[async_trait]
pub trait RemoteSettingsGateway: Send + Sync {
    /// Fetch the stored settings for the signed-in user
    async fn fetch(&self) -> Result<SettingsRecord, GatewayError>;

    /// Upsert settings for the signed-in user and return the canonical stored record
    async fn save(&self, patch: &SettingsPatch) -> Result<SettingsRecord, GatewayError>;
}
