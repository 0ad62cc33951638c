//! Module wiring - builds the process-wide cache from configuration

use crate::config::CacheConfig;
use crate::contract::RemoteSettingsGateway;
use crate::domain::{SettingsBroadcaster, SettingsCache, SettingsConsumerBinding, SettingsStore};
use crate::infra::HttpSettingsGateway;
use anyhow::Result;
use std::sync::Arc;

/// Owns the single store/broadcaster pair for a process and hands out bindings
#[derive(Clone)]
pub struct SettingsCacheModule {
    cache: SettingsCache,
}

impl SettingsCacheModule {
    /// Build the module against the HTTP gateway described by `config`
    pub fn init(config: &CacheConfig) -> Result<Self> {
        let gateway = Arc::new(HttpSettingsGateway::from_config(&config.gateway)?);
        tracing::info!(endpoint = %gateway.endpoint(), "settings cache initialized");
        Self::with_gateway(config, gateway)
    }

    /// Build the module against any gateway implementation
    pub fn with_gateway(
        config: &CacheConfig,
        gateway: Arc<dyn RemoteSettingsGateway>,
    ) -> Result<Self> {
        let cache = SettingsCache::new(
            Arc::new(SettingsStore::new()),
            Arc::new(SettingsBroadcaster::new()),
            gateway,
        )
        .with_options(config.cache_options()?);
        Ok(Self { cache })
    }

    pub fn cache(&self) -> &SettingsCache {
        &self.cache
    }

    /// New consumer binding sharing this module's cache
    pub fn bind(&self) -> SettingsConsumerBinding {
        SettingsConsumerBinding::new(self.cache.clone())
    }

    pub fn sign_out(&self) {
        self.cache.sign_out();
    }
}
