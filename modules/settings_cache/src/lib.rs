//! Settings Cache Module
//!
//! Session-scoped client cache for the current user's settings (language,
//! difficulty, display). Reads are served from memory once fresh, writes are
//! applied optimistically and broadcast to every bound consumer, then
//! persisted and reconciled against the backend in the background.

// Public exports
pub mod contract;
pub use contract::{
    Difficulty, GatewayError, RemoteSettingsGateway, SettingsPatch, SettingsRecord,
};

pub mod config;
pub use config::CacheConfig;

pub mod domain;
pub use domain::{
    BindingView, CacheOptions, LoadOutcome, LoadSource, PendingSave, SettingsBroadcaster,
    SettingsCache, SettingsConsumerBinding, SettingsStore, Subscription,
};

pub mod infra;
pub use infra::HttpSettingsGateway;

pub mod module;
pub use module::SettingsCacheModule;
