//! Domain layer - store, cache orchestration, broadcast and consumer bindings

pub mod binding;
pub mod broadcaster;
pub mod cache;
pub mod store;
pub mod validation;

pub use binding::{BindingView, SettingsConsumerBinding};
pub use broadcaster::{SettingsBroadcaster, Subscription};
pub use cache::{CacheOptions, LoadOutcome, LoadSource, PendingSave, SettingsCache};
pub use store::SettingsStore;
