//! Per-consumer adapter over the settings cache
//!
//! A binding is what a UI unit holds. It exposes a snapshot with explicit
//! loading and failure flags, keeps itself current through the broadcaster,
//! and unsubscribes when dropped.

use super::broadcaster::Subscription;
use super::cache::{LoadOutcome, SettingsCache};
use crate::contract::{Difficulty, GatewayError, SettingsPatch, SettingsRecord};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// What a consumer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingView {
    pub language: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub display: Option<bool>,
    /// No load has resolved and no broadcast has arrived yet
    pub is_loading: bool,
    /// The last save was not confirmed by the backend
    pub save_failed: bool,
    /// The shown values are a fallback because the backend could not be read
    pub unconfirmed: Option<GatewayError>,
}

impl BindingView {
    /// Fully populated record, `None` while loading
    pub fn record(&self) -> Option<SettingsRecord> {
        Some(SettingsRecord {
            language: self.language.clone()?,
            difficulty: self.difficulty?,
            display: self.display,
        })
    }
}

#[derive(Debug)]
struct BindingState {
    record: Option<SettingsRecord>,
    is_loading: bool,
    save_failed: bool,
    unconfirmed: Option<GatewayError>,
    /// Bumped by every `update`; only the latest one may touch `save_failed`
    generation: u64,
}

impl BindingState {
    fn view(&self) -> BindingView {
        BindingView {
            language: self.record.as_ref().map(|r| r.language.clone()),
            difficulty: self.record.as_ref().map(|r| r.difficulty),
            display: self.record.as_ref().and_then(|r| r.display),
            is_loading: self.is_loading,
            save_failed: self.save_failed,
            unconfirmed: self.unconfirmed.clone(),
        }
    }

    fn observe(&mut self, record: SettingsRecord) {
        self.record = Some(record);
        self.is_loading = false;
    }
}

/// Read/write surface for a single settings consumer
pub struct SettingsConsumerBinding {
    cache: SettingsCache,
    state: Arc<RwLock<BindingState>>,
    subscription: Subscription,
}

impl SettingsConsumerBinding {
    /// Subscribe to changes. The binding reports `is_loading` until [`Self::initialize`] resolves.
    pub fn new(cache: SettingsCache) -> Self {
        let state = Arc::new(RwLock::new(BindingState {
            record: None,
            is_loading: true,
            save_failed: false,
            unconfirmed: None,
            generation: 0,
        }));

        let sink = state.clone();
        let subscription = cache
            .broadcaster()
            .subscribe(move |record| sink.write().observe(record.clone()));

        Self {
            cache,
            state,
            subscription,
        }
    }

    /// Create a binding and wait for its initial load
    pub async fn attach(cache: SettingsCache) -> Self {
        let binding = Self::new(cache);
        binding.initialize().await;
        binding
    }

    /// Load settings (from the fresh cache when possible) and snapshot them
    pub async fn initialize(&self) -> BindingView {
        let outcome = self.cache.load_outcome(false).await;
        self.apply_load(outcome)
    }

    /// Re-read settings from the backend, bypassing freshness
    pub async fn refresh(&self) -> BindingView {
        let outcome = self.cache.load_outcome(true).await;
        self.apply_load(outcome)
    }

    pub fn view(&self) -> BindingView {
        self.state.read().view()
    }

    /// Save new settings.
    ///
    /// The binding reflects the new values before this returns. The returned
    /// handle resolves to `true` once the backend confirmed the write; on
    /// failure `save_failed` is raised until the next successful save or
    /// [`Self::dismiss_save_failure`]. A save that settles after a newer
    /// `update` was issued does not change the flag.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn update(
        &self,
        language: impl Into<String>,
        difficulty: Difficulty,
        display: Option<bool>,
    ) -> JoinHandle<bool> {
        let patch = SettingsPatch {
            language: Some(language.into()),
            difficulty: Some(difficulty),
            display,
        };

        let pending = self.cache.save(patch);
        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            match pending.optimistic() {
                Some(optimistic) => state.observe(optimistic.clone()),
                None => state.save_failed = true,
            }
            state.generation
        };

        let state = self.state.clone();
        tokio::spawn(async move {
            let confirmed = pending.await.is_some();
            let mut state = state.write();
            if confirmed {
                // The backend answered, so the shown values are no longer a fallback.
                state.unconfirmed = None;
            }
            if state.generation == generation {
                state.save_failed = !confirmed;
            }
            confirmed
        })
    }

    /// Clear the save failure flag once it has been shown
    pub fn dismiss_save_failure(&self) {
        self.state.write().save_failed = false;
    }

    /// Stop receiving broadcasts. Also happens on drop.
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }

    fn apply_load(&self, outcome: LoadOutcome) -> BindingView {
        let mut state = self.state.write();
        state.unconfirmed = outcome.error().cloned();
        state.observe(outcome.record);
        state.view()
    }
}

impl std::fmt::Debug for SettingsConsumerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsConsumerBinding")
            .field("view", &self.view())
            .field("subscription", &self.subscription)
            .finish()
    }
}
