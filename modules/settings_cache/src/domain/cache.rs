//! Settings cache - read-through / write-through orchestration
//!
//! The cache is the only component that decides whether the store can be
//! trusted or the remote gateway must be asked. Gateway failures never escape:
//! `load` degrades to a usable record and `save` resolves to `None`.

use super::broadcaster::SettingsBroadcaster;
use super::store::SettingsStore;
use super::validation::validate_patch;
use crate::contract::{GatewayError, RemoteSettingsGateway, SettingsPatch, SettingsRecord};
use futures::future::{BoxFuture, FutureExt};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Tunables for a [`SettingsCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// Record used when the backend cannot be reached and nothing is cached
    pub fallback: SettingsRecord,
    /// Drop fetch results issued before a newer local write
    pub discard_stale_responses: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            fallback: SettingsRecord::default(),
            discard_stale_responses: true,
        }
    }
}

/// Where the record returned by a load came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Served from a fresh store without a network call
    Cache,
    /// Fetched from the backend and stored
    Remote,
    /// Fetched, but a newer local write landed first; the current snapshot was returned
    Superseded,
    /// The backend failed; a cached or default record was returned
    Fallback(GatewayError),
}

/// Result of [`SettingsCache::load_outcome`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub record: SettingsRecord,
    pub source: LoadSource,
}

impl LoadOutcome {
    /// Gateway failure behind a fallback record, if any
    pub fn error(&self) -> Option<&GatewayError> {
        match &self.source {
            LoadSource::Fallback(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, LoadSource::Fallback(_))
    }
}

/// Session-scoped cache for the current user's settings
#[derive(Clone)]
pub struct SettingsCache {
    store: Arc<SettingsStore>,
    broadcaster: Arc<SettingsBroadcaster>,
    gateway: Arc<dyn RemoteSettingsGateway>,
    options: Arc<CacheOptions>,
}

impl SettingsCache {
    /// Create a cache over explicitly provided shared state
    pub fn new(
        store: Arc<SettingsStore>,
        broadcaster: Arc<SettingsBroadcaster>,
        gateway: Arc<dyn RemoteSettingsGateway>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            gateway,
            options: Arc::new(CacheOptions::default()),
        }
    }

    /// Create a cache with its own empty store and broadcaster
    pub fn with_gateway(gateway: Arc<dyn RemoteSettingsGateway>) -> Self {
        Self::new(
            Arc::new(SettingsStore::new()),
            Arc::new(SettingsBroadcaster::new()),
            gateway,
        )
    }

    pub fn with_options(mut self, options: CacheOptions) -> Self {
        self.options = Arc::new(options);
        self
    }

    pub fn store(&self) -> &Arc<SettingsStore> {
        &self.store
    }

    pub fn broadcaster(&self) -> &Arc<SettingsBroadcaster> {
        &self.broadcaster
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Current snapshot without touching the network
    pub fn snapshot(&self) -> Option<SettingsRecord> {
        self.store.get()
    }

    pub fn is_fresh(&self) -> bool {
        self.store.is_fresh()
    }

    /// Load settings, going to the backend unless the store is fresh.
    ///
    /// Never fails; see [`Self::load_outcome`] for the failure details.
    pub async fn load(&self, force_refresh: bool) -> SettingsRecord {
        self.load_outcome(force_refresh).await.record
    }

    /// Load settings and report where the record came from
    pub async fn load_outcome(&self, force_refresh: bool) -> LoadOutcome {
        if !force_refresh && self.store.is_fresh() {
            if let Some(record) = self.store.get() {
                tracing::debug!("settings served from fresh cache");
                return LoadOutcome {
                    record,
                    source: LoadSource::Cache,
                };
            }
        }

        let ticket = self.store.begin_fetch();
        tracing::debug!(force_refresh, ticket, "fetching settings from backend");

        match self.gateway.fetch().await {
            Ok(record) => {
                if !self.options.discard_stale_responses {
                    self.store.force_commit(record.clone());
                    return LoadOutcome {
                        record,
                        source: LoadSource::Remote,
                    };
                }

                if self.store.commit_fetch(record.clone(), ticket) {
                    return LoadOutcome {
                        record,
                        source: LoadSource::Remote,
                    };
                }

                tracing::debug!(ticket, "discarding settings fetched before a newer local write");
                LoadOutcome {
                    record: self.store.get().unwrap_or(record),
                    source: LoadSource::Superseded,
                }
            }
            Err(error) => {
                let record = self.store.get_or_set(self.options.fallback.clone());
                if error.is_auth_failure() {
                    tracing::warn!(
                        language = %record.language,
                        "no authenticated session; using fallback settings"
                    );
                } else {
                    tracing::warn!(
                        error = %error,
                        language = %record.language,
                        "settings fetch failed; using fallback settings"
                    );
                }
                LoadOutcome {
                    record,
                    source: LoadSource::Fallback(error),
                }
            }
        }
    }

    /// Apply `patch` optimistically, broadcast it, then persist it in the background.
    ///
    /// When this returns, the store already holds the merged record and every
    /// subscriber has seen it. Awaiting the returned [`PendingSave`] yields the
    /// reconciled record, or `None` if the patch was invalid or the backend
    /// rejected the write. Failed writes are not rolled back.
    ///
    /// # Panics
    ///
    /// Panics when a valid patch is saved outside a Tokio runtime, since the
    /// remote write is spawned onto the current runtime.
    pub fn save(&self, patch: SettingsPatch) -> PendingSave {
        if let Err(error) = validate_patch(&patch) {
            tracing::warn!(error = %error, "rejecting invalid settings patch");
            return PendingSave {
                optimistic: None,
                handle: None,
            };
        }

        let fallback = &self.options.fallback;
        let optimistic = self
            .store
            .update(|current| current.unwrap_or(fallback).merge(&patch));
        self.broadcaster.publish(&optimistic);

        let cache = self.clone();
        let record = optimistic.clone();
        let handle = tokio::spawn(async move { cache.persist(record).await });

        PendingSave {
            optimistic: Some(optimistic),
            handle: Some(handle),
        }
    }

    /// Forget the current user's settings (sign-out)
    pub fn sign_out(&self) {
        self.store.clear();
        tracing::info!("settings cache cleared");
    }

    async fn persist(&self, optimistic: SettingsRecord) -> Option<SettingsRecord> {
        // The write contract requires language and difficulty on every request.
        let payload = SettingsPatch::from_record(&optimistic);

        let saved = match self.gateway.save(&payload).await {
            Ok(saved) => saved,
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    language = %optimistic.language,
                    "settings save failed; keeping optimistic value"
                );
                return None;
            }
        };

        let reconciled = self.load_outcome(true).await;
        match reconciled.source {
            LoadSource::Remote => {
                if reconciled.record != optimistic {
                    tracing::info!(
                        language = %reconciled.record.language,
                        difficulty = %reconciled.record.difficulty,
                        "backend normalised saved settings; republishing"
                    );
                    self.broadcaster.publish(&reconciled.record);
                } else {
                    tracing::debug!("saved settings confirmed by backend");
                }
                Some(reconciled.record)
            }
            LoadSource::Superseded | LoadSource::Cache => Some(reconciled.record),
            LoadSource::Fallback(error) => {
                tracing::warn!(
                    error = %error,
                    "settings saved but reconciliation fetch failed"
                );
                Some(saved)
            }
        }
    }
}

/// Outcome of a [`SettingsCache::save`] that may still be in flight.
///
/// Await it for the reconciled record. Dropping it does not cancel the write.
#[must_use = "await the PendingSave to learn whether the write was confirmed"]
pub struct PendingSave {
    optimistic: Option<SettingsRecord>,
    handle: Option<JoinHandle<Option<SettingsRecord>>>,
}

impl PendingSave {
    /// Record applied locally, `None` when the patch was rejected before any write
    pub fn optimistic(&self) -> Option<&SettingsRecord> {
        self.optimistic.as_ref()
    }

    pub fn is_rejected(&self) -> bool {
        self.handle.is_none()
    }
}

impl IntoFuture for PendingSave {
    type Output = Option<SettingsRecord>;
    type IntoFuture = BoxFuture<'static, Option<SettingsRecord>>;

    fn into_future(self) -> Self::IntoFuture {
        async move {
            let handle = self.handle?;
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "settings save task did not complete");
                    None
                }
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for PendingSave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSave")
            .field("optimistic", &self.optimistic)
            .field("rejected", &self.is_rejected())
            .finish()
    }
}
