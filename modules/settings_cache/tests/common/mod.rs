//! Common test utilities: an in-memory gateway with scripted behaviour

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use settings_cache::{
    Difficulty, GatewayError, RemoteSettingsGateway, SettingsCache, SettingsPatch,
    SettingsRecord,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

type Normalizer = Box<dyn Fn(SettingsRecord) -> SettingsRecord + Send + Sync>;

#[derive(Default)]
struct FakeState {
    stored: Option<SettingsRecord>,
    fetch_error: Option<GatewayError>,
    save_error: Option<GatewayError>,
    normalizer: Option<Normalizer>,
    saved_payloads: Vec<SettingsPatch>,
    next_fetch_gate: Option<Arc<Notify>>,
    next_save_gate: Option<Arc<Notify>>,
}

/// Backend stand-in keyed to a single signed-in user
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<FakeState>,
    fetch_calls: AtomicUsize,
    save_calls: AtomicUsize,
}

impl FakeGateway {
    /// Backend holding `record` for the signed-in user
    pub fn signed_in(record: SettingsRecord) -> Arc<Self> {
        let gateway = Self::default();
        gateway.state.lock().stored = Some(record);
        Arc::new(gateway)
    }

    /// Backend with no session: every call fails with `Unauthenticated`
    pub fn signed_out() -> Arc<Self> {
        let gateway = Self::default();
        {
            let mut state = gateway.state.lock();
            state.fetch_error = Some(GatewayError::Unauthenticated);
            state.save_error = Some(GatewayError::Unauthenticated);
        }
        Arc::new(gateway)
    }

    pub fn fail_fetch(&self, error: Option<GatewayError>) {
        self.state.lock().fetch_error = error;
    }

    pub fn fail_save(&self, error: Option<GatewayError>) {
        self.state.lock().save_error = error;
    }

    /// Rewrite every saved record before storing it
    pub fn normalize_with<F>(&self, f: F)
    where
        F: Fn(SettingsRecord) -> SettingsRecord + Send + Sync + 'static,
    {
        self.state.lock().normalizer = Some(Box::new(f));
    }

    /// Make the next fetch wait until the returned notify fires.
    /// The fetch captures the stored record before waiting.
    pub fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().next_fetch_gate = Some(gate.clone());
        gate
    }

    /// Make the next save wait until the returned notify fires
    pub fn hold_next_save(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().next_save_gate = Some(gate.clone());
        gate
    }

    pub fn stored(&self) -> Option<SettingsRecord> {
        self.state.lock().stored.clone()
    }

    pub fn saved_payloads(&self) -> Vec<SettingsPatch> {
        self.state.lock().saved_payloads.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteSettingsGateway for FakeGateway {
    async fn fetch(&self) -> Result<SettingsRecord, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let (result, gate) = {
            let mut state = self.state.lock();
            let result = match (&state.fetch_error, &state.stored) {
                (Some(error), _) => Err(error.clone()),
                (None, Some(record)) => Ok(record.clone()),
                (None, None) => Err(GatewayError::Unauthenticated),
            };
            (result, state.next_fetch_gate.take())
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn save(&self, patch: &SettingsPatch) -> Result<SettingsRecord, GatewayError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let gate = {
            let mut state = self.state.lock();
            state.saved_payloads.push(patch.clone());
            state.next_save_gate.take()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock();
        if let Some(error) = &state.save_error {
            return Err(error.clone());
        }
        let merged = state.stored.clone().unwrap_or_default().merge(patch);
        let canonical = match &state.normalizer {
            Some(normalize) => normalize(merged),
            None => merged,
        };
        state.stored = Some(canonical.clone());
        Ok(canonical)
    }
}

pub fn spanish_advanced() -> SettingsRecord {
    SettingsRecord::new("Spanish", Difficulty::Advanced, Some(true))
}

pub fn cache_over(gateway: &Arc<FakeGateway>) -> SettingsCache {
    let gateway: Arc<dyn RemoteSettingsGateway> = gateway.clone();
    SettingsCache::with_gateway(gateway)
}

/// Yield until `condition` holds, failing the test after a bounded number of turns
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
