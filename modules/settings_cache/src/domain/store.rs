//! In-memory holder of the last-known settings record
//!
//! The store keeps zero or one record plus a freshness flag. It never talks to
//! the network; `SettingsCache` decides when its contents can be trusted.

use crate::contract::SettingsRecord;
use parking_lot::RwLock;

/// Monotonic write ticket
pub type Ticket = u64;

#[derive(Debug, Default)]
struct StoreState {
    record: Option<SettingsRecord>,
    fresh: bool,
    /// Last ticket handed out
    issued: Ticket,
    /// Ticket of the write currently reflected in `record`
    applied: Ticket,
}

/// Process-scoped settings snapshot
#[derive(Debug, Default)]
pub struct SettingsStore {
    state: RwLock<StoreState>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, `None` when nothing has been loaded or saved yet
    pub fn get(&self) -> Option<SettingsRecord> {
        self.state.read().record.clone()
    }

    /// Replace the snapshot. Freshness is left untouched.
    pub fn set(&self, record: SettingsRecord) {
        let mut state = self.state.write();
        state.issued += 1;
        state.applied = state.issued;
        state.record = Some(record);
    }

    /// Atomically derive the next snapshot from the current one and store it.
    ///
    /// Freshness is left untouched. Returns the stored record.
    pub fn update<F>(&self, f: F) -> SettingsRecord
    where
        F: FnOnce(Option<&SettingsRecord>) -> SettingsRecord,
    {
        let mut state = self.state.write();
        let next = f(state.record.as_ref());
        state.issued += 1;
        state.applied = state.issued;
        state.record = Some(next.clone());
        next
    }

    /// Reset to the unset state and drop freshness
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.issued += 1;
        state.applied = state.issued;
        state.record = None;
        state.fresh = false;
    }

    pub fn is_fresh(&self) -> bool {
        self.state.read().fresh
    }

    pub fn mark_fresh(&self) {
        self.state.write().fresh = true;
    }

    /// Reserve a ticket for a remote fetch that is about to start
    pub fn begin_fetch(&self) -> Ticket {
        let mut state = self.state.write();
        state.issued += 1;
        state.issued
    }

    /// Apply a fetched record unless a write issued after `ticket` has already landed.
    ///
    /// On success the store is marked fresh. Returns whether the record was applied.
    pub fn commit_fetch(&self, record: SettingsRecord, ticket: Ticket) -> bool {
        let mut state = self.state.write();
        if ticket <= state.applied {
            return false;
        }
        state.applied = ticket;
        state.record = Some(record);
        state.fresh = true;
        true
    }

    /// Apply a fetched record regardless of ordering and mark the store fresh
    pub fn force_commit(&self, record: SettingsRecord) {
        let mut state = self.state.write();
        state.issued += 1;
        state.applied = state.issued;
        state.record = Some(record);
        state.fresh = true;
    }

    /// Store `record` only if the store is still unset. Returns the resulting snapshot.
    pub fn get_or_set(&self, record: SettingsRecord) -> SettingsRecord {
        let mut state = self.state.write();
        if let Some(existing) = &state.record {
            return existing.clone();
        }
        state.issued += 1;
        state.applied = state.issued;
        state.record = Some(record.clone());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Difficulty;

    fn spanish() -> SettingsRecord {
        SettingsRecord::new("Spanish", Difficulty::Advanced, Some(true))
    }

    #[test]
    fn test_set_does_not_mark_fresh() {
        let store = SettingsStore::new();
        assert!(store.get().is_none());

        store.set(spanish());
        assert_eq!(store.get(), Some(spanish()));
        assert!(!store.is_fresh());

        store.mark_fresh();
        assert!(store.is_fresh());
    }

    #[test]
    fn test_clear_resets_record_and_freshness() {
        let store = SettingsStore::new();
        store.set(spanish());
        store.mark_fresh();

        store.clear();
        assert!(store.get().is_none());
        assert!(!store.is_fresh());
    }

    #[test]
    fn test_commit_fetch_marks_fresh() {
        let store = SettingsStore::new();
        let ticket = store.begin_fetch();
        assert!(store.commit_fetch(spanish(), ticket));
        assert!(store.is_fresh());
        assert_eq!(store.get(), Some(spanish()));
    }

    #[test]
    fn test_fetch_older_than_local_write_is_discarded() {
        let store = SettingsStore::new();
        let ticket = store.begin_fetch();

        let optimistic = SettingsRecord::new("English", Difficulty::Beginner, None);
        store.set(optimistic.clone());

        assert!(!store.commit_fetch(spanish(), ticket));
        assert_eq!(store.get(), Some(optimistic));
        assert!(!store.is_fresh());
    }

    #[test]
    fn test_older_fetch_settling_last_is_discarded() {
        let store = SettingsStore::new();
        let first = store.begin_fetch();
        let second = store.begin_fetch();

        let newer = SettingsRecord::new("Italian", Difficulty::Intermediate, None);
        assert!(store.commit_fetch(newer.clone(), second));
        assert!(!store.commit_fetch(spanish(), first));
        assert_eq!(store.get(), Some(newer));
    }

    #[test]
    fn test_fetch_started_before_clear_is_discarded() {
        let store = SettingsStore::new();
        let ticket = store.begin_fetch();
        store.clear();
        assert!(!store.commit_fetch(spanish(), ticket));
        assert!(store.get().is_none());
    }

    #[test]
    fn test_update_sees_current_snapshot() {
        let store = SettingsStore::new();
        let first = store.update(|current| {
            assert!(current.is_none());
            spanish()
        });
        assert_eq!(first, spanish());

        let second = store.update(|current| {
            let mut next = current.cloned().unwrap_or_default();
            next.difficulty = Difficulty::Beginner;
            next
        });
        assert_eq!(second.language, "Spanish");
        assert_eq!(store.get(), Some(second));
    }

    #[test]
    fn test_get_or_set_keeps_existing_value() {
        let store = SettingsStore::new();
        assert_eq!(store.get_or_set(SettingsRecord::default()), SettingsRecord::default());

        store.set(spanish());
        assert_eq!(store.get_or_set(SettingsRecord::default()), spanish());
    }
}
