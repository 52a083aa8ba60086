//! Client-side state containers.
//!
//! All of them live in one [`GameState`] that is handed to the UI loop and
//! the renderer explicitly. Loads are guarded by [`LoadTicket`]s so that a
//! completion commits only while it is still the newest request for its key.

pub mod entity;
pub mod local;
pub mod resources;
pub mod structures;

pub use entity::*;
pub use local::*;
pub use resources::*;
pub use structures::*;

use tracing::debug;

use crate::game::{Coordinate, ResearchForest};

/// Proof that a load was started; carries the generation it must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<K> {
    pub key: K,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct ResearchStore {
    forest: Option<ResearchForest>,
    error: Option<String>,
    current: u64,
}

impl ResearchStore {
    pub fn forest(&self) -> Option<&ResearchForest> {
        self.forest.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn begin_load(&mut self) -> u64 {
        self.current += 1;
        self.error = None;
        self.current
    }

    pub fn commit(&mut self, generation: u64, forest: ResearchForest) -> bool {
        if generation != self.current {
            debug!(generation, "dropping stale research forest");
            return false;
        }
        self.forest = Some(forest);
        true
    }

    pub fn fail(&mut self, generation: u64, message: String) {
        if generation == self.current {
            self.error = Some(message);
        }
    }
}

/// Seconds of time warp requested so far, persisted per user.
#[derive(Debug)]
pub struct TimeWarpLedger {
    key: String,
    total_seconds: u64,
    last_error: Option<String>,
}

impl TimeWarpLedger {
    pub fn load(user_id: &str, storage: &LocalStorage) -> Self {
        let key = time_warp_key(user_id);
        let total_seconds = storage
            .get(&key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);
        Self {
            key,
            total_seconds,
            last_error: None,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn record(&mut self, seconds: u64, storage: &mut LocalStorage) {
        self.total_seconds = self.total_seconds.saturating_add(seconds);
        self.last_error = None;
        storage.set(&self.key, self.total_seconds.to_string());
    }

    pub fn fail(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

/// Everything the client knows, owned by the UI loop.
#[derive(Debug)]
pub struct GameState {
    pub entity: EntityStore,
    pub structures: StructureCache,
    pub resources: ResourceStore,
    pub research: ResearchStore,
    pub time_warp: TimeWarpLedger,
    pub storage: LocalStorage,
}

impl GameState {
    /// Builds the state and re-hydrates the last resource snapshot.
    pub fn new(start: Coordinate, user_id: &str, storage: LocalStorage) -> Self {
        let mut resources = ResourceStore::default();
        resources.hydrate(&storage);
        let time_warp = TimeWarpLedger::load(user_id, &storage);
        Self {
            entity: EntityStore::new(start),
            structures: StructureCache::new(),
            resources,
            research: ResearchStore::default(),
            time_warp,
            storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_warp_total_accumulates_per_user() {
        let mut storage = LocalStorage::in_memory();
        storage.set("time-warp-u1", "600".to_string());

        let mut ledger = TimeWarpLedger::load("u1", &storage);
        ledger.record(3600, &mut storage);
        assert_eq!(ledger.total_seconds(), 4200);
        assert_eq!(storage.get("time-warp-u1"), Some("4200"));

        assert_eq!(TimeWarpLedger::load("u2", &storage).total_seconds(), 0);
    }

    #[test]
    fn research_commit_respects_generation() {
        let mut research = ResearchStore::default();
        let old = research.begin_load();
        let new = research.begin_load();
        assert!(!research.commit(old, ResearchForest::default()));
        assert!(research.commit(new, ResearchForest::default()));
        assert!(research.forest().is_some());
    }
}
