//! Process-wide resource snapshot.

use tracing::debug;

use crate::game::ResourcesData;
use crate::store::local::{LocalStorage, RESOURCES_KEY};

#[derive(Debug, Default)]
pub struct ResourceStore {
    snapshot: Option<ResourcesData>,
    current: u64,
    refreshing: bool,
}

impl ResourceStore {
    pub fn snapshot(&self) -> Option<&ResourcesData> {
        self.snapshot.as_ref()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Seeds the snapshot from the last persisted response, if any.
    pub fn hydrate(&mut self, storage: &LocalStorage) -> bool {
        match storage.get_json::<ResourcesData>(RESOURCES_KEY) {
            Some(cached) => {
                debug!("resources hydrated from local storage");
                self.snapshot = Some(cached);
                true
            }
            None => false,
        }
    }

    pub fn begin_refresh(&mut self) -> u64 {
        self.current += 1;
        self.refreshing = true;
        self.current
    }

    /// Replaces the snapshot and persists it, unless a newer refresh started.
    pub fn commit(&mut self, generation: u64, data: ResourcesData, storage: &mut LocalStorage) -> bool {
        if generation != self.current {
            debug!(generation, current = self.current, "dropping stale resources");
            return false;
        }
        storage.set_json(RESOURCES_KEY, &data);
        self.snapshot = Some(data);
        self.refreshing = false;
        true
    }

    pub fn fail(&mut self, generation: u64) {
        if generation == self.current {
            self.refreshing = false;
        }
    }
}
