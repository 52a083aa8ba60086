//! Structures snapshots keyed by (entity, x, y).
//!
//! Each key holds at most one snapshot. A load is started with
//! [`StructureCache::begin_load`], which issues a ticket carrying a fresh
//! generation; only the ticket with the newest generation for its key may
//! commit. Slow responses that were superseded are dropped instead of
//! overwriting newer data.

use std::collections::HashMap;

use tracing::debug;

use crate::game::{Coordinate, StructureIndex, StructureKey, StructuresData, aggregate};
use crate::store::LoadTicket;

#[derive(Debug, Default)]
struct Slot {
    snapshot: Option<StructuresData>,
    index: StructureIndex,
    current: u64,
    in_flight: bool,
}

#[derive(Debug, Default)]
pub struct StructureCache {
    slots: HashMap<StructureKey, Slot>,
    next_generation: u64,
}

impl StructureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &StructureKey) -> Option<&StructuresData> {
        self.slots.get(key)?.snapshot.as_ref()
    }

    /// Slot usage and buckets derived from the snapshot at `key`.
    pub fn index(&self, key: &StructureKey) -> Option<&StructureIndex> {
        let slot = self.slots.get(key)?;
        slot.snapshot.as_ref().map(|_| &slot.index)
    }

    /// True once `key` was ever requested, whether or not a snapshot arrived.
    pub fn is_known(&self, key: &StructureKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn is_loading(&self, key: &StructureKey) -> bool {
        self.slots.get(key).is_some_and(|slot| slot.in_flight)
    }

    pub fn begin_load(&mut self, key: StructureKey) -> LoadTicket<StructureKey> {
        self.next_generation += 1;
        let generation = self.next_generation;
        let slot = self.slots.entry(key.clone()).or_default();
        slot.current = generation;
        slot.in_flight = true;
        LoadTicket { key, generation }
    }

    /// Stores `data` if `ticket` is still the newest load for its key.
    pub fn commit(&mut self, ticket: &LoadTicket<StructureKey>, data: StructuresData) -> bool {
        let Some(slot) = self.current_slot(ticket) else {
            debug!(key = %ticket.key, generation = ticket.generation, "dropping stale structures");
            return false;
        };
        slot.index = aggregate(&data.built_structures);
        slot.snapshot = Some(data);
        slot.in_flight = false;
        true
    }

    /// Marks a failed load finished. Any earlier snapshot stays in place.
    pub fn fail(&mut self, ticket: &LoadTicket<StructureKey>) -> bool {
        match self.current_slot(ticket) {
            Some(slot) => {
                slot.in_flight = false;
                true
            }
            None => false,
        }
    }

    /// Forgets `key` entirely; in-flight loads for it will no longer commit.
    pub fn invalidate(&mut self, key: &StructureKey) {
        self.slots.remove(key);
    }

    /// Every key of `entity_id` that currently holds a snapshot.
    pub fn keys_for_entity(&self, entity_id: &str) -> Vec<StructureKey> {
        let mut keys: Vec<StructureKey> = self
            .slots
            .iter()
            .filter(|(key, slot)| key.entity_id == entity_id && slot.snapshot.is_some())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Every known key at a map coordinate.
    pub fn keys_at(&self, coordinate: Coordinate) -> Vec<StructureKey> {
        let mut keys: Vec<StructureKey> = self
            .slots
            .keys()
            .filter(|key| key.coordinate == coordinate)
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn current_slot(&mut self, ticket: &LoadTicket<StructureKey>) -> Option<&mut Slot> {
        self.slots
            .get_mut(&ticket.key)
            .filter(|slot| slot.current == ticket.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BuiltStructure, StructureTemplate};

    fn key(entity: &str, x: i64, y: i64) -> StructureKey {
        StructureKey::new(entity, Coordinate::new(x, y))
    }

    fn snapshot(ids: &[&str]) -> StructuresData {
        StructuresData {
            built_structures: ids
                .iter()
                .map(|id| BuiltStructure {
                    structure_id: id.to_string(),
                    level: 1,
                    template: StructureTemplate {
                        structure_type: "mine".to_string(),
                        title: "Mine".to_string(),
                        description: String::new(),
                        production_components: Vec::new(),
                        requirement_components: Vec::new(),
                    },
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn commit_replaces_snapshot_wholesale() {
        let mut cache = StructureCache::new();
        let first = cache.begin_load(key("e1", 0, 0));
        assert!(cache.is_loading(&key("e1", 0, 0)));
        assert!(cache.commit(&first, snapshot(&["a", "b"])));

        let second = cache.begin_load(key("e1", 0, 0));
        assert!(cache.commit(&second, snapshot(&["c"])));

        let stored = cache.get(&key("e1", 0, 0)).unwrap();
        assert_eq!(stored.built_structures.len(), 1);
        assert_eq!(cache.index(&key("e1", 0, 0)).unwrap().in_bucket("mine").len(), 1);
        assert!(!cache.is_loading(&key("e1", 0, 0)));
    }

    #[test]
    fn stale_completion_cannot_overwrite_newer_load() {
        let mut cache = StructureCache::new();
        let slow = cache.begin_load(key("e1", 0, 0));
        let fast = cache.begin_load(key("e1", 0, 0));

        assert!(cache.commit(&fast, snapshot(&["new"])));
        assert!(!cache.commit(&slow, snapshot(&["old"])));
        assert_eq!(
            cache.get(&key("e1", 0, 0)).unwrap().built_structures[0].structure_id,
            "new"
        );
    }

    #[test]
    fn failed_load_keeps_previous_snapshot() {
        let mut cache = StructureCache::new();
        let ticket = cache.begin_load(key("e1", 1, 1));
        cache.commit(&ticket, snapshot(&["kept"]));

        let retry = cache.begin_load(key("e1", 1, 1));
        assert!(cache.fail(&retry));
        assert!(cache.get(&key("e1", 1, 1)).is_some());
        assert!(!cache.is_loading(&key("e1", 1, 1)));
    }

    #[test]
    fn failed_load_is_known_but_empty() {
        let mut cache = StructureCache::new();
        let ticket = cache.begin_load(key("rock", 0, 0));
        cache.fail(&ticket);
        assert!(cache.is_known(&key("rock", 0, 0)));
        assert!(cache.get(&key("rock", 0, 0)).is_none());
        assert!(cache.index(&key("rock", 0, 0)).is_none());
    }

    #[test]
    fn invalidate_discards_entry_and_in_flight_load() {
        let mut cache = StructureCache::new();
        let ticket = cache.begin_load(key("e1", 0, 0));
        cache.invalidate(&key("e1", 0, 0));
        assert!(!cache.commit(&ticket, snapshot(&["late"])));
        assert!(!cache.is_known(&key("e1", 0, 0)));
    }

    #[test]
    fn entity_keys_span_all_coordinates_with_snapshots() {
        let mut cache = StructureCache::new();
        for (entity, x, y) in [("e1", 0, 0), ("e1", 3, -2), ("e2", 0, 0)] {
            let ticket = cache.begin_load(key(entity, x, y));
            cache.commit(&ticket, snapshot(&[]));
        }
        cache.begin_load(key("e1", 9, 9));

        assert_eq!(cache.keys_for_entity("e1"), vec![key("e1", 0, 0), key("e1", 3, -2)]);
        assert_eq!(cache.keys_at(Coordinate::new(0, 0)), vec![key("e1", 0, 0), key("e2", 0, 0)]);
    }
}
