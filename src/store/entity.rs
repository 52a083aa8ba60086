//! Entity tree for the coordinate currently in view.

use tracing::debug;

use crate::game::{Coordinate, Entity};
use crate::store::LoadTicket;

#[derive(Debug, Default)]
pub struct EntityStore {
    coordinate: Coordinate,
    entity: Option<Entity>,
    current: u64,
    error: Option<String>,
}

impl EntityStore {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            ..Default::default()
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Moves the view to `coordinate`, clearing the old tree.
    pub fn focus(&mut self, coordinate: Coordinate) -> LoadTicket<Coordinate> {
        self.coordinate = coordinate;
        self.entity = None;
        self.error = None;
        self.current += 1;
        LoadTicket {
            key: coordinate,
            generation: self.current,
        }
    }

    pub fn commit(&mut self, ticket: &LoadTicket<Coordinate>, entity: Entity) -> bool {
        if !self.is_current(ticket) {
            debug!(at = %ticket.key, "dropping entity tree for a stale view");
            return false;
        }
        self.entity = Some(entity);
        true
    }

    pub fn fail(&mut self, ticket: &LoadTicket<Coordinate>, message: String) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.error = Some(message);
        true
    }

    fn is_current(&self, ticket: &LoadTicket<Coordinate>) -> bool {
        ticket.generation == self.current && ticket.key == self.coordinate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str) -> Entity {
        Entity {
            id: id.to_string(),
            title: id.to_string(),
            category: None,
            components: Vec::new(),
        }
    }

    #[test]
    fn moving_away_discards_late_tree() {
        let mut store = EntityStore::new(Coordinate::new(0, 0));
        let origin = store.focus(Coordinate::new(0, 0));
        let east = store.focus(Coordinate::new(1, 0));

        assert!(!store.commit(&origin, entity("old")));
        assert!(store.entity().is_none());
        assert!(store.commit(&east, entity("east")));
        assert_eq!(store.entity().unwrap().id, "east");
    }

    #[test]
    fn focus_clears_tree_and_error() {
        let mut store = EntityStore::new(Coordinate::default());
        let ticket = store.focus(Coordinate::default());
        store.fail(&ticket, "boom".to_string());
        assert_eq!(store.error(), Some("boom"));

        store.focus(Coordinate::new(0, 1));
        assert!(store.error().is_none());
        assert_eq!(store.coordinate(), Coordinate::new(0, 1));
    }
}
