//! Build surface state: build, upgrade and destroy against one target.

use std::fmt;

use tracing::info;

use crate::api::ApiError;
use crate::app::Effect;
use crate::game::{StructureKey, StructuresData};
use crate::store::GameState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildAction {
    Build(String),
    Upgrade(String),
    Destroy(String),
}

impl BuildAction {
    pub fn verb(&self) -> &'static str {
        match self {
            BuildAction::Build(_) => "Build",
            BuildAction::Upgrade(_) => "Upgrade",
            BuildAction::Destroy(_) => "Destroy",
        }
    }

    /// Structure type for a build, structure id otherwise.
    pub fn subject(&self) -> &str {
        match self {
            BuildAction::Build(subject)
            | BuildAction::Upgrade(subject)
            | BuildAction::Destroy(subject) => subject,
        }
    }
}

impl fmt::Display for BuildAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.subject())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    Idle,
    Loading(BuildAction),
    Success(BuildAction),
    Error(String),
}

/// One open build surface. Every action carries a sequence number handed out
/// by the caller and unique across surfaces; only the latest action started
/// on this surface may update its status.
#[derive(Debug)]
pub struct BuildFlow {
    target: StructureKey,
    status: FlowStatus,
    sequence: u64,
    pub selection: usize,
}

impl BuildFlow {
    pub fn open(target: StructureKey) -> Self {
        Self {
            target,
            status: FlowStatus::Idle,
            sequence: 0,
            selection: 0,
        }
    }

    pub fn target(&self) -> &StructureKey {
        &self.target
    }

    pub fn status(&self) -> &FlowStatus {
        &self.status
    }

    pub fn start(&mut self, action: BuildAction, sequence: u64) -> Effect {
        self.sequence = sequence;
        self.status = FlowStatus::Loading(action.clone());
        Effect::Mutate {
            target: self.target.clone(),
            action,
            sequence: self.sequence,
        }
    }

    /// Records the outcome of action `sequence`. Returns false when a later
    /// action already superseded it.
    pub fn finish(&mut self, sequence: u64, action: &BuildAction, result: &Result<(), ApiError>) -> bool {
        if sequence != self.sequence {
            return false;
        }
        self.status = match result {
            Ok(()) => FlowStatus::Success(action.clone()),
            Err(err) => FlowStatus::Error(err.user_message()),
        };
        true
    }
}

/// Loads that follow a successful mutation at `target`: the target itself,
/// every other cached location of the entity, and the resource snapshot.
///
/// Destroy cascades like build and upgrade. Removing a structure frees
/// capacity entity-wide just as building consumes it.
pub fn success_cascade(target: &StructureKey, action: &BuildAction, state: &mut GameState) -> Vec<Effect> {
    let mut effects = vec![Effect::LoadStructures(state.structures.begin_load(target.clone()))];
    for key in state.structures.keys_for_entity(&target.entity_id) {
        if &key != target {
            effects.push(Effect::LoadStructures(state.structures.begin_load(key)));
        }
    }
    effects.push(Effect::RefreshResources(state.resources.begin_refresh()));
    info!(%target, %action, reloads = effects.len(), "mutation succeeded, reloading");
    effects
}

/// A selectable row of the build surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRow {
    Built { structure_id: String },
    Template { structure_type: String },
}

/// Built structures first, then buildable templates, in snapshot order.
pub fn build_rows(data: &StructuresData) -> Vec<BuildRow> {
    let built = data.built_structures.iter().map(|s| BuildRow::Built {
        structure_id: s.structure_id.clone(),
    });
    let templates = data.structure_templates.iter().map(|t| BuildRow::Template {
        structure_type: t.structure_type.clone(),
    });
    built.chain(templates).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    use crate::game::{BuiltStructure, Coordinate, StructureTemplate};
    use crate::store::LocalStorage;

    fn target() -> StructureKey {
        StructureKey::new("e1", Coordinate::new(0, 0))
    }

    fn template(structure_type: &str) -> StructureTemplate {
        StructureTemplate {
            structure_type: structure_type.to_string(),
            title: structure_type.to_string(),
            description: String::new(),
            production_components: Vec::new(),
            requirement_components: Vec::new(),
        }
    }

    #[test]
    fn status_moves_from_loading_to_success() {
        let mut flow = BuildFlow::open(target());
        assert_eq!(flow.status(), &FlowStatus::Idle);

        let action = BuildAction::Build("solar_panel".to_string());
        let Effect::Mutate { sequence, .. } = flow.start(action.clone(), 1) else {
            panic!("expected a mutation");
        };
        assert_eq!(flow.status(), &FlowStatus::Loading(action.clone()));

        assert!(flow.finish(sequence, &action, &Ok(())));
        assert_eq!(flow.status(), &FlowStatus::Success(action));
    }

    #[test]
    fn error_shows_detail_until_next_action() {
        let mut flow = BuildFlow::open(target());
        let destroy = BuildAction::Destroy("s-1".to_string());
        let Effect::Mutate { sequence, .. } = flow.start(destroy.clone(), 1) else {
            panic!("expected a mutation");
        };
        let failure = Err(ApiError::from_status(StatusCode::FORBIDDEN, br#"{"detail":"not owner"}"#));
        flow.finish(sequence, &destroy, &failure);
        assert_eq!(flow.status(), &FlowStatus::Error("not owner".to_string()));

        flow.start(BuildAction::Upgrade("s-2".to_string()), 2);
        assert!(matches!(flow.status(), FlowStatus::Loading(_)));
    }

    #[test]
    fn superseded_outcome_is_ignored() {
        let mut flow = BuildFlow::open(target());
        let first = BuildAction::Upgrade("s-1".to_string());
        let Effect::Mutate { sequence: first_seq, .. } = flow.start(first.clone(), 1) else {
            panic!("expected a mutation");
        };
        let second = BuildAction::Upgrade("s-2".to_string());
        flow.start(second.clone(), 2);

        assert!(!flow.finish(first_seq, &first, &Ok(())));
        assert_eq!(flow.status(), &FlowStatus::Loading(second));
    }

    #[test]
    fn cascade_reloads_target_entity_and_resources() {
        let mut state = GameState::new(Coordinate::default(), "u1", LocalStorage::in_memory());
        for key in [
            target(),
            StructureKey::new("e1", Coordinate::new(4, 4)),
            StructureKey::new("e2", Coordinate::new(0, 0)),
        ] {
            let ticket = state.structures.begin_load(key);
            state.structures.commit(&ticket, StructuresData::default());
        }

        for action in [
            BuildAction::Build("mine".to_string()),
            BuildAction::Destroy("s-1".to_string()),
        ] {
            let effects = success_cascade(&target(), &action, &mut state);
            let reloaded: Vec<_> = effects
                .iter()
                .filter_map(|effect| match effect {
                    Effect::LoadStructures(ticket) => Some(ticket.key.clone()),
                    _ => None,
                })
                .collect();
            assert_eq!(reloaded, vec![target(), StructureKey::new("e1", Coordinate::new(4, 4))]);
            assert!(matches!(effects.last(), Some(Effect::RefreshResources(_))));
        }
    }

    #[test]
    fn rows_list_built_before_templates() {
        let data = StructuresData {
            built_structures: vec![BuiltStructure {
                structure_id: "s-1".to_string(),
                level: 1,
                template: template("mine"),
            }],
            structure_templates: vec![template("refinery")],
            ..Default::default()
        };
        assert_eq!(
            build_rows(&data),
            vec![
                BuildRow::Built { structure_id: "s-1".to_string() },
                BuildRow::Template { structure_type: "refinery".to_string() },
            ]
        );
    }
}
