//! Network effects and their completions.
//!
//! State transitions never touch the network themselves; they return
//! [`Effect`]s. The [`Executor`] runs each effect on its own task and posts a
//! [`Completion`] back to the UI loop, which is the only place state is
//! written. Requests are never aborted; a completion that lost its
//! generation is discarded when applied.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::api::{ApiError, GameApi};
use crate::app::BuildAction;
use crate::game::{Coordinate, Entity, ResearchForest, ResourcesData, StructureKey, StructuresData};
use crate::store::LoadTicket;

#[derive(Debug, Clone)]
pub enum Effect {
    LoadEntity(LoadTicket<Coordinate>),
    LoadStructures(LoadTicket<StructureKey>),
    RefreshResources(u64),
    Mutate {
        target: StructureKey,
        action: BuildAction,
        sequence: u64,
    },
    LoadResearch(u64),
    TimeWarp(u64),
}

#[derive(Debug)]
pub enum Completion {
    Entity {
        ticket: LoadTicket<Coordinate>,
        result: Result<Entity, ApiError>,
    },
    Structures {
        ticket: LoadTicket<StructureKey>,
        result: Result<StructuresData, ApiError>,
    },
    Resources {
        generation: u64,
        result: Result<ResourcesData, ApiError>,
    },
    Mutation {
        target: StructureKey,
        action: BuildAction,
        sequence: u64,
        result: Result<(), ApiError>,
    },
    Research {
        generation: u64,
        result: Result<ResearchForest, ApiError>,
    },
    TimeWarp {
        seconds: u64,
        result: Result<(), ApiError>,
    },
    /// Projection clock tick.
    Tick,
}

/// Performs one effect against the backend.
pub async fn perform(api: &GameApi, effect: Effect) -> Completion {
    match effect {
        Effect::LoadEntity(ticket) => {
            let result = api.fetch_system(ticket.key).await;
            Completion::Entity { ticket, result }
        }
        Effect::LoadStructures(ticket) => {
            let result = api.fetch_structures(&ticket.key).await;
            Completion::Structures { ticket, result }
        }
        Effect::RefreshResources(generation) => {
            let result = api.fetch_resources().await;
            Completion::Resources { generation, result }
        }
        Effect::Mutate {
            target,
            action,
            sequence,
        } => {
            let result = match &action {
                BuildAction::Build(structure_type) => api.build_structure(&target, structure_type).await,
                BuildAction::Upgrade(structure_id) => api.upgrade_structure(&target, structure_id).await,
                BuildAction::Destroy(structure_id) => api.destroy_structure(structure_id).await,
            };
            Completion::Mutation {
                target,
                action,
                sequence,
                result,
            }
        }
        Effect::LoadResearch(generation) => {
            let result = api.fetch_research_forest().await;
            Completion::Research { generation, result }
        }
        Effect::TimeWarp(seconds) => {
            let result = api.time_warp(seconds).await;
            Completion::TimeWarp { seconds, result }
        }
    }
}

/// Spawns effects on the runtime and reports their completions.
#[derive(Debug, Clone)]
pub struct Executor {
    api: GameApi,
    completions: UnboundedSender<Completion>,
}

impl Executor {
    pub fn new(api: GameApi, completions: UnboundedSender<Completion>) -> Self {
        Self { api, completions }
    }

    pub fn run(&self, effect: Effect) {
        debug!(?effect, "dispatching");
        let api = self.api.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let completion = perform(&api, effect).await;
            if completions.send(completion).is_err() {
                warn!("completion arrived after the ui loop stopped");
            }
        });
    }

    pub fn run_all(&self, effects: impl IntoIterator<Item = Effect>) {
        for effect in effects {
            self.run(effect);
        }
    }
}
