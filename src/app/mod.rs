//! Client state machine.
//!
//! [`App`] owns the [`GameState`] and the open panel. Key presses and
//! [`Completion`]s are applied here and answered with the [`Effect`]s to run
//! next; nothing in this module performs I/O.

pub mod build;
pub mod effects;
pub mod ticker;

pub use build::*;
pub use effects::*;
pub use ticker::*;

use chrono::{DateTime, Utc};
use crossterm::event::KeyCode;
use tracing::{info, warn};

use crate::game::{Coordinate, ResourcesData, StructureKey, StructuresData};
use crate::store::GameState;
use crate::ui::tree::{TreeView, render_tree};

#[derive(Debug)]
pub enum Panel {
    Tree,
    Build(BuildFlow),
    Research,
}

#[derive(Debug)]
pub struct App {
    pub state: GameState,
    panel: Panel,
    /// Index into the tree's build affordances.
    selection: usize,
    /// Last mutation sequence handed out, shared by every build surface.
    mutations: u64,
    now: DateTime<Utc>,
    warp_seconds: u64,
    should_quit: bool,
}

impl App {
    pub fn new(state: GameState, warp_seconds: u64) -> Self {
        Self {
            state,
            panel: Panel::Tree,
            selection: 0,
            mutations: 0,
            now: Utc::now(),
            warp_seconds,
            should_quit: false,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn warp_seconds(&self) -> u64 {
        self.warp_seconds
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn coordinate(&self) -> Coordinate {
        self.state.entity.coordinate()
    }

    /// Initial loads: the tree at the start coordinate and the resources.
    pub fn start(&mut self) -> Vec<Effect> {
        let mut effects = self.move_view(self.coordinate());
        effects.push(Effect::RefreshResources(self.state.resources.begin_refresh()));
        effects
    }

    pub fn move_view(&mut self, to: Coordinate) -> Vec<Effect> {
        self.panel = Panel::Tree;
        self.selection = 0;
        info!(%to, "viewing coordinate");
        vec![Effect::LoadEntity(self.state.entity.focus(to))]
    }

    pub fn tree(&self) -> Option<TreeView> {
        let entity = self.state.entity.entity()?;
        Some(render_tree(entity, self.coordinate(), &self.state.structures))
    }

    /// Structures loads for every entity in view that was never loaded.
    pub fn pending_structure_loads(&mut self) -> Vec<Effect> {
        let Some(view) = self.tree() else {
            return Vec::new();
        };
        view.unloaded
            .into_iter()
            .map(|key| Effect::LoadStructures(self.state.structures.begin_load(key)))
            .collect()
    }

    /// Resource snapshot projected to the last clock tick.
    pub fn projected_resources(&self) -> Option<ResourcesData> {
        self.state.resources.snapshot().map(|data| data.projected(self.now))
    }

    pub fn open_build(&mut self, coordinate: Coordinate, entity_id: &str) -> Vec<Effect> {
        let key = StructureKey::new(entity_id, coordinate);
        info!(target = %key, "opening build surface");
        let load = Effect::LoadStructures(self.state.structures.begin_load(key.clone()));
        self.panel = Panel::Build(BuildFlow::open(key));
        vec![load]
    }

    /// Opens the build surface for the selected tree affordance.
    pub fn open_selected_build(&mut self) -> Vec<Effect> {
        let Some(view) = self.tree() else {
            return Vec::new();
        };
        let mut target = None;
        view.request_build(self.selection, |coordinate, entity_id| {
            target = Some((coordinate, entity_id.to_string()));
        });
        match target {
            Some((coordinate, entity_id)) => self.open_build(coordinate, &entity_id),
            None => Vec::new(),
        }
    }

    pub fn close_panel(&mut self) {
        self.panel = Panel::Tree;
    }

    pub fn build_flow(&self) -> Option<&BuildFlow> {
        match &self.panel {
            Panel::Build(flow) => Some(flow),
            _ => None,
        }
    }

    /// Snapshot shown by the open build surface.
    pub fn build_snapshot(&self) -> Option<&StructuresData> {
        self.state.structures.get(self.build_flow()?.target())
    }

    pub fn run_action(&mut self, action: BuildAction) -> Vec<Effect> {
        match &mut self.panel {
            Panel::Build(flow) => {
                self.mutations += 1;
                info!(target = %flow.target(), %action, sequence = self.mutations, "requesting");
                vec![flow.start(action, self.mutations)]
            }
            _ => Vec::new(),
        }
    }

    pub fn open_research(&mut self) -> Vec<Effect> {
        self.panel = Panel::Research;
        vec![Effect::LoadResearch(self.state.research.begin_load())]
    }

    pub fn time_warp(&self) -> Vec<Effect> {
        vec![Effect::TimeWarp(self.warp_seconds)]
    }

    /// Drops every snapshot at the viewed coordinate and reloads the view.
    pub fn refresh(&mut self) -> Vec<Effect> {
        let here = self.coordinate();
        for key in self.state.structures.keys_at(here) {
            self.state.structures.invalidate(&key);
        }
        let mut effects = self.move_view(here);
        effects.push(Effect::RefreshResources(self.state.resources.begin_refresh()));
        effects
    }

    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        let effects = self.apply_completion(completion);
        self.clamp_selection();
        effects
    }

    /// Keeps the affordance selection inside the current tree.
    fn clamp_selection(&mut self) {
        let targets = self.tree().map(|view| view.build_targets().len()).unwrap_or(0);
        self.selection = self.selection.min(targets.saturating_sub(1));
    }

    fn apply_completion(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Tick => {
                self.now = Utc::now();
                Vec::new()
            }
            Completion::Entity { ticket, result } => match result {
                Ok(entity) => {
                    if self.state.entity.commit(&ticket, entity) {
                        self.pending_structure_loads()
                    } else {
                        Vec::new()
                    }
                }
                Err(err) => {
                    warn!(at = %ticket.key, error = %err, "entity tree failed");
                    self.state.entity.fail(&ticket, err.user_message());
                    Vec::new()
                }
            },
            Completion::Structures { ticket, result } => {
                match result {
                    Ok(data) => {
                        self.state.structures.commit(&ticket, data);
                    }
                    Err(err) => {
                        warn!(key = %ticket.key, error = %err, "structures load failed");
                        self.state.structures.fail(&ticket);
                    }
                }
                Vec::new()
            }
            Completion::Resources { generation, result } => {
                match result {
                    Ok(data) => {
                        let state = &mut self.state;
                        state.resources.commit(generation, data, &mut state.storage);
                    }
                    Err(err) => {
                        warn!(error = %err, "resource refresh failed");
                        self.state.resources.fail(generation);
                    }
                }
                Vec::new()
            }
            Completion::Mutation {
                target,
                action,
                sequence,
                result,
            } => {
                if let Panel::Build(flow) = &mut self.panel {
                    if flow.target() == &target {
                        flow.finish(sequence, &action, &result);
                    }
                }
                match result {
                    Ok(()) => success_cascade(&target, &action, &mut self.state),
                    Err(err) => {
                        warn!(%target, %action, error = %err, "mutation failed");
                        Vec::new()
                    }
                }
            }
            Completion::Research { generation, result } => {
                match result {
                    Ok(forest) => {
                        self.state.research.commit(generation, forest);
                    }
                    Err(err) => {
                        warn!(error = %err, "research forest failed");
                        self.state.research.fail(generation, err.user_message());
                    }
                }
                Vec::new()
            }
            Completion::TimeWarp { seconds, result } => match result {
                Ok(()) => {
                    let state = &mut self.state;
                    state.time_warp.record(seconds, &mut state.storage);
                    info!(seconds, total = state.time_warp.total_seconds(), "time warped");
                    vec![Effect::RefreshResources(state.resources.begin_refresh())]
                }
                Err(err) => {
                    warn!(seconds, error = %err, "time warp failed");
                    self.state.time_warp.fail(err.user_message());
                    Vec::new()
                }
            },
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Vec<Effect> {
        if code == KeyCode::Char('q') {
            self.should_quit = true;
            return Vec::new();
        }
        match self.panel {
            Panel::Tree => self.handle_tree_key(code),
            Panel::Build(_) => self.handle_build_key(code),
            Panel::Research => {
                if matches!(code, KeyCode::Esc | KeyCode::Backspace) {
                    self.close_panel();
                }
                Vec::new()
            }
        }
    }

    fn handle_tree_key(&mut self, code: KeyCode) -> Vec<Effect> {
        self.clamp_selection();
        let here = self.coordinate();
        match code {
            KeyCode::Up => self.move_view(here.up()),
            KeyCode::Down => self.move_view(here.down()),
            KeyCode::Left => self.move_view(here.left()),
            KeyCode::Right => self.move_view(here.right()),
            KeyCode::Char('j') | KeyCode::Tab => {
                let targets = self.tree().map(|view| view.build_targets().len()).unwrap_or(0);
                if targets > 0 {
                    self.selection = (self.selection + 1) % targets;
                }
                Vec::new()
            }
            KeyCode::Char('k') | KeyCode::BackTab => {
                let targets = self.tree().map(|view| view.build_targets().len()).unwrap_or(0);
                if targets > 0 {
                    self.selection = (self.selection + targets - 1) % targets;
                }
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char('b') => self.open_selected_build(),
            KeyCode::Char('r') => self.open_research(),
            KeyCode::Char('w') => self.time_warp(),
            KeyCode::Char('R') => self.refresh(),
            _ => Vec::new(),
        }
    }

    fn handle_build_key(&mut self, code: KeyCode) -> Vec<Effect> {
        let rows = self.build_snapshot().map(build_rows).unwrap_or_default();
        let Panel::Build(flow) = &mut self.panel else {
            return Vec::new();
        };
        if !rows.is_empty() {
            flow.selection = flow.selection.min(rows.len() - 1);
        }
        let selected = rows.get(flow.selection).cloned();
        match code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.close_panel();
                Vec::new()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                flow.selection = flow.selection.saturating_sub(1);
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if flow.selection + 1 < rows.len() {
                    flow.selection += 1;
                }
                Vec::new()
            }
            KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('u') => match selected {
                Some(BuildRow::Template { structure_type }) if code != KeyCode::Char('u') => {
                    self.run_action(BuildAction::Build(structure_type))
                }
                Some(BuildRow::Built { structure_id }) => self.run_action(BuildAction::Upgrade(structure_id)),
                _ => Vec::new(),
            },
            KeyCode::Char('x') | KeyCode::Delete => match selected {
                Some(BuildRow::Built { structure_id }) => self.run_action(BuildAction::Destroy(structure_id)),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}
