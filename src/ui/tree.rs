//! Entity tree renderer.
//!
//! Walks an entity and its components depth-first and produces a flat list
//! of [`TreeLine`]s. Slot accounting for each entity comes from the
//! structures snapshot cached for that entity at the viewed coordinate.
//! Rendering is pure: entities whose structures were never loaded are
//! reported in [`TreeView::unloaded`] and the caller decides to load them.

use ratatui::{
    prelude::*,
    style::Stylize,
    text::{Line, Span},
};

use crate::game::{Component, Coordinate, Entity, StructureIndex, StructureKey, format_quantity};
use crate::store::StructureCache;

#[derive(Debug, Clone, PartialEq)]
pub enum TreeLineKind {
    Entity {
        title: String,
        id: String,
        build: Option<StructureKey>,
    },
    Resource {
        title: String,
        used: f64,
        capacity: f64,
    },
    Group {
        title: String,
        count: usize,
    },
    Slot {
        title: String,
        used: usize,
        slots: u32,
    },
    Structure {
        title: String,
        level: u32,
    },
    Pool {
        title: String,
        slots: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    pub depth: usize,
    pub kind: TreeLineKind,
}

impl TreeLine {
    pub fn text(&self) -> String {
        match &self.kind {
            TreeLineKind::Entity { title, id, .. } => format!("{title} (ID: {id})"),
            TreeLineKind::Resource {
                title,
                used,
                capacity,
            } => format!(
                "{title}: {} / {}",
                format_quantity(*used),
                format_quantity(*capacity)
            ),
            TreeLineKind::Group { title, count } => format!("{title} ({count}):"),
            TreeLineKind::Slot { title, used, slots } => format!("{title}: ({used} / {slots})"),
            TreeLineKind::Structure { title, level } => format!("• {title} (lv {level})"),
            TreeLineKind::Pool { title, slots } => format!("{title} slots: {slots}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TreeView {
    pub coordinate: Coordinate,
    pub lines: Vec<TreeLine>,
    /// Entities with no structures entry yet, loaded on first display.
    pub unloaded: Vec<StructureKey>,
}

impl TreeView {
    /// Keys of every entity that shows a build affordance, in display order.
    pub fn build_targets(&self) -> Vec<&StructureKey> {
        self.lines
            .iter()
            .filter_map(|line| match &line.kind {
                TreeLineKind::Entity { build, .. } => build.as_ref(),
                _ => None,
            })
            .collect()
    }

    /// Invokes `on_build` for the `selection`-th build affordance.
    pub fn request_build(&self, selection: usize, on_build: impl FnOnce(Coordinate, &str)) -> bool {
        match self.build_targets().get(selection) {
            Some(key) => {
                on_build(key.coordinate, &key.entity_id);
                true
            }
            None => false,
        }
    }

    /// Styled lines; `selected` highlights one build affordance.
    pub fn styled_lines(&self, selected: Option<usize>) -> Vec<Line<'static>> {
        let mut affordance = 0;
        self.lines
            .iter()
            .map(|line| {
                let indent = Span::raw("  ".repeat(line.depth));
                match &line.kind {
                    TreeLineKind::Entity { build, .. } => {
                        let mut spans = vec![indent, Span::styled(line.text(), Style::default().bold())];
                        if build.is_some() {
                            let style = if selected == Some(affordance) {
                                Style::default().fg(Color::Black).bg(Color::LightGreen).bold()
                            } else {
                                Style::default().fg(Color::LightGreen)
                            };
                            spans.push(Span::raw(" "));
                            spans.push(Span::styled("[build]", style));
                            affordance += 1;
                        }
                        Line::from(spans)
                    }
                    TreeLineKind::Resource { used, capacity, .. } => {
                        let color = if used > capacity { Color::LightRed } else { Color::Cyan };
                        Line::from(vec![indent, Span::styled(line.text(), Style::default().fg(color))])
                    }
                    TreeLineKind::Group { .. } => {
                        Line::from(vec![indent, Span::styled(line.text(), Style::default().fg(Color::Yellow))])
                    }
                    TreeLineKind::Slot { used, slots, .. } => {
                        let color = if *used as u64 > u64::from(*slots) {
                            Color::LightRed
                        } else {
                            Color::Magenta
                        };
                        Line::from(vec![indent, Span::styled(line.text(), Style::default().fg(color))])
                    }
                    TreeLineKind::Pool { .. } => {
                        Line::from(vec![indent, Span::styled(line.text(), Style::default().fg(Color::Magenta))])
                    }
                    TreeLineKind::Structure { .. } => {
                        Line::from(vec![indent, Span::styled(line.text(), Style::default().fg(Color::Gray))])
                    }
                }
            })
            .collect()
    }
}

/// Renders `entity` as seen from `coordinate`.
pub fn render_tree(entity: &Entity, coordinate: Coordinate, cache: &StructureCache) -> TreeView {
    let mut view = TreeView {
        coordinate,
        ..Default::default()
    };
    render_entity(entity, 0, coordinate, cache, &mut view);
    view
}

fn render_entity(entity: &Entity, depth: usize, coordinate: Coordinate, cache: &StructureCache, view: &mut TreeView) {
    let key = StructureKey::new(entity.id.clone(), coordinate);
    if !cache.is_known(&key) {
        view.unloaded.push(key.clone());
    }
    let empty = StructureIndex::default();
    let index = cache.index(&key).unwrap_or(&empty);
    let build = cache.get(&key).map(|_| key.clone());

    view.lines.push(TreeLine {
        depth,
        kind: TreeLineKind::Entity {
            title: entity.title.clone(),
            id: entity.id.clone(),
            build,
        },
    });

    for component in &entity.components {
        render_component(component, depth + 1, coordinate, cache, index, view);
    }
}

fn render_component(
    component: &Component,
    depth: usize,
    coordinate: Coordinate,
    cache: &StructureCache,
    index: &StructureIndex,
    view: &mut TreeView,
) {
    match component {
        Component::Resource {
            title,
            value,
            resource_type,
            ..
        } => {
            if *value <= 0.0 {
                return;
            }
            view.lines.push(TreeLine {
                depth,
                kind: TreeLineKind::Resource {
                    title: title.clone(),
                    used: index.usage(resource_type),
                    capacity: *value,
                },
            });
            push_structures(index.in_bucket(resource_type).iter(), depth + 1, view);
        }
        Component::Entities { title, entities } => {
            view.lines.push(TreeLine {
                depth,
                kind: TreeLineKind::Group {
                    title: title.clone(),
                    count: entities.len(),
                },
            });
            for child in entities {
                render_entity(child, depth + 1, coordinate, cache, view);
            }
        }
        Component::StructureSlot {
            title,
            structure_slots,
            allowed_structure_types,
        } => {
            let occupants = index.in_buckets(allowed_structure_types);
            view.lines.push(TreeLine {
                depth,
                kind: TreeLineKind::Slot {
                    title: title.clone(),
                    used: occupants.len(),
                    slots: *structure_slots,
                },
            });
            push_structures(occupants.into_iter(), depth + 1, view);
        }
        Component::Structures {
            title, structure_slots, ..
        } => view.lines.push(TreeLine {
            depth,
            kind: TreeLineKind::Pool {
                title: title.clone(),
                slots: *structure_slots,
            },
        }),
    }
}

fn push_structures<'a>(
    structures: impl Iterator<Item = &'a crate::game::BuiltStructure>,
    depth: usize,
    view: &mut TreeView,
) {
    for structure in structures {
        view.lines.push(TreeLine {
            depth,
            kind: TreeLineKind::Structure {
                title: structure.title().to_string(),
                level: structure.level,
            },
        });
    }
}
