//! Wire-level entity and structure types returned by the game backend.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn up(self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    pub fn down(self) -> Self {
        Self::new(self.x, self.y - 1)
    }

    pub fn left(self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    pub fn right(self) -> Self {
        Self::new(self.x + 1, self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One (entity, coordinate) location. Keys the structures cache and names
/// the target of a build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureKey {
    pub entity_id: String,
    pub coordinate: Coordinate,
}

impl StructureKey {
    pub fn new(entity_id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            entity_id: entity_id.into(),
            coordinate,
        }
    }
}

impl fmt::Display for StructureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.entity_id, self.coordinate)
    }
}

/// A node of the spatial tree (star, planet, moon, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "entity_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    /// `value` is the entity's slot capacity for `resource_type`, not a stock.
    Resource {
        title: String,
        value: f64,
        resource_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
    Entities {
        title: String,
        #[serde(default)]
        entities: Vec<Entity>,
    },
    StructureSlot {
        title: String,
        structure_slots: u32,
        #[serde(default)]
        allowed_structure_types: Vec<String>,
    },
    /// Fixed slot pool reserved for one structure type.
    Structures {
        title: String,
        structure_type: String,
        structure_slots: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

impl Component {
    pub fn title(&self) -> &str {
        match self {
            Component::Resource { title, .. }
            | Component::Entities { title, .. }
            | Component::StructureSlot { title, .. }
            | Component::Structures { title, .. } => title,
        }
    }
}

/// Envelope of `GET /v1/systems`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemResponse {
    pub data: Entity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProductionComponent {
    ResourceProduction {
        title: String,
        resource_type: String,
        slot_usage: f64,
        value: f64,
        #[serde(default)]
        scaling_factor: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequirementComponent {
    ResourceRequirement { title: String, value: f64 },
    ResearchRequirement { title: String },
}

impl RequirementComponent {
    pub fn title(&self) -> &str {
        match self {
            RequirementComponent::ResourceRequirement { title, .. }
            | RequirementComponent::ResearchRequirement { title } => title,
        }
    }
}

/// Catalog blueprint for something buildable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub structure_type: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub production_components: Vec<ProductionComponent>,
    #[serde(default)]
    pub requirement_components: Vec<RequirementComponent>,
}

/// A structure instance at one (coordinate, entity) location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltStructure {
    pub structure_id: String,
    pub level: u32,
    #[serde(flatten)]
    pub template: StructureTemplate,
}

impl BuiltStructure {
    pub fn title(&self) -> &str {
        &self.template.title
    }

    pub fn structure_type(&self) -> &str {
        &self.template.structure_type
    }
}

/// Full build-menu snapshot for one (x, y, entity) triple.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuresData {
    #[serde(default)]
    pub built_structures: Vec<BuiltStructure>,
    #[serde(default)]
    pub structure_templates: Vec<StructureTemplate>,
    #[serde(default)]
    pub other_templates: BTreeMap<String, String>,
}
