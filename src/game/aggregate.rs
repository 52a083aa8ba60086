//! Slot accounting over the structures built at one location.

use std::collections::BTreeMap;

use crate::game::{BuiltStructure, ProductionComponent};

/// Slot usage per resource type plus the bucket each structure occupies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureIndex {
    pub slot_usage: BTreeMap<String, f64>,
    pub buckets: BTreeMap<String, Vec<BuiltStructure>>,
}

impl StructureIndex {
    pub fn usage(&self, resource_type: &str) -> f64 {
        self.slot_usage.get(resource_type).copied().unwrap_or(0.0)
    }

    pub fn in_bucket(&self, key: &str) -> &[BuiltStructure] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Structures across every bucket named in `keys`, listed in the order
    /// the keys appear (not bucket order), each key counted once. Bucket
    /// order is alphabetical here and would reshuffle a slot's occupants
    /// whenever a new type is built.
    pub fn in_buckets<'a>(&'a self, keys: &[String]) -> Vec<&'a BuiltStructure> {
        let mut seen: Vec<&str> = Vec::new();
        let mut structures = Vec::new();
        for key in keys {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key.as_str());
            structures.extend(self.in_bucket(key));
        }
        structures
    }
}

/// Folds `built` into slot usage and buckets.
///
/// Every production component counts toward its resource's usage. A
/// structure is filed under the first resource it consumes slots of, or
/// under its own structure type when it consumes none.
pub fn aggregate(built: &[BuiltStructure]) -> StructureIndex {
    let mut index = StructureIndex::default();

    for structure in built {
        let mut bucket: Option<&str> = None;
        for component in &structure.template.production_components {
            match component {
                ProductionComponent::ResourceProduction {
                    resource_type,
                    slot_usage,
                    ..
                } => {
                    *index.slot_usage.entry(resource_type.clone()).or_insert(0.0) += slot_usage;
                    if *slot_usage > 0.0 && bucket.is_none() {
                        bucket = Some(resource_type.as_str());
                    }
                }
            }
        }

        let key = bucket.unwrap_or_else(|| structure.structure_type());
        index
            .buckets
            .entry(key.to_string())
            .or_default()
            .push(structure.clone());
    }

    index
}
