//! Research forest returned by `GET /v1/research/forest`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchNode {
    pub node_type: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: u32,
    pub status: String,
}

impl ResearchNode {
    /// Stable identifier, also the key of `node_rank`.
    pub fn id(&self) -> String {
        format!("{}-{}-{}", self.node_type, self.kind, self.level)
    }

    pub fn is_unlocked(&self) -> bool {
        self.status == "unlocked"
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchForest {
    #[serde(default)]
    pub nodes: Vec<ResearchNode>,
    /// Target node index -> indices of its prerequisite nodes.
    #[serde(default)]
    pub edges: HashMap<String, Vec<usize>>,
    #[serde(default)]
    pub node_rank: HashMap<String, i64>,
}

impl ResearchForest {
    pub fn rank(&self, node: &ResearchNode) -> i64 {
        self.node_rank.get(&node.id()).copied().unwrap_or(0)
    }

    /// Prerequisites of the node at `index`. Out-of-range sources are skipped.
    pub fn prerequisites(&self, index: usize) -> Vec<&ResearchNode> {
        self.edges
            .get(&index.to_string())
            .map(|sources| sources.iter().filter_map(|&s| self.nodes.get(s)).collect())
            .unwrap_or_default()
    }

    /// Node indices grouped by rank, lowest rank first.
    pub fn layers(&self) -> BTreeMap<i64, Vec<usize>> {
        let mut layers: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, node) in self.nodes.iter().enumerate() {
            layers.entry(self.rank(node)).or_default().push(index);
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> ResearchForest {
        serde_json::from_str(
            r#"{
                "nodes": [
                    {"node_type": "research", "title": "Mining", "type": "mining", "level": 1, "status": "unlocked"},
                    {"node_type": "structure", "title": "Mine", "type": "mine", "level": 1, "status": "unlockable"},
                    {"node_type": "research", "title": "Smelting", "type": "smelting", "level": 1, "status": "locked"}
                ],
                "edges": {"1": [0], "2": [0, 1, 9]},
                "node_rank": {"research-mining-1": 0, "structure-mine-1": 1, "research-smelting-1": 2}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn node_ids_combine_type_and_level() {
        let forest = forest();
        assert_eq!(forest.nodes[1].id(), "structure-mine-1");
        assert!(forest.nodes[0].is_unlocked());
    }

    #[test]
    fn prerequisites_resolve_edge_indices() {
        let forest = forest();
        let titles: Vec<_> = forest.prerequisites(2).iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["Mining", "Mine"]);
        assert!(forest.prerequisites(0).is_empty());
    }

    #[test]
    fn layers_follow_rank() {
        let layers = forest().layers();
        assert_eq!(layers.keys().copied().collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(layers[&2], [2]);
    }
}
