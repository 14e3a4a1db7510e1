use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A story region grouping level-graph nodes. Unlocking a region makes its
/// tagged nodes eligible for reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionId {
    /// The reserved region carrying the start and end nodes.
    StartEnd,
    /// The temporal lobe region.
    Temporal,
    /// The limbic system region.
    Limbic,
    /// The brainstem region.
    Brainstem,
    /// Any node outside the named regions.
    Other,
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartEnd => write!(f, "start_end"),
            Self::Temporal => write!(f, "temporal"),
            Self::Limbic => write!(f, "limbic"),
            Self::Brainstem => write!(f, "brainstem"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// The color tag of a level-graph node, gated by the active movement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeColor {
    /// Red node.
    Red,
    /// Yellow node.
    Yellow,
    /// Green node.
    Green,
    /// Black node.
    Black,
}

impl fmt::Display for NodeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Yellow => write!(f, "yellow"),
            Self::Green => write!(f, "green"),
            Self::Black => write!(f, "black"),
        }
    }
}

/// Definition of a single level-graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDef {
    /// Unique node identifier within the level.
    pub id: String,
    /// The node's color tag.
    pub color: NodeColor,
    /// Regions this node belongs to.
    #[serde(default)]
    pub regions: Vec<RegionId>,
}

impl NodeDef {
    /// Create a node definition with the given id and color and no regions.
    pub fn new(id: impl Into<String>, color: NodeColor) -> Self {
        Self {
            id: id.into(),
            color,
            regions: Vec::new(),
        }
    }

    /// Add a region tag.
    pub fn with_region(mut self, region: RegionId) -> Self {
        self.regions.push(region);
        self
    }
}

/// An undirected edge between two level-graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDef {
    /// One endpoint's node identifier.
    pub a: String,
    /// The other endpoint's node identifier.
    pub b: String,
}

impl EdgeDef {
    /// Create an edge between the two given node identifiers.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// If `id` is one endpoint, return the other endpoint.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.a == id {
            Some(&self.b)
        } else if self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Definition of one level: its node/edge graph, start and end nodes,
/// initially unlocked regions, and the dialogue graphs to play when the
/// level is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLevelData {
    /// Unique level identifier.
    pub level_id: String,
    /// Human-readable level name.
    #[serde(default)]
    pub display_name: String,
    /// The node the player starts on.
    pub start_node_id: String,
    /// The node that completes the level when reached.
    pub end_node_id: String,
    /// Regions unlocked when the level is built.
    #[serde(default)]
    pub initial_regions: Vec<RegionId>,
    /// All node definitions.
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    /// All edge definitions.
    #[serde(default)]
    pub edges: Vec<EdgeDef>,
    /// Key of the linear dialogue graph played after this level, if any.
    #[serde(default)]
    pub next_linear_graph: Option<String>,
    /// Key of the hub-and-branch dialogue graph played after the linear
    /// one, if any.
    #[serde(default)]
    pub next_hub_graph: Option<String>,
}

impl GraphLevelData {
    /// Create an empty level with the given identifiers.
    pub fn new(
        level_id: impl Into<String>,
        start_node_id: impl Into<String>,
        end_node_id: impl Into<String>,
    ) -> Self {
        Self {
            level_id: level_id.into(),
            display_name: String::new(),
            start_node_id: start_node_id.into(),
            end_node_id: end_node_id.into(),
            initial_regions: Vec::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            next_linear_graph: None,
            next_hub_graph: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Add an initially unlocked region.
    pub fn with_initial_region(mut self, region: RegionId) -> Self {
        self.initial_regions.push(region);
        self
    }

    /// Add a node definition.
    pub fn with_node(mut self, node: NodeDef) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge definition.
    pub fn with_edge(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.edges.push(EdgeDef::new(a, b));
        self
    }

    /// Set the follow-up linear dialogue graph key.
    pub fn with_next_linear(mut self, graph: impl Into<String>) -> Self {
        self.next_linear_graph = Some(graph.into());
        self
    }

    /// Set the follow-up hub-and-branch dialogue graph key.
    pub fn with_next_hub(mut self, graph: impl Into<String>) -> Self {
        self.next_hub_graph = Some(graph.into());
        self
    }

    /// Look up a node definition by id.
    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Return `true` if a node with the given id exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Direct neighbors of the given node over the undirected edge set.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.edges.iter().filter_map(|e| e.other(id)).collect()
    }

    /// Check structural invariants: node ids must be unique.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = std::collections::HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(CoreError::DuplicateNodeId {
                    graph: self.level_id.clone(),
                    id: node.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Deserialize a level from JSON.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this level to pretty-printed JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_level() -> GraphLevelData {
        GraphLevelData::new("BrainCase_01", "A", "D")
            .with_initial_region(RegionId::Temporal)
            .with_node(NodeDef::new("A", NodeColor::Black).with_region(RegionId::StartEnd))
            .with_node(NodeDef::new("B", NodeColor::Red).with_region(RegionId::Temporal))
            .with_node(NodeDef::new("C", NodeColor::Yellow).with_region(RegionId::Temporal))
            .with_node(NodeDef::new("D", NodeColor::Black).with_region(RegionId::StartEnd))
            .with_edge("A", "B")
            .with_edge("B", "C")
            .with_edge("C", "D")
    }

    #[test]
    fn node_lookup() {
        let level = chain_level();
        assert!(level.has_node("A"));
        assert_eq!(level.node("B").unwrap().color, NodeColor::Red);
        assert!(level.node("Z").is_none());
    }

    #[test]
    fn neighbors_are_undirected() {
        let level = chain_level();
        assert_eq!(level.neighbors("A"), vec!["B"]);
        let mut b = level.neighbors("B");
        b.sort_unstable();
        assert_eq!(b, vec!["A", "C"]);
    }

    #[test]
    fn edge_other_endpoint() {
        let edge = EdgeDef::new("A", "B");
        assert_eq!(edge.other("A"), Some("B"));
        assert_eq!(edge.other("B"), Some("A"));
        assert_eq!(edge.other("C"), None);
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let level = chain_level().with_node(NodeDef::new("B", NodeColor::Green));
        let err = level.validate().unwrap_err();
        assert!(matches!(err, CoreError::DuplicateNodeId { .. }));
    }

    #[test]
    fn validate_accepts_unique_ids() {
        assert!(chain_level().validate().is_ok());
    }

    #[test]
    fn json_round_trip() {
        let level = chain_level();
        let json = level.to_json().unwrap();
        let back = GraphLevelData::from_json(&json).unwrap();
        assert_eq!(back.level_id, "BrainCase_01");
        assert_eq!(back.nodes.len(), 4);
        assert_eq!(back.edges.len(), 3);
        assert_eq!(back.initial_regions, vec![RegionId::Temporal]);
    }

    #[test]
    fn json_defaults_for_optional_fields() {
        let json = r#"{
            "level_id": "L1",
            "start_node_id": "A",
            "end_node_id": "B"
        }"#;
        let level = GraphLevelData::from_json(json).unwrap();
        assert!(level.nodes.is_empty());
        assert!(level.edges.is_empty());
        assert!(level.next_linear_graph.is_none());
    }
}
