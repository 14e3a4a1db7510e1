use serde::{Deserialize, Serialize};

use crate::level::NodeColor;

/// The rule set gating level-graph traversal, sourced from the player's
/// currently selected inventory item. Absence of a policy means nothing
/// is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementPolicy {
    /// Maximum number of hops from the current node.
    pub max_hops: u32,
    /// Node colors this policy allows moving onto.
    pub allowed_colors: Vec<NodeColor>,
}

impl MovementPolicy {
    /// Create a policy with the given hop limit and no allowed colors.
    pub fn new(max_hops: u32) -> Self {
        Self {
            max_hops,
            allowed_colors: Vec::new(),
        }
    }

    /// Add an allowed color.
    pub fn with_color(mut self, color: NodeColor) -> Self {
        self.allowed_colors.push(color);
        self
    }

    /// Return `true` if this policy allows moving onto the given color.
    pub fn allows(&self, color: NodeColor) -> bool {
        self.allowed_colors.contains(&color)
    }
}
