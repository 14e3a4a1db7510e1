use std::collections::HashMap;

/// Stable identity of one choice: graph, node, and the choice's index
/// within that node. Index-based identity avoids collisions when several
/// choices share display text or destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PickKey {
    /// The owning graph's identifier.
    pub graph: String,
    /// The owning node's identifier.
    pub node: String,
    /// The choice's index within the node.
    pub choice: usize,
}

impl PickKey {
    /// Build a key from its parts.
    pub fn new(graph: impl Into<String>, node: impl Into<String>, choice: usize) -> Self {
        Self {
            graph: graph.into(),
            node: node.into(),
            choice,
        }
    }
}

/// Tracks how many times each choice has been picked in the current play
/// session. The first pick of a choice is free; every pick beyond that
/// counts as a repeat.
#[derive(Debug, Clone, Default)]
pub struct ChoicePickCounts {
    counts: HashMap<PickKey, u32>,
}

impl ChoicePickCounts {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one pick and return the new count for that choice.
    pub fn increment(&mut self, key: PickKey) -> u32 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// How many times the given choice has been picked.
    pub fn count(&self, key: &PickKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Sum of repeats across all tracked choices (count − 1 per choice,
    /// never negative).
    pub fn total_repeats(&self) -> u32 {
        self.counts.values().map(|c| c.saturating_sub(1)).sum()
    }

    /// The warning meter fill: total repeats over the allowed maximum,
    /// clamped to [0, 1]. A non-positive maximum reads as full.
    pub fn fill_ratio(&self, max_repeats: u32) -> f32 {
        if max_repeats == 0 {
            return 1.0;
        }
        (self.total_repeats() as f32 / max_repeats as f32).clamp(0.0, 1.0)
    }

    /// Forget all picks.
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Return `true` if nothing has been picked yet.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
