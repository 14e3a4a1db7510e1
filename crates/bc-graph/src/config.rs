/// Tunable constants for the level engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Ticks to wait for a transition-complete signal before forcing the
    /// arrival. Keeps a missing or stalled animation from deadlocking the
    /// engine.
    pub transition_timeout_ticks: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            transition_timeout_ticks: 120,
        }
    }
}

impl GraphConfig {
    /// Set the transition timeout in ticks.
    pub fn with_transition_timeout(mut self, ticks: u32) -> Self {
        self.transition_timeout_ticks = ticks;
        self
    }
}
