use bc_dialogue::DialogueConfig;
use bc_graph::GraphConfig;

/// Flow-level tunables, including the configurations handed to the
/// engines the flow constructs.
#[derive(Debug, Clone, Default)]
pub struct FlowConfig {
    /// Dialogue engine configuration.
    pub dialogue: DialogueConfig,
    /// Level engine configuration.
    pub graph: GraphConfig,
    /// Graph ids played, in order, when the choice-repeat limit is
    /// exceeded. The interrupted graph is replayed afterwards. Empty
    /// means no penalty sequence is configured.
    pub penalty_graphs: Vec<String>,
}

impl FlowConfig {
    /// Set the dialogue engine configuration.
    pub fn with_dialogue(mut self, dialogue: DialogueConfig) -> Self {
        self.dialogue = dialogue;
        self
    }

    /// Set the level engine configuration.
    pub fn with_graph(mut self, graph: GraphConfig) -> Self {
        self.graph = graph;
        self
    }

    /// Append a graph to the penalty sequence.
    pub fn with_penalty_graph(mut self, graph: impl Into<String>) -> Self {
        self.penalty_graphs.push(graph.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_penalty_graphs() {
        let config = FlowConfig::default()
            .with_penalty_graph("fail_a")
            .with_penalty_graph("fail_b");
        assert_eq!(config.penalty_graphs, vec!["fail_a", "fail_b"]);
    }
}
