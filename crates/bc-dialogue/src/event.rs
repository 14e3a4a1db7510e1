use bc_core::RegionId;

/// What happened during dialogue playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueEvent {
    /// A graph began playing. Fired before its first node is entered.
    Started {
        /// The graph that started.
        graph: String,
    },
    /// A graph reached a natural end.
    Finished {
        /// The graph that ended.
        graph: String,
    },
    /// A graph was cut short by an external controller.
    Interrupted {
        /// The graph that was interrupted.
        graph: String,
    },
    /// The player selected a choice and navigation proceeded.
    ChoiceSelected {
        /// The graph the choice belongs to.
        graph: String,
        /// The node the choice belongs to.
        node: String,
        /// The choice's index within its node.
        choice: usize,
        /// Region unlocked by this choice, if any.
        activate_region: Option<RegionId>,
    },
    /// The repeat threshold was exceeded; the flow controller should play
    /// its configured penalty sequence instead of navigating.
    RepeatLimitExceeded {
        /// The graph in which the threshold was exceeded.
        graph: String,
    },
}

impl DialogueEvent {
    /// The graph this event concerns.
    pub fn graph(&self) -> &str {
        match self {
            Self::Started { graph }
            | Self::Finished { graph }
            | Self::Interrupted { graph }
            | Self::ChoiceSelected { graph, .. }
            | Self::RepeatLimitExceeded { graph } => graph,
        }
    }
}
