use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::level::RegionId;

/// How a dialogue graph is traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueMode {
    /// Nodes chain via `next` links until a terminal node.
    Linear,
    /// Choices may route back to a designated hub node, forming a
    /// menu-like repeatable structure.
    HubAndBranch,
}

/// A single selectable option presented to the player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueChoice {
    /// The text shown to the player.
    pub text: String,
    /// Node to jump to when selected. Ignored when `back_to_hub` is set.
    #[serde(default)]
    pub next: Option<String>,
    /// Route to the owning graph's hub node instead of `next`.
    #[serde(default)]
    pub back_to_hub: bool,
    /// Story region unlocked by picking this choice, if any.
    #[serde(default)]
    pub activate_region: Option<RegionId>,
}

impl DialogueChoice {
    /// Create a choice with the given display text and no destination.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            next: None,
            back_to_hub: false,
            activate_region: None,
        }
    }

    /// Set the destination node.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Route this choice back to the hub node.
    pub fn with_back_to_hub(mut self) -> Self {
        self.back_to_hub = true;
        self
    }

    /// Set the region unlocked by this choice.
    pub fn with_region(mut self, region: RegionId) -> Self {
        self.activate_region = Some(region);
        self
    }
}

/// A single node of a dialogue graph: a speaker line and/or a set of
/// player choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Unique node identifier within the graph.
    pub id: String,
    /// The speaker's line. Empty means the node has no line.
    #[serde(default)]
    pub line: String,
    /// Node to advance to when the line completes and there are no choices.
    #[serde(default)]
    pub next: Option<String>,
    /// Choices offered to the player after the line completes.
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
}

impl DialogueNode {
    /// Create a node with the given id and no line, next, or choices.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            line: String::new(),
            next: None,
            choices: Vec::new(),
        }
    }

    /// Set the speaker line.
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    /// Set the follow-up node.
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        self.next = Some(next.into());
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: DialogueChoice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Return `true` if this node has a non-empty speaker line.
    pub fn has_line(&self) -> bool {
        !self.line.is_empty()
    }

    /// Return `true` if this node offers choices.
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// The character speaking a dialogue graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerProfile {
    /// Display name of the speaker.
    pub name: String,
    /// Flavor description of the speaker.
    #[serde(default)]
    pub description: String,
}

impl SpeakerProfile {
    /// Create a profile with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }
}

/// A directed graph of dialogue nodes played by the dialogue engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueGraph {
    /// Unique graph identifier (asset key).
    pub id: String,
    /// How this graph is traversed.
    pub mode: DialogueMode,
    /// The entry node. Empty falls back to `hub_id` in hub-and-branch mode.
    #[serde(default)]
    pub start_id: String,
    /// The hub node, meaningful only in hub-and-branch mode.
    #[serde(default)]
    pub hub_id: String,
    /// All nodes of the graph.
    #[serde(default)]
    pub nodes: Vec<DialogueNode>,
    /// The speaker shown while this graph plays.
    #[serde(default)]
    pub speaker: Option<SpeakerProfile>,
    /// Whether the speaker UI is shown for this graph.
    #[serde(default)]
    pub show_speaker: bool,
    /// Key of the level to build when this graph starts, if any.
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(skip)]
    index: OnceLock<HashMap<String, usize>>,
}

impl DialogueGraph {
    /// Create an empty graph with the given id and mode.
    pub fn new(id: impl Into<String>, mode: DialogueMode) -> Self {
        Self {
            id: id.into(),
            mode,
            start_id: String::new(),
            hub_id: String::new(),
            nodes: Vec::new(),
            speaker: None,
            show_speaker: false,
            next_level: None,
            index: OnceLock::new(),
        }
    }

    /// Set the entry node id.
    pub fn with_start(mut self, start_id: impl Into<String>) -> Self {
        self.start_id = start_id.into();
        self
    }

    /// Set the hub node id.
    pub fn with_hub(mut self, hub_id: impl Into<String>) -> Self {
        self.hub_id = hub_id.into();
        self
    }

    /// Add a node.
    pub fn with_node(mut self, node: DialogueNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Set the speaker profile and show the speaker UI.
    pub fn with_speaker(mut self, speaker: SpeakerProfile) -> Self {
        self.speaker = Some(speaker);
        self.show_speaker = true;
        self
    }

    /// Set the level built when this graph starts.
    pub fn with_next_level(mut self, level: impl Into<String>) -> Self {
        self.next_level = Some(level.into());
        self
    }

    /// Look up a node by id. The id-to-node index is built on first use
    /// and cached. When two nodes share an id the first one wins.
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        if id.is_empty() {
            return None;
        }
        let index = self.index.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.nodes.len());
            for (i, node) in self.nodes.iter().enumerate() {
                if !node.id.is_empty() {
                    map.entry(node.id.clone()).or_insert(i);
                }
            }
            map
        });
        index.get(id).map(|&i| &self.nodes[i])
    }

    /// Deserialize a graph from JSON.
    pub fn from_json(json: &str) -> crate::CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize this graph to pretty-printed JSON.
    pub fn to_json(&self) -> crate::CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
