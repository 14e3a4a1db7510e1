use std::collections::HashMap;

use bc_core::{DialogueGraph, GraphLevelData};
use bc_dialogue::{DialogueEngine, DialogueEvent, ViewCommand};
use bc_graph::{GraphEvent, LevelEngine};
use tracing::{debug, warn};

use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::inventory::{InventoryEvent, PotionDef, PotionInventory};
use crate::sequence::DialogueSequence;

/// The composition root: owns both engines and the inventory, holds the
/// registered story assets, and routes events between them.
///
/// The engines never see each other. Every cross-engine effect — a choice
/// unlocking a region, a started graph building its level, a finished
/// level queueing its follow-up dialogue, a proceed spending a potion —
/// runs through [`StoryFlow::pump`], which drains each engine's event
/// buffer in turn until all are empty.
#[derive(Debug)]
pub struct StoryFlow {
    penalty_graphs: Vec<String>,
    dialogue: DialogueEngine,
    level: LevelEngine,
    inventory: PotionInventory,
    graphs: HashMap<String, DialogueGraph>,
    levels: HashMap<String, GraphLevelData>,
    sequence: DialogueSequence,
}

impl StoryFlow {
    /// Construct the flow and its engines. Assets are registered
    /// separately; nothing plays until [`start`](Self::start) or
    /// [`start_level`](Self::start_level).
    pub fn new(config: FlowConfig) -> Self {
        Self {
            penalty_graphs: config.penalty_graphs,
            dialogue: DialogueEngine::new(config.dialogue),
            level: LevelEngine::new(config.graph),
            inventory: PotionInventory::new(),
            graphs: HashMap::new(),
            levels: HashMap::new(),
            sequence: DialogueSequence::new(),
        }
    }

    /// Register a dialogue graph. Duplicate ids keep the first.
    pub fn register_graph(&mut self, graph: DialogueGraph) {
        if self.graphs.contains_key(&graph.id) {
            warn!(graph = %graph.id, "duplicate dialogue graph id, keeping first");
            return;
        }
        self.graphs.insert(graph.id.clone(), graph);
    }

    /// Register a level. Duplicate ids keep the first.
    pub fn register_level(&mut self, level: GraphLevelData) {
        if self.levels.contains_key(&level.level_id) {
            warn!(level = %level.level_id, "duplicate level id, keeping first");
            return;
        }
        self.levels.insert(level.level_id.clone(), level);
    }

    /// Register a potion kind with zero stock.
    pub fn register_potion(&mut self, potion: PotionDef) {
        self.inventory.register(potion);
        self.pump();
    }

    /// Start playing a registered dialogue graph.
    pub fn start(&mut self, graph_id: &str) -> FlowResult<()> {
        if !self.graphs.contains_key(graph_id) {
            return Err(FlowError::UnknownGraph(graph_id.to_string()));
        }
        self.play_graph(graph_id);
        self.pump();
        Ok(())
    }

    /// Build a registered level directly, without an introducing dialogue.
    pub fn start_level(&mut self, level_id: &str) -> FlowResult<()> {
        let Some(data) = self.levels.get(level_id).cloned() else {
            return Err(FlowError::UnknownLevel(level_id.to_string()));
        };
        self.level.build_level(data);
        self.pump();
        Ok(())
    }

    /// The dialogue advance input.
    pub fn advance(&mut self) {
        self.dialogue.advance();
        self.pump();
    }

    /// A dialogue choice was clicked.
    pub fn choice_clicked(&mut self, index: usize) {
        self.dialogue.select_choice(index);
        self.pump();
    }

    /// A level node was clicked.
    pub fn node_proceed_requested(&mut self, node_id: &str) {
        self.level.proceed(node_id);
        self.pump();
    }

    /// The external transition animation finished.
    pub fn transition_complete(&mut self) {
        self.level.notify_transition_complete();
        self.pump();
    }

    /// Add potion stock, e.g. from a pickup.
    pub fn pick_up_potion(&mut self, potion_id: &str, amount: u32) {
        self.inventory.add(potion_id, amount);
        self.pump();
    }

    /// Select the active potion.
    pub fn select_potion(&mut self, potion_id: &str) {
        self.inventory.select(potion_id);
        self.pump();
    }

    /// Advance both engines by one tick.
    pub fn tick(&mut self) {
        self.dialogue.tick();
        self.level.tick();
        self.pump();
    }

    /// Read access to the dialogue engine.
    pub fn dialogue(&self) -> &DialogueEngine {
        &self.dialogue
    }

    /// Read access to the level engine.
    pub fn level(&self) -> &LevelEngine {
        &self.level
    }

    /// Read access to the inventory.
    pub fn inventory(&self) -> &PotionInventory {
        &self.inventory
    }

    /// Drain the dialogue view commands for the presentation layer.
    pub fn drain_view(&mut self) -> Vec<ViewCommand> {
        self.dialogue.drain_view()
    }

    /// Route buffered events between the engines until all buffers are
    /// empty. Handlers may themselves emit events, so this loops.
    fn pump(&mut self) {
        loop {
            let dialogue_events = self.dialogue.drain_events();
            let graph_events = self.level.drain_events();
            let inventory_events = self.inventory.drain_events();
            if dialogue_events.is_empty()
                && graph_events.is_empty()
                && inventory_events.is_empty()
            {
                break;
            }
            for event in dialogue_events {
                self.on_dialogue_event(event);
            }
            for event in graph_events {
                self.on_graph_event(event);
            }
            for event in inventory_events {
                self.on_inventory_event(event);
            }
        }
    }

    fn on_dialogue_event(&mut self, event: DialogueEvent) {
        match event {
            DialogueEvent::Started { graph } => {
                let next_level = self
                    .graphs
                    .get(&graph)
                    .and_then(|g| g.next_level.clone());
                if let Some(level_id) = next_level {
                    match self.levels.get(&level_id).cloned() {
                        Some(data) => self.level.build_level(data),
                        None => {
                            warn!(graph = %graph, level = %level_id, "graph references unregistered level")
                        }
                    }
                }
            }
            DialogueEvent::ChoiceSelected {
                activate_region, ..
            } => {
                if let Some(region) = activate_region {
                    self.level.set_unlocked_regions(vec![region]);
                }
            }
            DialogueEvent::Finished { .. } => {
                if let Some(next) = self.sequence.next_graph() {
                    self.play_graph(&next);
                }
            }
            DialogueEvent::Interrupted { graph } => {
                debug!(graph = %graph, "dialogue interrupted");
            }
            DialogueEvent::RepeatLimitExceeded { graph } => {
                self.escalate_repeat_failure(graph);
            }
        }
    }

    fn on_graph_event(&mut self, event: GraphEvent) {
        match event {
            GraphEvent::ConsumeRequested => {
                if !self.inventory.try_consume() {
                    debug!("consume request failed, stock unchanged");
                }
            }
            GraphEvent::LevelFinished(data) => {
                // A fresh level starts with a clean warning meter.
                self.dialogue.clear_pick_counts();
                let mut follow_ups = Vec::new();
                if let Some(graph) = data.next_linear_graph {
                    follow_ups.push(graph);
                }
                if let Some(graph) = data.next_hub_graph {
                    follow_ups.push(graph);
                }
                if follow_ups.is_empty() {
                    debug!(level = %data.level_id, "level finished with no follow-up dialogue");
                    return;
                }
                let first = follow_ups.remove(0);
                self.sequence.interject(follow_ups);
                self.play_graph(&first);
            }
            GraphEvent::UnlockedRegionsChanged(regions) => {
                debug!(?regions, "unlocked regions changed");
            }
        }
    }

    fn on_inventory_event(&mut self, event: InventoryEvent) {
        match event {
            InventoryEvent::SelectionChanged { policy, .. } => {
                self.level.set_movement_policy(policy);
            }
            InventoryEvent::CountChanged { potion, count } => {
                debug!(potion = %potion, count, "potion stock changed");
            }
        }
    }

    /// Too much circling in a choice hub: play the configured penalty
    /// sequence, then replay the graph it interrupted.
    fn escalate_repeat_failure(&mut self, graph: String) {
        if self.penalty_graphs.is_empty() {
            warn!(graph = %graph, "repeat limit exceeded with no penalty sequence configured");
            return;
        }
        let mut ids = self.penalty_graphs.clone();
        ids.push(graph);
        let first = ids.remove(0);
        self.sequence.interject(ids);
        self.play_graph(&first);
    }

    fn play_graph(&mut self, graph_id: &str) {
        match self.graphs.get(graph_id).cloned() {
            Some(graph) => self.dialogue.play(graph, None),
            None => warn!(graph = graph_id, "dialogue graph not registered, skipping"),
        }
    }
}
