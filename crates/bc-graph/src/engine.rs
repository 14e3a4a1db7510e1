use std::collections::{HashMap, HashSet, VecDeque};

use bc_core::{GraphLevelData, MovementPolicy, NodeDef, RegionId};
use tracing::{debug, warn};

use crate::config::GraphConfig;
use crate::event::GraphEvent;

/// Per-node display facts, recomputed whenever the current node, the
/// movement policy, or the unlocked-region set changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags {
    /// The node can be proceeded to from the current node.
    pub reachable: bool,
    /// At least one of the node's regions is unlocked.
    pub activated: bool,
    /// The node is the player's current node.
    pub selected: bool,
}

/// Runtime state derived from level data on build, discarded on clear.
#[derive(Debug)]
struct Runtime {
    data: GraphLevelData,
    nodes: HashMap<String, NodeDef>,
    adjacency: HashMap<String, Vec<String>>,
    current: String,
    unlocked: HashSet<RegionId>,
    flags: HashMap<String, NodeFlags>,
    lock: u32,
    /// Ticks left before a pending transition is force-completed.
    transition: Option<u32>,
}

/// Owns a level's node/edge graph and the player's position within it.
///
/// Reachability is a bounded breadth-first expansion from the current node,
/// filtered by the active [`MovementPolicy`]'s hop limit and allowed colors
/// and by the unlocked-region set. Without a policy nothing is reachable.
#[derive(Debug)]
pub struct LevelEngine {
    config: GraphConfig,
    runtime: Option<Runtime>,
    policy: Option<MovementPolicy>,
    events: Vec<GraphEvent>,
}

impl LevelEngine {
    /// Create an engine with no level built and no movement policy.
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            runtime: None,
            policy: None,
            events: Vec::new(),
        }
    }

    /// Build runtime state for a level, replacing any prior level.
    ///
    /// Duplicate node ids keep the first definition; edges referencing
    /// unknown nodes are dropped. Both are warnings, never fatal.
    pub fn build_level(&mut self, data: GraphLevelData) {
        if self.runtime.is_some() {
            debug!(level = %data.level_id, "replacing previously built level");
        }

        let mut nodes = HashMap::with_capacity(data.nodes.len());
        for node in &data.nodes {
            if nodes.contains_key(&node.id) {
                warn!(level = %data.level_id, node = %node.id, "duplicate node id, keeping first");
                continue;
            }
            nodes.insert(node.id.clone(), node.clone());
        }

        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        for edge in &data.edges {
            if !nodes.contains_key(&edge.a) || !nodes.contains_key(&edge.b) {
                warn!(level = %data.level_id, a = %edge.a, b = %edge.b, "edge references unknown node, dropped");
                continue;
            }
            adjacency
                .entry(edge.a.clone())
                .or_default()
                .push(edge.b.clone());
            adjacency
                .entry(edge.b.clone())
                .or_default()
                .push(edge.a.clone());
        }

        if !nodes.contains_key(&data.start_node_id) {
            warn!(level = %data.level_id, start = %data.start_node_id, "start node missing from node list");
        }

        let current = data.start_node_id.clone();
        let unlocked = data.initial_regions.iter().copied().collect();
        self.runtime = Some(Runtime {
            data,
            nodes,
            adjacency,
            current,
            unlocked,
            flags: HashMap::new(),
            lock: 0,
            transition: None,
        });
        self.recompute();
    }

    /// Tear down the current level's runtime state and clear the
    /// unlocked-region set.
    pub fn clear_level(&mut self) {
        if self.runtime.take().is_some() {
            self.events
                .push(GraphEvent::UnlockedRegionsChanged(Vec::new()));
        }
    }

    /// Replace the active movement policy. `None` makes nothing reachable.
    pub fn set_movement_policy(&mut self, policy: Option<MovementPolicy>) {
        self.policy = policy;
        self.recompute();
    }

    /// The active movement policy, if any.
    pub fn movement_policy(&self) -> Option<&MovementPolicy> {
        self.policy.as_ref()
    }

    /// Replace the unlocked-region set. Replacement, not a merge: only one
    /// region is active at a time in practice.
    pub fn set_unlocked_regions(&mut self, regions: Vec<RegionId>) {
        let Some(runtime) = self.runtime.as_mut() else {
            debug!("unlocked regions set with no level built, ignored");
            return;
        };
        runtime.unlocked = regions.iter().copied().collect();
        self.recompute();
        self.events.push(GraphEvent::UnlockedRegionsChanged(regions));
    }

    /// Move the player to `node_id`.
    ///
    /// Rejected without state change while input-locked or when the node is
    /// not in the last-computed reachable set. The declared end node skips
    /// the color and region checks, so its reachability depends only on the
    /// hop bound. Acceptance locks input, requests an inventory consume,
    /// and starts the transition wait.
    pub fn proceed(&mut self, node_id: &str) {
        let Some(runtime) = self.runtime.as_mut() else {
            debug!(node = node_id, "proceed with no level built, ignored");
            return;
        };
        if runtime.lock > 0 {
            debug!(node = node_id, "proceed while input-locked, ignored");
            return;
        }
        let Some(flags) = runtime.flags.get(node_id) else {
            warn!(node = node_id, "proceed to unknown node, ignored");
            return;
        };
        if !flags.reachable {
            debug!(node = node_id, "proceed to unreachable node, ignored");
            return;
        }

        runtime.lock += 1;
        runtime.current = node_id.to_string();
        runtime.transition = Some(self.config.transition_timeout_ticks);
        self.events.push(GraphEvent::ConsumeRequested);
    }

    /// Signal that the external transition animation finished. Finalizes
    /// the pending arrival; a no-op when no transition is in flight.
    pub fn notify_transition_complete(&mut self) {
        self.finish_transition();
    }

    /// Advance the transition-timeout clock by one tick. When the deadline
    /// elapses the arrival is forced so a stalled animation cannot deadlock
    /// the engine.
    pub fn tick(&mut self) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let Some(ticks_left) = runtime.transition.as_mut() else {
            return;
        };
        if *ticks_left > 0 {
            *ticks_left -= 1;
            return;
        }
        warn!("transition completion never signalled, forcing arrival");
        self.finish_transition();
    }

    /// Take one additional hold on the input lock.
    pub fn lock_input(&mut self) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.lock += 1;
        }
    }

    /// Release one hold on the input lock.
    pub fn unlock_input(&mut self) {
        if let Some(runtime) = self.runtime.as_mut() {
            runtime.lock = runtime.lock.saturating_sub(1);
        }
    }

    /// Whether proceed input is currently rejected.
    pub fn is_input_locked(&self) -> bool {
        self.runtime.as_ref().is_some_and(|rt| rt.lock > 0)
    }

    /// The id of the level currently built, if any.
    pub fn level_id(&self) -> Option<&str> {
        self.runtime.as_ref().map(|rt| rt.data.level_id.as_str())
    }

    /// The player's current node, if a level is built.
    pub fn current_node_id(&self) -> Option<&str> {
        self.runtime.as_ref().map(|rt| rt.current.as_str())
    }

    /// Display flags for a node, or `None` for an unknown node.
    pub fn node_flags(&self, node_id: &str) -> Option<NodeFlags> {
        self.runtime
            .as_ref()
            .and_then(|rt| rt.flags.get(node_id).copied())
    }

    /// The ids of all currently reachable nodes, sorted for determinism.
    pub fn reachable_nodes(&self) -> Vec<&str> {
        let Some(runtime) = self.runtime.as_ref() else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = runtime
            .flags
            .iter()
            .filter(|(_, flags)| flags.reachable)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Whether the given region is currently unlocked.
    pub fn is_region_unlocked(&self, region: RegionId) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(|rt| rt.unlocked.contains(&region))
    }

    /// Drain all events emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    fn finish_transition(&mut self) {
        let arrived_at_end = {
            let Some(runtime) = self.runtime.as_mut() else {
                return;
            };
            if runtime.transition.take().is_none() {
                debug!("transition completion with no transition pending, ignored");
                return;
            }
            !runtime.data.end_node_id.is_empty() && runtime.current == runtime.data.end_node_id
        };

        if arrived_at_end {
            // The level is gone after this; no recompute happens.
            if let Some(runtime) = self.runtime.take() {
                self.events.push(GraphEvent::LevelFinished(runtime.data));
            }
            return;
        }

        if let Some(runtime) = self.runtime.as_mut() {
            runtime.lock = runtime.lock.saturating_sub(1);
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let Some(runtime) = self.runtime.as_mut() else {
            return;
        };
        let in_range = match self.policy.as_ref() {
            Some(policy) => nodes_within(&runtime.adjacency, &runtime.current, policy.max_hops),
            None => HashSet::new(),
        };

        let mut flags = HashMap::with_capacity(runtime.nodes.len());
        for (id, node) in &runtime.nodes {
            let is_end = *id == runtime.data.end_node_id;
            // The end node bypasses color and region gating entirely.
            let color_ok =
                is_end || self.policy.as_ref().is_some_and(|p| p.allows(node.color));
            let region_ok =
                is_end || node.regions.iter().any(|r| runtime.unlocked.contains(r));
            flags.insert(
                id.clone(),
                NodeFlags {
                    reachable: in_range.contains(id) && color_ok && region_ok,
                    activated: region_ok,
                    selected: *id == runtime.current,
                },
            );
        }
        runtime.flags = flags;
    }
}

/// Collect every node within `max_hops` undirected hops of `start`,
/// excluding `start` itself.
fn nodes_within(
    adjacency: &HashMap<String, Vec<String>>,
    start: &str,
    max_hops: u32,
) -> HashSet<String> {
    let mut found = HashSet::new();
    if max_hops == 0 {
        return found;
    }
    if max_hops == 1 {
        // Direct neighbor lookup, no queue needed.
        if let Some(neighbors) = adjacency.get(start) {
            found.extend(neighbors.iter().filter(|n| *n != start).cloned());
        }
        return found;
    }

    let mut visited: HashSet<String> = HashSet::from([start.to_string()]);
    let mut queue: VecDeque<(String, u32)> = VecDeque::from([(start.to_string(), 0)]);
    while let Some((id, depth)) = queue.pop_front() {
        if depth == max_hops {
            continue;
        }
        let Some(neighbors) = adjacency.get(&id) else {
            continue;
        };
        for neighbor in neighbors {
            if visited.insert(neighbor.clone()) {
                found.insert(neighbor.clone());
                queue.push_back((neighbor.clone(), depth + 1));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use bc_core::NodeColor;
    use proptest::prelude::*;

    use super::*;

    fn red(id: &str) -> NodeDef {
        NodeDef::new(id, NodeColor::Red).with_region(RegionId::Temporal)
    }

    /// A-B-C-D chain, A start, D end, everything red and temporal.
    fn chain_level() -> GraphLevelData {
        GraphLevelData::new("chain", "a", "d")
            .with_initial_region(RegionId::Temporal)
            .with_node(red("a"))
            .with_node(red("b"))
            .with_node(red("c"))
            .with_node(red("d"))
            .with_edge("a", "b")
            .with_edge("b", "c")
            .with_edge("c", "d")
    }

    fn red_policy(max_hops: u32) -> MovementPolicy {
        MovementPolicy::new(max_hops).with_color(NodeColor::Red)
    }

    fn engine_with(level: GraphLevelData, policy: MovementPolicy) -> LevelEngine {
        let mut engine = LevelEngine::new(GraphConfig::default());
        engine.build_level(level);
        engine.set_movement_policy(Some(policy));
        engine
    }

    fn arrive(engine: &mut LevelEngine, node: &str) {
        engine.proceed(node);
        engine.notify_transition_complete();
    }

    #[test]
    fn build_starts_at_declared_start() {
        let engine = engine_with(chain_level(), red_policy(1));
        assert_eq!(engine.current_node_id(), Some("a"));
        assert!(engine.node_flags("a").is_some_and(|f| f.selected));
    }

    #[test]
    fn two_hops_from_start_reach_b_and_c() {
        let engine = engine_with(chain_level(), red_policy(2));
        assert_eq!(engine.reachable_nodes(), vec!["b", "c"]);
    }

    #[test]
    fn two_hops_from_b_reach_a_c_d() {
        let mut engine = engine_with(chain_level(), red_policy(2));
        arrive(&mut engine, "b");
        assert_eq!(engine.reachable_nodes(), vec!["a", "c", "d"]);
    }

    #[test]
    fn no_policy_means_nothing_reachable() {
        let mut engine = engine_with(chain_level(), red_policy(2));
        engine.set_movement_policy(None);
        assert!(engine.reachable_nodes().is_empty());
    }

    #[test]
    fn color_gate_filters_reachability() {
        let level = GraphLevelData::new("colors", "a", "d")
            .with_initial_region(RegionId::Temporal)
            .with_node(red("a"))
            .with_node(red("b"))
            .with_node(NodeDef::new("c", NodeColor::Yellow).with_region(RegionId::Temporal))
            .with_node(red("d"))
            .with_edge("a", "b")
            .with_edge("a", "c");
        let engine = engine_with(level, red_policy(1));
        assert_eq!(engine.reachable_nodes(), vec!["b"]);
    }

    #[test]
    fn region_gate_controls_reachable_and_activated() {
        let level = GraphLevelData::new("regions", "a", "d")
            .with_initial_region(RegionId::Temporal)
            .with_node(red("a"))
            .with_node(red("b"))
            .with_node(NodeDef::new("c", NodeColor::Red).with_region(RegionId::Limbic))
            .with_node(red("d"))
            .with_edge("a", "b")
            .with_edge("a", "c");
        let mut engine = engine_with(level, red_policy(1));
        assert_eq!(engine.reachable_nodes(), vec!["b"]);
        assert!(!engine.node_flags("c").is_some_and(|f| f.activated));

        engine.set_unlocked_regions(vec![RegionId::Limbic]);
        assert_eq!(engine.reachable_nodes(), vec!["c"]);
        assert!(engine.node_flags("c").is_some_and(|f| f.activated));
        assert!(
            engine
                .drain_events()
                .contains(&GraphEvent::UnlockedRegionsChanged(vec![RegionId::Limbic]))
        );
    }

    #[test]
    fn end_node_bypasses_color_and_region_checks() {
        let level = GraphLevelData::new("bypass", "a", "end")
            .with_initial_region(RegionId::Temporal)
            .with_node(red("a"))
            .with_node(NodeDef::new("end", NodeColor::Black).with_region(RegionId::Limbic))
            .with_edge("a", "end");
        let engine = engine_with(level, red_policy(1));
        assert_eq!(engine.reachable_nodes(), vec!["end"]);
        assert!(engine.node_flags("end").is_some_and(|f| f.activated));
    }

    #[test]
    fn end_node_out_of_hop_range_is_not_reachable() {
        let engine = engine_with(chain_level(), red_policy(2));
        assert!(!engine.node_flags("d").is_some_and(|f| f.reachable));
    }

    #[test]
    fn arriving_at_end_finishes_level_once_and_tears_down() {
        let mut engine = engine_with(chain_level(), red_policy(3));
        engine.drain_events();
        arrive(&mut engine, "d");

        let events = engine.drain_events();
        let finishes = events
            .iter()
            .filter(|e| matches!(e, GraphEvent::LevelFinished(_)))
            .count();
        assert_eq!(finishes, 1);
        assert!(engine.level_id().is_none());
        assert!(engine.reachable_nodes().is_empty());

        // Stray completion signals after teardown do nothing.
        engine.notify_transition_complete();
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn proceed_to_unreachable_node_is_a_no_op() {
        let mut engine = engine_with(chain_level(), red_policy(1));
        engine.drain_events();
        engine.proceed("c");
        assert_eq!(engine.current_node_id(), Some("a"));
        assert_eq!(engine.reachable_nodes(), vec!["b"]);
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn proceed_while_locked_is_a_no_op() {
        let mut engine = engine_with(chain_level(), red_policy(1));
        engine.lock_input();
        engine.proceed("b");
        assert_eq!(engine.current_node_id(), Some("a"));
        engine.unlock_input();
        engine.proceed("b");
        assert_eq!(engine.current_node_id(), Some("b"));
    }

    #[test]
    fn proceed_requests_consume_and_holds_lock_until_transition_ends() {
        let mut engine = engine_with(chain_level(), red_policy(1));
        engine.drain_events();

        engine.proceed("b");
        assert_eq!(engine.drain_events(), vec![GraphEvent::ConsumeRequested]);
        assert!(engine.is_input_locked());
        engine.proceed("a"); // dropped, not queued
        assert_eq!(engine.current_node_id(), Some("b"));

        engine.notify_transition_complete();
        assert!(!engine.is_input_locked());
        assert_eq!(engine.reachable_nodes(), vec!["a", "c"]);
    }

    #[test]
    fn stalled_transition_is_forced_after_timeout() {
        let mut engine = LevelEngine::new(GraphConfig::default().with_transition_timeout(3));
        engine.build_level(chain_level());
        engine.set_movement_policy(Some(red_policy(1)));

        engine.proceed("b");
        for _ in 0..3 {
            engine.tick();
            assert!(engine.is_input_locked());
        }
        engine.tick(); // deadline elapsed, arrival forced
        assert!(!engine.is_input_locked());
        assert_eq!(engine.reachable_nodes(), vec!["a", "c"]);
    }

    #[test]
    fn dangling_edges_are_dropped() {
        let level = GraphLevelData::new("dangling", "a", "b")
            .with_node(red("a"))
            .with_node(red("b"))
            .with_edge("a", "b")
            .with_edge("a", "ghost");
        let engine = engine_with(level, red_policy(1));
        assert_eq!(engine.reachable_nodes(), vec!["b"]);
        assert!(engine.node_flags("ghost").is_none());
    }

    #[test]
    fn duplicate_node_ids_keep_the_first() {
        let level = GraphLevelData::new("dupes", "a", "")
            .with_initial_region(RegionId::Temporal)
            .with_node(red("a"))
            .with_node(red("b"))
            .with_node(NodeDef::new("b", NodeColor::Black))
            .with_edge("a", "b");
        let engine = engine_with(level, red_policy(1));
        assert_eq!(engine.reachable_nodes(), vec!["b"]);
    }

    #[test]
    fn clear_level_resets_state_and_notifies_empty_regions() {
        let mut engine = engine_with(chain_level(), red_policy(2));
        engine.drain_events();
        engine.clear_level();
        assert!(engine.level_id().is_none());
        assert!(!engine.is_region_unlocked(RegionId::Temporal));
        assert_eq!(
            engine.drain_events(),
            vec![GraphEvent::UnlockedRegionsChanged(Vec::new())]
        );
    }

    /// Full-depth BFS distances, for checking the bounded expansion against.
    fn distances(adjacency: &HashMap<String, Vec<String>>, start: &str) -> HashMap<String, u32> {
        let mut dist = HashMap::from([(start.to_string(), 0u32)]);
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(id) = queue.pop_front() {
            let d = dist[&id];
            for n in adjacency.get(&id).cloned().unwrap_or_default() {
                dist.entry(n.clone()).or_insert_with(|| {
                    queue.push_back(n);
                    d + 1
                });
            }
        }
        dist
    }

    proptest! {
        #[test]
        fn reachable_nodes_respect_the_hop_bound(
            node_count in 2usize..8,
            edges in prop::collection::vec((0usize..8, 0usize..8), 0..16),
            max_hops in 0u32..4,
        ) {
            let mut level = GraphLevelData::new("prop", "n0", "");
            for i in 0..node_count {
                level = level.with_node(red(&format!("n{i}")));
            }
            for (a, b) in edges {
                level = level.with_edge(
                    format!("n{}", a % node_count),
                    format!("n{}", b % node_count),
                );
            }
            level = level.with_initial_region(RegionId::Temporal);

            let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
            for edge in &level.edges {
                adjacency.entry(edge.a.clone()).or_default().push(edge.b.clone());
                adjacency.entry(edge.b.clone()).or_default().push(edge.a.clone());
            }
            let dist = distances(&adjacency, "n0");

            let engine = engine_with(level, red_policy(max_hops));
            for id in engine.reachable_nodes() {
                prop_assert_ne!(id, "n0");
                let d = dist.get(id).copied();
                prop_assert!(d.is_some_and(|d| d >= 1 && d <= max_hops));
            }
        }
    }
}
