//! Level-graph navigation for Braincase.
//!
//! The [`LevelEngine`] owns a level's node/edge graph, the player's current
//! node, and the live movement policy, and recomputes the reachable set via
//! bounded breadth-first search whenever any of those change. Its single
//! mutating operation, [`LevelEngine::proceed`], is gated by reachability
//! and by an input lock held while an external transition animation runs.

/// Tunable constants for the level engine.
pub mod config;
/// The level engine itself.
pub mod engine;
/// Events emitted by the level engine.
pub mod event;

pub use config::GraphConfig;
pub use engine::{LevelEngine, NodeFlags};
pub use event::GraphEvent;
