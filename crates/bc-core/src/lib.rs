//! Core types for Braincase: dialogue graphs, level graphs, and movement policies.
//!
//! This crate defines the data model that the playback and navigation engines
//! operate on. Definitions are plain data — you can construct them
//! programmatically with the builder methods or deserialize them from JSON.

/// Dialogue graph definitions: nodes, choices, modes, and speaker profiles.
pub mod dialogue;
/// Error types used throughout the crate.
pub mod error;
/// Level graph definitions: nodes, edges, colors, and regions.
pub mod level;
/// Movement policy supplied by the inventory collaborator.
pub mod policy;

pub use dialogue::{DialogueChoice, DialogueGraph, DialogueMode, DialogueNode, SpeakerProfile};
pub use error::{CoreError, CoreResult};
pub use level::{EdgeDef, GraphLevelData, NodeColor, NodeDef, RegionId};
pub use policy::MovementPolicy;
