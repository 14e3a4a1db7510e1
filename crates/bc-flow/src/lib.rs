//! Story flow for Braincase.
//!
//! [`StoryFlow`] is the composition root: it owns the dialogue engine, the
//! level engine, and the potion inventory, registers story assets, and
//! routes each engine's events to the others so the engines stay ignorant
//! of one another. Construction is two-phase: register all assets, then
//! start the opening graph or level.

/// Flow-level tunables, including the nested engine configurations.
pub mod config;
/// Flow error types.
pub mod error;
/// The story flow controller.
pub mod flow;
/// Potion stock and the movement policies it supplies.
pub mod inventory;
/// Ordered queues of dialogue graphs to play back to back.
pub mod sequence;

pub use config::FlowConfig;
pub use error::{FlowError, FlowResult};
pub use flow::StoryFlow;
pub use inventory::{InventoryEvent, PotionDef, PotionInventory};
pub use sequence::DialogueSequence;
