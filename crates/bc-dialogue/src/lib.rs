//! Dialogue playback engine for Braincase.
//!
//! Plays a [`bc_core::DialogueGraph`] one node at a time: speaker lines are
//! revealed character by character on the simulation tick, choices are
//! published to the view, and repeated choice picks feed a warning meter
//! that escalates to the flow controller when it overflows. Narrative data
//! is authored content and must never crash a play session — every lookup
//! failure ends the current dialogue gracefully instead.

/// Builder-style configuration for the engine.
pub mod config;
/// The playback state machine.
pub mod engine;
/// Lifecycle and choice events emitted by the engine.
pub mod event;
/// Choice pick-count tracking across a play session.
pub mod picks;
/// Commands pushed to the presentation collaborator.
pub mod view;

pub use config::DialogueConfig;
pub use engine::{DialogueEngine, PlaybackState};
pub use event::DialogueEvent;
pub use picks::{ChoicePickCounts, PickKey};
pub use view::{SpeakerSide, ViewCommand};
