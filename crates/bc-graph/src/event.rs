use bc_core::{GraphLevelData, RegionId};

/// Events emitted by the level engine, drained by the flow controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// The unlocked-region set was replaced.
    UnlockedRegionsChanged(Vec<RegionId>),
    /// A proceed was accepted; one unit of the selected policy item
    /// should be consumed.
    ConsumeRequested,
    /// The player arrived at the level's end node. Carries the level data
    /// so the follow-up dialogue references survive the teardown.
    LevelFinished(GraphLevelData),
}
