use bc_core::SpeakerProfile;

/// Which side of the conversation is speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerSide {
    /// The non-player speaker.
    Npc,
    /// The player.
    Player,
}

/// A command pushed to the presentation collaborator.
///
/// The engine never draws anything itself; it records these in order and
/// the surrounding system drains and applies them each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Show the given speaker profile (or none).
    SetSpeaker(Option<SpeakerProfile>),
    /// Show or hide the speaker UI.
    SetSpeakerVisible(bool),
    /// Switch the active conversation side.
    SetSpeakerSide(SpeakerSide),
    /// Replace the displayed line text.
    SetLine(String),
    /// Append one revealed character to the displayed line.
    AppendChar(char),
    /// Show the choice list with the given display strings.
    ShowChoices(Vec<String>),
    /// Hide the choice list.
    HideChoices,
    /// Set the repeat-warning meter fill, clamped to [0, 1].
    SetWarningFill(f32),
}
