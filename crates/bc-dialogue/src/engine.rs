use bc_core::{DialogueGraph, DialogueMode, DialogueNode};
use tracing::{debug, warn};

use crate::config::DialogueConfig;
use crate::event::DialogueEvent;
use crate::picks::{ChoicePickCounts, PickKey};
use crate::view::{SpeakerSide, ViewCommand};

/// Where playback currently is within a node. Not playing at all is
/// represented by the absence of an active graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// A line is being revealed character by character.
    Typing,
    /// The full line is on screen, waiting for the advance input.
    LineComplete,
    /// Choices are on screen, waiting for a selection.
    Choosing,
}

/// Suspended typewriter state, advanced one step per tick.
#[derive(Debug)]
struct Typewriter {
    chars: Vec<char>,
    full: String,
    next: usize,
    delay_left: u32,
}

/// Completion callback invoked when a graph ends naturally.
pub type OnFinished = Box<dyn FnOnce()>;

/// Plays one dialogue graph at a time.
///
/// All mutation happens on the caller's thread: inputs arrive through
/// [`advance`](Self::advance) and [`select_choice`](Self::select_choice),
/// the typewriter moves on [`tick`](Self::tick), and outputs accumulate in
/// drainable event and view-command buffers.
pub struct DialogueEngine {
    config: DialogueConfig,
    graph: Option<DialogueGraph>,
    current: Option<DialogueNode>,
    state: Option<PlaybackState>,
    typing: Option<Typewriter>,
    on_finished: Option<OnFinished>,
    picks: ChoicePickCounts,
    events: Vec<DialogueEvent>,
    view: Vec<ViewCommand>,
}

impl std::fmt::Debug for DialogueEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueEngine")
            .field("graph", &self.graph.as_ref().map(|g| g.id.as_str()))
            .field("current", &self.current.as_ref().map(|n| n.id.as_str()))
            .field("state", &self.state)
            .finish()
    }
}

impl DialogueEngine {
    /// Create an idle engine with the given configuration.
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            config,
            graph: None,
            current: None,
            state: None,
            typing: None,
            on_finished: None,
            picks: ChoicePickCounts::new(),
            events: Vec::new(),
            view: Vec::new(),
        }
    }

    /// Return `true` while a graph is active.
    pub fn is_playing(&self) -> bool {
        self.graph.is_some()
    }

    /// The current playback state, or `None` when idle.
    pub fn state(&self) -> Option<PlaybackState> {
        self.state
    }

    /// The id of the graph currently playing, if any.
    pub fn graph_id(&self) -> Option<&str> {
        self.graph.as_ref().map(|g| g.id.as_str())
    }

    /// The id of the node currently entered, if any.
    pub fn current_node_id(&self) -> Option<&str> {
        self.current.as_ref().map(|n| n.id.as_str())
    }

    /// Start playing a graph. If another graph is active it is interrupted
    /// first, so exactly one graph plays at a time. The `on_finished`
    /// callback runs only on a natural end, never on an interrupt.
    pub fn play(&mut self, graph: DialogueGraph, on_finished: Option<OnFinished>) {
        if self.is_playing() {
            self.interrupt();
        }

        // Collaborators hear about the new graph before any node runs.
        self.events.push(DialogueEvent::Started {
            graph: graph.id.clone(),
        });

        self.view.push(ViewCommand::SetSpeaker(graph.speaker.clone()));
        self.view
            .push(ViewCommand::SetSpeakerVisible(graph.show_speaker));
        self.view.push(ViewCommand::HideChoices);
        self.view.push(ViewCommand::SetLine(String::new()));

        let start = graph.start_id.clone();
        let hub = graph.hub_id.clone();
        let mode = graph.mode;
        self.graph = Some(graph);
        self.on_finished = on_finished;

        if start.is_empty() {
            if mode == DialogueMode::HubAndBranch && !hub.is_empty() {
                self.goto(&hub);
                return;
            }
            debug!("graph has no entry node, ending immediately");
            self.end_dialogue(true);
            return;
        }
        self.goto(&start);
    }

    /// Force-stop the current graph. No completion callback runs; an
    /// `Interrupted` event fires instead of `Finished`.
    pub fn interrupt(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.end_dialogue(false);
    }

    /// Handle the advance input. Skips an in-flight reveal, moves past a
    /// completed line, and is ignored while choices are on screen.
    pub fn advance(&mut self) {
        match self.state {
            Some(PlaybackState::Typing) => {
                if self.config.allow_skip_typing {
                    self.finish_typing();
                }
            }
            Some(PlaybackState::LineComplete) => self.advance_after_line(),
            Some(PlaybackState::Choosing) | None => {}
        }
    }

    /// Advance the typewriter by one tick.
    pub fn tick(&mut self) {
        if self.state != Some(PlaybackState::Typing) {
            return;
        }
        let Some(typing) = self.typing.as_mut() else {
            return;
        };
        if typing.delay_left > 0 {
            typing.delay_left -= 1;
            return;
        }

        let mut revealed = Vec::new();
        let mut done = false;
        loop {
            revealed.push(typing.chars[typing.next]);
            typing.next += 1;
            if typing.next == typing.chars.len() {
                done = true;
                break;
            }
            if self.config.char_delay_ticks == 0 {
                // Zero delay reveals the whole line within this tick.
                continue;
            }
            typing.delay_left = self.config.char_delay_ticks - 1;
            break;
        }

        for c in revealed {
            self.view.push(ViewCommand::AppendChar(c));
        }
        if done {
            self.finish_typing();
        }
    }

    /// Select a choice on the current node by index. A no-op unless the
    /// engine is in the choosing state and the index is valid.
    pub fn select_choice(&mut self, index: usize) {
        if self.state != Some(PlaybackState::Choosing) {
            debug!(index, "choice selected outside choosing state, ignored");
            return;
        }
        let (Some(graph), Some(node)) = (self.graph.as_ref(), self.current.as_ref()) else {
            return;
        };
        let Some(choice) = node.choices.get(index).cloned() else {
            warn!(index, node = %node.id, "choice index out of range, ignored");
            return;
        };
        let graph_id = graph.id.clone();
        let mode = graph.mode;
        let hub = graph.hub_id.clone();
        let node_id = node.id.clone();

        self.view.push(ViewCommand::HideChoices);
        self.view.push(ViewCommand::SetSpeakerSide(SpeakerSide::Npc));

        let destination = if mode == DialogueMode::HubAndBranch && choice.back_to_hub {
            if hub.is_empty() {
                warn!(graph = %graph_id, "choice routes to hub but graph has no hub id");
                self.end_dialogue(true);
                return;
            }
            hub
        } else {
            match choice.next.clone().filter(|n| !n.is_empty()) {
                Some(next) => next,
                None => {
                    warn!(choice = %choice.text, "choice has no destination");
                    self.end_dialogue(true);
                    return;
                }
            }
        };

        self.picks
            .increment(PickKey::new(graph_id.clone(), node_id.clone(), index));
        let fill = self.picks.fill_ratio(self.config.max_repeat_count);
        self.view.push(ViewCommand::SetWarningFill(fill));

        if self.picks.total_repeats() > self.config.max_repeat_count {
            // Too much circling: hand control to the flow controller
            // instead of navigating.
            self.picks.clear();
            self.view.push(ViewCommand::SetWarningFill(0.0));
            self.events
                .push(DialogueEvent::RepeatLimitExceeded { graph: graph_id });
            return;
        }

        self.events.push(DialogueEvent::ChoiceSelected {
            graph: graph_id,
            node: node_id,
            choice: index,
            activate_region: choice.activate_region,
        });
        self.goto(&destination);
    }

    /// How many times the given choice has been picked this session.
    pub fn pick_count(&self, key: &PickKey) -> u32 {
        self.picks.count(key)
    }

    /// The current warning meter fill in [0, 1].
    pub fn warning_fill(&self) -> f32 {
        self.picks.fill_ratio(self.config.max_repeat_count)
    }

    /// Forget all pick counts and reset the warning meter.
    pub fn clear_pick_counts(&mut self) {
        self.picks.clear();
        self.view.push(ViewCommand::SetWarningFill(0.0));
    }

    /// Drain all events emitted since the last drain, in order.
    pub fn drain_events(&mut self) -> Vec<DialogueEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain all view commands emitted since the last drain, in order.
    pub fn drain_view(&mut self) -> Vec<ViewCommand> {
        std::mem::take(&mut self.view)
    }

    fn goto(&mut self, id: &str) {
        let Some(graph) = self.graph.as_ref() else {
            return;
        };
        match graph.node(id) {
            Some(node) => {
                let node = node.clone();
                self.enter_node(node);
            }
            None => {
                warn!(node = id, "dialogue node not found");
                self.end_dialogue(true);
            }
        }
    }

    fn enter_node(&mut self, node: DialogueNode) {
        self.view.push(ViewCommand::HideChoices);

        if node.has_choices() && !node.has_line() {
            self.state = Some(PlaybackState::Choosing);
            self.view.push(ViewCommand::SetSpeakerSide(SpeakerSide::Player));
            self.view.push(ViewCommand::SetLine(String::new()));
            self.view.push(ViewCommand::ShowChoices(choice_texts(&node)));
            self.current = Some(node);
            return;
        }

        self.view.push(ViewCommand::SetSpeakerSide(SpeakerSide::Npc));
        let line = node.line.clone();
        self.current = Some(node);
        self.start_typing(line);
    }

    fn start_typing(&mut self, line: String) {
        // Starting a new line always cancels any in-flight reveal.
        self.typing = None;
        self.view.push(ViewCommand::SetLine(String::new()));

        if line.is_empty() {
            self.state = Some(PlaybackState::LineComplete);
            return;
        }

        self.state = Some(PlaybackState::Typing);
        self.typing = Some(Typewriter {
            chars: line.chars().collect(),
            full: line,
            next: 0,
            delay_left: 0,
        });
    }

    fn finish_typing(&mut self) {
        if let Some(typing) = self.typing.take() {
            self.view.push(ViewCommand::SetLine(typing.full));
        }
        self.state = Some(PlaybackState::LineComplete);
    }

    fn advance_after_line(&mut self) {
        let Some(node) = self.current.clone() else {
            return;
        };

        if node.has_choices() {
            self.state = Some(PlaybackState::Choosing);
            self.view.push(ViewCommand::SetSpeakerSide(SpeakerSide::Player));
            self.view.push(ViewCommand::ShowChoices(choice_texts(&node)));
            return;
        }

        if let Some(next) = node.next.as_deref().filter(|n| !n.is_empty()) {
            let next = next.to_string();
            self.goto(&next);
            return;
        }

        self.end_dialogue(true);
    }

    fn end_dialogue(&mut self, natural: bool) {
        let Some(graph) = self.graph.take() else {
            return;
        };

        self.typing = None;
        self.current = None;
        self.state = None;
        self.view.push(ViewCommand::HideChoices);
        self.view.push(ViewCommand::SetLine(String::new()));

        let callback = self.on_finished.take();
        if natural {
            if let Some(callback) = callback {
                callback();
            }
            self.events
                .push(DialogueEvent::Finished { graph: graph.id });
        } else {
            self.events
                .push(DialogueEvent::Interrupted { graph: graph.id });
        }
    }
}

fn choice_texts(node: &DialogueNode) -> Vec<String> {
    node.choices.iter().map(|c| c.text.clone()).collect()
}
