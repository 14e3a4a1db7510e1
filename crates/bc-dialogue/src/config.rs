/// Configuration for dialogue playback.
#[derive(Debug, Clone)]
pub struct DialogueConfig {
    /// Ticks between revealed characters. 0 reveals the whole line in one tick.
    pub char_delay_ticks: u32,
    /// Whether the advance input may skip an in-flight reveal.
    pub allow_skip_typing: bool,
    /// Total choice repeats tolerated before the failure escalation fires.
    pub max_repeat_count: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            char_delay_ticks: 1,
            allow_skip_typing: true,
            max_repeat_count: 5,
        }
    }
}

impl DialogueConfig {
    /// Set the ticks between revealed characters (0 = whole line per tick).
    pub fn with_char_delay(mut self, ticks: u32) -> Self {
        self.char_delay_ticks = ticks;
        self
    }

    /// Allow or forbid skipping an in-flight reveal.
    pub fn with_allow_skip(mut self, allow: bool) -> Self {
        self.allow_skip_typing = allow;
        self
    }

    /// Set the repeat threshold for the failure escalation.
    pub fn with_max_repeats(mut self, max: u32) -> Self {
        self.max_repeat_count = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = DialogueConfig::default();
        assert_eq!(cfg.char_delay_ticks, 1);
        assert!(cfg.allow_skip_typing);
        assert_eq!(cfg.max_repeat_count, 5);
    }

    #[test]
    fn builder_chain() {
        let cfg = DialogueConfig::default()
            .with_char_delay(0)
            .with_allow_skip(false)
            .with_max_repeats(3);
        assert_eq!(cfg.char_delay_ticks, 0);
        assert!(!cfg.allow_skip_typing);
        assert_eq!(cfg.max_repeat_count, 3);
    }
}
