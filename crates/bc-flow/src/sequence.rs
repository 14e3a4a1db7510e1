use std::collections::VecDeque;

/// An ordered queue of dialogue graph ids to play back to back.
///
/// Follow-up graphs after a level and penalty sequences both flow through
/// this: each natural dialogue end pops the next id. An interrupt leaves
/// the queue untouched.
#[derive(Debug, Clone, Default)]
pub struct DialogueSequence {
    pending: VecDeque<String>,
}

impl DialogueSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a graph id to the back of the queue.
    pub fn enqueue(&mut self, graph: impl Into<String>) {
        self.pending.push_back(graph.into());
    }

    /// Insert graph ids at the front of the queue, in the given order.
    pub fn interject<I>(&mut self, graphs: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        for graph in graphs.into_iter().rev() {
            self.pending.push_front(graph);
        }
    }

    /// Pop the next graph id to play.
    pub fn next_graph(&mut self) -> Option<String> {
        self.pending.pop_front()
    }

    /// Whether any graphs are queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of queued graphs.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Drop all queued graphs.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_enqueue_order() {
        let mut seq = DialogueSequence::new();
        seq.enqueue("a");
        seq.enqueue("b");
        assert_eq!(seq.next_graph().as_deref(), Some("a"));
        assert_eq!(seq.next_graph().as_deref(), Some("b"));
        assert_eq!(seq.next_graph(), None);
    }

    #[test]
    fn interject_preserves_given_order_ahead_of_queue() {
        let mut seq = DialogueSequence::new();
        seq.enqueue("later");
        seq.interject(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(seq.next_graph().as_deref(), Some("first"));
        assert_eq!(seq.next_graph().as_deref(), Some("second"));
        assert_eq!(seq.next_graph().as_deref(), Some("later"));
    }
}
