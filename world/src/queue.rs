//! Ordered buffers of accepted moves.

use std::collections::VecDeque;

use maze_crawl_core::MoveCommand;

/// FIFO of accepted moves awaiting execution.
///
/// The queue is unbounded and performs no deduplication; insertion order is
/// arrival order.
#[derive(Clone, Debug, Default)]
pub(crate) struct CommandQueue {
    pending: VecDeque<MoveCommand>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a move to the tail.
    pub(crate) fn enqueue(&mut self, command: MoveCommand) {
        self.pending.push_back(command);
    }

    /// Removes and returns the head, or `None` when the queue is empty.
    pub(crate) fn dequeue_one(&mut self) -> Option<MoveCommand> {
        self.pending.pop_front()
    }

    /// Number of moves awaiting execution.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no moves are waiting.
    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops every pending move, returning how many were discarded.
    pub(crate) fn clear(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }
}

/// Sliding window over the most recently accepted moves, newest first.
#[derive(Clone, Debug)]
pub(crate) struct RecentCommands {
    capacity: usize,
    entries: VecDeque<MoveCommand>,
}

impl RecentCommands {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub(crate) fn record(&mut self, command: MoveCommand) {
        self.entries.push_front(command);
        self.entries.truncate(self.capacity);
    }

    pub(crate) fn to_vec(&self) -> Vec<MoveCommand> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use maze_crawl_core::Direction;

    use super::*;

    fn command(sender: &str, direction: Direction) -> MoveCommand {
        MoveCommand::new(direction, sender, Instant::now())
    }

    #[test]
    fn queue_is_first_in_first_out() {
        let mut queue = CommandQueue::new();
        let first = command("a", Direction::Up);
        let second = command("b", Direction::Left);

        queue.enqueue(first.clone());
        queue.enqueue(second.clone());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue_one(), Some(first));
        assert_eq!(queue.dequeue_one(), Some(second));
        assert_eq!(queue.dequeue_one(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn queue_keeps_duplicates() {
        let mut queue = CommandQueue::new();
        let repeated = command("a", Direction::Down);

        queue.enqueue(repeated.clone());
        queue.enqueue(repeated.clone());

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dequeue_one(), Some(repeated));
        assert_eq!(queue.clear(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn recent_window_evicts_oldest_first() {
        let mut recent = RecentCommands::with_capacity(3);
        for sender in ["a", "b", "c", "d", "e"] {
            recent.record(command(sender, Direction::Right));
        }

        let senders: Vec<_> = recent
            .to_vec()
            .iter()
            .map(|entry| entry.sender().to_owned())
            .collect();
        assert_eq!(senders, vec!["e", "d", "c"]);
    }
}
