#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that translates chat messages into queued moves.

use std::time::Instant;

use maze_crawl_core::{ChatMessage, Command, Direction, MoveCommand};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Maps a raw chat line to a direction.
///
/// Only the first character that is neither whitespace nor a byte order mark
/// matters, compared case insensitively: `u`, `d`, `l` and `r` select a
/// direction and anything else, including an empty line, is rejected. "up please" is therefore a valid
/// `Up` while "go up" is not.
#[must_use]
pub fn parse(raw: &str) -> Option<Direction> {
    let first = raw
        .chars()
        .find(|character| !character.is_whitespace() && *character != BYTE_ORDER_MARK)?;
    match first.to_ascii_lowercase() {
        'u' => Some(Direction::Up),
        'd' => Some(Direction::Down),
        'l' => Some(Direction::Left),
        'r' => Some(Direction::Right),
        _ => None,
    }
}

/// Chat ingestion system that emits a move command per accepted message.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChatCommands;

impl ChatCommands {
    /// Creates a new chat ingestion system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Converts each accepted message into a [`Command::SubmitMove`].
    ///
    /// Rejected messages are dropped without a trace; ordinary chatter is
    /// expected to vastly outnumber moves.
    pub fn handle(&self, messages: &[ChatMessage], received_at: Instant, out: &mut Vec<Command>) {
        for message in messages {
            if let Some(direction) = parse(&message.text) {
                out.push(Command::SubmitMove {
                    command: MoveCommand::new(direction, message.sender.clone(), received_at),
                });
            }
        }
    }
}
