//! Seam between chat networks and the engine.

use async_trait::async_trait;
use maze_crawl_core::ChatMessage;
use thiserror::Error;
use tokio::sync::mpsc;

const SUBSCRIPTION_CAPACITY: usize = 256;

/// Errors raised while establishing or holding a chat connection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel name was blank after normalisation.
    #[error("channel name must not be empty")]
    EmptyChannel,
    /// Underlying socket or stream failure.
    #[error("transport i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The remote side closed the stream before the channel was joined.
    #[error("connection closed before joining #{channel}")]
    Closed {
        /// Channel that was being joined.
        channel: String,
    },
    /// Joining did not complete in time.
    #[error("timed out joining #{channel}")]
    TimedOut {
        /// Channel that was being joined.
        channel: String,
    },
    /// The source was already consumed and cannot deliver more chat.
    #[error("chat source for #{channel} is exhausted")]
    Exhausted {
        /// Channel that was being joined.
        channel: String,
    },
}

impl TransportError {
    /// Reports whether connecting again may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::EmptyChannel | Self::Exhausted { .. })
    }
}

/// Live stream of chat messages from one channel.
///
/// The stream ends when the transport disconnects or the remote closes.
#[derive(Debug)]
pub struct ChatSubscription {
    messages: mpsc::Receiver<ChatMessage>,
}

impl ChatSubscription {
    /// Wraps a receiver fed by a transport reader task.
    #[must_use]
    pub fn new(messages: mpsc::Receiver<ChatMessage>) -> Self {
        Self { messages }
    }

    /// Creates a subscription together with the sender that feeds it.
    #[must_use]
    pub fn channel() -> (mpsc::Sender<ChatMessage>, Self) {
        let (sender, receiver) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        (sender, Self::new(receiver))
    }

    /// Waits for the next message, returning `None` once the stream ended.
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.messages.recv().await
    }
}

/// A source of chat messages for a named channel.
#[async_trait]
pub trait ChatTransport: Send {
    /// Joins `channel`, which has already been normalised.
    async fn connect(&mut self, channel: &str) -> Result<ChatSubscription, TransportError>;

    /// Leaves the current channel. Calling this while disconnected is a no-op.
    async fn disconnect(&mut self);
}

/// Trims whitespace and a leading `#`, then lowercases the name.
pub fn normalize_channel(raw: &str) -> Result<String, TransportError> {
    let trimmed = raw.trim();
    let name = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if name.is_empty() {
        return Err(TransportError::EmptyChannel);
    }
    Ok(name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_normalised() {
        assert_eq!(normalize_channel("  #The_AIA ").unwrap(), "the_aia");
        assert_eq!(normalize_channel("speedrun").unwrap(), "speedrun");
    }

    #[test]
    fn blank_channel_names_are_rejected() {
        assert!(matches!(
            normalize_channel("   "),
            Err(TransportError::EmptyChannel)
        ));
        assert!(matches!(
            normalize_channel("#"),
            Err(TransportError::EmptyChannel)
        ));
    }
}
