//! Line-oriented transport.

use async_trait::async_trait;
use maze_crawl_core::ChatMessage;
use maze_crawl_runtime::{ChatSubscription, ChatTransport, TransportError};
use tokio::{
    io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Stdin},
    sync::mpsc,
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Sender recorded for lines without a `sender:` prefix.
pub const ANONYMOUS_SENDER: &str = "anonymous";

/// Parses one `sender: text` line.
///
/// The sender must be a single token; otherwise the whole line is attributed
/// to [`ANONYMOUS_SENDER`]. Blank lines yield `None`.
#[must_use]
pub fn parse_line(line: &str) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.split_once(':') {
        Some((sender, text)) if is_sender(sender.trim()) => {
            Some(ChatMessage::new(sender.trim(), text.trim()))
        }
        _ => Some(ChatMessage::new(ANONYMOUS_SENDER, line)),
    }
}

fn is_sender(candidate: &str) -> bool {
    !candidate.is_empty() && !candidate.contains(char::is_whitespace)
}

/// Transport that treats every line of a reader as a chat message.
///
/// The reader is consumed by the first successful [`ChatTransport::connect`];
/// later attempts fail with [`TransportError::Exhausted`].
#[derive(Debug)]
pub struct LineTransport<R> {
    reader: Option<R>,
    relay: Option<JoinHandle<()>>,
}

impl LineTransport<BufReader<Stdin>> {
    /// Reads chat lines from standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R> LineTransport<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    /// Wraps a buffered reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            relay: None,
        }
    }
}

#[async_trait]
impl<R> ChatTransport for LineTransport<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    async fn connect(&mut self, channel: &str) -> Result<ChatSubscription, TransportError> {
        if channel.is_empty() {
            return Err(TransportError::EmptyChannel);
        }
        let reader = self.reader.take().ok_or_else(|| TransportError::Exhausted {
            channel: channel.to_owned(),
        })?;

        let (sender, subscription) = ChatSubscription::channel();
        self.relay = Some(tokio::spawn(relay(reader, sender)));
        info!(%channel, "reading chat lines");
        Ok(subscription)
    }

    async fn disconnect(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }
}

impl<R> Drop for LineTransport<R> {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }
}

async fn relay<R>(reader: R, messages: mpsc::Sender<ChatMessage>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(message) = parse_line(&line) else {
                    continue;
                };
                if messages.send(message).await.is_err() {
                    debug!("chat subscription dropped");
                    return;
                }
            }
            Ok(None) => {
                info!("chat input reached end of stream");
                return;
            }
            Err(error) => {
                warn!(%error, "failed to read chat input");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_lines_carry_their_sender() {
        assert_eq!(
            parse_line("ada: up we go"),
            Some(ChatMessage::new("ada", "up we go"))
        );
        assert_eq!(parse_line("  grace:r  "), Some(ChatMessage::new("grace", "r")));
    }

    #[test]
    fn bare_lines_are_anonymous() {
        assert_eq!(
            parse_line("left"),
            Some(ChatMessage::new(ANONYMOUS_SENDER, "left"))
        );
        assert_eq!(
            parse_line("go up: now"),
            Some(ChatMessage::new(ANONYMOUS_SENDER, "go up: now"))
        );
        assert_eq!(
            parse_line(": d"),
            Some(ChatMessage::new(ANONYMOUS_SENDER, ": d"))
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line(" \t "), None);
    }
}
