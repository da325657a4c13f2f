//! Anonymous Twitch chat over IRC.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use maze_crawl_core::ChatMessage;
use maze_crawl_runtime::{ChatSubscription, ChatTransport, TransportError};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::mpsc,
    task::JoinHandle,
    time,
};
use tracing::{debug, info, warn};

use crate::irc::{self, IrcLine};

/// Plain-text Twitch IRC endpoint.
pub const TWITCH_IRC_ADDRESS: &str = "irc.chat.twitch.tv:6667";

/// Time allowed for connecting and joining a channel.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only Twitch chat client using an anonymous `justinfan` login.
#[derive(Debug)]
pub struct TwitchTransport {
    address: String,
    join_timeout: Duration,
    relay: Option<JoinHandle<()>>,
}

impl Default for TwitchTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TwitchTransport {
    /// Targets the public Twitch endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_address(TWITCH_IRC_ADDRESS)
    }

    /// Targets a custom IRC endpoint speaking the Twitch dialect.
    #[must_use]
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            relay: None,
        }
    }

    /// Overrides how long connecting and joining may take.
    #[must_use]
    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }
}

#[async_trait]
impl ChatTransport for TwitchTransport {
    async fn connect(&mut self, channel: &str) -> Result<ChatSubscription, TransportError> {
        if channel.is_empty() {
            return Err(TransportError::EmptyChannel);
        }
        self.disconnect().await;

        let nick = anonymous_nick();
        debug!(address = %self.address, %nick, %channel, "joining twitch chat");
        let connection = time::timeout(self.join_timeout, join(&self.address, &nick, channel))
            .await
            .map_err(|_| TransportError::TimedOut {
                channel: channel.to_owned(),
            })??;

        let (sender, subscription) = ChatSubscription::channel();
        self.relay = Some(tokio::spawn(relay(connection, channel.to_owned(), sender)));
        info!(%channel, "joined twitch chat");
        Ok(subscription)
    }

    async fn disconnect(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
            debug!("left twitch chat");
        }
    }
}

impl Drop for TwitchTransport {
    fn drop(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.abort();
        }
    }
}

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn send(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await
    }
}

fn anonymous_nick() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.subsec_nanos());
    format!("justinfan{}", 10_000 + nanos % 90_000)
}

async fn join(address: &str, nick: &str, channel: &str) -> Result<Connection, TransportError> {
    let stream = TcpStream::connect(address).await?;
    let (reader, writer) = stream.into_split();
    let mut connection = Connection {
        lines: BufReader::new(reader).lines(),
        writer,
    };

    connection.send(&format!("NICK {nick}")).await?;
    connection.send(&format!("JOIN #{channel}")).await?;

    while let Some(line) = connection.lines.next_line().await? {
        match irc::parse(&line) {
            IrcLine::Ping(payload) => connection.send(&format!("PONG :{payload}")).await?,
            IrcLine::Joined { channel: joined } if joined == channel => return Ok(connection),
            _ => {}
        }
    }

    Err(TransportError::Closed {
        channel: channel.to_owned(),
    })
}

async fn relay(mut connection: Connection, channel: String, messages: mpsc::Sender<ChatMessage>) {
    loop {
        let line = match connection.lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!(%channel, "twitch closed the connection");
                return;
            }
            Err(error) => {
                warn!(%channel, %error, "failed to read twitch chat");
                return;
            }
        };

        match irc::parse(&line) {
            IrcLine::Ping(payload) => {
                let pong = format!("PONG :{payload}");
                if let Err(error) = connection.send(&pong).await {
                    warn!(%channel, %error, "failed to answer twitch keep-alive");
                    return;
                }
            }
            IrcLine::Privmsg {
                sender,
                channel: target,
                text,
            } if target == channel => {
                if messages.send(ChatMessage::new(sender, text)).await.is_err() {
                    debug!(%channel, "chat subscription dropped");
                    return;
                }
            }
            IrcLine::Reconnect => {
                info!(%channel, "twitch requested a reconnect");
                return;
            }
            _ => {}
        }
    }
}
