//! Binds a chat transport to the engine.

use std::time::{Duration, Instant};

use maze_crawl_core::GameSnapshot;
use maze_crawl_system_chat_commands::ChatCommands;
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, info, warn};

use crate::{
    engine::{EngineError, GameHandle},
    transport::{normalize_channel, ChatSubscription, ChatTransport, TransportError},
};

/// Errors returned by [`Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The chat transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The engine stopped accepting commands.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Delays between reconnection attempts, doubling up to a ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
}

impl Backoff {
    /// Starts at `initial` and never waits longer than `max`.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max: max.max(initial),
        }
    }

    fn next(self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30))
    }
}

/// Owns a transport and forwards its chat moves to the engine.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    handle: GameHandle,
    commands: ChatCommands,
    pump: Option<JoinHandle<()>>,
}

impl<T: ChatTransport> Session<T> {
    /// Creates a disconnected session.
    pub fn new(transport: T, handle: GameHandle) -> Self {
        Self {
            transport,
            handle,
            commands: ChatCommands::new(),
            pump: None,
        }
    }

    /// Joins `channel`, replacing any active connection.
    ///
    /// Failures are reported to the engine as well as returned, so the
    /// renderer can show them while the game keeps awaiting a connection.
    pub async fn connect(&mut self, channel: &str) -> Result<(), SessionError> {
        self.disconnect().await?;

        let channel = match normalize_channel(channel) {
            Ok(channel) => channel,
            Err(error) => {
                self.handle.report_connection_failure(error.to_string())?;
                return Err(error.into());
            }
        };

        match self.transport.connect(&channel).await {
            Ok(subscription) => {
                self.handle.begin_session(channel.as_str())?;
                info!(%channel, "chat session connected");
                let pump = pump(subscription, self.handle.clone(), self.commands);
                self.pump = Some(tokio::spawn(pump));
                Ok(())
            }
            Err(error) => {
                warn!(%channel, %error, "chat connection failed");
                self.handle.report_connection_failure(error.to_string())?;
                Err(error.into())
            }
        }
    }

    /// Keeps `channel` joined until the engine stops.
    ///
    /// Failed attempts and dropped streams are retried after `backoff`;
    /// a successful connection resets the delay. Errors that retrying cannot
    /// cure end the loop early.
    pub async fn run(&mut self, channel: &str, backoff: Backoff) {
        let mut snapshots = self.handle.subscribe();
        let mut delay = backoff.initial;

        loop {
            match self.connect(channel).await {
                Ok(()) => {
                    delay = backoff.initial;
                    tokio::select! {
                        () = self.hang_up() => {}
                        () = engine_stopped(&mut snapshots) => break,
                    }
                    info!(%channel, "chat stream lost");
                }
                Err(SessionError::Engine(_)) => break,
                Err(SessionError::Transport(error)) if !error.is_retryable() => {
                    warn!(%channel, %error, "giving up on chat");
                    break;
                }
                Err(SessionError::Transport(_)) => {}
            }

            debug!(%channel, delay_ms = delay.as_millis(), "reconnecting after delay");
            tokio::select! {
                () = time::sleep(delay) => {}
                () = engine_stopped(&mut snapshots) => break,
            }
            delay = backoff.next(delay);
        }

        let _ = self.disconnect().await;
    }

    async fn hang_up(&mut self) {
        if let Some(pump) = self.pump.as_mut() {
            let _ = pump.await;
        }
    }

    /// Leaves the active channel. Queued moves stay in the world.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        let Some(pump) = self.pump.take() else {
            return Ok(());
        };
        pump.abort();
        self.transport.disconnect().await;
        self.handle.end_session()?;
        info!("chat session disconnected");
        Ok(())
    }

    /// Reports whether messages are still being forwarded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.pump.as_ref().is_some_and(|pump| !pump.is_finished())
    }
}

impl<T> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

async fn engine_stopped(snapshots: &mut watch::Receiver<GameSnapshot>) {
    while snapshots.changed().await.is_ok() {}
}

async fn pump(mut subscription: ChatSubscription, handle: GameHandle, commands: ChatCommands) {
    let mut batch = Vec::new();
    while let Some(message) = subscription.recv().await {
        commands.handle(
            std::slice::from_ref(&message),
            Instant::now(),
            &mut batch,
        );
        for command in batch.drain(..) {
            if handle.submit(command).is_err() {
                debug!("engine stopped, chat pump exiting");
                return;
            }
        }
    }

    info!("chat stream ended");
    let _ = handle.end_session();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_its_ceiling() {
        let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(5));

        assert_eq!(backoff.next(Duration::from_secs(1)), Duration::from_secs(2));
        assert_eq!(backoff.next(Duration::from_secs(4)), Duration::from_secs(5));
        assert_eq!(backoff.next(Duration::from_secs(5)), Duration::from_secs(5));
    }

    #[test]
    fn ceiling_never_undercuts_the_first_delay() {
        let backoff = Backoff::new(Duration::from_secs(3), Duration::from_secs(1));
        assert_eq!(backoff.next(Duration::from_secs(3)), Duration::from_secs(3));
    }
}
