//! Single task that owns the world and serialises every mutation.

use std::time::Duration;

use maze_crawl_core::{Command, Event, GameSnapshot, MoveCommand};
use maze_crawl_world::{self as world, query, World};
use thiserror::Error;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, warn};

use crate::scheduler::Ticker;

/// Errors reported by a [`GameHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine task has shut down and no longer accepts commands.
    #[error("the game engine has stopped")]
    Stopped,
}

#[derive(Debug)]
enum EngineMessage {
    Apply(Command),
    Shutdown,
}

/// Cloneable handle through which adapters talk to the engine task.
///
/// Sending never blocks: commands travel over an unbounded channel and are
/// applied in arrival order by the task that owns the world.
#[derive(Clone, Debug)]
pub struct GameHandle {
    commands: mpsc::UnboundedSender<EngineMessage>,
    ticks: mpsc::Sender<()>,
    snapshots: watch::Receiver<GameSnapshot>,
}

impl GameHandle {
    /// Queues a world command for the engine.
    pub fn submit(&self, command: Command) -> Result<(), EngineError> {
        self.commands
            .send(EngineMessage::Apply(command))
            .map_err(|_| EngineError::Stopped)
    }

    /// Queues an accepted chat move.
    pub fn submit_move(&self, command: MoveCommand) -> Result<(), EngineError> {
        self.submit(Command::SubmitMove { command })
    }

    /// Marks the chat session bound to `channel` as live.
    pub fn begin_session(&self, channel: impl Into<String>) -> Result<(), EngineError> {
        self.submit(Command::BeginSession {
            channel: channel.into(),
        })
    }

    /// Records a failed connection attempt.
    pub fn report_connection_failure(&self, reason: impl Into<String>) -> Result<(), EngineError> {
        self.submit(Command::ReportConnectionFailure {
            reason: reason.into(),
        })
    }

    /// Marks the chat session as closed.
    pub fn end_session(&self) -> Result<(), EngineError> {
        self.submit(Command::EndSession)
    }

    /// Requests a fresh maze for the current level.
    pub fn regenerate_maze(&self) -> Result<(), EngineError> {
        self.submit(Command::RegenerateMaze)
    }

    /// Asks the engine task to stop after the commands already sent.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.commands
            .send(EngineMessage::Shutdown)
            .map_err(|_| EngineError::Stopped)
    }

    /// Latest snapshot published by the engine.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every applied command.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshots.clone()
    }

    /// Tick source for a [`crate::Scheduler`].
    #[must_use]
    pub fn ticker(&self) -> Ticker {
        Ticker::new(self.ticks.clone())
    }
}

/// Spawns the engine task that owns `world`.
///
/// Reaching the exit schedules [`Command::AdvanceLevel`] once the world's
/// [`query::transition_delay`] has elapsed. The join handle yields the world once the
/// engine shuts down, either through [`GameHandle::shutdown`] or because every
/// handle was dropped.
pub fn spawn_engine(world: World) -> (GameHandle, JoinHandle<World>) {
    let transition_delay = query::transition_delay(&world);
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (ticks_tx, ticks_rx) = mpsc::channel(1);
    let (snapshots_tx, snapshots_rx) = watch::channel(query::snapshot(&world));

    let engine = Engine {
        world,
        transition_delay,
        commands: commands_rx,
        ticks: ticks_rx,
        snapshots: snapshots_tx,
        pending_transition: None,
        events: Vec::new(),
    };
    let task = tokio::spawn(engine.run());

    let handle = GameHandle {
        commands: commands_tx,
        ticks: ticks_tx,
        snapshots: snapshots_rx,
    };
    (handle, task)
}

struct Engine {
    world: World,
    transition_delay: Duration,
    commands: mpsc::UnboundedReceiver<EngineMessage>,
    ticks: mpsc::Receiver<()>,
    snapshots: watch::Sender<GameSnapshot>,
    pending_transition: Option<Instant>,
    events: Vec<Event>,
}

impl Engine {
    async fn run(mut self) -> World {
        info!(
            level = query::level(&self.world),
            size = query::size(&self.world),
            "game engine started"
        );

        loop {
            let deadline = self.pending_transition;
            tokio::select! {
                message = self.commands.recv() => match message {
                    Some(EngineMessage::Apply(command)) => self.apply(command),
                    Some(EngineMessage::Shutdown) | None => break,
                },
                () = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.pending_transition = None;
                    self.apply(Command::AdvanceLevel);
                }
                Some(()) = self.ticks.recv() => self.apply(Command::Tick),
            }
        }

        info!(
            highest_level = query::highest_level(&self.world),
            "game engine stopped"
        );
        self.world
    }

    fn apply(&mut self, command: Command) {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        for event in &self.events {
            log_event(event);
        }

        self.schedule_transition();
        let _ = self.snapshots.send_replace(query::snapshot(&self.world));
    }

    fn schedule_transition(&mut self) {
        if !query::transition_pending(&self.world) {
            self.pending_transition = None;
            return;
        }

        if self.pending_transition.is_none() {
            self.pending_transition = Some(Instant::now() + self.transition_delay);
            debug!(
                delay_ms = self.transition_delay.as_millis(),
                "level transition scheduled"
            );
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::SessionStarted { channel } => info!(%channel, "chat session started"),
        Event::SessionEnded => info!("chat session ended"),
        Event::ConnectionFailed { reason } => warn!(%reason, "chat connection failed"),
        Event::MoveQueued {
            sender,
            direction,
            queue_len,
        } => debug!(
            %sender,
            direction = direction.label(),
            queue_len = *queue_len,
            "move queued"
        ),
        Event::PlayerMoved {
            sender,
            direction,
            to,
            ..
        } => debug!(
            %sender,
            direction = direction.label(),
            column = to.column(),
            row = to.row(),
            "player moved"
        ),
        Event::MoveBlocked {
            sender,
            direction,
            reason,
            ..
        } => debug!(%sender, direction = direction.label(), ?reason, "move blocked"),
        Event::ExitReached { level } => info!(level = *level, "exit reached"),
        Event::LevelStarted { level, size } => {
            info!(level = *level, size = *size, "level started");
        }
        Event::MazeRegenerated { size } => info!(size = *size, "maze regenerated"),
        Event::MazeLoaded { size } => info!(size = *size, "maze loaded"),
        Event::QueueCleared { discarded } => {
            debug!(discarded = *discarded, "queued moves discarded");
        }
    }
}
