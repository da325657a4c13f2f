#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Crawl.
//!
//! The [`World`] owns the maze, the player, the level counters and the queue
//! of accepted moves. It is mutated exclusively through [`apply`], which
//! executes at most one queued move per [`Command::Tick`] and reports the
//! outcome as [`Event`] values.

mod queue;

use std::{sync::Arc, time::Duration};

use maze_crawl_core::{
    BlockReason, CellCoord, Command, Event, GameConfig, GenerationError, Grid, MazeSize,
    MoveCommand, MoveStats, WELCOME_BANNER,
};
use maze_crawl_system_maze_generation::MazeGenerator;

use queue::{CommandQueue, RecentCommands};

const DEFAULT_MAZE_SEED: u64 = 0x6d61_7a65_6372_6177;
const DISCONNECTED_STATUS: &str = "Disconnected";

/// Represents the authoritative Maze Crawl world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    generator: MazeGenerator,
    size_increment: u32,
    transition_delay: Duration,
    grid: Arc<Grid>,
    player: CellCoord,
    level: u32,
    highest_level: u32,
    connected: bool,
    transition_pending: bool,
    queue: CommandQueue,
    recent: RecentCommands,
    status: Option<String>,
    stats: MoveStats,
    tick_index: u64,
}

impl World {
    /// Creates a world at level one, awaiting a chat connection.
    ///
    /// Fails when the configured initial size cannot hold a maze.
    pub fn new(config: &GameConfig) -> Result<Self, GenerationError> {
        let size = MazeSize::new(config.initial_size)?;
        let mut generator = MazeGenerator::from_seed(config.seed.unwrap_or(DEFAULT_MAZE_SEED));
        let grid = generator.generate(size);

        Ok(Self {
            banner: WELCOME_BANNER,
            generator,
            size_increment: config.size_increment,
            transition_delay: config.level_transition_delay(),
            player: grid.start(),
            grid: Arc::new(grid),
            level: 1,
            highest_level: 1,
            connected: false,
            transition_pending: false,
            queue: CommandQueue::new(),
            recent: RecentCommands::with_capacity(config.recent_window),
            status: None,
            stats: MoveStats::default(),
            tick_index: 0,
        })
    }

    fn enqueue(&mut self, command: MoveCommand, out_events: &mut Vec<Event>) {
        let sender = command.sender().to_owned();
        let direction = command.direction();
        self.recent.record(command.clone());
        self.queue.enqueue(command);
        self.stats.accepted = self.stats.accepted.saturating_add(1);
        out_events.push(Event::MoveQueued {
            sender,
            direction,
            queue_len: self.queue.len(),
        });
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        let Some(command) = self.queue.dequeue_one() else {
            return;
        };

        let from = self.player;
        let direction = command.direction();
        let candidate = from.step_clamped(direction, self.grid.size());

        let blocked = if candidate == from {
            Some(BlockReason::Boundary)
        } else if !self.grid.is_open(candidate) {
            Some(BlockReason::Wall)
        } else {
            None
        };

        if let Some(reason) = blocked {
            self.stats.blocked = self.stats.blocked.saturating_add(1);
            out_events.push(Event::MoveBlocked {
                sender: command.sender().to_owned(),
                direction,
                at: from,
                reason,
            });
            return;
        }

        self.player = candidate;
        self.stats.applied = self.stats.applied.saturating_add(1);
        out_events.push(Event::PlayerMoved {
            sender: command.sender().to_owned(),
            direction,
            from,
            to: candidate,
        });

        if candidate == self.grid.exit() {
            out_events.push(Event::ExitReached { level: self.level });
            self.transition_pending = true;
            if self.transition_delay.is_zero() {
                self.complete_level(out_events);
            }
        }
    }

    fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        self.transition_pending = false;
        self.discard_queue(out_events);
        self.level = self.level.saturating_add(1);
        self.highest_level = self.highest_level.max(self.level);

        let size = self.grid.maze_size().grown_by(self.size_increment);
        let grid = self.generator.generate(size);
        self.replace_grid(grid);

        out_events.push(Event::LevelStarted {
            level: self.level,
            size: size.get(),
        });
    }

    fn discard_queue(&mut self, out_events: &mut Vec<Event>) {
        if self.queue.is_empty() {
            return;
        }
        let discarded = self.queue.clear();
        let counted = u64::try_from(discarded).unwrap_or(u64::MAX);
        self.stats.discarded = self.stats.discarded.saturating_add(counted);
        out_events.push(Event::QueueCleared { discarded });
    }

    fn replace_grid(&mut self, grid: Grid) {
        self.player = grid.start();
        self.grid = Arc::new(grid);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginSession { channel } => {
            world.connected = true;
            world.status = Some(format!("Connected to #{channel}"));
            out_events.push(Event::SessionStarted { channel });
        }
        Command::ReportConnectionFailure { reason } => {
            world.connected = false;
            world.status = Some(format!("Connection failed: {reason}"));
            out_events.push(Event::ConnectionFailed { reason });
        }
        Command::EndSession => {
            if world.connected {
                world.connected = false;
                world.status = Some(DISCONNECTED_STATUS.to_owned());
                out_events.push(Event::SessionEnded);
            }
        }
        Command::SubmitMove { command } => world.enqueue(command, out_events),
        Command::Tick => {
            if !world.connected || world.transition_pending {
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            world.step(out_events);
        }
        Command::AdvanceLevel => {
            if world.transition_pending {
                world.complete_level(out_events);
            }
        }
        Command::RegenerateMaze => {
            if world.transition_pending {
                return;
            }
            let size = world.grid.maze_size();
            let grid = world.generator.generate(size);
            world.replace_grid(grid);
            world.discard_queue(out_events);
            out_events.push(Event::MazeRegenerated { size: size.get() });
        }
        Command::LoadMaze { mut grid } => {
            let start = grid.start();
            let exit = grid.exit();
            grid.open(start);
            grid.open(exit);
            let size = grid.size();
            world.transition_pending = false;
            world.replace_grid(grid);
            out_events.push(Event::MazeLoaded { size });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::{sync::Arc, time::Duration};

    use maze_crawl_core::{CellCoord, GameSnapshot, Grid, MoveCommand, MoveStats, Phase};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides shared access to the active maze.
    #[must_use]
    pub fn grid(world: &World) -> &Arc<Grid> {
        &world.grid
    }

    /// Side length of the active maze.
    #[must_use]
    pub fn size(world: &World) -> u32 {
        world.grid.size()
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(world: &World) -> CellCoord {
        world.player
    }

    /// Active level, starting at one.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Highest level reached so far.
    #[must_use]
    pub fn highest_level(world: &World) -> u32 {
        world.highest_level
    }

    /// Lifecycle phase derived from the session and transition flags.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        if !world.connected {
            Phase::AwaitingConnection
        } else if world.transition_pending {
            Phase::LevelComplete
        } else {
            Phase::Playing
        }
    }

    /// Reports whether a level transition awaits [`maze_crawl_core::Command::AdvanceLevel`].
    ///
    /// This stays true across disconnects, unlike [`phase`].
    #[must_use]
    pub fn transition_pending(world: &World) -> bool {
        world.transition_pending
    }

    /// Pause between reaching the exit and the next level; zero advances at once.
    #[must_use]
    pub fn transition_delay(world: &World) -> Duration {
        world.transition_delay
    }

    /// Number of moves awaiting execution.
    #[must_use]
    pub fn queue_len(world: &World) -> usize {
        world.queue.len()
    }

    /// Most recently accepted moves, newest first.
    #[must_use]
    pub fn recent_commands(world: &World) -> Vec<MoveCommand> {
        world.recent.to_vec()
    }

    /// Connection status line, if one was recorded.
    #[must_use]
    pub fn status(world: &World) -> Option<&str> {
        world.status.as_deref()
    }

    /// Running move totals.
    #[must_use]
    pub fn stats(world: &World) -> MoveStats {
        world.stats
    }

    /// Number of ticks that were eligible to consume a move.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures everything a renderer needs for one frame.
    #[must_use]
    pub fn snapshot(world: &World) -> GameSnapshot {
        GameSnapshot {
            phase: phase(world),
            level: world.level,
            highest_level: world.highest_level,
            grid: Arc::clone(&world.grid),
            player: world.player,
            queue_len: world.queue.len(),
            recent: world.recent.to_vec(),
            status: world.status.clone(),
            stats: world.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_world() -> World {
        let mut world = World::new(&GameConfig {
            seed: Some(9),
            ..GameConfig::default()
        })
        .expect("valid configuration");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginSession {
                channel: "the_aia".to_owned(),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn new_world_starts_at_level_one_on_the_start_cell() {
        let world = World::new(&GameConfig::default()).expect("valid configuration");

        assert_eq!(query::level(&world), 1);
        assert_eq!(query::highest_level(&world), 1);
        assert_eq!(query::size(&world), 10);
        assert_eq!(query::player(&world), CellCoord::new(0, 0));
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(query::status(&world).is_none());
    }

    #[test]
    fn undersized_configuration_is_rejected() {
        let config = GameConfig {
            initial_size: 1,
            ..GameConfig::default()
        };
        assert!(matches!(
            World::new(&config),
            Err(GenerationError::InvalidSize { size: 1 })
        ));
    }

    #[test]
    fn begin_session_records_status() {
        let world = connected_world();
        assert_eq!(query::status(&world), Some("Connected to #the_aia"));
    }

    #[test]
    fn ticks_count_only_while_playing() {
        let mut world = World::new(&GameConfig::default()).expect("valid configuration");
        let mut events = Vec::new();

        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::tick_index(&world), 0);

        let mut world = connected_world();
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::tick_index(&world), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn transition_delay_follows_the_configuration() {
        let world = World::new(&GameConfig {
            level_transition_delay_ms: 250,
            ..GameConfig::default()
        })
        .expect("valid configuration");
        assert_eq!(query::transition_delay(&world), Duration::from_millis(250));

        let world = World::new(&GameConfig {
            level_transition_delay_ms: 0,
            ..GameConfig::default()
        })
        .expect("valid configuration");
        assert!(query::transition_delay(&world).is_zero());
    }

    #[test]
    fn end_session_is_idempotent() {
        let mut world = connected_world();
        let mut events = Vec::new();

        apply(&mut world, Command::EndSession, &mut events);
        apply(&mut world, Command::EndSession, &mut events);

        assert_eq!(events, vec![Event::SessionEnded]);
        assert_eq!(query::status(&world), Some(DISCONNECTED_STATUS));
    }
}
