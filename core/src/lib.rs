#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Crawl engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! actually happened. Renderers never touch the world directly; they consume
//! [`GameSnapshot`] values captured after each applied command.

mod config;

use std::{sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{ConfigError, GameConfig};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "MazeCrawl: Twitch Trials";

/// Smallest side length a maze may be generated with.
pub const MIN_MAZE_SIZE: u32 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Marks the chat session as live so ticks start consuming moves.
    BeginSession {
        /// Chat channel the transport subscribed to.
        channel: String,
    },
    /// Records that the chat transport failed to connect.
    ReportConnectionFailure {
        /// Human readable failure description shown to the operator.
        reason: String,
    },
    /// Marks the chat session as closed; queued moves are retained.
    EndSession,
    /// Appends an accepted chat move to the tail of the command queue.
    SubmitMove {
        /// Move parsed from a chat message.
        command: MoveCommand,
    },
    /// Advances the simulation by one step, consuming at most one queued move.
    Tick,
    /// Completes a level transition previously scheduled by reaching the exit.
    AdvanceLevel,
    /// Replaces the current maze with a freshly generated one of the same size.
    RegenerateMaze,
    /// Replaces the current maze with a prepared layout.
    LoadMaze {
        /// Layout that becomes the active maze.
        grid: Grid,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the chat session became live.
    SessionStarted {
        /// Channel the session is bound to.
        channel: String,
    },
    /// Confirms that the chat session closed.
    SessionEnded,
    /// Reports that the chat transport could not connect.
    ConnectionFailed {
        /// Failure description recorded as the status line.
        reason: String,
    },
    /// Confirms that a move joined the command queue.
    MoveQueued {
        /// Sender that issued the move.
        sender: String,
        /// Direction of the queued move.
        direction: Direction,
        /// Queue length after the move was appended.
        queue_len: usize,
    },
    /// Confirms that the player advanced between two cells.
    PlayerMoved {
        /// Sender whose move was executed.
        sender: String,
        /// Direction of travel.
        direction: Direction,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that a dequeued move produced no motion and was dropped.
    MoveBlocked {
        /// Sender whose move was dropped.
        sender: String,
        /// Direction of the attempted move.
        direction: Direction,
        /// Cell the player remains on.
        at: CellCoord,
        /// Why the move produced no motion.
        reason: BlockReason,
    },
    /// Announces that the player stepped onto the exit cell.
    ExitReached {
        /// Level that was just completed.
        level: u32,
    },
    /// Announces that a new level began with a fresh maze.
    LevelStarted {
        /// Level that is now active.
        level: u32,
        /// Side length of the new maze.
        size: u32,
    },
    /// Announces that the current level's maze was regenerated.
    MazeRegenerated {
        /// Side length of the regenerated maze.
        size: u32,
    },
    /// Announces that a prepared layout replaced the current maze.
    MazeLoaded {
        /// Side length of the loaded maze.
        size: u32,
    },
    /// Reports queued moves that were discarded without being executed.
    QueueCleared {
        /// Number of moves removed from the queue.
        discarded: usize,
    },
}

/// Reasons a dequeued move can fail to move the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// The neighbouring cell is a wall.
    Wall,
    /// The player stands on the maze edge facing outward.
    Boundary,
}

/// Lifecycle phase of the game as observed by adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No chat session is live; ticks are ignored.
    AwaitingConnection,
    /// Ticks consume queued moves.
    Playing,
    /// The exit was reached and the level transition is pending.
    LevelComplete,
}

/// Cardinal movement directions available to the crowd.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a fixed declaration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Column and row delta of a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Lowercase word used when presenting the direction.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Moves one cell in `direction`, clamping each axis to `0..size`.
    ///
    /// Stepping outward from an edge leaves that axis untouched.
    #[must_use]
    pub fn step_clamped(self, direction: Direction, size: u32) -> Self {
        let last = size.saturating_sub(1);
        let (dx, dy) = direction.offset();
        Self {
            column: clamp_axis(self.column, dx, last),
            row: clamp_axis(self.row, dy, last),
        }
    }
}

fn clamp_axis(value: u32, delta: i32, last: u32) -> u32 {
    let shifted = i64::from(value) + i64::from(delta);
    let clamped = shifted.clamp(0, i64::from(last));
    u32::try_from(clamped).unwrap_or(last)
}

/// Side length of a square maze, guaranteed to be at least [`MIN_MAZE_SIZE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MazeSize(u32);

impl MazeSize {
    /// Validates a raw side length.
    pub fn new(value: u32) -> Result<Self, GenerationError> {
        if value < MIN_MAZE_SIZE {
            return Err(GenerationError::InvalidSize { size: value });
        }
        Ok(Self(value))
    }

    /// Retrieves the side length.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the size grown by `increment` cells per side.
    #[must_use]
    pub const fn grown_by(self, increment: u32) -> Self {
        Self(self.0.saturating_add(increment))
    }
}

/// Errors raised while generating a maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The requested side length cannot hold a start and an exit.
    #[error("maze size {size} is below the minimum of {MIN_MAZE_SIZE}")]
    InvalidSize {
        /// Side length that was requested.
        size: u32,
    },
}

/// Passability of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Impassable cell.
    Wall,
    /// Passable cell.
    Open,
}

/// Square matrix of maze cells stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: MazeSize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of the provided size with every cell walled.
    #[must_use]
    pub fn walled(size: MazeSize) -> Self {
        let side = usize::try_from(size.get()).unwrap_or(0);
        Self {
            size,
            cells: vec![Cell::Wall; side.saturating_mul(side)],
        }
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size.get()
    }

    /// Validated side length of the grid.
    #[must_use]
    pub const fn maze_size(&self) -> MazeSize {
        self.size
    }

    /// Top-left cell where every level starts.
    #[must_use]
    pub const fn start(&self) -> CellCoord {
        CellCoord::new(0, 0)
    }

    /// Bottom-right cell that completes the level.
    #[must_use]
    pub const fn exit(&self) -> CellCoord {
        let last = self.size.get() - 1;
        CellCoord::new(last, last)
    }

    /// Returns the cell at `coord`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<Cell> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether `coord` lies inside the grid on an open cell.
    #[must_use]
    pub fn is_open(&self, coord: CellCoord) -> bool {
        self.cell(coord) == Some(Cell::Open)
    }

    /// Marks `coord` as open. Out-of-bounds coordinates are ignored.
    pub fn open(&mut self, coord: CellCoord) {
        if let Some(index) = self.index(coord) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Cell::Open;
            }
        }
    }

    /// Iterates over rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        let side = usize::try_from(self.size.get()).unwrap_or(1).max(1);
        self.cells.chunks(side)
    }

    /// Number of open cells in the grid.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell == Cell::Open).count()
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        let size = self.size.get();
        if coord.column() < size && coord.row() < size {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Message received from the chat transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    /// Identifier of the chatter that sent the message.
    pub sender: String,
    /// Raw message text.
    pub text: String,
}

impl ChatMessage {
    /// Creates a new chat message.
    #[must_use]
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }
}

/// Validated movement instruction derived from a single chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCommand {
    direction: Direction,
    sender: String,
    received_at: Instant,
}

impl MoveCommand {
    /// Creates a move issued by `sender` that arrived at `received_at`.
    #[must_use]
    pub fn new(direction: Direction, sender: impl Into<String>, received_at: Instant) -> Self {
        Self {
            direction,
            sender: sender.into(),
            received_at,
        }
    }

    /// Direction the move requests.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Identifier of the chatter that issued the move.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Monotonic arrival time, used only for presentation.
    #[must_use]
    pub const fn received_at(&self) -> Instant {
        self.received_at
    }
}

/// Running totals of moves handled by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStats {
    /// Moves appended to the queue.
    pub accepted: u64,
    /// Moves that changed the player position.
    pub applied: u64,
    /// Moves dequeued without motion.
    pub blocked: u64,
    /// Moves removed from the queue by a level transition or regeneration.
    pub discarded: u64,
}

impl MoveStats {
    /// Moves that left the queue, whatever their outcome.
    #[must_use]
    pub const fn settled(&self) -> u64 {
        self.applied + self.blocked + self.discarded
    }
}

/// Read-only capture of everything adapters present for a single frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Lifecycle phase at capture time.
    pub phase: Phase,
    /// Active level, starting at one.
    pub level: u32,
    /// Highest level reached during the process lifetime.
    pub highest_level: u32,
    /// Active maze layout; shared with the world until it is replaced.
    pub grid: Arc<Grid>,
    /// Cell occupied by the player.
    pub player: CellCoord,
    /// Number of moves awaiting execution.
    pub queue_len: usize,
    /// Most recently accepted moves, newest first.
    pub recent: Vec<MoveCommand>,
    /// Connection status line, if any was recorded.
    pub status: Option<String>,
    /// Move totals used for reconciliation and diagnostics.
    pub stats: MoveStats,
}

impl GameSnapshot {
    /// Side length of the active maze.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.grid.size()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, Direction, GenerationError, Grid, MazeSize};

    #[test]
    fn step_clamps_at_edges() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step_clamped(Direction::Up, 5), corner);
        assert_eq!(corner.step_clamped(Direction::Left, 5), corner);
        assert_eq!(
            corner.step_clamped(Direction::Right, 5),
            CellCoord::new(1, 0)
        );

        let far = CellCoord::new(4, 4);
        assert_eq!(far.step_clamped(Direction::Down, 5), far);
        assert_eq!(far.step_clamped(Direction::Right, 5), far);
        assert_eq!(far.step_clamped(Direction::Up, 5), CellCoord::new(4, 3));
    }

    #[test]
    fn maze_size_rejects_degenerate_values() {
        assert_eq!(
            MazeSize::new(1),
            Err(GenerationError::InvalidSize { size: 1 })
        );
        assert_eq!(
            MazeSize::new(0),
            Err(GenerationError::InvalidSize { size: 0 })
        );
        assert_eq!(MazeSize::new(2).map(|size| size.get()), Ok(2));
    }

    #[test]
    fn maze_size_growth_saturates() {
        let size = MazeSize::new(u32::MAX - 1).expect("valid size");
        assert_eq!(size.grown_by(2).get(), u32::MAX);
    }

    #[test]
    fn walled_grid_opens_individual_cells() {
        let mut grid = Grid::walled(MazeSize::new(3).expect("valid size"));
        assert_eq!(grid.open_count(), 0);

        grid.open(CellCoord::new(1, 2));
        grid.open(CellCoord::new(7, 7));

        assert!(grid.is_open(CellCoord::new(1, 2)));
        assert!(!grid.is_open(CellCoord::new(2, 1)));
        assert!(!grid.is_open(CellCoord::new(7, 7)));
        assert_eq!(grid.open_count(), 1);
        assert_eq!(grid.exit(), CellCoord::new(2, 2));
        assert_eq!(grid.rows().count(), 3);
    }
}
