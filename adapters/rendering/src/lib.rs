#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Crawl adapters.

mod terminal;

use std::sync::Arc;

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_crawl_core::{Cell, CellCoord, GameSnapshot, Grid, Phase};

pub use terminal::{render_text, TerminalBackend};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns the same color with its alpha scaled by `opacity`.
    #[must_use]
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            alpha: self.alpha * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fixed colors of the neon theme.
pub mod palette {
    use super::Color;

    /// Backdrop behind the maze.
    pub const BACKGROUND: Color = Color::from_rgb_u8(0x02, 0x02, 0x12);
    /// Impassable cells.
    pub const WALL: Color = Color::from_rgb_u8(0x11, 0x11, 0x33);
    /// Passable cells.
    pub const OPEN: Color = Color::from_rgb_u8(0x0a, 0x0a, 0x1a);
    /// The start cell.
    pub const START: Color = Color::from_rgb_u8(0x00, 0xff, 0x88);
    /// The exit cell.
    pub const EXIT: Color = Color::from_rgb_u8(0xff, 0x00, 0x88);
    /// Primary text.
    pub const TEXT: Color = Color::from_rgb_u8(0xff, 0xff, 0xff);
    /// Hints and secondary text.
    pub const MUTED: Color = Color::from_rgb_u8(0x66, 0x66, 0x66);
    /// Accent colors, one per level, repeating every five levels.
    pub const NEON_ACCENTS: [Color; 5] = [
        Color::from_rgb_u8(0x00, 0xff, 0xff),
        Color::from_rgb_u8(0x00, 0xff, 0x88),
        Color::from_rgb_u8(0xff, 0x00, 0xff),
        Color::from_rgb_u8(0xff, 0xff, 0x00),
        Color::from_rgb_u8(0xff, 0x00, 0x88),
    ];
}

/// Accent color for `level`, cycling through [`palette::NEON_ACCENTS`].
#[must_use]
pub fn level_accent(level: u32) -> Color {
    let accents = palette::NEON_ACCENTS;
    let index = usize::try_from(level.saturating_sub(1)).unwrap_or(0) % accents.len();
    accents[index]
}

/// Opacity of the recent command at `index`, where zero is the newest.
#[must_use]
pub fn recent_opacity(index: usize) -> f32 {
    (1.0 - 0.15 * index as f32).max(0.0)
}

/// Hint shown while no chat command has been accepted yet.
pub const IDLE_HINT: &str = "Waiting for chat input...";

/// What a single maze cell shows, in drawing precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Impassable cell.
    Wall,
    /// Passable cell.
    Open,
    /// The level's start cell.
    Start,
    /// The level's exit cell.
    Exit,
    /// The cell occupied by the player; drawn over everything else.
    Player,
}

impl CellKind {
    /// Fill color given the current level accent.
    #[must_use]
    pub const fn color(self, accent: Color) -> Color {
        match self {
            Self::Wall => palette::WALL,
            Self::Open => palette::OPEN,
            Self::Start => palette::START,
            Self::Exit => palette::EXIT,
            Self::Player => accent,
        }
    }
}

/// Cell-by-cell description of the active maze.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPresentation {
    source: Arc<Grid>,
    player: CellCoord,
    cell_length: f32,
    cells: Vec<CellKind>,
}

impl GridPresentation {
    /// Largest side length the drawn maze may occupy.
    pub const MAX_EXTENT: f32 = 600.0;

    /// Upper bound for a single cell so small mazes stay compact.
    pub const MAX_CELL_LENGTH: f32 = 60.0;

    /// Classifies every cell of `grid` with the player at `player`.
    #[must_use]
    pub fn new(grid: &Arc<Grid>, player: CellCoord) -> Self {
        let size = grid.size();
        let mut cells = Vec::with_capacity(grid.rows().map(<[Cell]>::len).sum());
        for row in 0..size {
            for column in 0..size {
                cells.push(base_kind(grid, CellCoord::new(column, row)));
            }
        }

        let mut presentation = Self {
            source: Arc::clone(grid),
            player,
            cell_length: (Self::MAX_EXTENT / size.max(1) as f32).min(Self::MAX_CELL_LENGTH),
            cells,
        };
        presentation.set(player, CellKind::Player);
        presentation
    }

    /// Side length of the maze in cells.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.source.size()
    }

    /// Side length of a drawn cell.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Side length of the whole drawn maze.
    #[must_use]
    pub fn extent(&self) -> f32 {
        self.size() as f32 * self.cell_length
    }

    /// Cell occupied by the player.
    #[must_use]
    pub const fn player(&self) -> CellCoord {
        self.player
    }

    /// What the cell at `coord` shows, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<CellKind> {
        self.index(coord).map(|index| self.cells[index])
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, CellKind)> + '_ {
        let size = self.size().max(1);
        (0u32..).zip(self.cells.iter()).map(move |(index, kind)| {
            (CellCoord::new(index % size, index / size), *kind)
        })
    }

    /// Top-left corner of `coord` relative to the maze origin.
    #[must_use]
    pub fn cell_origin(&self, coord: CellCoord) -> Vec2 {
        Vec2::new(coord.column() as f32, coord.row() as f32) * self.cell_length
    }

    fn sync(&mut self, grid: &Arc<Grid>, player: CellCoord) {
        if !Arc::ptr_eq(&self.source, grid) {
            *self = Self::new(grid, player);
            return;
        }
        if player != self.player {
            let previous = self.player;
            self.set(previous, base_kind(&self.source, previous));
            self.set(player, CellKind::Player);
            self.player = player;
        }
    }

    fn set(&mut self, coord: CellCoord, kind: CellKind) {
        if let Some(index) = self.index(coord) {
            self.cells[index] = kind;
        }
    }

    fn index(&self, coord: CellCoord) -> Option<usize> {
        let size = self.size();
        if coord.column() >= size || coord.row() >= size {
            return None;
        }
        usize::try_from(coord.row() * size + coord.column()).ok()
    }
}

fn base_kind(grid: &Grid, coord: CellCoord) -> CellKind {
    if coord == grid.exit() {
        CellKind::Exit
    } else if coord == grid.start() {
        CellKind::Start
    } else if grid.is_open(coord) {
        CellKind::Open
    } else {
        CellKind::Wall
    }
}

/// Headline numbers shown above the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatsBar {
    /// Active level.
    pub level: u32,
    /// Maze side length.
    pub size: u32,
    /// Moves waiting to execute.
    pub queue_len: usize,
    /// Highest level reached.
    pub highest_level: u32,
}

impl StatsBar {
    /// Label and value pairs in display order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, String); 4] {
        [
            ("Level", self.level.to_string()),
            ("Size", format!("{0}x{0}", self.size)),
            ("Queue", self.queue_len.to_string()),
            ("High Score", self.highest_level.to_string()),
        ]
    }
}

/// One line of the recent command panel.
#[derive(Clone, Debug, PartialEq)]
pub struct RecentCommandLine {
    /// Chat user that sent the move.
    pub sender: String,
    /// Direction word.
    pub direction: &'static str,
    /// Opacity in the range 0.0..=1.0, lower for older commands.
    pub opacity: f32,
}

/// Everything a backend draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Lifecycle phase of the game.
    pub phase: Phase,
    /// Accent color of the active level.
    pub accent: Color,
    /// The maze and the player.
    pub grid: GridPresentation,
    /// Headline numbers.
    pub stats: StatsBar,
    /// Recently accepted commands, newest first.
    pub recent: Vec<RecentCommandLine>,
    /// Connection status line.
    pub status: Option<String>,
}

impl Scene {
    /// Builds a scene from a world snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            phase: snapshot.phase,
            accent: level_accent(snapshot.level),
            grid: GridPresentation::new(&snapshot.grid, snapshot.player),
            stats: stats_bar(snapshot),
            recent: recent_lines(snapshot),
            status: snapshot.status.clone(),
        }
    }

    /// Refreshes the scene, reclassifying cells only when the maze changed.
    pub fn update(&mut self, snapshot: &GameSnapshot) {
        self.phase = snapshot.phase;
        self.accent = level_accent(snapshot.level);
        self.grid.sync(&snapshot.grid, snapshot.player);
        self.stats = stats_bar(snapshot);
        self.recent = recent_lines(snapshot);
        self.status.clone_from(&snapshot.status);
    }

    /// Short description of the phase for headers.
    #[must_use]
    pub const fn phase_label(&self) -> &'static str {
        match self.phase {
            Phase::AwaitingConnection => "Awaiting connection",
            Phase::Playing => "Playing",
            Phase::LevelComplete => "Level complete!",
        }
    }
}

fn stats_bar(snapshot: &GameSnapshot) -> StatsBar {
    StatsBar {
        level: snapshot.level,
        size: snapshot.size(),
        queue_len: snapshot.queue_len,
        highest_level: snapshot.highest_level,
    }
}

fn recent_lines(snapshot: &GameSnapshot) -> Vec<RecentCommandLine> {
    snapshot
        .recent
        .iter()
        .enumerate()
        .map(|(index, command)| RecentCommandLine {
            sender: command.sender().to_owned(),
            direction: command.direction().label(),
            opacity: recent_opacity(index),
        })
        .collect()
}

/// Operator requests captured by a backend during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// The operator asked for a fresh maze.
    pub regenerate_maze: bool,
}

/// Whether a backend keeps presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Draw another frame.
    Continue,
    /// Close the presentation.
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Maze Crawl scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the operator input
    /// captured for the frame and may mutate the scene before it is rendered.
    /// Returning [`FrameControl::Exit`] ends the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameControl + 'static;
}
