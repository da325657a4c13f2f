#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Maze Crawl.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter uses Macroquad's immediate-mode UI module for the side panel.
//! All UI-specific calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult};
use anyhow::Result;
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use maze_crawl_rendering::{
    palette, Color, FrameControl, FrameInput, Presentation, RenderingBackend, Scene, IDLE_HINT,
};

const PANEL_WIDTH: f32 = 320.0;
const PANEL_UI_HEIGHT: f32 = 300.0;
const STATS_BAR_HEIGHT: f32 = 56.0;
const MARGIN: f32 = 16.0;
const CELL_GAP: f32 = 1.0;
const FONT_SIZE: f32 = 24.0;
const LINE_HEIGHT: f32 = 28.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    regenerate_latched: bool,
}

impl ControlPanelInputState {
    /// Returns whether the panel requested a new maze and clears the latch so
    /// the action fires only once.
    pub fn take_regenerate(&mut self) -> bool {
        let latched = self.regenerate_latched;
        self.regenerate_latched = false;
        latched
    }

    /// Records that the "New Maze" button was pressed this frame.
    pub fn register_regenerate(&mut self) {
        self.regenerate_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `N` requests a fresh maze.
    regenerate_maze: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            regenerate_maze: is_key_pressed(KeyCode::N),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1000,
            window_height: 720,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = self.swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let frame_input = FrameInput {
                    regenerate_maze: keyboard.regenerate_maze
                        || control_panel_input.take_regenerate(),
                };
                if update_scene(frame_input, &mut scene) == FrameControl::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);

                draw_stats_bar(&scene, screen_width);
                draw_maze(&scene, &metrics);
                draw_recent_commands(&scene, screen_width);

                let panel = ControlPanelUiContext {
                    origin: MacroquadVec2::new((screen_width - PANEL_WIDTH).max(0.0), STATS_BAR_HEIGHT),
                    size: MacroquadVec2::new(PANEL_WIDTH, PANEL_UI_HEIGHT),
                    background: to_macroquad_color(palette::OPEN),
                    phase: scene.phase_label(),
                    status: scene.status.as_deref(),
                };
                let mut control_panel_ui = macroquad::ui::root_ui();
                let ControlPanelUiResult { regenerate_pressed } =
                    draw_control_panel_ui(&mut control_panel_ui, &panel);
                if regenerate_pressed {
                    control_panel_input.register_regenerate();
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen placement of the maze for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    origin: Vec2,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let extent = scene.grid.extent();
        let available_width = (screen_width - PANEL_WIDTH - 2.0 * MARGIN).max(0.0);
        let available_height = (screen_height - STATS_BAR_HEIGHT - 2.0 * MARGIN).max(0.0);

        let scale = if extent <= f32::EPSILON {
            1.0
        } else {
            (available_width / extent).min(available_height / extent).min(1.0)
        };
        let scaled_extent = extent * scale;
        let origin = Vec2::new(
            MARGIN + ((available_width - scaled_extent) * 0.5).max(0.0),
            STATS_BAR_HEIGHT + MARGIN + ((available_height - scaled_extent) * 0.5).max(0.0),
        );

        Self {
            scale,
            origin,
            cell_step: scene.grid.cell_length() * scale,
        }
    }

    fn cell_position(&self, cell_origin: Vec2) -> Vec2 {
        self.origin + cell_origin * self.scale
    }
}

fn draw_stats_bar(scene: &Scene, screen_width: f32) {
    let slot = (screen_width / 4.0).max(1.0);
    let label_color = to_macroquad_color(scene.accent);
    let value_color = to_macroquad_color(palette::TEXT);

    for (index, (label, value)) in scene.stats.entries().iter().enumerate() {
        let x = MARGIN + slot * index as f32;
        let label_text = format!("{label}:");
        let _ = macroquad::text::draw_text(&label_text, x, LINE_HEIGHT + 8.0, FONT_SIZE, label_color);
        let offset = macroquad::text::measure_text(&label_text, None, FONT_SIZE as u16, 1.0).width;
        let _ = macroquad::text::draw_text(
            value,
            x + offset + 8.0,
            LINE_HEIGHT + 8.0,
            FONT_SIZE,
            value_color,
        );
    }
}

fn draw_maze(scene: &Scene, metrics: &SceneMetrics) {
    let gap = CELL_GAP.min(metrics.cell_step * 0.1);
    let size = (metrics.cell_step - gap).max(0.0);

    for (coord, kind) in scene.grid.cells() {
        let position = metrics.cell_position(scene.grid.cell_origin(coord));
        let color = to_macroquad_color(kind.color(scene.accent));
        macroquad::shapes::draw_rectangle(position.x, position.y, size, size, color);
    }

    let player = metrics.cell_position(scene.grid.cell_origin(scene.grid.player()));
    let glow = to_macroquad_color(scene.accent.lighten(0.4).faded(0.8));
    macroquad::shapes::draw_rectangle_lines(player.x, player.y, size, size, 2.0, glow);
}

fn draw_recent_commands(scene: &Scene, screen_width: f32) {
    let left = (screen_width - PANEL_WIDTH).max(0.0) + MARGIN;
    let mut baseline = STATS_BAR_HEIGHT + PANEL_UI_HEIGHT + MARGIN + LINE_HEIGHT;
    let heading = to_macroquad_color(scene.accent);
    let _ = macroquad::text::draw_text("Recent Commands", left, baseline, FONT_SIZE, heading);
    baseline += LINE_HEIGHT;

    if scene.recent.is_empty() {
        let muted = to_macroquad_color(palette::MUTED);
        let _ = macroquad::text::draw_text(IDLE_HINT, left, baseline, FONT_SIZE, muted);
        return;
    }

    for line in &scene.recent {
        let sender = format!("{}:", line.sender);
        let sender_color = to_macroquad_color(scene.accent.faded(line.opacity));
        let text_color = to_macroquad_color(palette::TEXT.faded(line.opacity));
        let _ = macroquad::text::draw_text(&sender, left, baseline, FONT_SIZE, sender_color);
        let offset = macroquad::text::measure_text(&sender, None, FONT_SIZE as u16, 1.0).width;
        let _ = macroquad::text::draw_text(
            line.direction,
            left + offset + 8.0,
            baseline,
            FONT_SIZE,
            text_color,
        );
        baseline += LINE_HEIGHT;
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_crawl_core::{CellCoord, GameSnapshot, Grid, MazeSize, MoveStats, Phase};
    use std::sync::Arc;

    fn scene(size: u32) -> Scene {
        let grid = Grid::walled(MazeSize::new(size).expect("valid size"));
        Scene::from_snapshot(&GameSnapshot {
            phase: Phase::Playing,
            level: 1,
            highest_level: 1,
            grid: Arc::new(grid),
            player: CellCoord::new(0, 0),
            queue_len: 0,
            recent: Vec::new(),
            status: None,
            stats: MoveStats::default(),
        })
    }

    #[test]
    fn maze_is_centred_left_of_the_panel() {
        let scene = scene(10);
        let metrics = SceneMetrics::from_scene(&scene, 1000.0, 720.0);

        let available_width = 1000.0 - PANEL_WIDTH - 2.0 * MARGIN;
        let available_height = 720.0 - STATS_BAR_HEIGHT - 2.0 * MARGIN;
        let extent = scene.grid.extent() * metrics.scale;
        assert!(extent <= available_width + 1e-3);
        assert!(extent <= available_height + 1e-3);
        assert!((metrics.origin.x - (MARGIN + (available_width - extent) * 0.5)).abs() < 1e-3);
        assert!(metrics.origin.y >= STATS_BAR_HEIGHT);
    }

    #[test]
    fn small_windows_shrink_the_maze() {
        let scene = scene(20);
        let roomy = SceneMetrics::from_scene(&scene, 2000.0, 2000.0);
        let cramped = SceneMetrics::from_scene(&scene, 600.0, 400.0);

        assert_eq!(roomy.scale, 1.0);
        assert!(cramped.scale < 1.0);
        assert!(cramped.cell_step < roomy.cell_step);
    }

    #[test]
    fn cell_positions_follow_the_origin() {
        let scene = scene(4);
        let metrics = SceneMetrics::from_scene(&scene, 1000.0, 720.0);
        let origin = scene.grid.cell_origin(CellCoord::new(1, 2));

        let position = metrics.cell_position(origin);

        assert_eq!(
            position,
            metrics.origin + Vec2::new(metrics.cell_step, 2.0 * metrics.cell_step)
        );
    }
}
