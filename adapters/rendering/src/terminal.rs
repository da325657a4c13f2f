//! Plain-text backend for terminals and headless hosts.

use std::{
    fmt::Write as _,
    io::{self, Write},
    thread,
    time::Duration,
};

use anyhow::{Context, Result as AnyResult};

use crate::{
    CellKind, FrameControl, FrameInput, Presentation, RenderingBackend, Scene, IDLE_HINT,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Renders a scene as text: a header, the stats bar, the maze and the recent
/// command panel.
#[must_use]
pub fn render_text(title: &str, scene: &Scene) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{title} [{}]", scene.phase_label());

    let stats: Vec<String> = scene
        .stats
        .entries()
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    let _ = writeln!(text, "{}", stats.join(" | "));
    if let Some(status) = &scene.status {
        let _ = writeln!(text, "{status}");
    }

    let size = scene.grid.size();
    for (coord, kind) in scene.grid.cells() {
        text.push(glyph(kind));
        if coord.column() + 1 == size {
            text.push('\n');
        }
    }

    text.push_str("Recent commands:\n");
    if scene.recent.is_empty() {
        let _ = writeln!(text, "  {IDLE_HINT}");
    }
    for line in &scene.recent {
        let _ = writeln!(text, "  {}: {}", line.sender, line.direction);
    }
    text
}

fn glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Wall => '#',
        CellKind::Open => ' ',
        CellKind::Start => 'S',
        CellKind::Exit => 'E',
        CellKind::Player => '@',
    }
}

/// Redraws the scene on standard output whenever it changes.
#[derive(Clone, Copy, Debug)]
pub struct TerminalBackend {
    refresh: Duration,
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl TerminalBackend {
    /// Creates a backend polling for scene changes every `refresh`.
    #[must_use]
    pub const fn new(refresh: Duration) -> Self {
        Self { refresh }
    }
}

impl RenderingBackend for TerminalBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        let stdout = io::stdout();
        let mut drawn: Option<String> = None;

        loop {
            if update_scene(FrameInput::default(), &mut scene) == FrameControl::Exit {
                return Ok(());
            }

            let frame = render_text(&window_title, &scene);
            if drawn.as_deref() != Some(frame.as_str()) {
                let mut out = stdout.lock();
                out.write_all(CLEAR_SCREEN.as_bytes())
                    .and_then(|()| out.write_all(frame.as_bytes()))
                    .and_then(|()| out.flush())
                    .context("failed to draw terminal frame")?;
                drawn = Some(frame);
            }

            thread::sleep(self.refresh);
        }
    }
}
