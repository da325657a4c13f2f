//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the control panel UI for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the "New Maze" button was pressed during this frame.
    pub(crate) regenerate_pressed: bool,
}

/// Layout and text of the control panel for the current frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin.
    pub(crate) background: Color,
    /// Phase description shown as the panel heading.
    pub(crate) phase: &'a str,
    /// Connection status line, if any.
    pub(crate) status: Option<&'a str>,
}

/// Renders the control panel's widgets for the current frame.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: &ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(17, 17, 51, 255))
        .color_hovered(Color::from_rgba(34, 34, 85, 255))
        .color_clicked(Color::from_rgba(10, 10, 26, 255))
        .color_selected(Color::from_rgba(17, 17, 51, 255))
        .color_selected_hovered(Color::from_rgba(34, 34, 85, 255))
        .color_inactive(Color::from_rgba(10, 10, 26, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut regenerate_pressed = false;
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, context.phase);
        ui.label(None, context.status.unwrap_or("Not connected"));
        ui.label(None, "Chat Commands:");
        ui.label(None, "u / d / l / r (or up, down, left, right)");
        ui.label(None, "N: new maze   Esc/Q: quit");

        regenerate_pressed = ui.button(None, "New Maze");
    });

    ui.pop_skin();

    ControlPanelUiResult { regenerate_pressed }
}
