//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use evergreen_core::Formation;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Outcome of rendering the control panel UI for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the formation toggle button was pressed during this frame.
    pub(crate) formation_toggle_pressed: bool,
}

/// Snapshot of the control panel's layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ControlPanelUiContext {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin.
    pub(crate) background: Color,
    /// Formation the ensemble is heading toward.
    pub(crate) formation: Formation,
    /// Current morph progress.
    pub(crate) progress: f32,
}

/// Caption of the toggle button; it names the action, not the current state.
fn toggle_caption(formation: Formation) -> &'static str {
    match formation {
        Formation::Dispersed => "Assemble The Tree",
        Formation::Assembled => "Release Magic",
    }
}

fn status_label(formation: Formation, progress: f32) -> String {
    let heading = match formation {
        Formation::Dispersed => "Dispersing",
        Formation::Assembled => "Assembling",
    };
    format!("{heading}: {:>3.0}%", progress.clamp(0.0, 1.0) * 100.0)
}

/// Renders the control panel's widgets for the current frame.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext,
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
        .color(Color::from_rgba(0, 77, 37, 255))
        .color_hovered(Color::from_rgba(0, 110, 54, 255))
        .color_clicked(Color::from_rgba(0, 58, 28, 255))
        .color_selected(Color::from_rgba(0, 77, 37, 255))
        .color_selected_hovered(Color::from_rgba(0, 110, 54, 255))
        .color_inactive(Color::from_rgba(0, 58, 28, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut button_pressed = false;
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(None, &status_label(context.formation, context.progress));
        ui.label(None, "Space toggles, arrows orbit, +/- zoom.");
        button_pressed = ui.button(None, toggle_caption(context.formation));
    });

    ui.pop_skin();

    ControlPanelUiResult {
        formation_toggle_pressed: button_pressed,
    }
}
