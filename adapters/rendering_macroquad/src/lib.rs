#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Evergreen.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so
//! the adapter depends on macroquad without its default `audio` feature.
//!
//! Prototype meshes are transformed and shaded on the CPU every frame and
//! submitted as vertex-coloured triangle batches through a perspective camera
//! that orbits the ensemble. The control panel lives in the local `ui` module
//! so Macroquad UI types stay out of the renderer.

mod mesh;
mod ui;

use self::{
    mesh::{MeshBatch, PrototypeLibrary},
    ui::{draw_control_panel_ui, ControlPanelUiContext, ControlPanelUiResult},
};
use anyhow::Result;
use evergreen_rendering::{CameraRig, Color, FrameInput, Presentation, RenderingBackend, Scene};
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    input::{is_key_down, is_key_pressed, mouse_wheel, KeyCode},
    math::{vec2, vec3},
};
use std::time::{Duration, Instant};

/// Width of the control panel docked to the right edge of the window.
const CONTROL_PANEL_WIDTH: f32 = 260.0;

/// Orbit speed applied while an arrow key is held, in radians per second.
const ORBIT_SPEED: f32 = 1.2;

/// Distance covered per second while a zoom key is held.
const ZOOM_SPEED: f32 = 12.0;

/// Distance covered per mouse wheel notch.
const ZOOM_WHEEL_STEP: f32 = 1.5;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    formation_toggle_latched: bool,
}

impl ControlPanelInputState {
    /// Returns whether the UI requested a formation toggle and clears the latch
    /// so the action fires only once.
    pub fn take_formation_toggle(&mut self) -> bool {
        let latched = self.formation_toggle_latched;
        self.formation_toggle_latched = false;
        latched
    }

    /// Records that the control-panel button requested a formation toggle this frame.
    pub fn register_formation_toggle(&mut self) {
        self.formation_toggle_latched = true;
    }
}

/// Snapshot of the keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the render loop.
    quit_requested: bool,
    /// `Space` or `Enter` toggles between the two formations.
    toggle_formation: bool,
    /// Held `Left`/`Right` arrows, as -1, 0 or 1.
    orbit_azimuth: f32,
    /// Held `Up`/`Down` arrows, as -1, 0 or 1.
    orbit_polar: f32,
    /// Held `-`/`+` keys, as -1, 0 or 1; positive moves away.
    zoom: f32,
    /// Mouse wheel notches scrolled this frame; positive moves closer.
    wheel: f32,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let axis = |negative: KeyCode, positive: KeyCode| {
            f32::from(u8::from(is_key_down(positive))) - f32::from(u8::from(is_key_down(negative)))
        };
        let (_, wheel) = mouse_wheel();

        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_formation: is_key_pressed(KeyCode::Space) || is_key_pressed(KeyCode::Enter),
            orbit_azimuth: axis(KeyCode::Left, KeyCode::Right),
            orbit_polar: axis(KeyCode::Up, KeyCode::Down),
            zoom: axis(KeyCode::Equal, KeyCode::Minus),
            wheel: if wheel > 0.0 {
                1.0
            } else if wheel < 0.0 {
                -1.0
            } else {
                0.0
            },
        }
    }
}

/// Applies idle rotation and held keys to the camera for a frame of `dt` seconds.
fn steer_camera(camera: &mut CameraRig, keyboard: KeyboardShortcuts, dt: f32) {
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
    camera.advance(dt);
    camera.orbit(
        keyboard.orbit_azimuth * ORBIT_SPEED * dt,
        keyboard.orbit_polar * ORBIT_SPEED * dt,
    );
    camera.zoom(keyboard.zoom * ZOOM_SPEED * dt - keyboard.wheel * ZOOM_WHEEL_STEP);
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
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

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Wall-clock cost of the phases of one frame.
#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    update: Duration,
    render: Duration,
    triangles: usize,
}

/// Averages reported once per second.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    avg_update: Duration,
    avg_render: Duration,
    triangles: usize,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    update_accum: Duration,
    render_accum: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the averages once one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.update_accum += breakdown.update;
        self.render_accum += breakdown.render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let metrics = FpsMetrics {
            per_second: self.frames as f32 / self.elapsed.as_secs_f32(),
            avg_update: self.update_accum / self.frames,
            avg_render: self.render_accum / self.frames,
            triangles: breakdown.triangles,
        };
        *self = Self::default();
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
            materials,
            camera,
            lighting,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 1280,
            window_height: 800,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut camera = camera;
            let prototypes = PrototypeLibrary::new();
            let mut batch = MeshBatch::new();

            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(clear_color.lighten(0.08));
            let mut fps_counter = FpsCounter::default();
            let mut control_panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                steer_camera(&mut camera, keyboard, dt_seconds);

                let formation_toggle =
                    control_panel_input.take_formation_toggle() || keyboard.toggle_formation;
                let update_start = Instant::now();
                update_scene(frame_dt, FrameInput { formation_toggle }, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                set_camera(&to_macroquad_camera(&camera));

                batch.clear();
                batch.push_scene(&scene, &prototypes, &materials, &lighting);
                batch.draw();

                set_default_camera();
                let left = screen_width - CONTROL_PANEL_WIDTH;
                macroquad::shapes::draw_rectangle(
                    left,
                    0.0,
                    CONTROL_PANEL_WIDTH,
                    screen_height,
                    panel_background,
                );
                let ControlPanelUiResult {
                    formation_toggle_pressed,
                } = draw_control_panel_ui(
                    &mut macroquad::ui::root_ui(),
                    ControlPanelUiContext {
                        origin: vec2(left, 0.0),
                        size: vec2(CONTROL_PANEL_WIDTH, screen_height),
                        background: panel_background,
                        formation: scene.formation,
                        progress: scene.progress,
                    },
                );
                if formation_toggle_pressed {
                    control_panel_input.register_formation_toggle();
                }
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                    triangles: batch.triangle_count(),
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_update,
                        avg_render,
                        triangles,
                    }) = fps_metrics
                    {
                        println!(
                            "FPS: {:.2} | update: {:>6.2}ms render: {:>6.2}ms | {} triangles",
                            per_second,
                            avg_update.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                            triangles,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn to_macroquad_camera(camera: &CameraRig) -> Camera3D {
    let eye = camera.eye();
    Camera3D {
        position: vec3(eye.x, eye.y, eye.z),
        target: vec3(camera.target.x, camera.target.y, camera.target.z),
        up: vec3(0.0, 1.0, 0.0),
        fovy: camera.fov_degrees.to_radians(),
        ..Camera3D::default()
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
