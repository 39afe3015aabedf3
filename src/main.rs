//! Raster Basic: a small software rasterizer
//!
//! Renders colored triangle scenes on the CPU:
//! - Model, view and perspective projection matrices
//! - Barycentric scanning with per-vertex color interpolation
//! - Z-buffer visibility
//! - Optional n x n multisample anti-aliasing
//! - Chunky "big pixel" presentation, PNG and turntable export

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod rasterizer;
mod scene;
mod present;
mod ui;
mod app;

use macroquad::logging::info;
use macroquad::prelude::*;
use app::{Action, AppState, SceneSource, ROTATE_STEP};
use present::Axis;
use rasterizer::{RenderParams, ANTI_ALIAS_PRESETS, PIXEL_SIZE_PRESETS};
use scene::{Scene, SceneFileInfo};
use ui::{MouseState, Panel, Rect, UiContext, LABEL_COLOR};

const PANEL_WIDTH: f32 = 240.0;

fn window_conf() -> Conf {
    let params = RenderParams::default();
    Conf {
        window_title: format!("Raster Basic v{}", VERSION),
        window_width: params.display_width as i32 + PANEL_WIDTH as i32,
        window_height: params.display_height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Hotkeys, checked once per frame
fn keyboard_actions() -> Vec<Action> {
    let mut actions = Vec::new();
    let bindings = [
        (KeyCode::W, Action::RotateX(-ROTATE_STEP)),
        (KeyCode::S, Action::RotateX(ROTATE_STEP)),
        (KeyCode::A, Action::RotateY(-ROTATE_STEP)),
        (KeyCode::D, Action::RotateY(ROTATE_STEP)),
        (KeyCode::Q, Action::RotateZ(-ROTATE_STEP)),
        (KeyCode::E, Action::RotateZ(ROTATE_STEP)),
        (KeyCode::R, Action::Render),
        (KeyCode::M, Action::CycleAntiAlias),
        (KeyCode::P, Action::CyclePixelSize),
        (KeyCode::Key1, Action::SelectBuiltin(0)),
        (KeyCode::Key2, Action::SelectBuiltin(1)),
        (KeyCode::X, Action::ExportPng),
        (KeyCode::T, Action::ExportTurntable(Axis::Y)),
    ];
    for (key, action) in bindings {
        if is_key_pressed(key) {
            actions.push(action);
        }
    }
    actions
}

/// Ask for a scene file (native only)
#[cfg(not(target_arch = "wasm32"))]
fn prompt_scene_file() -> Option<Action> {
    let dialog = rfd::FileDialog::new()
        .add_filter("RON Scene", &["ron"])
        .set_directory(scene::SCENES_DIR);
    dialog.pick_file().map(Action::OpenScene)
}

#[cfg(target_arch = "wasm32")]
fn prompt_scene_file() -> Option<Action> {
    None
}

/// Side panel; returns whatever the user clicked
fn draw_panel(ctx: &mut UiContext, rect: Rect, app: &AppState, scene_files: &[SceneFileInfo]) -> Vec<Action> {
    let mut actions = Vec::new();
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, Color::from_rgba(24, 24, 28, 255));

    let mut panel = Panel::new(rect);
    panel.heading("Camera");
    let p = &app.params;
    match panel.stepper(ctx, "Z Near", &format!("{:.0}", p.z_near)) {
        0 => {}
        d => actions.push(Action::AdjustNear(d as f64)),
    }
    match panel.stepper(ctx, "Z Far", &format!("{:.0}", p.z_far)) {
        0 => {}
        d => actions.push(Action::AdjustFar(d as f64 * 5.0)),
    }
    match panel.stepper(ctx, "Eye fov", &format!("{:.0}", p.eye_fov)) {
        0 => {}
        d => actions.push(Action::AdjustFov(d as f64 * 5.0)),
    }
    panel.label(&format!("Rotate  x {:.0}  y {:.0}  z {:.0}", p.x_rotate, p.y_rotate, p.z_rotate));

    panel.heading("Raster");
    let sizes: Vec<String> = PIXEL_SIZE_PRESETS.iter().map(|n| n.to_string()).collect();
    if let Some(i) = panel.options(ctx, "Pixel size", &sizes, app.pixel_size_index()) {
        actions.push(Action::SetPixelSize(PIXEL_SIZE_PRESETS[i]));
    }
    let factors: Vec<String> = ANTI_ALIAS_PRESETS
        .iter()
        .map(|&n| if n == 0 { "Off".to_string() } else { format!("{}x{}", n, n) })
        .collect();
    if let Some(i) = panel.options(ctx, "Anti-alias", &factors, app.anti_alias_index()) {
        actions.push(Action::SetAntiAlias(ANTI_ALIAS_PRESETS[i]));
    }

    panel.heading("Scene");
    let builtins = Scene::builtins();
    let mut names: Vec<String> = builtins.iter().map(|s| s.name.clone()).collect();
    names.extend(scene_files.iter().map(|f| f.name.clone()));
    let selected = match &app.source {
        SceneSource::Builtin(i) => *i,
        SceneSource::File(path) => scene_files
            .iter()
            .position(|f| &f.path == path)
            .map(|i| builtins.len() + i)
            .unwrap_or(usize::MAX),
    };
    for (row, chunk) in names.chunks(3).enumerate() {
        let label = if row == 0 { "Scene" } else { "" };
        let local = selected.checked_sub(row * 3).unwrap_or(usize::MAX);
        if let Some(i) = panel.options(ctx, label, chunk, local) {
            let index = row * 3 + i;
            if index < builtins.len() {
                actions.push(Action::SelectBuiltin(index));
            } else {
                actions.push(Action::OpenScene(scene_files[index - builtins.len()].path.clone()));
            }
        }
    }
    if panel.button(ctx, "Open...", "Open a scene file (O)") {
        actions.extend(prompt_scene_file());
    }

    panel.heading("Output");
    if panel.button(ctx, "Render", "Render again (R)") {
        actions.push(Action::Render);
    }
    if panel.button(ctx, "Export PNG", "Write the frame to exports/ (X)") {
        actions.push(Action::ExportPng);
    }
    if panel.button(ctx, "Turntable", "Export a 360 degree sweep about Y (T)") {
        actions.push(Action::ExportTurntable(Axis::Y));
    }
    if panel.button(ctx, "Save params", "Write render.ron") {
        actions.push(Action::SaveParams);
    }
    if panel.button(ctx, "Load params", "Read render.ron") {
        actions.push(Action::LoadParams);
    }

    if let Some(frame) = &app.frame {
        let s = frame.stats;
        panel.label(&format!("{} tris, {} drawn", s.triangles, s.drawn));
        panel.label(&format!("{} degenerate, {} rejected", s.degenerate, s.rejected));
        panel.label(&format!("{} pixels, {}", s.pixels_written, p.anti_alias().label()));
    }

    actions
}

#[macroquad::main(window_conf)]
async fn main() {
    let mut app = AppState::new(RenderParams::default());
    let mut ui_ctx = UiContext::new();
    let mut last_left_down = false;

    // WASM can't list directories, so fall back to the build manifest
    let mut scene_files = scene::discover_scenes(scene::SCENES_DIR);
    if scene_files.is_empty() {
        scene_files = scene::load_scene_list().await;
    }
    info!("=== Raster Basic v{} === ({} scene files)", VERSION, scene_files.len());

    let mut texture: Option<Texture2D> = None;
    let mut texture_version = 0;

    loop {
        let mouse = MouseState::capture(last_left_down);
        last_left_down = mouse.left_down;
        ui_ctx.begin_frame(mouse);

        clear_background(Color::from_rgba(30, 30, 35, 255));

        let screen = Rect::new(0.0, 0.0, screen_width(), screen_height());
        let view_rect = Rect::new(0.0, 0.0, (screen.w - PANEL_WIDTH).max(0.0), screen.h);
        let panel_rect = Rect::new(view_rect.right(), 0.0, PANEL_WIDTH, screen.h);

        let mut actions = keyboard_actions();
        if is_key_pressed(KeyCode::O) {
            actions.extend(prompt_scene_file());
        }
        actions.extend(draw_panel(&mut ui_ctx, panel_rect, &app, &scene_files));
        for action in actions {
            app.apply(action);
        }

        // Re-upload only when a new frame arrived
        if texture_version != app.frame_version {
            if let Some(frame) = &app.frame {
                let rgba = present::frame_rgba(&frame.framebuffer, &app.params);
                let tex = Texture2D::from_rgba8(rgba.width as u16, rgba.height as u16, &rgba.pixels);
                tex.set_filter(FilterMode::Nearest);
                texture = Some(tex);
            }
            texture_version = app.frame_version;
        }

        if let Some(tex) = &texture {
            // Nearest-filtered upscale keeps the big pixels square
            let ps = app.params.pixel_size.max(1) as f32;
            let w = tex.width() * ps;
            let h = tex.height() * ps;
            let scale = (view_rect.w / w).min(view_rect.h / h).min(1.0);
            let (draw_w, draw_h) = (w * scale, h * scale);
            draw_texture_ex(
                tex,
                view_rect.x + ((view_rect.w - draw_w) / 2.0).floor(),
                view_rect.y + ((view_rect.h - draw_h) / 2.0).floor(),
                WHITE,
                DrawTextureParams {
                    dest_size: Some(Vec2::new(draw_w, draw_h)),
                    ..Default::default()
                },
            );
        }

        if let Some(status) = &app.status {
            let color = if status.is_error { Color::from_rgba(230, 90, 80, 255) } else { LABEL_COLOR };
            draw_text(&status.text, view_rect.x + 8.0, view_rect.bottom() - 10.0, 16.0, color);
        }

        ui_ctx.draw_hint();
        app.tick(get_frame_time() as f64);

        next_frame().await
    }
}
