//! Viewer state
//!
//! Holds the current render parameters and scene, the last rendered frame
//! and a status line. Input is turned into `Action`s so everything here runs
//! without a window.

use std::path::{Path, PathBuf};
use macroquad::logging::{error, info};

use crate::present::{self, Axis};
use crate::rasterizer::{
    load_params, render, save_params, Frame, RenderParams, ANTI_ALIAS_PRESETS, PIXEL_SIZE_PRESETS,
};
use crate::scene::{load_scene, Scene};

/// Rotation step for the W/S, A/D, Q/E hotkeys
pub const ROTATE_STEP: f64 = 10.0;

/// Where PNG and turntable exports go
pub const EXPORT_DIR: &str = "exports";

/// Where the viewer saves and loads its parameters
pub const PARAMS_FILE: &str = "render.ron";

/// Seconds a status message stays visible
const STATUS_SECONDS: f64 = 3.0;

/// Something the user asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
    SetAntiAlias(u32),
    CycleAntiAlias,
    SetPixelSize(u32),
    CyclePixelSize,
    AdjustFov(f64),
    AdjustNear(f64),
    AdjustFar(f64),
    SelectBuiltin(usize),
    OpenScene(PathBuf),
    Render,
    ExportPng,
    ExportTurntable(Axis),
    SaveParams,
    LoadParams,
}

/// Which scene is showing
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSource {
    Builtin(usize),
    File(PathBuf),
}

/// Transient message for the status line
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
    remaining: f64,
}

pub struct AppState {
    pub params: RenderParams,
    pub scene: Scene,
    pub source: SceneSource,
    /// Last successful render
    pub frame: Option<Frame>,
    /// Bumped every time `frame` changes so the viewer knows to re-upload it
    pub frame_version: u64,
    pub status: Option<Status>,
    export_counter: u32,
}

impl AppState {
    pub fn new(params: RenderParams) -> Self {
        let mut app = Self {
            params,
            scene: Scene::basic_triangles(),
            source: SceneSource::Builtin(0),
            frame: None,
            frame_version: 0,
            status: None,
            export_counter: 0,
        };
        app.rerender();
        app
    }

    pub fn set_status(&mut self, text: &str) {
        self.status = Some(Status { text: text.to_string(), is_error: false, remaining: STATUS_SECONDS });
    }

    pub fn set_error(&mut self, text: &str) {
        error!("{}", text);
        self.status = Some(Status { text: text.to_string(), is_error: true, remaining: STATUS_SECONDS * 2.0 });
    }

    /// Age the status message by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        if let Some(status) = &mut self.status {
            status.remaining -= dt;
            if status.remaining <= 0.0 {
                self.status = None;
            }
        }
    }

    /// Render the current scene with the current parameters.
    /// On failure the previous frame stays up and the error is shown.
    pub fn rerender(&mut self) {
        match render(&self.scene, &self.params) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.frame_version += 1;
            }
            Err(e) => self.set_error(&format!("Render failed: {}", e)),
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::RotateX(d) => self.params.x_rotate += d,
            Action::RotateY(d) => self.params.y_rotate += d,
            Action::RotateZ(d) => self.params.z_rotate += d,
            Action::SetAntiAlias(n) => self.params.anti_alias = n,
            Action::CycleAntiAlias => self.params.cycle_anti_alias(),
            Action::SetPixelSize(n) => self.params.pixel_size = n,
            Action::CyclePixelSize => self.params.cycle_pixel_size(),
            Action::AdjustFov(d) => self.params.eye_fov += d,
            Action::AdjustNear(d) => self.params.z_near += d,
            Action::AdjustFar(d) => self.params.z_far += d,
            Action::SelectBuiltin(i) => {
                if let Some(scene) = Scene::builtins().into_iter().nth(i) {
                    self.scene = scene;
                    self.source = SceneSource::Builtin(i);
                    self.set_status(&format!("Scene: {}", self.scene.name));
                }
            }
            Action::OpenScene(path) => match load_scene(&path) {
                Ok(scene) => {
                    info!("loaded scene '{}' from {}", scene.name, path.display());
                    self.set_status(&format!("Loaded {}", path.display()));
                    self.scene = scene;
                    self.source = SceneSource::File(path);
                }
                Err(e) => {
                    self.set_error(&format!("Load failed: {}", e));
                    return;
                }
            },
            Action::Render => {}
            Action::ExportPng => {
                self.export_png(Path::new(EXPORT_DIR));
                return;
            }
            Action::ExportTurntable(axis) => {
                self.export_turntable(axis, Path::new(EXPORT_DIR));
                return;
            }
            Action::SaveParams => {
                match save_params(&self.params, PARAMS_FILE) {
                    Ok(()) => self.set_status(&format!("Saved {}", PARAMS_FILE)),
                    Err(e) => self.set_error(&format!("Save failed: {}", e)),
                }
                return;
            }
            Action::LoadParams => match load_params(PARAMS_FILE) {
                Ok(params) => {
                    self.params = params;
                    self.set_status(&format!("Loaded {}", PARAMS_FILE));
                }
                Err(e) => {
                    self.set_error(&format!("Load failed: {}", e));
                    return;
                }
            },
        }
        self.rerender();
    }

    /// Write the current frame to `dir/<scene>_NNN.png`
    pub fn export_png(&mut self, dir: &Path) -> Option<PathBuf> {
        if self.frame.is_none() {
            self.set_error("Nothing rendered yet");
            return None;
        }
        if let Err(e) = std::fs::create_dir_all(dir) {
            self.set_error(&format!("Export failed: {}", e));
            return None;
        }

        let path = dir.join(format!("{}_{:03}.png", present::slug(&self.scene.name), self.export_counter));
        let result = match &self.frame {
            Some(frame) => present::export_png(&path, &frame.framebuffer, &self.params),
            None => return None,
        };
        match result {
            Ok(()) => {
                self.export_counter += 1;
                self.set_status(&format!("Exported {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.set_error(&format!("Export failed: {}", e));
                None
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn export_turntable(&mut self, axis: Axis, dir: &Path) {
        match present::export_turntable(&self.scene, &self.params, axis, 36, dir) {
            Ok(paths) => self.set_status(&format!("Exported {} frames to {}", paths.len(), dir.display())),
            Err(e) => self.set_error(&format!("Turntable failed: {}", e)),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn export_turntable(&mut self, _axis: Axis, _dir: &Path) {
        self.set_status("Turntable export not available in browser");
    }

    pub fn anti_alias_index(&self) -> usize {
        ANTI_ALIAS_PRESETS.iter().position(|&n| n == self.params.anti_alias).unwrap_or(usize::MAX)
    }

    pub fn pixel_size_index(&self) -> usize {
        PIXEL_SIZE_PRESETS.iter().position(|&n| n == self.params.pixel_size).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_a_frame() {
        let app = AppState::new(RenderParams::default());
        let frame = app.frame.as_ref().unwrap();
        assert_eq!(frame.stats.triangles, 3);
        assert_eq!(app.frame_version, 1);
        assert_eq!(app.source, SceneSource::Builtin(0));
    }

    #[test]
    fn test_rotation_rerenders() {
        let mut app = AppState::new(RenderParams::default());
        app.apply(Action::RotateY(ROTATE_STEP));
        app.apply(Action::RotateY(ROTATE_STEP));
        assert_eq!(app.params.y_rotate, 20.0);
        assert_eq!(app.frame_version, 3);
    }

    #[test]
    fn test_bad_parameter_keeps_last_frame() {
        let mut app = AppState::new(RenderParams::default());
        let before = app.frame.as_ref().unwrap().framebuffer.clone();
        app.apply(Action::AdjustFov(200.0));
        assert_eq!(app.frame_version, 1);
        assert_eq!(app.frame.as_ref().unwrap().framebuffer, before);
        assert!(app.status.as_ref().unwrap().is_error);

        app.apply(Action::AdjustFov(-200.0));
        assert_eq!(app.frame_version, 2);
    }

    #[test]
    fn test_select_builtin() {
        let mut app = AppState::new(RenderParams::default());
        app.apply(Action::SelectBuiltin(1));
        assert_eq!(app.scene.name, "Pyramid");
        assert_eq!(app.frame.as_ref().unwrap().stats.triangles, 4);
        app.apply(Action::SelectBuiltin(9));
        assert_eq!(app.source, SceneSource::Builtin(1));
    }

    #[test]
    fn test_open_missing_scene_reports_error() {
        let mut app = AppState::new(RenderParams::default());
        app.apply(Action::OpenScene(PathBuf::from("does/not/exist.ron")));
        assert_eq!(app.source, SceneSource::Builtin(0));
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_presets_and_raster_size() {
        let mut app = AppState::new(RenderParams::default());
        app.apply(Action::SetPixelSize(4));
        assert_eq!(app.pixel_size_index(), 1);
        let fb = &app.frame.as_ref().unwrap().framebuffer;
        assert_eq!((fb.width(), fb.height()), (200, 200));

        app.apply(Action::CycleAntiAlias);
        assert_eq!(app.params.anti_alias, 2);
        assert_eq!(app.anti_alias_index(), 1);
    }

    #[test]
    fn test_status_expires() {
        let mut app = AppState::new(RenderParams::default());
        app.set_status("hello");
        app.tick(1.0);
        assert!(app.status.is_some());
        app.tick(STATUS_SECONDS);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_export_png_numbers_files() {
        let dir = std::env::temp_dir().join(format!("raster-basic-{}-app-export", std::process::id()));
        let mut app = AppState::new(RenderParams::default());
        let first = app.export_png(&dir).unwrap();
        let second = app.export_png(&dir).unwrap();
        let both_exist = first.exists() && second.exists();
        let _ = std::fs::remove_dir_all(&dir);
        assert!(first.ends_with("triangles_000.png"));
        assert!(second.ends_with("triangles_001.png"));
        assert!(both_exist);
    }
}
