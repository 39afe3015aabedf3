//! Scene loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable scene files.

use std::fs;
use std::path::{Path, PathBuf};
use macroquad::logging::warn;

use super::{Scene, SceneError};

/// Where the viewer looks for scene files
pub const SCENES_DIR: &str = "assets/scenes";

/// A scene file found on disk or listed in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFileInfo {
    pub name: String,
    pub path: PathBuf,
}

/// Load a scene from a RON file
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<Scene, SceneError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut scene = load_scene_from_str(&contents)?;

    if scene.name.is_empty() {
        scene.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unnamed".to_string());
    }

    Ok(scene)
}

/// Save a scene to a RON file
pub fn save_scene<P: AsRef<Path>>(scene: &Scene, path: P) -> Result<(), SceneError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(2)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(scene, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a scene from a RON string. The scene is validated so a bad file
/// fails here rather than at render time.
pub fn load_scene_from_str(s: &str) -> Result<Scene, SceneError> {
    let scene: Scene = ron::from_str(s)?;
    scene.validate()?;
    Ok(scene)
}

/// List `*.ron` files in a directory, sorted by name
#[cfg(not(target_arch = "wasm32"))]
pub fn discover_scenes<P: AsRef<Path>>(dir: P) -> Vec<SceneFileInfo> {
    let mut scenes = Vec::new();

    if let Ok(entries) = fs::read_dir(dir.as_ref()) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() && path.extension().map(|e| e == "ron").unwrap_or(false) {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                scenes.push(SceneFileInfo { name, path });
            }
        }
    }

    scenes.sort_by(|a, b| a.name.cmp(&b.name));
    scenes
}

/// WASM can't list directories; the build script writes a manifest instead
#[cfg(target_arch = "wasm32")]
pub fn discover_scenes<P: AsRef<Path>>(_dir: P) -> Vec<SceneFileInfo> {
    Vec::new()
}

/// Parse the build script's manifest: one file name per line
pub fn parse_manifest(manifest: &str, dir: &Path) -> Vec<SceneFileInfo> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.ends_with(".ron"))
        .map(|line| SceneFileInfo {
            name: line.strip_suffix(".ron").unwrap_or(line).to_string(),
            path: dir.join(line),
        })
        .collect()
}

/// Load the scene list from the build manifest
pub async fn load_scene_list() -> Vec<SceneFileInfo> {
    let manifest_path = format!("{}/manifest.txt", SCENES_DIR);
    match macroquad::file::load_string(&manifest_path).await {
        Ok(manifest) => parse_manifest(&manifest, Path::new(SCENES_DIR)),
        Err(e) => {
            warn!("Failed to load scenes manifest: {}", e);
            Vec::new()
        }
    }
}
