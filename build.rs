//! Build script to generate the scene manifest for WASM builds
//!
//! Scans assets/scenes/ and lists every .ron file, since WASM can't
//! enumerate directories at runtime.

use std::fs;
use std::io::Write;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=assets/scenes");

    generate_scenes_manifest();
}

/// Generate manifest for scenes
fn generate_scenes_manifest() {
    let scenes_dir = Path::new("assets/scenes");
    let manifest_path = Path::new("assets/scenes/manifest.txt");

    let mut manifest = String::new();

    if scenes_dir.exists() {
        let mut scenes: Vec<_> = fs::read_dir(scenes_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                let path = e.path();
                path.is_file() && path
                    .extension()
                    .map(|ext| ext.to_ascii_lowercase() == "ron")
                    .unwrap_or(false)
            })
            .collect();

        scenes.sort_by_key(|e| e.file_name());

        for entry in scenes {
            manifest.push_str(&format!("{}\n", entry.file_name().to_string_lossy()));
        }
    }

    let mut file = fs::File::create(manifest_path).unwrap();
    file.write_all(manifest.as_bytes()).unwrap();
}
