//! Settings Tests
//!
//! Tests for:
//! - Defaults
//! - Partial JSON documents
//! - Load / load_or_default behaviour on disk

use std::path::PathBuf;

use lantern::errors::LanternError;
use lantern::settings::{CullMode, Settings};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lantern-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_match_the_demo_window() {
    let s = Settings::default();
    assert_eq!((s.window.width, s.window.height), (1782, 1024));
    assert_eq!(s.render.clear_color, [0.0, 0.0, 0.0, 1.0]);
    assert!(s.render.vsync);
    assert_eq!(s.camera.fov_degrees, 78.0);
    assert_eq!((s.camera.near, s.camera.far), (0.01, 100.0));
    assert_eq!((s.camera.radius, s.camera.min_radius, s.camera.max_radius), (2.0, 1.0, 10.0));
    assert_eq!(s.light.diffuse, [1.0; 4]);
}

#[test]
fn partial_json_keeps_other_defaults() {
    let s = Settings::from_json(r#"{ "render": { "cull_mode": "back", "wireframe": true }, "camera": { "invert_y": true } }"#)
        .unwrap();
    assert_eq!(s.render.cull_mode, CullMode::Back);
    assert!(s.render.wireframe);
    assert!(s.render.vsync);
    assert!(s.camera.invert_y);
    assert_eq!(s.camera.radius, 2.0);
    assert_eq!(s.window, Settings::default().window);
}

#[test]
fn malformed_json_is_an_error() {
    let err = Settings::from_json("{ \"window\": 3 }").unwrap_err();
    assert!(matches!(err, LanternError::JsonError(_)));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let s = Settings::load_or_default("definitely/not/here.json").unwrap();
    assert_eq!(s, Settings::default());
    assert!(Settings::load("definitely/not/here.json").is_err());
}

#[test]
fn existing_file_is_loaded() -> anyhow::Result<()> {
    let path = temp_file("settings.json", r#"{ "asset_dir": "media", "light": { "diffuse": [0.5, 0.5, 0.5, 1.0] } }"#);
    let s = Settings::load_or_default(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(s.light.diffuse, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(s.asset_path("mesh.obj"), PathBuf::from("media").join("mesh.obj"));
    Ok(())
}

#[test]
fn broken_existing_file_is_not_silently_ignored() {
    let path = temp_file("broken.json", "{ not json");
    let result = Settings::load_or_default(&path);
    std::fs::remove_file(&path).unwrap();
    assert!(result.is_err());
}
