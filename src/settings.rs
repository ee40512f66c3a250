//! Application Settings
//!
//! All tunables of the demo live in one [`Settings`] value that can be read
//! from a JSON file. Every field has a default, so a file only needs the keys
//! it wants to change and a missing file means "all defaults".
//!
//! # Example
//!
//! ```json
//! {
//!     "window": { "width": 1280, "height": 720 },
//!     "render": { "cull_mode": "back", "wireframe": true },
//!     "light": { "diffuse": [1.0, 0.8, 0.6, 1.0] }
//! }
//! ```
//!
//! # Defaults
//!
//! | Field                 | Default        |
//! |-----------------------|----------------|
//! | `window.width/height` | 1782 × 1024    |
//! | `render.clear_color`  | black, opaque  |
//! | `render.cull_mode`    | `none`         |
//! | `camera.fov_degrees`  | 78             |
//! | `camera.near/far`     | 0.01 / 100     |
//! | `camera.radius`       | 2, in [1, 10]  |
//! | `light.diffuse`       | (1, 1, 1, 1)   |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LanternError, Result};

/// Root of the settings file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub render: RenderSettings,
    pub camera: CameraSettings,
    pub light: LightSettings,
    /// Directory that mesh and texture paths are resolved against.
    pub asset_dir: PathBuf,
}

impl Settings {
    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| LanternError::AssetLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_json(&text)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Like [`load`](Self::load), falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is still an
    /// error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Resolves an asset path against [`asset_dir`](Self::asset_dir).
    #[must_use]
    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_dir.join(relative)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Lantern: Scene Graphs".to_string(),
            width: 1782,
            height: 1024,
        }
    }
}

/// Which triangle faces the rasterizer discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CullMode {
    #[default]
    None,
    Back,
    Front,
}

impl CullMode {
    #[must_use]
    pub fn to_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Back => Some(wgpu::Face::Back),
            CullMode::Front => Some(wgpu::Face::Front),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub vsync: bool,
    /// RGBA, linear.
    pub clear_color: [f64; 4],
    pub cull_mode: CullMode,
    /// Draw triangles as lines. Needs adapter support; falls back to fill.
    pub wireframe: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            cull_mode: CullMode::None,
            wireframe: false,
        }
    }
}

impl RenderSettings {
    #[must_use]
    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub radius: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub invert_y: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 78.0,
            near: 0.01,
            far: 100.0,
            radius: 2.0,
            min_radius: 1.0,
            max_radius: 10.0,
            invert_y: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub diffuse: [f32; 4],
}

impl Default for LightSettings {
    fn default() -> Self {
        Self { diffuse: [1.0; 4] }
    }
}
