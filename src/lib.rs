//! Lantern
//!
//! A small retained-mode scene graph on top of wgpu.
//!
//! Nodes carry a local transform (yaw/pitch/roll, translation, scale, or an
//! explicit matrix) and an optional weak attachment to a renderable and a
//! shader. Each frame [`Graphics::update`] propagates world transforms from
//! the root down, then [`Graphics::render`] walks the tree in pre-order and
//! lets every attached renderable write its world matrix and issue its draws.
//!
//! - [`scene`]: nodes, transforms, the arena-backed [`SceneGraph`]
//! - [`renderables`]: the [`Renderable`] contract and the built-in shapes
//! - [`render`]: backends, the per-frame [`DrawContext`], constant buffers
//! - [`assets`]: OBJ and image loading
//! - [`graphics`]: the frame driver
//! - [`app`]: winit window shell (feature `winit`)

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod errors;
pub mod graphics;
pub mod render;
pub mod renderables;
pub mod scene;
pub mod settings;
pub mod utils;

#[cfg(feature = "winit")]
pub mod app;

pub use errors::{LanternError, Result, StartupStage};
pub use graphics::Graphics;
pub use render::{DrawContext, HeadlessBackend, RenderBackend, Shader, WgpuBackend};
pub use renderables::{Renderable, RenderableKey, Resources, ShaderKey};
pub use scene::{NodeHandle, SceneGraph, SceneNode};
pub use settings::Settings;
pub use utils::OrbitCamera;

#[cfg(feature = "winit")]
pub use app::{App, AppHandler};
