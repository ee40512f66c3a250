//! Things that can be drawn.
//!
//! A [`Renderable`] knows nothing about the scene graph. Given a shader and a
//! world matrix it writes the matrix into its own local-to-world constant
//! buffer, binds its geometry and issues its draws, in that order.
//!
//! Construction is fallible (`initialize`), so an object that failed to set up
//! never exists. `cleanup` releases GPU resources exactly once; calling it
//! again, or on an object that owns nothing, does nothing.

pub mod cube;
pub mod geometry;
pub mod grid;
pub mod light;
pub mod material;
pub mod mesh;
pub mod plane;
pub mod primitive;
pub mod registry;
pub mod sphere;
pub mod textured_mesh;

use glam::Mat4;

use crate::render::backend::RenderBackend;
use crate::render::context::DrawContext;
use crate::render::shader::Shader;

pub use cube::Cube;
pub use grid::Grid;
pub use light::Light;
pub use material::Material;
pub use mesh::Mesh;
pub use plane::Plane;
pub use primitive::RenderPrimitive;
pub use registry::{RenderableKey, Resources, ShaderKey};
pub use sphere::Sphere;
pub use textured_mesh::TexturedMesh;

/// A drawable payload for a scene node.
pub trait Renderable {
    /// Debug label.
    fn label(&self) -> &str;

    /// Writes `world` into the local-to-world buffer, binds geometry and
    /// `shader`, then issues the draw calls.
    fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4);

    /// Releases owned GPU resources. Idempotent.
    fn cleanup(&mut self, backend: &mut dyn RenderBackend);
}
