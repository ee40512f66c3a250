use glam::Mat4;

use crate::errors::Result;
use crate::render::backend::{ConstantBufferId, RenderBackend};
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::Topology;
use crate::renderables::Renderable;
use crate::renderables::geometry;
use crate::renderables::primitive::RenderPrimitive;

/// Wireframe sphere, used as the light's bulb.
#[derive(Debug)]
pub struct Sphere {
    primitive: RenderPrimitive,
    radius: f32,
}

impl Sphere {
    /// Builds a sphere of `radius` from `slices` meridians and `stacks`
    /// rings. Needs at least 3 slices and 2 stacks, and at most 65536
    /// vertices.
    pub fn initialize(
        backend: &mut dyn RenderBackend,
        light_buffer: ConstantBufferId,
        radius: f32,
        slices: u32,
        stacks: u32,
    ) -> Result<Self> {
        let geometry = geometry::wire_sphere(radius, slices, stacks)?;
        let primitive =
            RenderPrimitive::from_geometry(backend, "Sphere", &geometry, Topology::LineList, Some(light_buffer))?;
        Ok(Self { primitive, radius })
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[must_use]
    pub fn primitive(&self) -> &RenderPrimitive {
        &self.primitive
    }
}

impl Renderable for Sphere {
    fn label(&self) -> &str {
        self.primitive.label()
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4) {
        self.primitive.draw(ctx, shader, world);
    }

    fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        self.primitive.cleanup(backend);
    }
}
