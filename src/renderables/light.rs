use glam::Mat4;

use crate::errors::Result;
use crate::render::backend::{ConstantBufferId, RenderBackend};
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::Topology;
use crate::renderables::Renderable;
use crate::renderables::geometry;
use crate::renderables::primitive::RenderPrimitive;

/// Axis gizmo marking where the light is.
///
/// Binds the shared light buffer so the light geometry shader can tint the
/// lines with the current diffuse colour.
#[derive(Debug)]
pub struct Light {
    primitive: RenderPrimitive,
}

impl Light {
    pub fn initialize(backend: &mut dyn RenderBackend, light_buffer: ConstantBufferId) -> Result<Self> {
        let primitive = RenderPrimitive::from_geometry(
            backend,
            "Light",
            &geometry::light_gizmo(),
            Topology::LineList,
            Some(light_buffer),
        )?;
        Ok(Self { primitive })
    }

    #[must_use]
    pub fn primitive(&self) -> &RenderPrimitive {
        &self.primitive
    }
}

impl Renderable for Light {
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
