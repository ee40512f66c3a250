use glam::Mat4;

use crate::errors::Result;
use crate::render::backend::RenderBackend;
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::Topology;
use crate::renderables::Renderable;
use crate::renderables::geometry;
use crate::renderables::primitive::RenderPrimitive;

/// Vertex-coloured unit cube.
#[derive(Debug)]
pub struct Cube {
    primitive: RenderPrimitive,
}

impl Cube {
    pub fn initialize(backend: &mut dyn RenderBackend) -> Result<Self> {
        let primitive = RenderPrimitive::from_geometry(backend, "Cube", &geometry::cube(), Topology::TriangleList, None)?;
        Ok(Self { primitive })
    }

    #[must_use]
    pub fn primitive(&self) -> &RenderPrimitive {
        &self.primitive
    }
}

impl Renderable for Cube {
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
