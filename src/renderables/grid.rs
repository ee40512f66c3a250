use glam::Mat4;

use crate::errors::Result;
use crate::render::backend::RenderBackend;
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::Topology;
use crate::renderables::Renderable;
use crate::renderables::geometry;
use crate::renderables::primitive::RenderPrimitive;

/// Ground reference grid, drawn as lines.
#[derive(Debug)]
pub struct Grid {
    primitive: RenderPrimitive,
}

impl Grid {
    pub fn initialize(backend: &mut dyn RenderBackend) -> Result<Self> {
        log::info!("Initializing the grid");
        let primitive = RenderPrimitive::from_geometry(backend, "Grid", &geometry::grid(), Topology::LineList, None)?;
        Ok(Self { primitive })
    }

    #[must_use]
    pub fn primitive(&self) -> &RenderPrimitive {
        &self.primitive
    }
}

impl Renderable for Grid {
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
