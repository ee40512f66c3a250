use bytemuck::Pod;
use glam::Mat4;

use crate::errors::{LanternError, ResourceKind, Result};
use crate::render::backend::{BufferId, ConstantBufferId, RenderBackend};
use crate::render::constants::{ConstantBuffer, LIGHT_SLOT, LOCAL_TO_WORLD_SLOT, LocalToWorldConstants};
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::{IndexFormat, Topology};
use crate::renderables::geometry::Geometry;

#[derive(Debug)]
struct GpuGeometry {
    vertices: BufferId,
    indices: BufferId,
    world: ConstantBuffer<LocalToWorldConstants>,
}

/// Buffer-backed shape with a fixed vertex and index buffer.
///
/// Owns its geometry buffers and its local-to-world constant buffer. A light
/// buffer passed at initialization is shared: it is bound at the light slot
/// but never released here.
#[derive(Debug)]
pub struct RenderPrimitive {
    label: String,
    stride: u32,
    offset: u32,
    num_indices: u32,
    topology: Topology,
    gpu: Option<GpuGeometry>,
    light: Option<ConstantBufferId>,
}

impl RenderPrimitive {
    /// Uploads `vertices` and `indices` and creates the world buffer.
    ///
    /// On failure everything created so far is released again.
    pub fn initialize<V: Pod>(
        backend: &mut dyn RenderBackend,
        label: &str,
        vertices: &[V],
        indices: &[u16],
        topology: Topology,
        light: Option<ConstantBufferId>,
    ) -> Result<Self> {
        let stride = std::mem::size_of::<V>() as u32;
        let num_indices = u32::try_from(indices.len()).map_err(|_| LanternError::ResourceCreation {
            kind: ResourceKind::IndexBuffer,
            label: label.to_string(),
            reason: "too many indices".to_string(),
        })?;

        let vertex_buffer = backend.create_vertex_buffer(&format!("{label} vertices"), bytemuck::cast_slice(vertices))?;
        let index_buffer = match backend.create_index_buffer(&format!("{label} indices"), bytemuck::cast_slice(indices)) {
            Ok(id) => id,
            Err(e) => {
                backend.release_buffer(vertex_buffer);
                return Err(e);
            }
        };
        let world = match ConstantBuffer::create(backend, &format!("{label} world")) {
            Ok(cb) => cb,
            Err(e) => {
                backend.release_buffer(vertex_buffer);
                backend.release_buffer(index_buffer);
                return Err(e);
            }
        };

        log::debug!("Initialized '{label}': {} vertices, {num_indices} indices", vertices.len());

        Ok(Self {
            label: label.to_string(),
            stride,
            offset: 0,
            num_indices,
            topology,
            gpu: Some(GpuGeometry {
                vertices: vertex_buffer,
                indices: index_buffer,
                world,
            }),
            light,
        })
    }

    pub fn from_geometry(
        backend: &mut dyn RenderBackend,
        label: &str,
        geometry: &Geometry,
        topology: Topology,
        light: Option<ConstantBufferId>,
    ) -> Result<Self> {
        Self::initialize(backend, label, &geometry.vertices, &geometry.indices, topology, light)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    #[must_use]
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    /// Writes `world`, binds the buffers and issues one indexed draw.
    pub fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4) {
        let Some(gpu) = &self.gpu else {
            return;
        };

        gpu.world.write(ctx, &LocalToWorldConstants { local_to_world: *world });
        ctx.set_topology(self.topology);
        ctx.set_shader(shader);
        gpu.world.bind(ctx, LOCAL_TO_WORLD_SLOT);
        match self.light {
            Some(light) => ctx.bind_constants(LIGHT_SLOT, light),
            None => ctx.unbind_constants(LIGHT_SLOT),
        }
        ctx.set_vertex_buffer(gpu.vertices, self.stride, self.offset);
        ctx.set_index_buffer(gpu.indices, IndexFormat::U16);
        ctx.draw_indexed(self.num_indices, 0, 0);
    }

    /// Releases the owned buffers. Safe to call more than once.
    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(gpu) = self.gpu.take() {
            log::info!("Cleaning up '{}'", self.label);
            backend.release_buffer(gpu.vertices);
            backend.release_buffer(gpu.indices);
            gpu.world.release(backend);
        }
        self.light = None;
    }
}
