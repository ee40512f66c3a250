use std::path::Path;

use bytemuck::Pod;
use glam::Mat4;

use crate::assets::{self, ObjScene};
use crate::errors::Result;
use crate::render::backend::{BufferId, ConstantBufferId, RenderBackend, TextureId};
use crate::render::constants::{
    ConstantBuffer, LIGHT_SLOT, LOCAL_TO_WORLD_SLOT, LocalToWorldConstants, TEXTURE_SLOT,
};
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::render::vertex::{IndexFormat, Topology};
use crate::renderables::Renderable;

/// GPU buffers of one imported mesh part.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PartBuffers {
    vertices: BufferId,
    indices: BufferId,
    stride: u32,
    num_indices: u32,
}

/// World buffer, light binding and the uploaded parts shared by
/// [`Mesh`] and [`TexturedMesh`](crate::renderables::TexturedMesh).
#[derive(Debug)]
pub(crate) struct PartList {
    label: String,
    world: Option<ConstantBuffer<LocalToWorldConstants>>,
    light: Option<ConstantBufferId>,
    parts: Vec<PartBuffers>,
}

impl PartList {
    pub(crate) fn new(backend: &mut dyn RenderBackend, label: &str, light: ConstantBufferId) -> Result<Self> {
        let world = ConstantBuffer::create(backend, &format!("{label} world"))?;
        Ok(Self {
            label: label.to_string(),
            world: Some(world),
            light: Some(light),
            parts: Vec::new(),
        })
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn len(&self) -> usize {
        self.parts.len()
    }

    pub(crate) fn index_count(&self) -> u32 {
        self.parts.iter().map(|p| p.num_indices).sum()
    }

    /// Uploads every `(vertices, indices)` pair. If any upload fails, the
    /// parts added by this call are released and the list is unchanged.
    pub(crate) fn upload<V: Pod>(
        &mut self,
        backend: &mut dyn RenderBackend,
        parts: impl IntoIterator<Item = (Vec<V>, Vec<u32>)>,
    ) -> Result<()> {
        let mut uploaded = Vec::new();
        for (n, (vertices, indices)) in parts.into_iter().enumerate() {
            match upload_part(backend, &format!("{} part {n}", self.label), &vertices, &indices) {
                Ok(part) => uploaded.push(part),
                Err(e) => {
                    for part in uploaded {
                        release_part(backend, part);
                    }
                    return Err(e);
                }
            }
        }
        self.parts.extend(uploaded);
        Ok(())
    }

    pub(crate) fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4, texture: Option<TextureId>) {
        let Some(world_buffer) = &self.world else {
            return;
        };

        world_buffer.write(ctx, &LocalToWorldConstants { local_to_world: *world });
        ctx.set_topology(Topology::TriangleList);
        for part in &self.parts {
            ctx.set_shader(shader);
            world_buffer.bind(ctx, LOCAL_TO_WORLD_SLOT);
            if let Some(light) = self.light {
                ctx.bind_constants(LIGHT_SLOT, light);
            }
            if let Some(texture) = texture {
                ctx.bind_texture(TEXTURE_SLOT, texture);
            }
            ctx.set_vertex_buffer(part.vertices, part.stride, 0);
            ctx.set_index_buffer(part.indices, IndexFormat::U32);
            ctx.draw_indexed(part.num_indices, 0, 0);
        }
    }

    pub(crate) fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        for part in self.parts.drain(..) {
            release_part(backend, part);
        }
        if let Some(world) = self.world.take() {
            log::info!("Clearing mesh '{}'", self.label);
            world.release(backend);
        }
        self.light = None;
    }
}

fn upload_part<V: Pod>(backend: &mut dyn RenderBackend, label: &str, vertices: &[V], indices: &[u32]) -> Result<PartBuffers> {
    let vertex_buffer = backend.create_vertex_buffer(label, bytemuck::cast_slice(vertices))?;
    let index_buffer = match backend.create_index_buffer(label, bytemuck::cast_slice(indices)) {
        Ok(id) => id,
        Err(e) => {
            backend.release_buffer(vertex_buffer);
            return Err(e);
        }
    };
    Ok(PartBuffers {
        vertices: vertex_buffer,
        indices: index_buffer,
        stride: std::mem::size_of::<V>() as u32,
        num_indices: indices.len() as u32,
    })
}

fn release_part(backend: &mut dyn RenderBackend, part: PartBuffers) {
    backend.release_buffer(part.vertices);
    backend.release_buffer(part.indices);
}

/// Lit mesh imported from an OBJ file, one draw per part.
///
/// Vertices take the diffuse colour of their part's material. The light
/// buffer is shared with the rest of the scene and not released here.
#[derive(Debug)]
pub struct Mesh {
    parts: PartList,
}

impl Mesh {
    /// Creates an empty mesh; parts are added by
    /// [`load_from_file`](Self::load_from_file).
    pub fn initialize(backend: &mut dyn RenderBackend, label: &str, light_buffer: ConstantBufferId) -> Result<Self> {
        Ok(Self {
            parts: PartList::new(backend, label, light_buffer)?,
        })
    }

    pub fn load_from_file(&mut self, backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> Result<()> {
        let scene = assets::load_obj(path)?;
        self.load_scene(backend, &scene)
    }

    /// Uploads already-parsed OBJ data.
    pub fn load_scene(&mut self, backend: &mut dyn RenderBackend, scene: &ObjScene) -> Result<()> {
        self.parts.upload(
            backend,
            scene
                .parts
                .iter()
                .map(|part| (part.untextured_vertices(), part.indices.clone())),
        )
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn index_count(&self) -> u32 {
        self.parts.index_count()
    }
}

impl Renderable for Mesh {
    fn label(&self) -> &str {
        self.parts.label()
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4) {
        self.parts.draw(ctx, shader, world, None);
    }

    fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        self.parts.cleanup(backend);
    }
}
