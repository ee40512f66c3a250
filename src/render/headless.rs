//! A backend without a GPU.
//!
//! [`HeadlessBackend`] keeps every resource in CPU arenas and stores each
//! submitted [`FrameData`] so the draw sequence can be inspected afterwards.
//! Resource creation can be made to fail on purpose to exercise the error
//! paths of renderable initialization.

use bytemuck::Pod;
use slotmap::SlotMap;

use crate::errors::{LanternError, ResourceKind, Result};
use crate::render::backend::{BufferId, ConstantBufferId, RenderBackend, ShaderId, TextureData, TextureId};
use crate::render::constants::MAX_CONSTANT_BUFFER_SIZE;
use crate::render::context::{ConstantStore, FrameData};
use crate::render::shader::ShaderDesc;
use crate::render::vertex::InputLayout;

#[derive(Debug)]
struct BufferRecord {
    label: String,
    kind: ResourceKind,
    data: Vec<u8>,
}

#[derive(Debug)]
struct TextureRecord {
    label: String,
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct ShaderRecord {
    label: String,
    layout: InputLayout,
}

/// Number of live resources per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveResources {
    pub vertex_buffers: usize,
    pub index_buffers: usize,
    pub constant_buffers: usize,
    pub textures: usize,
    pub shaders: usize,
}

impl LiveResources {
    #[must_use]
    pub fn total(&self) -> usize {
        self.vertex_buffers + self.index_buffers + self.constant_buffers + self.textures + self.shaders
    }
}

/// Recording backend for tests and tooling.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    buffers: SlotMap<BufferId, BufferRecord>,
    textures: SlotMap<TextureId, TextureRecord>,
    shaders: SlotMap<ShaderId, ShaderRecord>,
    constants: ConstantStore,
    frames: Vec<FrameData>,
    creation_budget: Option<usize>,
    failing_kind: Option<ResourceKind>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows only `budget` more successful resource creations; every
    /// creation after that fails.
    #[must_use]
    pub fn with_creation_budget(mut self, budget: usize) -> Self {
        self.creation_budget = Some(budget);
        self
    }

    /// Makes every creation of `kind` fail.
    #[must_use]
    pub fn failing(mut self, kind: ResourceKind) -> Self {
        self.failing_kind = Some(kind);
        self
    }

    pub fn set_creation_budget(&mut self, budget: Option<usize>) {
        self.creation_budget = budget;
    }

    #[must_use]
    pub fn live_resources(&self) -> LiveResources {
        let mut live = LiveResources {
            constant_buffers: self.constants.len(),
            textures: self.textures.len(),
            shaders: self.shaders.len(),
            ..LiveResources::default()
        };
        for record in self.buffers.values() {
            match record.kind {
                ResourceKind::IndexBuffer => live.index_buffers += 1,
                _ => live.vertex_buffers += 1,
            }
        }
        live
    }

    /// Frames submitted so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[FrameData] {
        &self.frames
    }

    #[must_use]
    pub fn last_frame(&self) -> Option<&FrameData> {
        self.frames.last()
    }

    pub fn clear_frames(&mut self) {
        self.frames.clear();
    }

    /// Constants captured for `slot` of the `draw`-th draw of frame `frame`.
    #[must_use]
    pub fn read_constants<T: Pod>(&self, frame: usize, draw: usize, slot: u32) -> Option<T> {
        let frame = self.frames.get(frame)?;
        frame.read_constants(frame.draws.get(draw)?, slot)
    }

    /// Raw contents of a vertex or index buffer.
    #[must_use]
    pub fn buffer_data(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(id).map(|b| b.data.as_slice())
    }

    #[must_use]
    pub fn buffer_label(&self, id: BufferId) -> Option<&str> {
        self.buffers.get(id).map(|b| b.label.as_str())
    }

    #[must_use]
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(id).map(|t| (t.width, t.height))
    }

    #[must_use]
    pub fn shader_label(&self, id: ShaderId) -> Option<&str> {
        self.shaders.get(id).map(|s| s.label.as_str())
    }

    fn check_creation(&mut self, kind: ResourceKind, label: &str) -> Result<()> {
        let refused = |reason: &str| LanternError::ResourceCreation {
            kind,
            label: label.to_string(),
            reason: reason.to_string(),
        };

        if self.failing_kind == Some(kind) {
            return Err(refused("injected failure"));
        }
        match &mut self.creation_budget {
            Some(0) => Err(refused("creation budget exhausted")),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn create_buffer(&mut self, kind: ResourceKind, label: &str, data: &[u8]) -> Result<BufferId> {
        self.check_creation(kind, label)?;
        if data.is_empty() {
            return Err(LanternError::ResourceCreation {
                kind,
                label: label.to_string(),
                reason: "empty buffer".to_string(),
            });
        }
        Ok(self.buffers.insert(BufferRecord {
            label: label.to_string(),
            kind,
            data: data.to_vec(),
        }))
    }

    fn validate_frame(&self, frame: &FrameData) -> Result<()> {
        for draw in &frame.draws {
            if !self.shaders.contains_key(draw.shader) {
                return Err(LanternError::ResourceNotFound { kind: ResourceKind::Shader });
            }
            if !self.buffers.contains_key(draw.vertex.buffer) {
                return Err(LanternError::ResourceNotFound {
                    kind: ResourceKind::VertexBuffer,
                });
            }
            if !self.buffers.contains_key(draw.index.buffer) {
                return Err(LanternError::ResourceNotFound {
                    kind: ResourceKind::IndexBuffer,
                });
            }
            if let Some(texture) = draw.texture
                && !self.textures.contains_key(texture)
            {
                return Err(LanternError::ResourceNotFound { kind: ResourceKind::Texture });
            }
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId> {
        self.create_buffer(ResourceKind::VertexBuffer, label, data)
    }

    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId> {
        self.create_buffer(ResourceKind::IndexBuffer, label, data)
    }

    fn create_constant_buffer(&mut self, label: &str, size: usize) -> Result<ConstantBufferId> {
        self.check_creation(ResourceKind::ConstantBuffer, label)?;
        if size == 0 || size > MAX_CONSTANT_BUFFER_SIZE {
            return Err(LanternError::ResourceCreation {
                kind: ResourceKind::ConstantBuffer,
                label: label.to_string(),
                reason: format!("size {size} outside 1..={MAX_CONSTANT_BUFFER_SIZE}"),
            });
        }
        Ok(self.constants.insert(label, size))
    }

    fn create_texture(&mut self, label: &str, data: &TextureData) -> Result<TextureId> {
        self.check_creation(ResourceKind::Texture, label)?;
        if !data.is_consistent() {
            return Err(LanternError::ResourceCreation {
                kind: ResourceKind::Texture,
                label: label.to_string(),
                reason: format!("{}x{} does not match {} bytes", data.width, data.height, data.rgba.len()),
            });
        }
        Ok(self.textures.insert(TextureRecord {
            label: label.to_string(),
            width: data.width,
            height: data.height,
        }))
    }

    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId> {
        self.check_creation(ResourceKind::Shader, &desc.label)?;
        desc.validate()?;
        Ok(self.shaders.insert(ShaderRecord {
            label: desc.label.clone(),
            layout: desc.layout,
        }))
    }

    fn release_buffer(&mut self, id: BufferId) {
        if self.buffers.remove(id).is_none() {
            log::warn!("Releasing unknown buffer {id:?}");
        }
    }

    fn release_constant_buffer(&mut self, id: ConstantBufferId) {
        if !self.constants.remove(id) {
            log::warn!("Releasing unknown constant buffer {id:?}");
        }
    }

    fn release_texture(&mut self, id: TextureId) {
        if let Some(texture) = self.textures.remove(id) {
            log::trace!("Released texture '{}'", texture.label);
        } else {
            log::warn!("Releasing unknown texture {id:?}");
        }
    }

    fn release_shader(&mut self, id: ShaderId) {
        if let Some(shader) = self.shaders.remove(id) {
            log::trace!("Released shader '{}' ({:?})", shader.label, shader.layout);
        } else {
            log::warn!("Releasing unknown shader {id:?}");
        }
    }

    fn constants(&mut self) -> &mut ConstantStore {
        &mut self.constants
    }

    fn submit(&mut self, frame: FrameData) -> Result<()> {
        self.validate_frame(&frame)?;
        log::trace!(
            "Headless frame {}: {} draws, {} rejected",
            self.frames.len(),
            frame.draws.len(),
            frame.rejected_draws
        );
        self.frames.push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_budget_runs_out() {
        let mut backend = HeadlessBackend::new().with_creation_budget(1);
        assert!(backend.create_vertex_buffer("a", &[0; 4]).is_ok());
        assert!(matches!(
            backend.create_vertex_buffer("b", &[0; 4]),
            Err(LanternError::ResourceCreation { .. })
        ));
    }

    #[test]
    fn failing_kind_only_affects_that_kind() {
        let mut backend = HeadlessBackend::new().failing(ResourceKind::Texture);
        assert!(backend.create_constant_buffer("c", 64).is_ok());
        assert!(backend.create_texture("t", &TextureData::white()).is_err());
    }

    #[test]
    fn oversized_constant_buffer_is_refused() {
        let mut backend = HeadlessBackend::new();
        assert!(backend.create_constant_buffer("big", 512).is_err());
        assert_eq!(backend.live_resources().total(), 0);
    }
}
