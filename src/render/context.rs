//! Per-frame draw recording.
//!
//! [`DrawContext`] mirrors an immediate-mode device context: renderables write
//! constant buffers, bind state and issue indexed draws, in order. Each
//! [`draw_indexed`](DrawContext::draw_indexed) captures a snapshot of every
//! constant buffer bound at that moment, so a buffer rewritten before the next
//! draw never leaks into the previous one.
//!
//! Snapshots are packed into [`FrameData::staging`] at
//! [`MAX_CONSTANT_BUFFER_SIZE`]-byte boundaries. The first block of the
//! staging area is always zero and stands in for unbound slots.

use std::collections::HashMap;

use bytemuck::Pod;
use slotmap::SlotMap;

use crate::render::backend::{BufferId, ConstantBufferId, ShaderId, TextureId};
use crate::render::constants::{CONSTANT_SLOT_COUNT, MAX_CONSTANT_BUFFER_SIZE, TEXTURE_SLOT};
use crate::render::shader::Shader;
use crate::render::vertex::{IndexFormat, InputLayout, Topology};

// ============================================================================
// Constant Store
// ============================================================================

#[derive(Debug)]
struct ConstantEntry {
    label: String,
    data: Vec<u8>,
    version: u64,
}

/// CPU shadow of every constant buffer a backend has created.
///
/// Contents persist across frames until overwritten.
#[derive(Debug, Default)]
pub struct ConstantStore {
    buffers: SlotMap<ConstantBufferId, ConstantEntry>,
}

impl ConstantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a zero-filled buffer of `size` bytes.
    pub fn insert(&mut self, label: &str, size: usize) -> ConstantBufferId {
        self.buffers.insert(ConstantEntry {
            label: label.to_string(),
            data: vec![0; size],
            version: 0,
        })
    }

    pub fn remove(&mut self, id: ConstantBufferId) -> bool {
        self.buffers.remove(id).is_some()
    }

    #[must_use]
    pub fn contains(&self, id: ConstantBufferId) -> bool {
        self.buffers.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    #[must_use]
    pub fn contents(&self, id: ConstantBufferId) -> Option<&[u8]> {
        self.buffers.get(id).map(|e| e.data.as_slice())
    }

    #[must_use]
    pub fn label(&self, id: ConstantBufferId) -> Option<&str> {
        self.buffers.get(id).map(|e| e.label.as_str())
    }

    /// Replaces the whole contents. Fails if the id is unknown or the size
    /// differs from the size the buffer was created with.
    pub fn write(&mut self, id: ConstantBufferId, bytes: &[u8]) -> bool {
        match self.buffers.get_mut(id) {
            Some(entry) if entry.data.len() == bytes.len() => {
                entry.data.copy_from_slice(bytes);
                entry.version += 1;
                true
            }
            _ => false,
        }
    }

    fn version(&self, id: ConstantBufferId) -> Option<u64> {
        self.buffers.get(id).map(|e| e.version)
    }
}

// ============================================================================
// Recorded frame
// ============================================================================

/// Vertex buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    pub buffer: BufferId,
    pub stride: u32,
    pub offset: u32,
}

/// Index buffer binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBinding {
    pub buffer: BufferId,
    pub format: IndexFormat,
}

/// Where a constant buffer's contents were captured for one draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSnapshot {
    pub buffer: ConstantBufferId,
    /// Byte offset into [`FrameData::staging`], aligned to
    /// [`MAX_CONSTANT_BUFFER_SIZE`].
    pub offset: u32,
    pub size: u32,
}

/// One fully resolved indexed draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub shader: ShaderId,
    pub layout: InputLayout,
    pub topology: Topology,
    pub vertex: VertexBinding,
    pub index: IndexBinding,
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub constants: [Option<ConstantSnapshot>; CONSTANT_SLOT_COUNT],
    pub texture: Option<TextureId>,
}

/// Everything a backend needs to execute one frame.
#[derive(Debug, Clone)]
pub struct FrameData {
    /// Packed constant snapshots; block 0 is all zeros.
    pub staging: Vec<u8>,
    pub draws: Vec<DrawItem>,
    /// Draw calls dropped because required state was missing or invalid.
    pub rejected_draws: usize,
}

impl FrameData {
    fn new() -> Self {
        Self {
            staging: vec![0; MAX_CONSTANT_BUFFER_SIZE],
            draws: Vec::new(),
            rejected_draws: 0,
        }
    }

    /// Bytes captured for `slot` of `draw`, if a buffer was bound there.
    #[must_use]
    pub fn constants_for(&self, draw: &DrawItem, slot: u32) -> Option<&[u8]> {
        let snapshot = (*draw.constants.get(slot as usize)?)?;
        let start = snapshot.offset as usize;
        self.staging.get(start..start + snapshot.size as usize)
    }

    /// Typed view of [`constants_for`](Self::constants_for).
    #[must_use]
    pub fn read_constants<T: Pod>(&self, draw: &DrawItem, slot: u32) -> Option<T> {
        let bytes = self.constants_for(draw, slot)?;
        (bytes.len() == std::mem::size_of::<T>()).then(|| bytemuck::pod_read_unaligned(bytes))
    }
}

// ============================================================================
// Draw Context
// ============================================================================

#[derive(Debug, Default, Clone)]
struct BindState {
    shader: Option<(ShaderId, InputLayout)>,
    topology: Topology,
    vertex: Option<VertexBinding>,
    index: Option<IndexBinding>,
    constants: [Option<ConstantBufferId>; CONSTANT_SLOT_COUNT],
    texture: Option<TextureId>,
}

/// Records the draw calls of one frame.
pub struct DrawContext<'a> {
    store: &'a mut ConstantStore,
    state: BindState,
    frame: FrameData,
    // (buffer, version) -> staging offset, so unchanged buffers are captured once.
    captured: HashMap<(ConstantBufferId, u64), u32>,
}

impl<'a> DrawContext<'a> {
    pub fn new(store: &'a mut ConstantStore) -> Self {
        Self {
            store,
            state: BindState::default(),
            frame: FrameData::new(),
            captured: HashMap::new(),
        }
    }

    /// Overwrites a constant buffer with `value` (map, discard, copy, unmap).
    pub fn update_constants<T: Pod>(&mut self, buffer: ConstantBufferId, value: &T) {
        self.write_constants(buffer, bytemuck::bytes_of(value));
    }

    pub fn write_constants(&mut self, buffer: ConstantBufferId, bytes: &[u8]) {
        if !self.store.write(buffer, bytes) {
            log::warn!(
                "Ignoring constant write of {} bytes to {:?}: unknown buffer or size mismatch",
                bytes.len(),
                buffer
            );
        }
    }

    /// Binds a compiled shader. A shader that was cleaned up unbinds instead.
    pub fn set_shader(&mut self, shader: &Shader) {
        match shader.id() {
            Some(id) => self.state.shader = Some((id, shader.layout())),
            None => {
                log::warn!("Shader '{}' is not compiled; unbinding", shader.label());
                self.state.shader = None;
            }
        }
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.state.topology = topology;
    }

    pub fn bind_constants(&mut self, slot: u32, buffer: ConstantBufferId) {
        match self.state.constants.get_mut(slot as usize) {
            Some(bound) => *bound = Some(buffer),
            None => log::warn!("Constant slot {slot} out of range"),
        }
    }

    pub fn unbind_constants(&mut self, slot: u32) {
        if let Some(bound) = self.state.constants.get_mut(slot as usize) {
            *bound = None;
        }
    }

    pub fn bind_texture(&mut self, slot: u32, texture: TextureId) {
        if slot == TEXTURE_SLOT {
            self.state.texture = Some(texture);
        } else {
            log::warn!("Textures bind at slot {TEXTURE_SLOT}, not {slot}");
        }
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferId, stride: u32, offset: u32) {
        self.state.vertex = Some(VertexBinding { buffer, stride, offset });
    }

    pub fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat) {
        self.state.index = Some(IndexBinding { buffer, format });
    }

    /// Resets all bound state, like a device context's `ClearState`.
    pub fn clear_state(&mut self) {
        self.state = BindState::default();
    }

    /// Issues an indexed draw with the currently bound state.
    ///
    /// The draw is dropped (and counted in [`FrameData::rejected_draws`]) if
    /// no shader, vertex buffer or index buffer is bound, or if the vertex
    /// stride does not match the shader's input layout.
    pub fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) {
        let (Some((shader, layout)), Some(vertex), Some(index)) =
            (self.state.shader, self.state.vertex, self.state.index)
        else {
            log::warn!("draw_indexed without shader, vertex buffer or index buffer bound");
            self.frame.rejected_draws += 1;
            return;
        };

        if vertex.stride != layout.stride() {
            log::warn!(
                "Vertex stride {} does not match layout {:?} (stride {})",
                vertex.stride,
                layout,
                layout.stride()
            );
            self.frame.rejected_draws += 1;
            return;
        }

        let bound = self.state.constants;
        let mut constants = [None; CONSTANT_SLOT_COUNT];
        for (slot, buffer) in bound.into_iter().enumerate() {
            if let Some(buffer) = buffer {
                constants[slot] = self.capture(buffer);
            }
        }

        self.frame.draws.push(DrawItem {
            shader,
            layout,
            topology: self.state.topology,
            vertex,
            index,
            index_count,
            first_index,
            base_vertex,
            constants,
            texture: self.state.texture,
        });
    }

    fn capture(&mut self, buffer: ConstantBufferId) -> Option<ConstantSnapshot> {
        let Some(version) = self.store.version(buffer) else {
            log::warn!("Bound constant buffer {buffer:?} no longer exists");
            return None;
        };
        let data = self.store.contents(buffer)?;
        let size = data.len() as u32;

        let offset = match self.captured.get(&(buffer, version)) {
            Some(&offset) => offset,
            None => {
                let offset = self.frame.staging.len() as u32;
                self.frame.staging.extend_from_slice(data);
                let padded = self.frame.staging.len().next_multiple_of(MAX_CONSTANT_BUFFER_SIZE);
                self.frame.staging.resize(padded, 0);
                self.captured.insert((buffer, version), offset);
                offset
            }
        };

        Some(ConstantSnapshot { buffer, offset, size })
    }

    /// Frame recorded so far.
    #[must_use]
    pub fn frame(&self) -> &FrameData {
        &self.frame
    }

    /// Ends recording and hands the frame over for submission.
    #[must_use]
    pub fn finish(self) -> FrameData {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_rejects_wrong_size_writes() {
        let mut store = ConstantStore::new();
        let id = store.insert("test", 16);
        assert!(!store.write(id, &[1u8; 8]));
        assert!(store.write(id, &[1u8; 16]));
        assert_eq!(store.contents(id), Some(&[1u8; 16][..]));
    }

    #[test]
    fn staging_starts_with_zero_block() {
        let mut store = ConstantStore::new();
        let ctx = DrawContext::new(&mut store);
        let frame = ctx.finish();
        assert_eq!(frame.staging.len(), MAX_CONSTANT_BUFFER_SIZE);
        assert!(frame.staging.iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_without_state_is_rejected() {
        let mut store = ConstantStore::new();
        let mut ctx = DrawContext::new(&mut store);
        ctx.draw_indexed(3, 0, 0);
        let frame = ctx.finish();
        assert!(frame.draws.is_empty());
        assert_eq!(frame.rejected_draws, 1);
    }
}
