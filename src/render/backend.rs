//! Backend contract.
//!
//! A [`RenderBackend`] plays the role of the graphics device: it creates and
//! releases GPU resources, and consumes one recorded [`FrameData`] per frame.
//! Resources are referred to by opaque generational ids, so a released id
//! never aliases a newer resource.

use slotmap::new_key_type;

use crate::errors::Result;
use crate::render::context::{ConstantStore, DrawContext, FrameData};
use crate::render::shader::ShaderDesc;

new_key_type! {
    /// Vertex or index buffer.
    pub struct BufferId;
    /// Constant (uniform) buffer.
    pub struct ConstantBufferId;
    /// 2D texture with its sampler.
    pub struct TextureId;
    /// Compiled shader program.
    pub struct ShaderId;
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Tightly packed rows, 4 bytes per pixel.
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// A single opaque white pixel.
    #[must_use]
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    /// True when `rgba` holds exactly `width * height` pixels.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.width > 0 && self.height > 0 && self.rgba.len() == (self.width as usize) * (self.height as usize) * 4
    }
}

/// Resource creation and frame submission.
///
/// All creation methods may fail; callers treat a failure as fatal for the
/// object being built and release whatever they already created.
pub trait RenderBackend {
    /// Creates an immutable vertex buffer.
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId>;

    /// Creates an immutable index buffer.
    fn create_index_buffer(&mut self, label: &str, data: &[u8]) -> Result<BufferId>;

    /// Creates a writable constant buffer of `size` bytes, zero-filled.
    fn create_constant_buffer(&mut self, label: &str, size: usize) -> Result<ConstantBufferId>;

    /// Creates a sampled 2D texture.
    fn create_texture(&mut self, label: &str, data: &TextureData) -> Result<TextureId>;

    /// Compiles a shader program.
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<ShaderId>;

    fn release_buffer(&mut self, id: BufferId);
    fn release_constant_buffer(&mut self, id: ConstantBufferId);
    fn release_texture(&mut self, id: TextureId);
    fn release_shader(&mut self, id: ShaderId);

    /// CPU-side contents of every constant buffer.
    fn constants(&mut self) -> &mut ConstantStore;

    /// Starts recording a frame.
    fn begin_frame(&mut self) -> DrawContext<'_> {
        DrawContext::new(self.constants())
    }

    /// Executes a recorded frame.
    fn submit(&mut self, frame: FrameData) -> Result<()>;

    /// Notifies the backend that the output size changed.
    fn resize(&mut self, _width: u32, _height: u32) {}
}
