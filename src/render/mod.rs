//! Rendering layer.
//!
//! - [`backend`]: the [`RenderBackend`] trait and resource ids
//! - [`context`]: per-frame draw recording ([`DrawContext`])
//! - [`constants`]: constant buffer layouts and bind slots
//! - [`shader`]: shader descriptions and compiled [`Shader`] handles
//! - [`vertex`]: vertex formats and input layouts
//! - [`headless`]: a CPU-only backend that records frames
//! - [`wgpu_backend`]: the GPU backend

pub mod backend;
pub mod constants;
pub mod context;
pub mod headless;
pub mod shader;
pub mod vertex;
pub mod wgpu_backend;

pub use backend::{BufferId, ConstantBufferId, RenderBackend, ShaderId, TextureData, TextureId};
pub use constants::{
    ConstantBuffer, LIGHT_SLOT, LOCAL_TO_WORLD_SLOT, LightConstants, LocalToWorldConstants, TEXTURE_SLOT,
    VIEW_PROJECTION_SLOT, ViewProjectionConstants,
};
pub use context::{ConstantStore, DrawContext, DrawItem, FrameData};
pub use headless::{HeadlessBackend, LiveResources};
pub use shader::{BuiltinShader, Shader, ShaderDesc};
pub use vertex::{ColorVertex, ColorVertexNormal, ColorVertexNormalUv, IndexFormat, InputLayout, Topology};
pub use wgpu_backend::WgpuBackend;
