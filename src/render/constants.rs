//! Constant buffer layouts and bind slots.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::errors::Result;
use crate::render::backend::{ConstantBufferId, RenderBackend};
use crate::render::context::DrawContext;

/// Slot of the frame-global view-projection matrix.
pub const VIEW_PROJECTION_SLOT: u32 = 0;
/// Slot of the per-renderable local-to-world matrix.
pub const LOCAL_TO_WORLD_SLOT: u32 = 1;
/// Slot of the light parameters.
pub const LIGHT_SLOT: u32 = 2;
/// Number of constant buffer slots.
pub const CONSTANT_SLOT_COUNT: usize = 3;
/// Slot of the diffuse texture and its sampler.
pub const TEXTURE_SLOT: u32 = 3;

/// Largest constant buffer the backends accept; also the snapshot alignment.
pub const MAX_CONSTANT_BUFFER_SIZE: usize = 256;

/// Binding size per constant slot, matching the WGSL uniform structs.
pub const CONSTANT_SLOT_SIZES: [u64; CONSTANT_SLOT_COUNT] = [
    std::mem::size_of::<ViewProjectionConstants>() as u64,
    std::mem::size_of::<LocalToWorldConstants>() as u64,
    std::mem::size_of::<LightConstants>() as u64,
];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewProjectionConstants {
    pub view_projection: Mat4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LocalToWorldConstants {
    pub local_to_world: Mat4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightConstants {
    /// World position, `w` is always 0.
    pub light_position: Vec4,
    pub diffuse: Vec4,
}

impl LightConstants {
    #[must_use]
    pub fn new(position: Vec3, diffuse: Vec4) -> Self {
        Self {
            light_position: position.extend(0.0),
            diffuse,
        }
    }
}

/// A typed handle to a backend constant buffer holding one `T`.
///
/// Writes go through the [`DrawContext`] with map/discard semantics: the
/// previous contents are replaced and every later draw that binds the buffer
/// sees the new value.
pub struct ConstantBuffer<T: Pod> {
    id: ConstantBufferId,
    _marker: PhantomData<T>,
}

impl<T: Pod> ConstantBuffer<T> {
    pub fn create(backend: &mut dyn RenderBackend, label: &str) -> Result<Self> {
        let id = backend.create_constant_buffer(label, std::mem::size_of::<T>())?;
        Ok(Self {
            id,
            _marker: PhantomData,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ConstantBufferId {
        self.id
    }

    pub fn write(&self, ctx: &mut DrawContext<'_>, value: &T) {
        ctx.update_constants(self.id, value);
    }

    pub fn bind(&self, ctx: &mut DrawContext<'_>, slot: u32) {
        ctx.bind_constants(slot, self.id);
    }

    pub fn release(self, backend: &mut dyn RenderBackend) {
        backend.release_constant_buffer(self.id);
    }
}

impl<T: Pod> Clone for ConstantBuffer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Pod> Copy for ConstantBuffer<T> {}

impl<T: Pod> fmt::Debug for ConstantBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantBuffer")
            .field("id", &self.id)
            .field("size", &std::mem::size_of::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_layouts_fit_one_snapshot() {
        for size in CONSTANT_SLOT_SIZES {
            assert!(size as usize <= MAX_CONSTANT_BUFFER_SIZE);
            assert_eq!(size % 16, 0);
        }
    }

    #[test]
    fn light_position_w_is_zero() {
        let light = LightConstants::new(Vec3::new(1.5, 2.0, 1.0), Vec4::ONE);
        assert_eq!(light.light_position, Vec4::new(1.5, 2.0, 1.0, 0.0));
    }
}
