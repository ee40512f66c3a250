//! Vertex formats and input layouts.
//!
//! Every vertex starts with a position followed by an RGBA colour; the lit and
//! textured layouts append a normal and a UV pair. The structs are `#[repr(C)]`
//! and [`Pod`] so vertex slices upload with `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};

/// Position + colour, 7 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    #[must_use]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// Position + colour + normal, 10 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertexNormal {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
}

/// Position + colour + normal + UV, 12 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColorVertexNormalUv {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Vertex input layout a shader is compiled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLayout {
    VertexColor,
    VertexColorNormal,
    VertexColorNormalUv,
}

const VERTEX_COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];
const VERTEX_COLOR_NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x3];
const VERTEX_COLOR_NORMAL_UV_ATTRIBUTES: [wgpu::VertexAttribute; 4] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4, 2 => Float32x3, 3 => Float32x2];

impl InputLayout {
    /// Size of one vertex in bytes.
    #[must_use]
    pub const fn stride(self) -> u32 {
        match self {
            InputLayout::VertexColor => std::mem::size_of::<ColorVertex>() as u32,
            InputLayout::VertexColorNormal => std::mem::size_of::<ColorVertexNormal>() as u32,
            InputLayout::VertexColorNormalUv => std::mem::size_of::<ColorVertexNormalUv>() as u32,
        }
    }

    /// Whether shaders of this layout sample a texture at the texture slot.
    #[must_use]
    pub const fn is_textured(self) -> bool {
        matches!(self, InputLayout::VertexColorNormalUv)
    }

    #[must_use]
    pub fn attributes(self) -> &'static [wgpu::VertexAttribute] {
        match self {
            InputLayout::VertexColor => &VERTEX_COLOR_ATTRIBUTES,
            InputLayout::VertexColorNormal => &VERTEX_COLOR_NORMAL_ATTRIBUTES,
            InputLayout::VertexColorNormalUv => &VERTEX_COLOR_NORMAL_UV_ATTRIBUTES,
        }
    }

    #[must_use]
    pub fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: u64::from(self.stride()),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: self.attributes(),
        }
    }
}

/// Primitive topology of an indexed draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    #[default]
    TriangleList,
    LineList,
}

impl From<Topology> for wgpu::PrimitiveTopology {
    fn from(t: Topology) -> Self {
        match t {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Topology::LineList => wgpu::PrimitiveTopology::LineList,
        }
    }
}

/// Width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

impl From<IndexFormat> for wgpu::IndexFormat {
    fn from(f: IndexFormat) -> Self {
        match f {
            IndexFormat::U16 => wgpu::IndexFormat::Uint16,
            IndexFormat::U32 => wgpu::IndexFormat::Uint32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_match_float_counts() {
        assert_eq!(InputLayout::VertexColor.stride(), 7 * 4);
        assert_eq!(InputLayout::VertexColorNormal.stride(), 10 * 4);
        assert_eq!(InputLayout::VertexColorNormalUv.stride(), 12 * 4);
    }

    #[test]
    fn attribute_offsets_fit_inside_stride() {
        for layout in [
            InputLayout::VertexColor,
            InputLayout::VertexColorNormal,
            InputLayout::VertexColorNormalUv,
        ] {
            let last = layout.attributes().last().copied().unwrap();
            assert!(last.offset + last.format.size() <= u64::from(layout.stride()));
        }
    }
}
