//! Vertex and index data of the built-in shapes.

use std::f32::consts::{PI, TAU};

use crate::errors::{LanternError, ResourceKind, Result};
use crate::render::vertex::ColorVertex;

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// CPU-side geometry of one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<ColorVertex>,
    pub indices: Vec<u16>,
}

/// Unit cube centred at the origin, 8 shared corners.
#[must_use]
pub fn cube() -> Geometry {
    let vertices = vec![
        ColorVertex::new([-0.5, -0.5, -0.5], BLUE),
        ColorVertex::new([-0.5, -0.5, 0.5], GREEN),
        ColorVertex::new([-0.5, 0.5, -0.5], RED),
        ColorVertex::new([-0.5, 0.5, 0.5], GREEN),
        ColorVertex::new([0.5, -0.5, -0.5], BLUE),
        ColorVertex::new([0.5, -0.5, 0.5], GREEN),
        ColorVertex::new([0.5, 0.5, -0.5], RED),
        ColorVertex::new([0.5, 0.5, 0.5], BLUE),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 6, 4,  0, 2, 6,
        0, 3, 2,  0, 1, 3,
        2, 7, 6,  2, 3, 7,
        4, 6, 7,  4, 7, 5,
        0, 4, 5,  0, 5, 1,
        1, 5, 7,  1, 7, 3,
    ];
    Geometry { vertices, indices }
}

/// 10x10 line grid on the XZ plane: blue lines along Z, red lines along X.
#[must_use]
pub fn grid() -> Geometry {
    let mut vertices = Vec::with_capacity(44);
    for i in -5..=5 {
        let x = i as f32;
        vertices.push(ColorVertex::new([x, 0.0, -5.0], BLUE));
        vertices.push(ColorVertex::new([x, 0.0, 5.0], BLUE));
    }
    for i in -5..=5 {
        let z = i as f32;
        vertices.push(ColorVertex::new([-5.0, 0.0, z], RED));
        vertices.push(ColorVertex::new([5.0, 0.0, z], RED));
    }
    let indices = (0..vertices.len() as u16).collect();
    Geometry { vertices, indices }
}

/// 2x2 quad in the XY plane.
#[must_use]
pub fn plane() -> Geometry {
    let vertices = vec![
        ColorVertex::new([-1.0, 1.0, 0.0], BLUE),
        ColorVertex::new([1.0, 1.0, 0.0], GREEN),
        ColorVertex::new([1.0, -1.0, 0.0], RED),
        ColorVertex::new([-1.0, -1.0, 0.0], GREEN),
    ];
    Geometry {
        vertices,
        indices: vec![0, 1, 3, 1, 2, 3],
    }
}

/// Three short axis lines marking the light position.
#[must_use]
pub fn light_gizmo() -> Geometry {
    let vertices = vec![
        ColorVertex::new([0.0, 0.0, 0.0], RED),
        ColorVertex::new([0.0, 0.0, 0.0], GREEN),
        ColorVertex::new([0.0, 0.0, 0.0], BLUE),
        ColorVertex::new([0.25, 0.0, 0.0], [0.25, 0.0, 0.0, 1.0]),
        ColorVertex::new([0.0, 0.25, 0.0], GREEN),
        ColorVertex::new([0.0, 0.0, 0.25], BLUE),
    ];
    Geometry {
        vertices,
        indices: vec![0, 3, 1, 4, 2, 5],
    }
}

/// White wireframe sphere as a line list of `stacks` rings by `slices`
/// meridians.
pub fn wire_sphere(radius: f32, slices: u32, stacks: u32) -> Result<Geometry> {
    let vertex_count = (u64::from(stacks) + 1) * (u64::from(slices) + 1);
    if slices < 3 || stacks < 2 || vertex_count > u64::from(u16::MAX) + 1 {
        return Err(LanternError::ResourceCreation {
            kind: ResourceKind::VertexBuffer,
            label: "sphere".to_string(),
            reason: format!("unsupported tessellation {slices} slices x {stacks} stacks"),
        });
    }

    let mut vertices = Vec::with_capacity(vertex_count as usize);
    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            vertices.push(ColorVertex::new(
                [
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                ],
                WHITE,
            ));
        }
    }

    let row = slices + 1;
    let index = |stack: u32, slice: u32| (stack * row + slice) as u16;
    let mut indices = Vec::new();
    for i in 0..stacks {
        for j in 0..slices {
            indices.extend_from_slice(&[index(i, j), index(i, j + 1)]);
            indices.extend_from_slice(&[index(i, j), index(i + 1, j)]);
        }
    }
    for j in 0..slices {
        indices.extend_from_slice(&[index(stacks, j), index(stacks, j + 1)]);
    }

    Ok(Geometry { vertices, indices })
}
