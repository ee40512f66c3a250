//! Wavefront OBJ loading.
//!
//! Files are read with `tobj`, triangulated and single-indexed. Each OBJ model
//! becomes one [`MeshPart`] whose vertices carry the diffuse colour of the
//! model's material. Missing normals are rebuilt from face normals; missing
//! texture coordinates default to zero.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::errors::{LanternError, Result};
use crate::render::vertex::{ColorVertexNormal, ColorVertexNormalUv};

/// A material as referenced by the OBJ's MTL library.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse: [f32; 3],
    /// Diffuse texture, resolved relative to the OBJ file.
    pub diffuse_texture: Option<PathBuf>,
}

/// One indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub name: String,
    pub vertices: Vec<ColorVertexNormalUv>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

impl MeshPart {
    /// The vertices without texture coordinates.
    #[must_use]
    pub fn untextured_vertices(&self) -> Vec<ColorVertexNormal> {
        self.vertices
            .iter()
            .map(|v| ColorVertexNormal {
                position: v.position,
                color: v.color,
                normal: v.normal,
            })
            .collect()
    }
}

/// Everything loaded from one OBJ file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjScene {
    pub parts: Vec<MeshPart>,
    pub materials: Vec<ObjMaterial>,
}

impl ObjScene {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }
}

/// Loads and converts an OBJ file.
///
/// A missing or broken MTL library is not fatal: the parts fall back to a
/// white diffuse colour.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ObjScene> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LanternError::AssetLoad {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let materials = materials.unwrap_or_else(|e| {
        log::warn!("No usable MTL for {}: {e}", path.display());
        Vec::new()
    });

    let base_dir = path.parent().unwrap_or(Path::new("."));
    let scene = convert(&models, &materials, base_dir);
    log::info!(
        "Loaded {}: {} parts, {} vertices, {} materials",
        path.display(),
        scene.parts.len(),
        scene.vertex_count(),
        scene.materials.len()
    );
    Ok(scene)
}

fn convert(models: &[tobj::Model], materials: &[tobj::Material], base_dir: &Path) -> ObjScene {
    let materials: Vec<ObjMaterial> = materials
        .iter()
        .map(|m| ObjMaterial {
            name: m.name.clone(),
            diffuse: m.diffuse.unwrap_or([1.0; 3]),
            diffuse_texture: m.diffuse_texture.as_ref().map(|t| base_dir.join(t)),
        })
        .collect();

    let parts = models
        .iter()
        .filter_map(|model| {
            let mesh = &model.mesh;
            if mesh.indices.is_empty() {
                log::warn!("Skipping empty OBJ model '{}'", model.name);
                return None;
            }
            let material = mesh.material_id.filter(|&id| id < materials.len());
            let diffuse = material.map_or([1.0; 3], |id| materials[id].diffuse);
            Some(MeshPart {
                name: model.name.clone(),
                vertices: build_vertices(mesh, diffuse),
                indices: mesh.indices.clone(),
                material,
            })
        })
        .collect();

    ObjScene { parts, materials }
}

fn build_vertices(mesh: &tobj::Mesh, diffuse: [f32; 3]) -> Vec<ColorVertexNormalUv> {
    let count = mesh.positions.len() / 3;
    let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    } else {
        face_normals(&mesh.positions, &mesh.indices)
    };
    let color = [diffuse[0], diffuse[1], diffuse[2], 1.0];

    (0..count)
        .map(|i| ColorVertexNormalUv {
            position: [
                mesh.positions[3 * i],
                mesh.positions[3 * i + 1],
                mesh.positions[3 * i + 2],
            ],
            color,
            normal: normals[i],
            uv: if mesh.texcoords.len() >= 2 * count {
                [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
            } else {
                [0.0, 0.0]
            },
        })
        .collect()
}

/// Per-vertex normals averaged from the faces that share each vertex.
fn face_normals(positions: &[f32], indices: &[u32]) -> Vec<[f32; 3]> {
    let position = |i: u32| {
        let i = i as usize * 3;
        Vec3::new(positions[i], positions[i + 1], positions[i + 2])
    };
    let mut normals = vec![Vec3::ZERO; positions.len() / 3];

    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (position(tri[0]), position(tri[1]), position(tri[2]));
        let n = (b - a).cross(c - a);
        for &i in tri {
            normals[i as usize] += n;
        }
    }

    normals
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
