use std::path::Path;

use glam::Mat4;

use crate::assets::{self, ObjScene};
use crate::errors::{LanternError, Result};
use crate::render::backend::{ConstantBufferId, RenderBackend, TextureData};
use crate::render::context::DrawContext;
use crate::render::shader::Shader;
use crate::renderables::Renderable;
use crate::renderables::material::Material;
use crate::renderables::mesh::PartList;

/// Lit, textured mesh imported from an OBJ file.
///
/// Only files with a single material are supported, and that material must
/// name a diffuse texture.
#[derive(Debug)]
pub struct TexturedMesh {
    parts: PartList,
    material: Option<Material>,
}

impl TexturedMesh {
    pub fn initialize(backend: &mut dyn RenderBackend, label: &str, light_buffer: ConstantBufferId) -> Result<Self> {
        Ok(Self {
            parts: PartList::new(backend, label, light_buffer)?,
            material: None,
        })
    }

    pub fn load_from_file(&mut self, backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Loading textured mesh from {}", path.display());
        let scene = assets::load_obj(path)?;

        let texture_path = match scene.materials.as_slice() {
            [material] => material.diffuse_texture.clone(),
            [] => None,
            many => {
                return Err(LanternError::AssetLoad {
                    path: path.to_path_buf(),
                    reason: format!("only one material is supported, found {}", many.len()),
                });
            }
        };
        let texture_path = texture_path.ok_or_else(|| LanternError::AssetLoad {
            path: path.to_path_buf(),
            reason: "material has no diffuse texture".to_string(),
        })?;

        let texture = assets::load_texture(&texture_path)?;
        self.load_scene(backend, &scene, &texture)
    }

    /// Uploads already-parsed OBJ data together with its diffuse texture.
    pub fn load_scene(&mut self, backend: &mut dyn RenderBackend, scene: &ObjScene, texture: &TextureData) -> Result<()> {
        let mut material = Material::from_texture_data(backend, &format!("{} diffuse", self.parts.label()), texture)?;
        let parts = scene
            .parts
            .iter()
            .map(|part| (part.vertices.clone(), part.indices.clone()));
        if let Err(e) = self.parts.upload(backend, parts) {
            material.cleanup(backend);
            return Err(e);
        }

        if let Some(mut old) = self.material.replace(material) {
            old.cleanup(backend);
        }
        Ok(())
    }

    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }
}

impl Renderable for TexturedMesh {
    fn label(&self) -> &str {
        self.parts.label()
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, shader: &Shader, world: &Mat4) {
        let texture = self.material.as_ref().and_then(Material::texture);
        self.parts.draw(ctx, shader, world, texture);
    }

    fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        self.parts.cleanup(backend);
        if let Some(mut material) = self.material.take() {
            material.cleanup(backend);
        }
    }
}
