use std::path::Path;

use crate::assets;
use crate::errors::Result;
use crate::render::backend::{RenderBackend, TextureData, TextureId};

/// A diffuse texture with its sampler.
#[derive(Debug)]
pub struct Material {
    label: String,
    texture: Option<TextureId>,
    size: (u32, u32),
}

impl Material {
    pub fn from_texture_data(backend: &mut dyn RenderBackend, label: &str, data: &TextureData) -> Result<Self> {
        let texture = backend.create_texture(label, data)?;
        Ok(Self {
            label: label.to_string(),
            texture: Some(texture),
            size: (data.width, data.height),
        })
    }

    /// Decodes an image file and uploads it.
    pub fn load_image_from_file(backend: &mut dyn RenderBackend, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = assets::load_texture(path)?;
        Self::from_texture_data(backend, &path.display().to_string(), &data)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(texture) = self.texture.take() {
            backend.release_texture(texture);
        }
    }
}
