use std::path::Path;

use image::GenericImageView;

use crate::errors::{LanternError, Result};
use crate::render::backend::TextureData;

/// Decodes an image file into tightly packed RGBA8.
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureData> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| LanternError::AssetLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let (width, height) = img.dimensions();
    log::debug!("Loaded texture {} ({width}x{height})", path.display());

    Ok(TextureData {
        width,
        height,
        rgba: img.into_rgba8().into_raw(),
    })
}

/// Decodes an encoded image (PNG, JPEG) held in memory.
pub fn texture_from_memory(bytes: &[u8]) -> Result<TextureData> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: img.into_rgba8().into_raw(),
    })
}
