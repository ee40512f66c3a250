//! Asset loading: Wavefront OBJ meshes and image textures.

pub mod obj;
pub mod texture;

pub use obj::{MeshPart, ObjMaterial, ObjScene, load_obj};
pub use texture::{load_texture, texture_from_memory};
