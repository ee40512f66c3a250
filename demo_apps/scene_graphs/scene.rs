//! The demo scene.
//!
//! ```text
//! Root
//! ├── Grid
//! ├── Cube
//! ├── Plane           (1.5, 0, 0)
//! ├── Light           (1.5, 2, 1)
//! │   └── Sphere
//! ├── Gizmo 01        (0, 1, 0)
//! ├── Gizmo 02        (0, -1, 0)
//! └── Textured Mesh   (-1, 0, 0)
//! ```
//!
//! The gizmos and the textured mesh come from files under the asset
//! directory. A file that fails to load is logged and its node left out.

use glam::Vec3;

use lantern::errors::{LanternError, ResourceKind, Result};
use lantern::render::{BuiltinShader, RenderBackend, Shader};
use lantern::renderables::{Cube, Grid, Light, Mesh, Plane, Renderable, Sphere, TexturedMesh};
use lantern::{Graphics, NodeHandle, RenderableKey, Resources, SceneGraph, Settings, ShaderKey};

pub const GIZMO_FILE: &str = "gizmoxyz.obj";
pub const TEXTURED_MESH_FILE: &str = "brick_cube.obj";

struct Shaders {
    combined: ShaderKey,
    light_geometry: ShaderKey,
    simple_lit: ShaderKey,
    textured: ShaderKey,
}

/// Builds the scene and returns the light node.
pub fn build<B: RenderBackend>(graphics: &mut Graphics<B>, settings: &Settings) -> Result<NodeHandle> {
    let light_buffer = graphics.light_buffer().ok_or(LanternError::ResourceNotFound {
        kind: ResourceKind::ConstantBuffer,
    })?;
    let (backend, resources, scene) = graphics.parts_mut();

    let shaders = Shaders {
        combined: add_shader(backend, resources, BuiltinShader::VertexColor)?,
        light_geometry: add_shader(backend, resources, BuiltinShader::LightGeometry)?,
        simple_lit: add_shader(backend, resources, BuiltinShader::SimpleLit)?,
        textured: add_shader(backend, resources, BuiltinShader::Textured)?,
    };

    let root = scene.root();
    scene.get_node_mut(root).ok_or(LanternError::NodeNotFound(root))?.set_local_transform(glam::Mat4::IDENTITY);

    let grid = resources.add_renderable(Grid::initialize(backend)?);
    attach(scene, root, "Grid", Vec3::ZERO, grid, shaders.combined)?;

    let cube = resources.add_renderable(Cube::initialize(backend)?);
    attach(scene, root, "Cube", Vec3::ZERO, cube, shaders.combined)?;

    let plane = resources.add_renderable(Plane::initialize(backend)?);
    attach(scene, root, "Plane", Vec3::new(1.5, 0.0, 0.0), plane, shaders.combined)?;

    let light = resources.add_renderable(Light::initialize(backend, light_buffer)?);
    let light_node = attach(scene, root, "Light", Vec3::new(1.5, 2.0, 1.0), light, shaders.light_geometry)?;

    let sphere = resources.add_renderable(Sphere::initialize(backend, light_buffer, 0.25, 12, 6)?);
    attach(scene, light_node, "Sphere", Vec3::ZERO, sphere, shaders.light_geometry)?;

    for (name, y) in [("Gizmo 01", 1.0), ("Gizmo 02", -1.0)] {
        let mut gizmo = Mesh::initialize(backend, name, light_buffer)?;
        match gizmo.load_from_file(backend, settings.asset_path(GIZMO_FILE)) {
            Ok(()) => {
                let key = resources.add_renderable(gizmo);
                attach(scene, root, name, Vec3::new(0.0, y, 0.0), key, shaders.simple_lit)?;
            }
            Err(e) => {
                log::warn!("Leaving out '{name}': {e}");
                gizmo.cleanup(backend);
            }
        }
    }

    let mut textured = TexturedMesh::initialize(backend, "Textured Mesh", light_buffer)?;
    match textured.load_from_file(backend, settings.asset_path(TEXTURED_MESH_FILE)) {
        Ok(()) => {
            let key = resources.add_renderable(textured);
            attach(scene, root, "Textured Mesh", Vec3::new(-1.0, 0.0, 0.0), key, shaders.textured)?;
        }
        Err(e) => {
            log::warn!("Leaving out 'Textured Mesh': {e}");
            textured.cleanup(backend);
        }
    }

    graphics.set_light_node(Some(light_node));
    log::info!("Demo scene built: {} nodes", graphics.scene().len());
    Ok(light_node)
}

fn add_shader<B: RenderBackend>(backend: &mut B, resources: &mut Resources, shader: BuiltinShader) -> Result<ShaderKey> {
    Ok(resources.add_shader(Shader::builtin(backend, shader)?))
}

fn attach(
    scene: &mut SceneGraph,
    parent: NodeHandle,
    name: &str,
    translation: Vec3,
    renderable: RenderableKey,
    shader: ShaderKey,
) -> Result<NodeHandle> {
    let node = scene.create_child(parent, name)?;
    scene.set_renderable(node, renderable, shader)?;
    if let Some(n) = scene.get_node_mut(node) {
        n.set_local_translation(translation.x, translation.y, translation.z);
    }
    Ok(node)
}
