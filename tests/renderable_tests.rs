//! Renderable Tests
//!
//! Tests for:
//! - Primitive shapes: initialization, bookkeeping, draw recording
//! - Initialization failure releasing partial resources
//! - Cleanup idempotence and shared light buffer ownership
//! - Mesh / TexturedMesh upload from parsed OBJ data
//! - Resources registry removal

use glam::{Mat4, Vec3};

use lantern::assets::{MeshPart, ObjScene};
use lantern::errors::{LanternError, ResourceKind};
use lantern::render::{
    BuiltinShader, ColorVertexNormalUv, ConstantBuffer, ConstantBufferId, HeadlessBackend, IndexFormat, LIGHT_SLOT,
    LightConstants, RenderBackend, Shader, TEXTURE_SLOT, TextureData, Topology,
};
use lantern::renderables::{Cube, Grid, Light, Mesh, Plane, Renderable, Resources, Sphere, TexturedMesh};

fn light_buffer(backend: &mut HeadlessBackend) -> ConstantBufferId {
    ConstantBuffer::<LightConstants>::create(backend, "Light").unwrap().id()
}

fn vertex(position: [f32; 3]) -> ColorVertexNormalUv {
    ColorVertexNormalUv {
        position,
        color: [1.0; 4],
        normal: [0.0, 0.0, -1.0],
        uv: [position[0], position[1]],
    }
}

fn triangle_part(name: &str) -> MeshPart {
    MeshPart {
        name: name.to_string(),
        vertices: vec![vertex([0.0, 0.0, 0.0]), vertex([0.0, 1.0, 0.0]), vertex([1.0, 0.0, 0.0])],
        indices: vec![0, 1, 2],
        material: None,
    }
}

fn two_part_scene() -> ObjScene {
    ObjScene {
        parts: vec![triangle_part("first"), triangle_part("second")],
        materials: Vec::new(),
    }
}

fn checker() -> TextureData {
    TextureData {
        width: 2,
        height: 2,
        rgba: vec![255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255, 255],
    }
}

// ============================================================================
// Primitives
// ============================================================================

#[test]
fn primitives_report_their_geometry() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);

    let cube = Cube::initialize(&mut backend).unwrap();
    assert_eq!(cube.primitive().num_indices(), 36);
    assert_eq!(cube.primitive().stride(), 28);
    assert_eq!(cube.primitive().offset(), 0);
    assert_eq!(cube.primitive().topology(), Topology::TriangleList);

    let grid = Grid::initialize(&mut backend).unwrap();
    assert_eq!(grid.primitive().num_indices(), 44);
    assert_eq!(grid.primitive().topology(), Topology::LineList);

    let plane = Plane::initialize(&mut backend).unwrap();
    assert_eq!(plane.primitive().num_indices(), 6);

    let gizmo = Light::initialize(&mut backend, light).unwrap();
    assert_eq!(gizmo.primitive().num_indices(), 6);
    assert_eq!(gizmo.primitive().topology(), Topology::LineList);

    let sphere = Sphere::initialize(&mut backend, light, 0.25, 12, 6).unwrap();
    assert_eq!(sphere.radius(), 0.25);
    assert!(sphere.primitive().is_initialized());

    // Each shape: vertex + index + world buffer; plus the light buffer.
    let live = backend.live_resources();
    assert_eq!((live.vertex_buffers, live.index_buffers, live.constant_buffers), (5, 5, 6));
}

#[test]
fn primitive_draw_records_bindings() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let shader = Shader::builtin(&mut backend, BuiltinShader::LightGeometry).unwrap();
    let sphere = Sphere::initialize(&mut backend, light, 0.5, 8, 4).unwrap();

    let world = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
    let mut ctx = backend.begin_frame();
    sphere.draw(&mut ctx, &shader, &world);
    let frame = ctx.finish();

    assert_eq!(frame.draws.len(), 1);
    let draw = &frame.draws[0];
    assert_eq!(draw.topology, Topology::LineList);
    assert_eq!(draw.index.format, IndexFormat::U16);
    assert_eq!(draw.index_count, sphere.primitive().num_indices());
    assert_eq!(draw.constants[LIGHT_SLOT as usize].map(|s| s.buffer), Some(light));
    assert_eq!(draw.texture, None);
}

#[test]
fn bad_sphere_tessellation_creates_nothing() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    assert!(Sphere::initialize(&mut backend, light, 1.0, 2, 2).is_err());
    assert_eq!(backend.live_resources().total(), 1);
}

// ============================================================================
// Initialization failure
// ============================================================================

#[test]
fn failed_primitive_initialization_releases_everything() {
    // A primitive needs three resources; fail at each of them in turn.
    for budget in 0..3 {
        let mut backend = HeadlessBackend::new().with_creation_budget(budget);
        let err = Cube::initialize(&mut backend).unwrap_err();
        assert!(matches!(err, LanternError::ResourceCreation { .. }));
        assert_eq!(backend.live_resources().total(), 0, "leak with budget {budget}");
    }
}

#[test]
fn injected_index_buffer_failure_is_reported() {
    let mut backend = HeadlessBackend::new().failing(ResourceKind::IndexBuffer);
    let err = Plane::initialize(&mut backend).unwrap_err();
    assert!(matches!(err, LanternError::ResourceCreation { kind: ResourceKind::IndexBuffer, .. }));
    assert_eq!(backend.live_resources().total(), 0);
}

#[test]
fn failed_mesh_upload_rolls_back_added_parts() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let mut mesh = Mesh::initialize(&mut backend, "Mesh", light).unwrap();

    // First part succeeds, second part's index buffer fails.
    backend.set_creation_budget(Some(3));
    assert!(mesh.load_scene(&mut backend, &two_part_scene()).is_err());
    assert_eq!(mesh.part_count(), 0);

    let live = backend.live_resources();
    assert_eq!((live.vertex_buffers, live.index_buffers, live.constant_buffers), (0, 0, 2));
}

#[test]
fn failed_textured_upload_releases_material() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let mut mesh = TexturedMesh::initialize(&mut backend, "Textured", light).unwrap();

    backend.set_creation_budget(Some(2));
    assert!(mesh.load_scene(&mut backend, &two_part_scene(), &checker()).is_err());
    assert!(mesh.material().is_none());
    assert_eq!(backend.live_resources().textures, 0);
    assert_eq!(backend.live_resources().total(), 2);
}

#[test]
fn missing_mesh_file_is_an_asset_error() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let mut mesh = Mesh::initialize(&mut backend, "Mesh", light).unwrap();
    let err = mesh.load_from_file(&mut backend, "does/not/exist.obj").unwrap_err();
    assert!(matches!(err, LanternError::AssetLoad { .. }));
    assert_eq!(mesh.part_count(), 0);
}

// ============================================================================
// Cleanup
// ============================================================================

#[test]
fn cleanup_is_idempotent_and_keeps_shared_light() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let mut sphere = Sphere::initialize(&mut backend, light, 0.25, 12, 6).unwrap();
    let mut mesh = Mesh::initialize(&mut backend, "Mesh", light).unwrap();
    mesh.load_scene(&mut backend, &two_part_scene()).unwrap();

    sphere.cleanup(&mut backend);
    sphere.cleanup(&mut backend);
    mesh.cleanup(&mut backend);
    mesh.cleanup(&mut backend);

    assert!(!sphere.primitive().is_initialized());
    let live = backend.live_resources();
    assert_eq!(live.total(), 1);
    assert!(backend.constants().contains(light));
}

#[test]
fn cleaned_up_renderable_draws_nothing() {
    let mut backend = HeadlessBackend::new();
    let shader = Shader::builtin(&mut backend, BuiltinShader::VertexColor).unwrap();
    let mut cube = Cube::initialize(&mut backend).unwrap();
    cube.cleanup(&mut backend);

    let mut ctx = backend.begin_frame();
    cube.draw(&mut ctx, &shader, &Mat4::IDENTITY);
    let frame = ctx.finish();
    assert!(frame.draws.is_empty());
    assert_eq!(frame.rejected_draws, 0);
}

#[test]
fn registry_cleanup_releases_everything() {
    let mut backend = HeadlessBackend::new();
    let mut resources = Resources::new();
    let cube = resources.add_renderable(Cube::initialize(&mut backend).unwrap());
    resources.add_renderable(Grid::initialize(&mut backend).unwrap());
    let shader = resources.add_shader(Shader::builtin(&mut backend, BuiltinShader::VertexColor).unwrap());

    assert!(resources.remove_renderable(cube, &mut backend));
    assert!(!resources.remove_renderable(cube, &mut backend));
    assert!(resources.renderable(cube).is_none());
    assert_eq!(resources.renderable_count(), 1);

    resources.cleanup(&mut backend);
    assert_eq!(resources.renderable_count(), 0);
    assert!(resources.shader(shader).is_none());
    assert_eq!(backend.live_resources().total(), 0);
}

// ============================================================================
// Meshes
// ============================================================================

#[test]
fn mesh_draws_once_per_part() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let shader = Shader::builtin(&mut backend, BuiltinShader::SimpleLit).unwrap();
    let mut mesh = Mesh::initialize(&mut backend, "Mesh", light).unwrap();
    mesh.load_scene(&mut backend, &two_part_scene()).unwrap();
    assert_eq!((mesh.part_count(), mesh.index_count()), (2, 6));

    let mut ctx = backend.begin_frame();
    mesh.draw(&mut ctx, &shader, &Mat4::IDENTITY);
    let frame = ctx.finish();

    assert_eq!(frame.draws.len(), 2);
    for draw in &frame.draws {
        assert_eq!(draw.index.format, IndexFormat::U32);
        assert_eq!(draw.vertex.stride, 40);
        assert_eq!(draw.constants[LIGHT_SLOT as usize].map(|s| s.buffer), Some(light));
    }
}

#[test]
fn textured_mesh_binds_its_texture() {
    let mut backend = HeadlessBackend::new();
    let light = light_buffer(&mut backend);
    let shader = Shader::builtin(&mut backend, BuiltinShader::Textured).unwrap();
    let mut mesh = TexturedMesh::initialize(&mut backend, "Textured", light).unwrap();
    mesh.load_scene(&mut backend, &two_part_scene(), &checker()).unwrap();

    let material = mesh.material().unwrap();
    assert_eq!(material.size(), (2, 2));
    let texture = material.texture();
    assert_eq!(backend.texture_size(texture.unwrap()), Some((2, 2)));

    let mut ctx = backend.begin_frame();
    mesh.draw(&mut ctx, &shader, &Mat4::IDENTITY);
    let frame = ctx.finish();
    assert_eq!(frame.draws.len(), 2);
    assert!(frame.draws.iter().all(|d| d.texture == texture && d.vertex.stride == 48));
    assert_eq!(TEXTURE_SLOT, 3);

    mesh.cleanup(&mut backend);
    assert_eq!(backend.live_resources().textures, 0);
}
