//! Graphics Tests
//!
//! Tests for:
//! - Global constant buffer lifetime
//! - Startup failure reporting
//! - Cleanup idempotence and rendering after cleanup

use glam::{Mat4, Vec4};

use lantern::errors::{LanternError, ResourceKind, StartupStage};
use lantern::render::{BuiltinShader, HeadlessBackend, Shader};
use lantern::renderables::{Cube, Light};
use lantern::Graphics;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn new_creates_only_the_global_buffers() {
    let graphics = Graphics::new(HeadlessBackend::new()).unwrap();
    let live = graphics.backend().live_resources();
    assert_eq!((live.constant_buffers, live.total()), (2, 2));
    assert!(graphics.light_buffer().is_some());
    assert_eq!(graphics.scene().len(), 1);
    assert_eq!(graphics.scene().get_node(graphics.scene().root()).unwrap().name, "Root");
}

#[test]
fn new_reports_light_buffer_failure() {
    let err = Graphics::new(HeadlessBackend::new().with_creation_budget(1)).err().unwrap();
    assert!(matches!(
        err,
        LanternError::ResourceCreation {
            kind: ResourceKind::ConstantBuffer,
            ..
        }
    ));
}

#[test]
fn startup_errors_map_to_stage_exit_codes() {
    let err = LanternError::ResourceNotFound { kind: ResourceKind::Shader }.at_stage(StartupStage::Resources);
    assert_eq!(err.exit_code(), 4);
    // The innermost stage is kept.
    assert_eq!(err.at_stage(StartupStage::Scene).exit_code(), 4);

    let codes: Vec<u8> = [
        StartupStage::Window,
        StartupStage::Device,
        StartupStage::RenderTarget,
        StartupStage::Resources,
        StartupStage::Scene,
    ]
    .into_iter()
    .map(StartupStage::exit_code)
    .collect();
    assert_eq!(codes, [1, 2, 3, 4, 5]);
    assert_eq!(LanternError::RootModification.exit_code(), 1);
}

#[test]
fn cleanup_releases_everything_once() {
    init_logging();
    let mut graphics = Graphics::new(HeadlessBackend::new()).unwrap();
    let light = graphics.light_buffer().unwrap();
    let (backend, resources, scene) = graphics.parts_mut();
    let shader = resources.add_shader(Shader::builtin(backend, BuiltinShader::VertexColor).unwrap());
    let cube = resources.add_renderable(Cube::initialize(backend).unwrap());
    resources.add_renderable(Light::initialize(backend, light).unwrap());
    let node = scene.create_child(scene.root(), "Cube").unwrap();
    scene.set_renderable(node, cube, shader).unwrap();

    graphics.cleanup();
    assert_eq!(graphics.backend().live_resources().total(), 0);
    assert!(graphics.light_buffer().is_none());

    graphics.cleanup();
    assert_eq!(graphics.backend().live_resources().total(), 0);
}

#[test]
fn render_after_cleanup_is_an_error() {
    init_logging();
    let mut graphics = Graphics::new(HeadlessBackend::new()).unwrap();
    graphics.render(Mat4::IDENTITY, Vec4::ONE).unwrap();
    graphics.cleanup();
    assert!(graphics.render(Mat4::IDENTITY, Vec4::ONE).is_err());
    assert_eq!(graphics.backend().frames().len(), 1);
}

#[test]
fn each_render_submits_one_frame() {
    let mut graphics = Graphics::new(HeadlessBackend::new()).unwrap();
    for _ in 0..3 {
        graphics.update(1.0 / 60.0);
        let stats = graphics.render(Mat4::IDENTITY, Vec4::ONE).unwrap();
        assert_eq!((stats.visited, stats.drawn), (1, 0));
    }
    assert_eq!(graphics.backend().frames().len(), 3);
}
