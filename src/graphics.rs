//! Frame driver.
//!
//! [`Graphics`] ties the pieces together: it owns the backend, the resource
//! registry, the scene graph and the two frame-global constant buffers, and
//! runs `update` then `render` once per frame.

use glam::{Mat4, Vec3, Vec4};

use crate::errors::{LanternError, ResourceKind, Result};
use crate::render::backend::{ConstantBufferId, RenderBackend};
use crate::render::constants::{ConstantBuffer, LightConstants, VIEW_PROJECTION_SLOT, ViewProjectionConstants};
use crate::renderables::Resources;
use crate::scene::{DrawStats, NodeHandle, SceneGraph};

pub struct Graphics<B: RenderBackend> {
    backend: B,
    resources: Resources,
    scene: SceneGraph,
    view_projection: Option<ConstantBuffer<ViewProjectionConstants>>,
    light: Option<ConstantBuffer<LightConstants>>,
    light_node: Option<NodeHandle>,
}

impl<B: RenderBackend> Graphics<B> {
    /// Creates the global constant buffers and an empty scene rooted at
    /// `"Root"`.
    pub fn new(mut backend: B) -> Result<Self> {
        let view_projection = ConstantBuffer::create(&mut backend, "View Projection")?;
        let light = match ConstantBuffer::create(&mut backend, "Light") {
            Ok(light) => light,
            Err(e) => {
                view_projection.release(&mut backend);
                return Err(e);
            }
        };

        Ok(Self {
            backend,
            resources: Resources::new(),
            scene: SceneGraph::new(),
            view_projection: Some(view_projection),
            light: Some(light),
            light_node: None,
        })
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    #[inline]
    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    #[inline]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    /// Split borrow for scene setup code that creates renderables and nodes
    /// in one go.
    pub fn parts_mut(&mut self) -> (&mut B, &mut Resources, &mut SceneGraph) {
        (&mut self.backend, &mut self.resources, &mut self.scene)
    }

    /// The light buffer, for renderables that bind it at the light slot.
    #[must_use]
    pub fn light_buffer(&self) -> Option<ConstantBufferId> {
        self.light.as_ref().map(ConstantBuffer::id)
    }

    /// Chooses the node whose world translation is the light position.
    pub fn set_light_node(&mut self, node: Option<NodeHandle>) {
        self.light_node = node;
    }

    #[must_use]
    pub fn light_node(&self) -> Option<NodeHandle> {
        self.light_node
    }

    /// World position of the light; the origin if no light node is set.
    #[must_use]
    pub fn light_position(&self) -> Vec3 {
        self.light_node
            .and_then(|h| self.scene.get_node(h))
            .map_or(Vec3::ZERO, |n| n.world_translation())
    }

    /// Propagates transforms through the scene.
    pub fn update(&mut self, dt: f64) {
        self.scene.update(dt);
    }

    /// Records and submits one frame.
    ///
    /// Writes the view-projection and light buffers, binds the former at
    /// slot 0, draws the scene and hands the frame to the backend.
    pub fn render(&mut self, view_projection: Mat4, light_diffuse: Vec4) -> Result<DrawStats> {
        let (Some(vp_buffer), Some(light_buffer)) = (self.view_projection, self.light) else {
            return Err(LanternError::ResourceNotFound {
                kind: ResourceKind::ConstantBuffer,
            });
        };
        let light = LightConstants::new(self.light_position(), light_diffuse);

        let mut ctx = self.backend.begin_frame();
        vp_buffer.write(&mut ctx, &ViewProjectionConstants { view_projection });
        light_buffer.write(&mut ctx, &light);
        vp_buffer.bind(&mut ctx, VIEW_PROJECTION_SLOT);

        let stats = self.scene.draw(&mut ctx, &self.resources);
        let frame = ctx.finish();
        if frame.rejected_draws > 0 {
            log::debug!("{} draws rejected this frame", frame.rejected_draws);
        }
        self.backend.submit(frame)?;
        Ok(stats)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
    }

    /// Releases every renderable, shader and global buffer. Idempotent.
    pub fn cleanup(&mut self) {
        self.resources.cleanup(&mut self.backend);
        if let Some(vp) = self.view_projection.take() {
            vp.release(&mut self.backend);
        }
        if let Some(light) = self.light.take() {
            light.release(&mut self.backend);
            log::info!("Graphics cleanup complete");
        }
    }
}

impl<B: RenderBackend> Drop for Graphics<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
