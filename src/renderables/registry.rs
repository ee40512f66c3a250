//! Ownership of renderables and shaders.
//!
//! Scene nodes never own what they draw. They hold a [`RenderableKey`] and a
//! [`ShaderKey`] into this registry; once an entry is removed the keys stop
//! resolving and the node quietly skips its draw.

use slotmap::{SlotMap, new_key_type};

use crate::render::backend::RenderBackend;
use crate::render::shader::Shader;
use crate::renderables::Renderable;

new_key_type! {
    /// Weak reference to a registered renderable.
    pub struct RenderableKey;
    /// Weak reference to a registered shader.
    pub struct ShaderKey;
}

#[derive(Default)]
pub struct Resources {
    renderables: SlotMap<RenderableKey, Box<dyn Renderable>>,
    shaders: SlotMap<ShaderKey, Shader>,
}

impl Resources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_renderable(&mut self, renderable: impl Renderable + 'static) -> RenderableKey {
        self.renderables.insert(Box::new(renderable))
    }

    pub fn add_boxed(&mut self, renderable: Box<dyn Renderable>) -> RenderableKey {
        self.renderables.insert(renderable)
    }

    pub fn add_shader(&mut self, shader: Shader) -> ShaderKey {
        self.shaders.insert(shader)
    }

    #[must_use]
    pub fn renderable(&self, key: RenderableKey) -> Option<&dyn Renderable> {
        self.renderables.get(key).map(Box::as_ref)
    }

    pub fn renderable_mut(&mut self, key: RenderableKey) -> Option<&mut (dyn Renderable + 'static)> {
        self.renderables.get_mut(key).map(Box::as_mut)
    }

    #[must_use]
    pub fn shader(&self, key: ShaderKey) -> Option<&Shader> {
        self.shaders.get(key)
    }

    pub fn shader_mut(&mut self, key: ShaderKey) -> Option<&mut Shader> {
        self.shaders.get_mut(key)
    }

    /// Removes a renderable and releases its GPU resources.
    ///
    /// Returns `false` if the key was already stale.
    pub fn remove_renderable(&mut self, key: RenderableKey, backend: &mut dyn RenderBackend) -> bool {
        match self.renderables.remove(key) {
            Some(mut renderable) => {
                renderable.cleanup(backend);
                true
            }
            None => false,
        }
    }

    pub fn remove_shader(&mut self, key: ShaderKey, backend: &mut dyn RenderBackend) -> bool {
        match self.shaders.remove(key) {
            Some(mut shader) => {
                shader.cleanup(backend);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Releases and drops everything.
    pub fn cleanup(&mut self, backend: &mut dyn RenderBackend) {
        for (_, mut renderable) in self.renderables.drain() {
            log::debug!("Cleaning up '{}'", renderable.label());
            renderable.cleanup(backend);
        }
        for (_, mut shader) in self.shaders.drain() {
            shader.cleanup(backend);
        }
    }
}
