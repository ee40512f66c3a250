use glam::{Mat4, Quat, Vec3};

use crate::renderables::registry::{RenderableKey, ShaderKey};
use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Non-owning link from a node to the thing it draws and the shader it uses.
///
/// Both keys are generational: once the renderable or shader is removed from
/// the [`Resources`](crate::renderables::Resources) registry, the key stops
/// resolving and the node draws nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub renderable: RenderableKey,
    pub shader: ShaderKey,
}

/// A node of the scene graph.
///
/// # Hierarchy
///
/// - `parent`: handle of the parent node (`None` for the root and for
///   detached nodes)
/// - `children`: child handles in insertion order, which is also draw order
///
/// Hierarchy links are maintained by [`SceneGraph`](crate::scene::SceneGraph);
/// a node on its own only exposes them read-only.
///
/// # Transform
///
/// The local transform is edited through the `set_local_*` methods and takes
/// effect on the next [`SceneGraph::update`](crate::scene::SceneGraph::update).
/// World getters return the values cached by that update.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Debug label; not required to be unique.
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial Data ===
    pub(crate) transform: Transform,

    // === Payload ===
    pub(crate) attachment: Option<Attachment>,
}

impl SceneNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            attachment: None,
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    // ========================================================================
    // Local transform
    // ========================================================================

    /// Installs an explicit local matrix, bypassing scale/rotation/translation.
    pub fn set_local_transform(&mut self, matrix: Mat4) {
        self.transform.set_matrix(matrix);
    }

    /// Sets the local rotation as Euler angles in degrees. `yaw` turns about
    /// X, `pitch` about Y and `roll` about Z.
    pub fn set_local_rotation(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.transform.set_rotation_degrees(yaw, pitch, roll);
    }

    pub fn set_local_translation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_translation(Vec3::new(x, y, z));
    }

    pub fn set_local_scale(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_scale(Vec3::new(x, y, z));
    }

    /// Local rotation in degrees as `(yaw, pitch, roll)`.
    #[inline]
    #[must_use]
    pub fn local_rotation(&self) -> Vec3 {
        self.transform.rotation_degrees()
    }

    #[inline]
    #[must_use]
    pub fn local_translation(&self) -> Vec3 {
        self.transform.translation()
    }

    #[inline]
    #[must_use]
    pub fn local_scale(&self) -> Vec3 {
        self.transform.scale()
    }

    /// Local matrix computed by the last update.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.local_matrix()
    }

    // ========================================================================
    // World transform (valid after an update)
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.world_matrix()
    }

    #[inline]
    #[must_use]
    pub fn world_rotation(&self) -> Quat {
        self.transform.world_rotation
    }

    #[inline]
    #[must_use]
    pub fn world_translation(&self) -> Vec3 {
        self.transform.world_translation
    }

    #[inline]
    #[must_use]
    pub fn world_scale(&self) -> Vec3 {
        self.transform.world_scale
    }

    // ========================================================================
    // Renderable attachment
    // ========================================================================

    /// Attaches (or replaces) the drawable payload of this node.
    pub fn set_renderable(&mut self, renderable: RenderableKey, shader: ShaderKey) {
        self.attachment = Some(Attachment { renderable, shader });
    }

    /// Turns this node back into a pure transform group.
    pub fn clear_renderable(&mut self) {
        self.attachment = None;
    }

    #[inline]
    #[must_use]
    pub fn attachment(&self) -> Option<Attachment> {
        self.attachment
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self::new("")
    }
}
