use glam::{Mat4, Quat, Vec3};

/// How a node's local matrix is produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocalMode {
    /// Rebuilt from scale / Euler rotation / translation on every update.
    Components,
    /// Installed verbatim with [`Transform::set_matrix`].
    Explicit(Mat4),
}

/// Local transform of a scene node plus the cached world state.
///
/// The component form stores rotation as Euler angles in degrees in the order
/// they are passed to [`set_rotation_degrees`](Self::set_rotation_degrees):
/// `x` turns about the X axis, `y` about Y, `z` about Z. The local matrix is
/// composed as scale, then the Y turn, then the X turn, then the Z turn, then
/// translation.
///
/// Component setters and [`set_matrix`](Self::set_matrix) are mutually
/// exclusive: whichever was called last decides the mode.
#[derive(Debug, Clone)]
pub struct Transform {
    scale: Vec3,
    rotation: Vec3,
    translation: Vec3,
    mode: LocalMode,

    // === Derived, refreshed by the transform system ===
    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,
    pub(crate) world_scale: Vec3,
    pub(crate) world_rotation: Quat,
    pub(crate) world_translation: Vec3,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
            mode: LocalMode::Components,

            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            world_scale: Vec3::ONE,
            world_rotation: Quat::IDENTITY,
            world_translation: Vec3::ZERO,
        }
    }

    // ========================================================================
    // Component form
    // ========================================================================

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.use_components();
    }

    /// Sets the Euler rotation in degrees. `yaw` turns about X and `pitch`
    /// about Y.
    pub fn set_rotation_degrees(&mut self, yaw: f32, pitch: f32, roll: f32) {
        self.rotation = Vec3::new(yaw, pitch, roll);
        self.use_components();
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.use_components();
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Euler rotation in degrees as `(yaw, pitch, roll)`.
    #[inline]
    #[must_use]
    pub fn rotation_degrees(&self) -> Vec3 {
        self.rotation
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    fn use_components(&mut self) {
        if matches!(self.mode, LocalMode::Explicit(_)) {
            log::debug!("Transform switched from explicit matrix back to components");
        }
        self.mode = LocalMode::Components;
    }

    // ========================================================================
    // Explicit matrix form
    // ========================================================================

    /// Installs a local matrix directly, bypassing the component form.
    ///
    /// The stored components are left untouched but no longer contribute to
    /// the local matrix until a component setter is called again.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.mode = LocalMode::Explicit(matrix);
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> LocalMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(self.mode, LocalMode::Explicit(_))
    }

    // ========================================================================
    // Matrix computation
    // ========================================================================

    /// Computes the local matrix for the current mode without caching it.
    #[must_use]
    pub fn compute_local_matrix(&self) -> Mat4 {
        match self.mode {
            LocalMode::Explicit(matrix) => matrix,
            LocalMode::Components => compose_local(self.scale, self.rotation, self.translation),
        }
    }

    /// Refreshes the cached local matrix from the current mode.
    pub fn update_local_matrix(&mut self) {
        self.local_matrix = self.compute_local_matrix();
    }

    /// Sets the world matrix and caches its decomposition.
    pub fn set_world_matrix(&mut self, world: Mat4) {
        let (scale, rotation, translation) = world.to_scale_rotation_translation();
        self.world_matrix = world;
        self.world_scale = scale;
        self.world_rotation = rotation;
        self.world_translation = translation;
    }

    /// Local matrix as of the last update.
    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.local_matrix
    }

    /// World matrix as of the last update.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds `Scale * RotY(r.y) * RotX(r.x) * RotZ(r.z) * Translation`
/// (row-vector order).
///
/// With glam's column vectors the same transform reads `T * Rz * Rx * Ry * S`.
#[must_use]
pub fn compose_local(scale: Vec3, rotation_degrees: Vec3, translation: Vec3) -> Mat4 {
    let about_x = Mat4::from_rotation_x(rotation_degrees.x.to_radians());
    let about_y = Mat4::from_rotation_y(rotation_degrees.y.to_radians());
    let about_z = Mat4::from_rotation_z(rotation_degrees.z.to_radians());

    Mat4::from_translation(translation) * about_z * about_x * about_y * Mat4::from_scale(scale)
}
