use glam::{Mat4, Vec3};

use crate::settings::CameraSettings;

/// Wheel units reported for one notch of a standard mouse wheel.
pub const WHEEL_UNITS_PER_NOTCH: f32 = 120.0;

const ZOOM_PER_UNIT: f32 = 0.01;
const FINE_ZOOM_PER_UNIT: f32 = 0.001;
const PAN_PER_PIXEL: f32 = 0.001;
// Kept just short of the pole so the look-at basis never degenerates.
const MAX_AZIMUTH_DEGREES: f32 = 89.9;

/// Camera orbiting a focus point.
///
/// `polar` turns around the world Y axis, `azimuth` tilts above or below the
/// horizon. Both are in degrees; one pixel of drag is one degree.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    focus: Vec3,
    radius: f32,
    min_radius: f32,
    max_radius: f32,
    polar: f32,
    azimuth: f32,
    fov_degrees: f32,
    near: f32,
    far: f32,
    aspect: f32,
    invert_y: bool,
}

impl OrbitCamera {
    #[must_use]
    pub fn new(settings: &CameraSettings, aspect: f32) -> Self {
        let min_radius = settings.min_radius.min(settings.max_radius);
        let max_radius = settings.max_radius.max(settings.min_radius);
        Self {
            focus: Vec3::ZERO,
            radius: settings.radius.clamp(min_radius, max_radius),
            min_radius,
            max_radius,
            polar: 0.0,
            azimuth: 0.0,
            fov_degrees: settings.fov_degrees,
            near: settings.near,
            far: settings.far,
            aspect: sanitize_aspect(aspect),
            invert_y: settings.invert_y,
        }
    }

    #[must_use]
    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Vec3) {
        self.focus = focus;
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[must_use]
    pub fn angles(&self) -> (f32, f32) {
        (self.polar, self.azimuth)
    }

    pub fn set_invert_y(&mut self, invert_y: bool) {
        self.invert_y = invert_y;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    /// Orbits by a mouse drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let dy = if self.invert_y { -dy } else { dy };
        self.polar = (self.polar - dx).rem_euclid(360.0);
        self.azimuth = (self.azimuth + dy).clamp(-MAX_AZIMUTH_DEGREES, MAX_AZIMUTH_DEGREES);
    }

    /// Moves toward the focus for positive `wheel_units`; `fine` selects the
    /// slow step.
    pub fn zoom(&mut self, wheel_units: f32, fine: bool) {
        let step = if fine { FINE_ZOOM_PER_UNIT } else { ZOOM_PER_UNIT };
        self.radius = (self.radius - wheel_units * step).clamp(self.min_radius, self.max_radius);
    }

    /// Slides the focus point in the view plane by a drag of `(dx, dy)`
    /// pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.focus - self.eye()).normalize_or(Vec3::Z);
        let right = Vec3::Y.cross(forward).normalize_or(Vec3::X);
        let up = forward.cross(right);
        self.focus += (-right * dx + up * dy) * PAN_PER_PIXEL;
    }

    /// Eye position on the orbit sphere.
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        let (polar, azimuth) = (self.polar.to_radians(), self.azimuth.to_radians());
        let direction = Vec3::new(azimuth.cos() * polar.cos(), azimuth.sin(), azimuth.cos() * polar.sin());
        self.focus + direction * self.radius
    }

    #[must_use]
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye(), self.focus, Vec3::Y)
    }

    #[must_use]
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraSettings::default(), 16.0 / 9.0)
    }

    #[test]
    fn starts_on_positive_x() {
        let cam = camera();
        assert!(cam.eye().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn focus_projects_to_screen_centre() {
        let mut cam = camera();
        cam.rotate(30.0, 20.0);
        let clip = cam.view_projection() * cam.focus().extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn degenerate_aspect_falls_back() {
        let cam = OrbitCamera::new(&CameraSettings::default(), 0.0);
        assert!(cam.projection().is_finite());
    }
}
