//! Orbit Camera Tests
//!
//! Tests for:
//! - Drag rotation and azimuth clamping
//! - Zoom steps and radius clamping
//! - Panning the focus point
//! - Inverted Y

use glam::Vec3;

use lantern::settings::CameraSettings;
use lantern::utils::{OrbitCamera, WHEEL_UNITS_PER_NOTCH};

const EPSILON: f32 = 1e-4;

fn camera() -> OrbitCamera {
    OrbitCamera::new(&CameraSettings::default(), 1782.0 / 1024.0)
}

#[test]
fn azimuth_is_clamped_below_the_poles() {
    let mut cam = camera();
    cam.rotate(0.0, 500.0);
    let (_, azimuth) = cam.angles();
    assert!(azimuth < 90.0 && azimuth > 89.0);
    assert!(cam.view().is_finite());

    cam.rotate(0.0, -1000.0);
    assert!(cam.angles().1 > -90.0);
}

#[test]
fn one_pixel_is_one_degree() {
    let mut cam = camera();
    cam.rotate(-90.0, 0.0);
    assert_eq!(cam.angles(), (90.0, 0.0));
    // Polar 90 degrees puts the eye on +Z.
    assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPSILON));
}

#[test]
fn wheel_steps_and_clamps_radius() {
    let mut cam = camera();
    cam.zoom(WHEEL_UNITS_PER_NOTCH, true);
    assert!((cam.radius() - 1.88).abs() < EPSILON);

    cam.zoom(WHEEL_UNITS_PER_NOTCH, false);
    assert!((cam.radius() - 1.0).abs() < EPSILON);

    cam.zoom(-10_000.0, false);
    assert_eq!(cam.radius(), 10.0);
}

#[test]
fn pan_moves_focus_and_eye_together() {
    let mut cam = camera();
    let offset = cam.eye() - cam.focus();
    cam.pan(100.0, 0.0);
    assert!(cam.focus().length() > 0.0);
    assert!((cam.focus().length() - 0.1).abs() < EPSILON);
    assert!((cam.eye() - cam.focus()).abs_diff_eq(offset, EPSILON));
}

#[test]
fn invert_y_flips_vertical_drag() {
    let mut normal = camera();
    let mut inverted = camera();
    inverted.set_invert_y(true);
    normal.rotate(0.0, 10.0);
    inverted.rotate(0.0, 10.0);
    assert_eq!(normal.angles().1, -inverted.angles().1);
}

#[test]
fn settings_radius_is_clamped_on_creation() {
    let settings = CameraSettings {
        radius: 50.0,
        ..CameraSettings::default()
    };
    let cam = OrbitCamera::new(&settings, 1.0);
    assert_eq!(cam.radius(), 10.0);
}
