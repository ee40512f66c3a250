use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::utils::{OrbitCamera, WHEEL_UNITS_PER_NOTCH};

/// Mouse state accumulated between frames.
///
/// Left drag orbits, right drag pans, the wheel zooms (finely while Shift is
/// held). Accumulated motion is handed to the camera once per frame by
/// [`apply`](Self::apply).
#[derive(Debug, Default, Clone)]
pub struct Input {
    cursor: Option<Vec2>,
    left: bool,
    right: bool,
    shift: bool,
    orbit: Vec2,
    pan: Vec2,
    wheel: f32,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x as f32, y as f32);
        if let Some(last) = self.cursor {
            let delta = position - last;
            if self.left {
                self.orbit += delta;
            }
            if self.right {
                self.pan += delta;
            }
        }
        self.cursor = Some(position);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let pressed = state.is_pressed();
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            _ => {}
        }
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel += match delta {
            MouseScrollDelta::LineDelta(_, y) => y * WHEEL_UNITS_PER_NOTCH,
            MouseScrollDelta::PixelDelta(p) => p.y as f32,
        };
    }

    pub fn set_shift(&mut self, held: bool) {
        self.shift = held;
    }

    /// Feeds the accumulated motion to `camera` and resets it.
    pub fn apply(&mut self, camera: &mut OrbitCamera) {
        if self.orbit != Vec2::ZERO {
            camera.rotate(self.orbit.x, self.orbit.y);
        }
        if self.pan != Vec2::ZERO {
            camera.pan(self.pan.x, self.pan.y);
        }
        if self.wheel != 0.0 {
            camera.zoom(self.wheel, self.shift);
        }
        self.orbit = Vec2::ZERO;
        self.pan = Vec2::ZERO;
        self.wheel = 0.0;
    }
}
