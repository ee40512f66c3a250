//! Utility Module
//!
//! - [`OrbitCamera`]: mouse-driven camera orbiting a focus point
//! - [`FrameClock`]: frame delta and elapsed time
//! - [`FpsCounter`]: frame rate averaged over one-second windows

pub mod fps_counter;
pub mod orbit_camera;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_camera::{OrbitCamera, WHEEL_UNITS_PER_NOTCH};
pub use time::FrameClock;
