//! Scene graph demo.
//!
//! Usage: `scene_graphs [settings.json]`
//!
//! Left drag orbits, right drag pans, the wheel zooms (Shift for fine steps),
//! F1 logs the scene outline and Escape quits.

mod scene;

use std::path::PathBuf;
use std::process::ExitCode;

use lantern::errors::Result;
use lantern::{App, AppHandler, Graphics, NodeHandle, Settings, WgpuBackend};

const DEFAULT_SETTINGS: &str = "settings.json";
/// Turn rate of the light node about Y, degrees per second. The child sphere
/// turns with it.
const LIGHT_SPIN: f64 = 20.0;

struct SceneGraphsDemo {
    light: NodeHandle,
    spin: f64,
}

impl AppHandler for SceneGraphsDemo {
    fn init(graphics: &mut Graphics<WgpuBackend>, settings: &Settings) -> Result<Self> {
        let light = scene::build(graphics, settings)?;
        Ok(Self { light, spin: 0.0 })
    }

    fn update(&mut self, graphics: &mut Graphics<WgpuBackend>, dt: f64) {
        self.spin = (self.spin + LIGHT_SPIN * dt) % 360.0;
        if let Some(node) = graphics.scene_mut().get_node_mut(self.light) {
            node.set_local_rotation(0.0, self.spin as f32, 0.0);
        }
    }
}

fn load_settings() -> Result<Settings> {
    let mut settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default(DEFAULT_SETTINGS)?,
    };
    if settings.asset_dir.as_os_str().is_empty() {
        settings.asset_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets"));
    }
    Ok(settings)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = load_settings().and_then(|settings| App::new(settings).run::<SceneGraphsDemo>());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
