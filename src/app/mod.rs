//! Winit application shell
//!
//! Opens the window, brings up the [`WgpuBackend`] and [`Graphics`], and
//! drives one `update` plus `render` per redraw.
//!
//! - [`AppHandler`]: what the application builds and does each frame
//! - [`App`]: entry point; [`App::run`] blocks until the window closes
//!
//! ```rust,ignore
//! use lantern::app::{App, AppHandler};
//!
//! struct Viewer;
//!
//! impl AppHandler for Viewer {
//!     fn init(graphics: &mut Graphics<WgpuBackend>, settings: &Settings) -> Result<Self> {
//!         Ok(Viewer)
//!     }
//! }
//!
//! App::new(Settings::default()).run::<Viewer>()?;
//! ```
//!
//! Startup failures are returned from [`App::run`] wrapped in
//! [`LanternError::Startup`], so the caller can turn them into a process exit
//! code with [`LanternError::exit_code`].

pub mod input;

use std::sync::Arc;

use glam::Vec4;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::errors::{LanternError, Result, StartupStage};
use crate::graphics::Graphics;
use crate::render::WgpuBackend;
use crate::settings::Settings;
use crate::utils::{FpsCounter, FrameClock, OrbitCamera};

pub use self::input::Input;

/// Application behaviour plugged into the [`App`] loop.
pub trait AppHandler: Sized + 'static {
    /// Builds the scene. Called once after the device is up.
    fn init(graphics: &mut Graphics<WgpuBackend>, settings: &Settings) -> Result<Self>;

    /// Per-frame hook, called before the scene transforms are propagated.
    #[allow(unused_variables)]
    fn update(&mut self, graphics: &mut Graphics<WgpuBackend>, dt: f64) {}
}

pub struct App {
    settings: Settings,
}

impl App {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs the event loop until the window closes.
    pub fn run<H: AppHandler>(self) -> Result<()> {
        let event_loop = EventLoop::new().map_err(|e| LanternError::from(e).at_stage(StartupStage::Window))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.settings);
        event_loop.run_app(&mut runner)?;

        match runner.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Running<H: AppHandler> {
    window: Arc<Window>,
    graphics: Graphics<WgpuBackend>,
    handler: H,
    camera: OrbitCamera,
}

struct AppRunner<H: AppHandler> {
    settings: Settings,
    state: Option<Running<H>>,
    startup_error: Option<LanternError>,
    input: Input,
    clock: FrameClock,
    fps: FpsCounter,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            state: None,
            startup_error: None,
            input: Input::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running<H>> {
        let window_settings = &self.settings.window;
        let attributes = Window::default_attributes()
            .with_title(&window_settings.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(window_settings.width, window_settings.height));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| LanternError::SurfaceError(e.to_string()).at_stage(StartupStage::Window))?;
        let window = Arc::new(window);

        log::info!("Initializing wgpu backend...");
        let size = window.inner_size();
        let backend = pollster::block_on(WgpuBackend::new(
            window.clone(),
            &self.settings.render,
            size.width.max(1),
            size.height.max(1),
        ))?;
        let aspect = backend.aspect_ratio();

        let mut graphics = Graphics::new(backend).map_err(|e| e.at_stage(StartupStage::Resources))?;
        let handler = H::init(&mut graphics, &self.settings).map_err(|e| e.at_stage(StartupStage::Scene))?;
        log::info!("Scene ready with {} nodes", graphics.scene().len());

        Ok(Running {
            window,
            graphics,
            handler,
            camera: OrbitCamera::new(&self.settings.camera, aspect),
        })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let dt = self.clock.tick();
        if let Some(fps) = self.fps.record(dt) {
            log::debug!("{fps:.1} fps");
        }

        self.input.apply(&mut state.camera);
        state.handler.update(&mut state.graphics, dt);
        state.graphics.update(dt);

        let diffuse = Vec4::from_array(self.settings.light.diffuse);
        match state.graphics.render(state.camera.view_projection(), diffuse) {
            Ok(_) => {}
            Err(LanternError::SurfaceError(msg)) => log::warn!("Frame skipped: {msg}"),
            Err(e) => {
                log::error!("Render failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn key_pressed(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::F1 => {
                if let Some(state) = &self.state {
                    log::info!("Scene graph:\n{}", state.graphics.scene().outline());
                }
            }
            _ => {}
        }
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.startup_error.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(state) => {
                self.clock = FrameClock::new();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("{e}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    state.graphics.resize(size.width, size.height);
                    state.camera.set_aspect(size.width as f32 / size.height.max(1) as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.input.cursor_moved(position.x, position.y),
            WindowEvent::CursorLeft { .. } => self.input.cursor_left(),
            WindowEvent::MouseInput { state, button, .. } => self.input.mouse_button(button, state),
            WindowEvent::MouseWheel { delta, .. } => self.input.mouse_wheel(delta),
            WindowEvent::ModifiersChanged(modifiers) => self.input.set_shift(modifiers.state().shift_key()),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.key_pressed(event_loop, code),
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(state) = &self.state {
                    state.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut state) = self.state.take() {
            state.graphics.cleanup();
        }
    }
}
