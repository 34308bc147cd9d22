//! fp_walk - first-person controller playground
//!
//! Opens a window and drives a [`FirstPersonController`] from winit events.
//! The rig state is shown in the window title.
//!
//! Usage: `fp_walk [options.json]`
//!
//! Controls: click to capture the mouse, WASD/arrows move, Shift sprints,
//! Space jumps, C toggles crouch, Escape releases the mouse, Q quits.
//! Set `RUST_LOG=controls=debug` to trace jumps, landings and lock changes.

use std::sync::Arc;
use std::time::Instant;

use fp_controls_engine::input::key_from_event;
use fp_controls_engine::{
    ControllerOptions, FirstPersonController, PerspectiveCamera, PointerMotion, WinitPointerLock,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{WindowAttributes, WindowId};

/// Seconds between title refreshes
const TITLE_INTERVAL: f32 = 0.25;

struct WalkApp {
    options: ControllerOptions,
    controller: Option<FirstPersonController<PerspectiveCamera>>,
    window: Option<Arc<winit::window::Window>>,
    last_frame: Instant,
    since_title: f32,
}

impl WalkApp {
    fn new(options: ControllerOptions) -> Self {
        Self {
            options,
            controller: None,
            window: None,
            last_frame: Instant::now(),
            since_title: 0.0,
        }
    }

    fn initialize(&mut self, window: Arc<winit::window::Window>) {
        let size = window.inner_size();
        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        let built = FirstPersonController::builder()
            .camera(PerspectiveCamera::new(aspect))
            .input_target(WinitPointerLock::new(window.clone()))
            .options(self.options.clone())
            .build();

        match built {
            Ok(mut controller) => {
                controller.on_jump(|| info!(target: "fp_walk", "jump"));
                controller.on_pointer_lock_change(|locked| {
                    info!(target: "fp_walk", locked, "pointer lock");
                });
                self.controller = Some(controller);
                self.window = Some(window);
                self.last_frame = Instant::now();
            }
            Err(err) => error!(target: "fp_walk", %err, "failed to build controller"),
        }
    }

    fn refresh_title(&mut self, dt: f32) {
        self.since_title += dt;
        if self.since_title < TITLE_INTERVAL {
            return;
        }
        self.since_title = 0.0;
        if let (Some(window), Some(controller)) = (&self.window, &self.controller) {
            let state = controller.state();
            window.set_title(&format!(
                "fp_walk | pos ({:.1}, {:.1}, {:.1}) | {}",
                state.position.x,
                state.position.y,
                state.position.z,
                controller.debug_info()
            ));
        }
    }
}

impl ApplicationHandler for WalkApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = WindowAttributes::default()
            .with_title("fp_walk")
            .with_inner_size(PhysicalSize::new(1280, 720));
        match event_loop.create_window(attrs) {
            Ok(window) => self.initialize(Arc::new(window)),
            Err(err) => {
                error!(target: "fp_walk", %err, "failed to create window");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => {
                controller.dispose();
                event_loop.exit();
            }
            WindowEvent::Focused(focused) => {
                controller.handle_focus(focused);
                if !focused {
                    // Release the OS grab too, so the cursor comes back
                    controller.unlock_pointer();
                    controller.handle_pointer_lock_change(false);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let Some((key, pressed)) = key_from_event(&event) else {
                    return;
                };
                match key {
                    KeyCode::Escape if pressed => controller.unlock_pointer(),
                    KeyCode::KeyQ if pressed => {
                        controller.dispose();
                        event_loop.exit();
                    }
                    KeyCode::KeyC if pressed => {
                        controller.toggle_crouch();
                    }
                    _ => {
                        controller.handle_key(key, pressed);
                    }
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                controller.handle_pointer_down();
            }
            WindowEvent::Resized(size) => {
                controller
                    .camera_mut()
                    .set_aspect(size.width.max(1) as f32 / size.height.max(1) as f32);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                controller.update(dt);
                controller.camera_mut().update_matrices();
                self.refresh_title(dt);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _: &ActiveEventLoop, _: DeviceId, event: DeviceEvent) {
        if let (Some(controller), DeviceEvent::MouseMotion { delta }) =
            (self.controller.as_mut(), event)
        {
            controller.handle_pointer_motion(PointerMotion::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = match std::env::args().nth(1) {
        Some(path) => {
            info!(target: "fp_walk", %path, "loading options");
            ControllerOptions::from_path(path)?
        }
        None => ControllerOptions::default(),
    };

    println!("Click to capture the mouse. WASD move, Shift sprint, Space jump, C crouch.");
    println!("Escape releases the mouse, Q quits.");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = WalkApp::new(options);
    event_loop.run_app(&mut app)?;
    Ok(())
}
