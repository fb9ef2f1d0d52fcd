use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use futures::channel::oneshot;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::config::ViewerConfig;
use crate::gfx::rendering::{FrameHandle, RenderEngine, TickStatus};
use crate::viewer::{ColorPreset, LoadCompletion, ModelViewer};

/// Number keys 1-7 in swatch order
const SWATCHES: [(KeyCode, ColorPreset); 7] = [
    (KeyCode::Digit1, ColorPreset::Grey),
    (KeyCode::Digit2, ColorPreset::Black),
    (KeyCode::Digit3, ColorPreset::Coffee),
    (KeyCode::Digit4, ColorPreset::Green),
    (KeyCode::Digit5, ColorPreset::Blue),
    (KeyCode::Digit6, ColorPreset::Orange),
    (KeyCode::Digit7, ColorPreset::Red),
];

/// Desktop host: one window, one viewer
pub struct PairviewApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: ViewerConfig,
    asset: Option<PathBuf>,
    window: Option<Arc<Window>>,
    viewer: Option<ModelViewer<RenderEngine>>,
    frame_handle: Option<FrameHandle>,
    /// Load id and the channel its decode reports back on
    pending_load: Option<(u64, oneshot::Receiver<LoadCompletion>)>,
    fatal: Option<anyhow::Error>,
}

impl PairviewApp {
    pub fn new(config: ViewerConfig, asset: Option<PathBuf>) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                asset,
                window: None,
                viewer: None,
                frame_handle: None,
                pending_load: None,
                fatal: None,
            },
        })
    }

    /// Runs until the window closes or the frame loop is cancelled
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        match self.app_state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(handle) = self.frame_handle.take() {
            handle.cancel();
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.dispose();
        }
        event_loop.exit();
    }

    /// Starts decoding the configured asset on a worker thread
    fn start_load(&mut self) {
        let (Some(viewer), Some(path)) = (self.viewer.as_mut(), self.asset.as_ref()) else {
            return;
        };
        let pending = match viewer.begin_load(path) {
            Ok(pending) => pending,
            Err(err) => {
                log::warn!("{}", err);
                return;
            }
        };

        let id = pending.id();
        let (sender, receiver) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("asset-load".into())
            .spawn(move || {
                let completion = pollster::block_on(pending.resolve());
                // The receiver is gone only if the app already shut down
                let _ = sender.send(completion);
            });
        match spawned {
            Ok(_) => self.pending_load = Some((id, receiver)),
            Err(err) => {
                log::error!("Failed to spawn loader thread: {}", err);
                viewer.abandon_load(id);
            }
        }
    }

    /// Hands a finished decode back to the viewer on this thread
    fn poll_load(&mut self) {
        let Some((id, receiver)) = self.pending_load.as_mut() else {
            return;
        };
        let id = *id;
        let received = receiver.try_recv();
        if let Ok(None) = received {
            return;
        }
        self.pending_load = None;

        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let completion = match received {
            Ok(Some(completion)) => completion,
            Ok(None) => return,
            Err(oneshot::Canceled) => {
                log::error!("Asset loader thread ended without a result");
                viewer.abandon_load(id);
                return;
            }
        };
        match viewer.complete_load(completion) {
            Ok(report) => log::info!(
                "{} meshes, scale {:.4}, size {:?}",
                report.mesh_count,
                report.scale,
                report.bounds.size()
            ),
            // Already logged by the viewer; the stage shows the fallback
            Err(err) if err.is_load_failure() => {}
            Err(err) => log::warn!("{}", err),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        if key_code == KeyCode::Escape {
            self.shutdown(event_loop);
            return;
        }
        if key_code == KeyCode::KeyL {
            self.start_load();
            return;
        }

        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if key_code == KeyCode::KeyR {
            viewer.toggle_auto_rotate();
        } else if let Some((_, preset)) = SWATCHES.iter().find(|(key, _)| *key == key_code) {
            viewer.set_preset(*preset);
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("pairview")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("failed to create window"));
                return;
            }
        };
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let renderer = match pollster::block_on(RenderEngine::new(window, width, height)) {
            Ok(renderer) => renderer,
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("failed to set up rendering"));
                return;
            }
        };

        let mut viewer = ModelViewer::new(renderer, self.config.clone());
        self.frame_handle = Some(viewer.start_frame_loop());
        self.viewer = Some(viewer);
        self.start_load();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(viewer) = self.viewer.as_mut() {
                    viewer.on_resize(width, height);
                }
            }
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => {
                let Some(viewer) = self.viewer.as_mut() else {
                    return;
                };
                match viewer.render_tick() {
                    Ok(TickStatus::Stopped) => event_loop.exit(),
                    Ok(_) => {}
                    Err(err) => self.fail(event_loop, anyhow::Error::new(err)),
                }
            }
            _ => (),
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: winit::event::DeviceEvent,
    ) {
        let (Some(window), Some(viewer)) = (self.window.as_ref(), self.viewer.as_mut()) else {
            return;
        };
        viewer.process_device_event(&event, window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.poll_load();
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
