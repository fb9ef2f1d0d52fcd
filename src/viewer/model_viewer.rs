//! The viewer instance a host owns
//!
//! [`ModelViewer`] ties the pipeline together: it owns the scene and the
//! render surface, runs loads through normalization and pairing, recolors
//! the presented object and drives the frame loop.
//!
//! Loading is split in two so the decode can leave the render thread:
//! [`ModelViewer::begin_load`] hands out a [`PendingLoad`] whose future is
//! `Send + 'static`, and [`ModelViewer::complete_load`] takes the result back
//! and swaps it onto the stage in one step.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use cgmath::Rad;
use futures::future::BoxFuture;
use winit::{event::DeviceEvent, window::Window};

use crate::config::{PresentationMode, ViewerConfig};
use crate::error::{LoadError, ViewerError};
use crate::gfx::bounds::BoundingVolume;
use crate::gfx::environment::SceneEnvironment;
use crate::gfx::rendering::frame_loop::{FrameHandle, FrameLoop, TickStatus};
use crate::gfx::rendering::surface::RenderSurface;
use crate::gfx::scene::{node::Node, Scene};

use super::loader::{prepare_surfaces, AssetLoader, FileAssetLoader, StockFinish};
use super::normalize::{normalize, EmptyGeometry};
use super::pairing::{compose, PresentedObject};
use super::recolor::{apply_preset, ColorPreset};
use super::viewport::ViewportResponder;

/// Lifecycle of a viewer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// Environment is up, nothing has been loaded yet
    EnvironmentBuilt,
    /// Load `id` is in flight
    Loading { id: u64 },
    /// The last load presented an object
    Loaded,
    /// The last load failed; the stage keeps what it showed before
    LoadFailed,
    Disposed,
}

/// A load that has been started but not yet decoded
///
/// Dropping it (or the [`LoadCompletion`] it resolves to) without handing
/// the result back releases the viewer for the next load.
pub struct PendingLoad {
    id: u64,
    path: PathBuf,
    future: BoxFuture<'static, Result<Node, LoadError>>,
    ticket: Arc<()>,
}

impl PendingLoad {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the decode; safe to await on any thread
    pub async fn resolve(self) -> LoadCompletion {
        let result = self.future.await;
        LoadCompletion {
            id: self.id,
            path: self.path,
            result,
            ticket: self.ticket,
        }
    }
}

/// Result of a decode, ready to hand back to [`ModelViewer::complete_load`]
#[derive(Debug)]
pub struct LoadCompletion {
    id: u64,
    path: PathBuf,
    result: Result<Node, LoadError>,
    ticket: Arc<()>,
}

impl LoadCompletion {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Summary of a successful load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub path: PathBuf,
    pub mode: PresentationMode,
    /// Scale of the final fit
    pub scale: f32,
    /// World-space bounds of the presented object
    pub bounds: BoundingVolume,
    /// Preset applied on presentation, if any
    pub preset: Option<ColorPreset>,
    /// Meshes in the decoded asset (before pairing)
    pub mesh_count: usize,
}

/// The load the viewer is waiting on
#[derive(Debug)]
struct InFlight {
    path: PathBuf,
    /// Dead once the pending load and its completion are both gone
    ticket: Weak<()>,
    /// State to fall back to if the load is abandoned
    settled: ViewerState,
}

impl InFlight {
    fn is_abandoned(&self) -> bool {
        self.ticket.strong_count() == 0
    }
}

pub struct ModelViewer<S: RenderSurface> {
    config: ViewerConfig,
    surface: S,
    scene: Scene,
    loader: Arc<dyn AssetLoader>,
    viewport: ViewportResponder,
    frame_loop: FrameLoop,
    state: ViewerState,
    next_load_id: u64,
    in_flight: Option<InFlight>,
    active_preset: Option<ColorPreset>,
    stock_finish: StockFinish,
    auto_rotate: bool,
}

impl<S: RenderSurface> ModelViewer<S> {
    /// Creates a viewer that loads assets from the filesystem
    pub fn new(surface: S, config: ViewerConfig) -> Self {
        Self::with_loader(surface, config, Arc::new(FileAssetLoader::new()))
    }

    /// Creates a viewer with a custom asset source
    pub fn with_loader(surface: S, config: ViewerConfig, loader: Arc<dyn AssetLoader>) -> Self {
        let (width, height) = surface.size();
        let mut environment = SceneEnvironment::build(width, height, &config);
        environment.update_grid_visibility(config.grid_rule);

        let mut scene = Scene::new(environment);
        scene.show_placeholder();

        log::info!(
            "Viewer ready at {}x{} ({:?} presentation)",
            width,
            height,
            config.pairing.mode
        );

        Self {
            viewport: ViewportResponder::new(&config, width),
            active_preset: config.initial_preset,
            auto_rotate: config.auto_rotate,
            config,
            surface,
            scene,
            loader,
            frame_loop: FrameLoop::new(),
            state: ViewerState::EnvironmentBuilt,
            next_load_id: 0,
            in_flight: None,
            stock_finish: StockFinish::default(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Current lifecycle state
    ///
    /// A load whose [`PendingLoad`] was dropped no longer counts as in flight.
    pub fn state(&self) -> ViewerState {
        match &self.in_flight {
            Some(in_flight) if in_flight.is_abandoned() => in_flight.settled,
            _ => self.state,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Preset that is (or will be) applied to the presented object
    pub fn active_preset(&self) -> Option<ColorPreset> {
        self.active_preset
    }

    pub fn is_narrow(&self) -> bool {
        self.viewport.is_narrow()
    }

    /// Starts loading `path`
    ///
    /// Only one load may be in flight; a second request is rejected rather
    /// than queued.
    pub fn begin_load(&mut self, path: impl AsRef<Path>) -> Result<PendingLoad, ViewerError> {
        let path = path.as_ref();
        if self.state == ViewerState::Disposed {
            return Err(ViewerError::Disposed);
        }
        if let ViewerState::Loading { id } = self.state {
            if let Some(in_flight) = self.in_flight.as_ref().filter(|f| !f.is_abandoned()) {
                log::warn!(
                    "Rejecting load of {} while {} is in flight",
                    path.display(),
                    in_flight.path.display()
                );
                return Err(ViewerError::LoadInProgress {
                    in_flight: in_flight.path.clone(),
                });
            }
            self.abandon_load(id);
        }

        self.next_load_id += 1;
        let id = self.next_load_id;
        let ticket = Arc::new(());
        self.in_flight = Some(InFlight {
            path: path.to_path_buf(),
            ticket: Arc::downgrade(&ticket),
            settled: self.state,
        });
        self.state = ViewerState::Loading { id };
        log::info!("Loading {} (load #{})", path.display(), id);

        Ok(PendingLoad {
            id,
            path: path.to_path_buf(),
            future: self.loader.load(path),
            ticket,
        })
    }

    /// Gives up on load `id` without touching the stage
    ///
    /// For hosts whose decode never came back. Returns false if `id` is not
    /// the load in flight; its completion is rejected as stale afterwards.
    pub fn abandon_load(&mut self, id: u64) -> bool {
        if self.state != (ViewerState::Loading { id }) {
            return false;
        }
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        self.state = in_flight.settled;
        log::warn!(
            "Abandoned load #{} of {}; back to {:?}",
            id,
            in_flight.path.display(),
            self.state
        );
        true
    }

    /// Finishes a load on the render thread
    ///
    /// The asset is normalized and composed off-stage, then replaces the
    /// placeholder or the previous object in one step. On failure the stage
    /// keeps the previous object, or the placeholder if there was none.
    /// Degenerate assets are still presented, unscaled at the origin, and
    /// reported as [`ViewerError::EmptyGeometry`].
    pub fn complete_load(&mut self, completion: LoadCompletion) -> Result<LoadReport, ViewerError> {
        let LoadCompletion {
            id, path, result, ..
        } = completion;
        match self.state {
            ViewerState::Disposed => return Err(ViewerError::Disposed),
            ViewerState::Loading { id: current } if current == id => {}
            _ => {
                log::warn!("Discarding stale load #{} of {}", id, path.display());
                return Err(ViewerError::StaleLoad { id });
            }
        }
        self.in_flight = None;

        match self.present_asset(&path, result) {
            Ok(report) => {
                self.state = ViewerState::Loaded;
                log::info!(
                    "Presented {} ({:?}, scale {:.4})",
                    path.display(),
                    report.mode,
                    report.scale
                );
                Ok(report)
            }
            Err(err @ ViewerError::EmptyGeometry { .. }) => {
                self.state = ViewerState::Loaded;
                log::warn!("{}", err);
                Err(err)
            }
            Err(err) => {
                self.state = ViewerState::LoadFailed;
                self.scene.show_placeholder();
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Loads, normalizes and presents `path`
    ///
    /// The returned future borrows the viewer; hosts that decode on another
    /// thread use [`begin_load`](Self::begin_load) and
    /// [`complete_load`](Self::complete_load) instead.
    pub async fn load_asset(&mut self, path: impl AsRef<Path>) -> Result<LoadReport, ViewerError> {
        let pending = self.begin_load(path)?;
        let completion = pending.resolve().await;
        self.complete_load(completion)
    }

    fn present_asset(
        &mut self,
        path: &Path,
        result: Result<Node, LoadError>,
    ) -> Result<LoadReport, ViewerError> {
        let mut raw = result?;
        prepare_surfaces(&mut raw, &self.stock_finish);
        let mesh_count = raw.mesh_count();

        let (mut presented, fitted) = match normalize(raw, &self.config.fit) {
            Ok(normalized) => {
                let presented = compose(normalized, &self.config.pairing, &self.config.fit)
                    .map_err(|source| ViewerError::CompositionFailed {
                        path: path.to_path_buf(),
                        source,
                    })?;
                (presented, true)
            }
            Err(EmptyGeometry { fallback }) => (
                PresentedObject::unfitted(*fallback, PresentationMode::Single),
                false,
            ),
        };

        if let Some(preset) = self.active_preset {
            apply_preset(presented.root_mut(), preset);
        }

        let report = LoadReport {
            path: path.to_path_buf(),
            mode: presented.mode(),
            scale: presented.scale(),
            bounds: *presented.bounds(),
            preset: self.active_preset,
            mesh_count,
        };

        if let Some(previous) = self.scene.present(presented) {
            log::debug!("Replaced '{}' on stage", previous.root().name);
        }

        if fitted {
            Ok(report)
        } else {
            Err(ViewerError::EmptyGeometry {
                path: path.to_path_buf(),
            })
        }
    }

    /// Recolors the presented object by preset id
    ///
    /// Unknown ids fall back to coffee. Returns the preset that was applied.
    pub fn set_material_color(&mut self, id: &str) -> ColorPreset {
        let preset = ColorPreset::resolve(id);
        self.set_preset(preset);
        preset
    }

    pub fn set_preset(&mut self, preset: ColorPreset) {
        if self.state == ViewerState::Disposed {
            log::warn!("Ignoring preset '{}' on a disposed viewer", preset);
            return;
        }
        // Remembered so the next load comes up in the same color
        self.active_preset = Some(preset);
        match self.scene.presented_mut() {
            Some(object) => {
                apply_preset(object.root_mut(), preset);
            }
            None => log::debug!("No asset on stage; preset '{}' kept for later", preset),
        }
    }

    /// Follows a container resize; returns false if the size was ignored
    pub fn on_resize(&mut self, width: u32, height: u32) -> bool {
        if self.state == ViewerState::Disposed {
            return false;
        }
        self.viewport
            .on_resize(&mut self.scene.environment, &mut self.surface, width, height)
    }

    /// Forwards raw pointer input to the orbit controls
    pub fn process_device_event(&mut self, event: &DeviceEvent, window: &Window) {
        self.scene.environment.camera_manager.process_event(event, window);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    /// Flips auto-rotate; returns the new setting
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotate = !self.auto_rotate;
        log::info!("Auto-rotate {}", if self.auto_rotate { "on" } else { "off" });
        self.auto_rotate
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    /// Starts ticking; the handle cancels the loop from anywhere
    pub fn start_frame_loop(&mut self) -> FrameHandle {
        if self.state == ViewerState::Disposed {
            log::warn!("Frame loop started on a disposed viewer; it will not render");
        }
        self.frame_loop.start()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_loop.frame_count()
    }

    /// Advances one frame: orbit damping, auto-rotate, grid rule, draw
    pub fn render_tick(&mut self) -> Result<TickStatus, ViewerError> {
        if self.state == ViewerState::Disposed {
            return Ok(TickStatus::Stopped);
        }
        let status = self.frame_loop.begin_frame();
        if !matches!(status, TickStatus::Rendered { .. }) {
            return Ok(status);
        }

        self.scene.environment.camera_manager.update();
        if self.auto_rotate {
            if let Some(object) = self.scene.presented_mut() {
                object.turn(Rad(self.config.auto_rotate_speed));
            }
        }
        self.scene.environment.update_grid_visibility(self.config.grid_rule);
        self.scene.update();
        self.surface.render(&self.scene)?;
        Ok(status)
    }

    /// Stops the frame loop and releases the stage
    ///
    /// Loads still in flight are rejected when they complete.
    pub fn dispose(&mut self) {
        if self.state == ViewerState::Disposed {
            return;
        }
        self.frame_loop.stop();
        self.scene.clear();
        self.in_flight = None;
        self.state = ViewerState::Disposed;
        log::info!("Viewer disposed after {} frames", self.frame_loop.frame_count());
    }
}
