//! WGPU-based rendering of the viewer scene
//!
//! One forward pass draws the floor, the grid and the live object. Mesh
//! buffers are uploaded on first use and evicted once their geometry stops
//! being drawn, so replaced assets release their GPU memory a frame later.

use std::collections::HashMap;
use std::sync::Arc;
use wgpu::TextureFormat;

use crate::error::RenderError;
use crate::gfx::{
    resources::{
        global_bindings::{
            GlobalBindings, GlobalUBO, GlobalUniform, ObjectBindings, ObjectUBO, ObjectUniform,
        },
        texture_resource::TextureResource,
    },
    scene::{GeometryId, Scene, Topology},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::render_pass_ext::{GpuGeometry, RenderPassExt};
use super::surface::RenderSurface;

const SHADER: &str = "viewer.wgsl";
const SURFACE_PIPELINE: &str = "Surfaces";
const LINE_PIPELINE: &str = "Lines";

/// Draws start with room for this many objects; the buffer grows on demand
const INITIAL_DRAW_CAPACITY: usize = 16;

/// What to do when the next surface texture cannot be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcquireFailure {
    /// The swapchain no longer matches the window
    Reconfigure,
    /// Transient; the next frame may succeed
    Skip,
    Fatal,
}

impl AcquireFailure {
    fn classify(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigure,
            wgpu::SurfaceError::Timeout => Self::Skip,
            _ => Self::Fatal,
        }
    }
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_ubo: ObjectUBO,
    object_bindings: ObjectBindings,
    geometry_cache: HashMap<GeometryId, GpuGeometry>,
    draws: Vec<ObjectUniform>,
    frame: u64,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        // Shading happens in linear space; the sRGB target encodes on write
        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8UnormSrgb);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let object_ubo = ObjectUBO::new(&device, INITIAL_DRAW_CAPACITY);
        let object_bindings = ObjectBindings::new(&device, &object_ubo);

        let mut pipeline_manager = PipelineManager::new(device.clone());
        pipeline_manager.load_shader(SHADER, include_str!("viewer.wgsl"));

        let layouts = vec![
            global_bindings.bind_group_layout().clone(),
            object_bindings.bind_group_layout().clone(),
        ];
        // Assets are drawn double-sided and may be mirrored, so nothing is culled
        pipeline_manager.create_pipeline(
            SURFACE_PIPELINE,
            &PipelineConfig::default_with_shader(SHADER)
                .with_label("Surface Pipeline")
                .with_bind_group_layouts(layouts.clone())
                .with_cull_mode(None)
                .with_depth(TextureResource::DEPTH_FORMAT, true)
                .with_color_target(format, Some(wgpu::BlendState::ALPHA_BLENDING)),
        )?;
        pipeline_manager.create_pipeline(
            LINE_PIPELINE,
            &PipelineConfig::default_with_shader(SHADER)
                .with_label("Line Pipeline")
                .with_bind_group_layouts(layouts)
                .with_primitive_topology(wgpu::PrimitiveTopology::LineList)
                .with_cull_mode(None)
                .with_depth(TextureResource::DEPTH_FORMAT, false)
                .with_color_target(format, Some(wgpu::BlendState::ALPHA_BLENDING)),
        )?;

        log::info!("Render engine ready: {}x{} {:?}", width, height, format);

        Ok(RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_ubo,
            object_bindings,
            geometry_cache: HashMap::new(),
            draws: Vec::new(),
            frame: 0,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    /// Number of geometries currently resident on the GPU
    pub fn cached_geometries(&self) -> usize {
        self.geometry_cache.len()
    }

    fn clear_color(scene: &Scene) -> wgpu::Color {
        let c = scene.environment.render_settings.background;
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }

    /// Drops buffers whose geometry was not drawn this frame
    fn evict_unused(&mut self) {
        let frame = self.frame;
        let before = self.geometry_cache.len();
        self.geometry_cache.retain(|_, gpu| gpu.last_used == frame);
        let evicted = before - self.geometry_cache.len();
        if evicted > 0 {
            log::debug!("Evicted {} unused geometries", evicted);
        }
    }
}

impl RenderSurface for RenderEngine {
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Resizes the surface and recreates the depth buffer
    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    fn render(&mut self, scene: &Scene) -> Result<(), RenderError> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e) => match AcquireFailure::classify(&e) {
                AcquireFailure::Reconfigure => {
                    log::warn!("Surface {}; reconfiguring and skipping frame", e);
                    self.surface.configure(&self.device, &self.config);
                    return Ok(());
                }
                AcquireFailure::Skip => {
                    log::warn!("Surface {}; skipping frame", e);
                    return Ok(());
                }
                AcquireFailure::Fatal => return Err(e.into()),
            },
        };
        self.frame += 1;

        self.global_ubo
            .update_content(&self.queue, GlobalUniform::from_environment(&scene.environment));

        let items = scene.draw_items();
        self.draws.clear();
        self.draws.extend(
            items
                .iter()
                .map(|item| ObjectUniform::new(item.model, &item.mesh.material)),
        );
        if self.object_ubo.ensure_capacity(&self.device, self.draws.len()) {
            self.object_bindings.rebind(&self.device, &self.object_ubo);
        }
        self.object_ubo.write(&self.queue, &self.draws);

        let device = &self.device;
        let frame = self.frame;
        for item in &items {
            let geometry = &item.mesh.geometry;
            self.geometry_cache
                .entry(geometry.id())
                .and_modify(|gpu| gpu.last_used = frame)
                .or_insert_with(|| GpuGeometry::upload(device, geometry, frame));
        }

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(Self::clear_color(scene)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

            for (index, item) in items.iter().enumerate() {
                let Some(gpu) = self.geometry_cache.get(&item.mesh.geometry.id()) else {
                    continue;
                };
                let name = match item.mesh.geometry.topology() {
                    Topology::Triangles => SURFACE_PIPELINE,
                    Topology::Lines => LINE_PIPELINE,
                };
                let Some(pipeline) = self.pipeline_manager.pipeline(name) else {
                    continue;
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(
                    1,
                    self.object_bindings.bind_group(),
                    &[self.object_ubo.offset(index)],
                );
                render_pass.draw_geometry(gpu);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        self.evict_unused();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_surface_errors_skip_the_frame() {
        assert_eq!(
            AcquireFailure::classify(&wgpu::SurfaceError::Timeout),
            AcquireFailure::Skip
        );
        assert_eq!(
            AcquireFailure::classify(&wgpu::SurfaceError::Lost),
            AcquireFailure::Reconfigure
        );
        assert_eq!(
            AcquireFailure::classify(&wgpu::SurfaceError::Outdated),
            AcquireFailure::Reconfigure
        );
        assert_eq!(
            AcquireFailure::classify(&wgpu::SurfaceError::OutOfMemory),
            AcquireFailure::Fatal
        );
    }
}
