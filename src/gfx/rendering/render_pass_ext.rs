//! Render pass extensions for cached mesh buffers

use wgpu::util::DeviceExt;
use wgpu::*;

use crate::gfx::scene::mesh::Geometry;

/// GPU copy of a [`Geometry`]
pub struct GpuGeometry {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
    /// Last frame the geometry was drawn in
    pub last_used: u64,
}

impl GpuGeometry {
    pub fn upload(device: &Device, geometry: &Geometry, frame: u64) -> Self {
        let label = format!("{:?}", geometry.id());
        let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(&format!("{} Vertices", label)),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(&format!("{} Indices", label)),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.index_count(),
            last_used: frame,
        }
    }
}

/// Extension trait for RenderPass to draw cached geometry
pub trait RenderPassExt {
    fn draw_geometry(&mut self, geometry: &GpuGeometry);
}

impl RenderPassExt for RenderPass<'_> {
    fn draw_geometry(&mut self, geometry: &GpuGeometry) {
        self.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        self.set_index_buffer(geometry.index_buffer.slice(..), IndexFormat::Uint32);
        self.draw_indexed(0..geometry.index_count, 0, 0..1);
    }
}
