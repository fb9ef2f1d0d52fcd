//! Uniform bindings shared by every draw and per-draw object data
//!
//! Group 0 holds the per-frame globals (camera, light rig, fog, exposure);
//! group 1 holds one [`ObjectUniform`] per draw, selected with a dynamic
//! offset. Both layouts MUST match `viewer.wgsl`.

use cgmath::{InnerSpace, Matrix, Matrix4, SquareMatrix, Vector3};

use crate::gfx::environment::SceneEnvironment;
use crate::gfx::resources::material::{Color, Material};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::{DynamicUniformBuffer, UniformBuffer},
};

/// Per-frame scene data
///
/// Colors are linear RGB with the light intensity folded in. Directions point
/// from the surface towards the light.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub hemi_sky: [f32; 4],
    pub hemi_ground: [f32; 4],
    pub key_direction: [f32; 4],
    pub key_color: [f32; 4],
    pub back_direction: [f32; 4],
    pub back_color: [f32; 4],
    pub area_direction: [f32; 4],
    pub area_color: [f32; 4],
    pub fill_position: [f32; 4],
    pub fill_color: [f32; 4],
    pub fog_color: [f32; 4],
    /// near, far, exposure, unused
    pub fog_params: [f32; 4],
}

fn direction(v: Vector3<f32>) -> [f32; 4] {
    let v = if v.magnitude2() > 0.0 {
        v.normalize()
    } else {
        Vector3::unit_y()
    };
    [v.x, v.y, v.z, 0.0]
}

fn light(color: Color, intensity: f32) -> [f32; 4] {
    color.scaled(intensity).to_vec4(1.0)
}

impl GlobalUniform {
    /// Packs the environment; the camera uniform must be current
    pub fn from_environment(env: &SceneEnvironment) -> Self {
        let camera = &env.camera().uniform;
        let lights = &env.lights;
        let hemi = &lights.hemisphere;
        let area = &lights.area;
        let fill = &lights.fill;

        Self {
            view_proj: camera.view_proj,
            camera_position: camera.view_position,
            ambient: light(lights.ambient.color, lights.ambient.intensity),
            hemi_sky: light(hemi.sky_color, hemi.intensity),
            hemi_ground: light(hemi.ground_color, hemi.intensity),
            key_direction: direction(lights.key.position),
            key_color: light(lights.key.color, lights.key.intensity),
            back_direction: direction(lights.back.position),
            back_color: light(lights.back.color, lights.back.intensity),
            area_direction: direction(area.position - area.target),
            area_color: light(area.color, area.intensity),
            fill_position: [fill.position.x, fill.position.y, fill.position.z, 1.0],
            fill_color: light(fill.color, fill.intensity),
            fog_color: env.fog.color.to_vec4(1.0),
            fog_params: [
                env.fog.near,
                env.fog.far,
                env.render_settings.exposure,
                0.0,
            ],
        }
    }
}

/// Per-draw data: transforms plus the packed material
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`
    pub normal: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    /// roughness, metallic, unlit, flat shading
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, material: &Material) -> Self {
        let normal = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        let packed = material.uniform();
        Self {
            model: model.into(),
            normal: normal.into(),
            base_color: packed.base_color,
            emissive: packed.emissive,
            params: packed.params,
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUniform>;
pub type ObjectUBO = DynamicUniformBuffer<ObjectUniform>;

/// Bind group 0: the global uniform
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Bind group 1: one object uniform per draw through a dynamic offset
pub struct ObjectBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl ObjectBindings {
    pub fn new(device: &wgpu::Device, ubo: &ObjectUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::dynamic_uniform(
                std::mem::size_of::<ObjectUniform>() as u64,
            ))
            .create(device, "Objects Bind Group Layout");
        let bind_group = Self::create_bind_group(device, &bind_group_layout, ubo);

        ObjectBindings {
            bind_group_layout,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        ubo: &ObjectUBO,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, "Objects Bind Group")
    }

    /// Rebinds after the object buffer was replaced
    pub fn rebind(&mut self, device: &wgpu::Device, ubo: &ObjectUBO) {
        self.bind_group = Self::create_bind_group(device, &self.bind_group_layout, ubo);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use cgmath::{Vector4, Zero};

    #[test]
    fn uniform_sizes_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 176);
    }

    #[test]
    fn globals_carry_fog_and_exposure() {
        let mut env = SceneEnvironment::build(1200, 800, &ViewerConfig::default());
        env.camera_mut().update_view_proj();
        let globals = GlobalUniform::from_environment(&env);

        assert_eq!(globals.fog_params[0], 16.0);
        assert_eq!(globals.fog_params[1], 120.0);
        assert_eq!(globals.fog_params[2], 1.1);
        assert_eq!(globals.camera_position[1], 1.25);
        let key = Vector3::new(
            globals.key_direction[0],
            globals.key_direction[1],
            globals.key_direction[2],
        );
        assert!((key.magnitude() - 1.0).abs() < 1e-5);
        assert!(key.y > 0.0);
    }

    #[test]
    fn mirrored_normals_stay_mirrored() {
        let model = Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0);
        let object = ObjectUniform::new(model, &Material::default());
        let normal = Matrix4::from(object.normal);
        let n = normal * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_eq!(n.x, -1.0);
    }

    #[test]
    fn singular_model_falls_back_to_identity_normals() {
        let object = ObjectUniform::new(Matrix4::zero(), &Material::default());
        assert_eq!(Matrix4::from(object.normal), Matrix4::identity());
    }
}
