//! Material system for surface shading
//!
//! Provides color handling and per-surface material definitions. Every mesh
//! owns its material so recoloring one presented object never leaks into
//! another.

/// Linear RGB color
///
/// Hex values are interpreted as sRGB, the way designers specify them, and
/// converted to linear space on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Creates a color from linear components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Creates a color from a 0xRRGGBB sRGB hex value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Converts back to a 0xRRGGBB sRGB hex value
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Scales all channels, used to fold intensity into a light or emissive color
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_vec4(self, w: f32) -> [f32; 4] {
        [self.r, self.g, self.b, w]
    }
}

impl From<[f32; 3]> for Color {
    fn from(rgb: [f32; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

/// Material definition with PBR-style properties
///
/// Only the parameters the viewer actually drives are modelled: base color,
/// opacity, metallic/roughness and an emissive tint with its own intensity.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub double_sided: bool,
    pub flat_shading: bool,
    /// Skip lighting entirely, used for grid lines
    pub unlit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: Color::new(0.8, 0.8, 0.8),
            opacity: 1.0,
            transparent: false,
            metallic: 0.0,
            roughness: 0.5,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            double_sided: false,
            flat_shading: false,
            unlit: false,
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Name for this material
    /// * `base_color` - Linear base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: Color, metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Builder pattern: Set alpha transparency
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.opacity < 1.0;
        self
    }

    /// Builder pattern: Set emissive color and intensity
    pub fn with_emission(mut self, emissive: Color, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn unlit(mut self) -> Self {
        self.unlit = true;
        self
    }

    /// Emissive color with its intensity applied
    pub fn emitted(&self) -> Color {
        self.emissive.scaled(self.emissive_intensity)
    }

    /// Packs the shading parameters for the GPU
    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color.to_vec4(self.opacity),
            emissive: self.emitted().to_vec4(0.0),
            params: [
                self.roughness,
                self.metallic,
                if self.unlit { 1.0 } else { 0.0 },
                if self.flat_shading { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// GPU uniform data for materials
///
/// `params` holds roughness, metallic, unlit flag and flat-shading flag.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    pub params: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_linear_space() {
        for hex in [0x3a2414, 0x8a1010, 0xff4d00, 0x0066ff, 0x111111] {
            assert_eq!(Color::from_hex(hex).to_hex(), hex);
        }
    }

    #[test]
    fn hex_is_decoded_as_srgb() {
        let grey = Color::from_hex(0x808080);
        assert!((grey.r - 0.2158).abs() < 1e-3);
        let white = Color::from_hex(0xffffff);
        assert!((white.r - 1.0).abs() < 1e-5 && (white.b - 1.0).abs() < 1e-5);
    }

    #[test]
    fn opacity_below_one_marks_transparent() {
        let floor = Material::default().with_opacity(0.98);
        assert!(floor.transparent);
        assert!(!Material::default().with_opacity(1.0).transparent);
    }

    #[test]
    fn uniform_folds_emissive_intensity() {
        let mat = Material::default().with_emission(Color::new(0.5, 0.0, 0.0), 0.2);
        let uniform = mat.uniform();
        assert!((uniform.emissive[0] - 0.1).abs() < 1e-6);
        assert_eq!(uniform.base_color[3], 1.0);
    }
}
