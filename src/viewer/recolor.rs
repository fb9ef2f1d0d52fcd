//! Material recoloring presets
//!
//! A preset sets the base color of every material in a subtree and picks one
//! of three finishes: red gets a boosted red glow, black a slightly glossier
//! surface with a grey sheen, every other color the stock faint glow.

use std::fmt;
use std::str::FromStr;

use crate::gfx::resources::material::{Color, Material};
use crate::gfx::scene::node::Node;

/// Roughness every preset except black resets to
pub const STOCK_ROUGHNESS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorPreset {
    #[default]
    Coffee,
    Green,
    Grey,
    Black,
    Orange,
    Blue,
    Red,
}

/// Surface finish a preset applies on top of the base color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finish {
    pub roughness: f32,
    pub emissive: Color,
    pub emissive_intensity: f32,
}

impl ColorPreset {
    pub const ALL: [ColorPreset; 7] = [
        ColorPreset::Coffee,
        ColorPreset::Green,
        ColorPreset::Grey,
        ColorPreset::Black,
        ColorPreset::Orange,
        ColorPreset::Blue,
        ColorPreset::Red,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ColorPreset::Coffee => "coffee",
            ColorPreset::Green => "green",
            ColorPreset::Grey => "grey",
            ColorPreset::Black => "black",
            ColorPreset::Orange => "orange",
            ColorPreset::Blue => "blue",
            ColorPreset::Red => "red",
        }
    }

    /// sRGB hex value of the base color
    pub fn hex(self) -> u32 {
        match self {
            ColorPreset::Coffee => 0x3a2414,
            ColorPreset::Green => 0x14341b,
            ColorPreset::Grey => 0x555555,
            ColorPreset::Black => 0x151515,
            ColorPreset::Orange => 0xff4d00,
            ColorPreset::Blue => 0x0066ff,
            ColorPreset::Red => 0x8a1010,
        }
    }

    pub fn base_color(self) -> Color {
        Color::from_hex(self.hex())
    }

    pub fn finish(self) -> Finish {
        match self {
            ColorPreset::Red => Finish {
                roughness: STOCK_ROUGHNESS,
                emissive: Color::from_hex(0x660000),
                emissive_intensity: 0.18,
            },
            ColorPreset::Black => Finish {
                roughness: 0.47,
                emissive: Color::from_hex(0x232323),
                emissive_intensity: 0.14,
            },
            _ => Finish {
                roughness: STOCK_ROUGHNESS,
                emissive: Color::from_hex(0x222222),
                emissive_intensity: 0.05,
            },
        }
    }

    /// Lenient lookup used by callers passing user input
    ///
    /// Matching ignores case and surrounding whitespace. Unknown identifiers
    /// fall back to the default preset with a warning; this never fails.
    pub fn resolve(id: &str) -> ColorPreset {
        id.trim().to_ascii_lowercase().parse().unwrap_or_else(|_| {
            log::warn!(
                "Unknown color preset '{}', using '{}'",
                id,
                ColorPreset::default()
            );
            ColorPreset::default()
        })
    }

    /// Writes the preset into a single material
    pub fn apply_to(self, material: &mut Material) {
        let finish = self.finish();
        material.base_color = self.base_color();
        material.roughness = finish.roughness;
        material.emissive = finish.emissive;
        material.emissive_intensity = finish.emissive_intensity;
    }
}

impl fmt::Display for ColorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown color preset '{0}'")]
pub struct UnknownPreset(pub String);

impl FromStr for ColorPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorPreset::ALL
            .into_iter()
            .find(|preset| preset.id() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

/// Recolors every mesh in the subtree; returns the number of materials touched
///
/// Material state afterwards depends only on `preset`, so applying the same
/// preset twice is the same as applying it once.
pub fn apply_preset(node: &mut Node, preset: ColorPreset) -> usize {
    let mut touched = 0;
    node.for_each_mesh_mut(&mut |mesh| {
        preset.apply_to(&mut mesh.material);
        touched += 1;
    });
    log::debug!("Applied color preset '{}' to {} materials", preset, touched);
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::mesh::{Geometry, Mesh, Topology};
    use std::sync::Arc;

    fn two_mesh_node() -> Node {
        let geometry = Arc::new(Geometry::new(Vec::new(), Vec::new(), Topology::Triangles));
        let mesh = Mesh::new(geometry, Material::default());
        let child = Node::with_meshes("child", vec![mesh.clone()]);
        let mut root = Node::with_meshes("root", vec![mesh]);
        root.add_child(child);
        root
    }

    #[test]
    fn every_preset_is_idempotent() {
        for preset in ColorPreset::ALL {
            let mut once = two_mesh_node();
            apply_preset(&mut once, preset);
            let mut twice = once.clone();
            apply_preset(&mut twice, preset);

            let a: Vec<_> = once.meshes_recursive().iter().map(|m| m.material.clone()).collect();
            let b: Vec<_> = twice.meshes_recursive().iter().map(|m| m.material.clone()).collect();
            assert_eq!(a, b, "preset {preset} is not idempotent");
        }
    }

    #[test]
    fn state_depends_only_on_last_preset() {
        let mut via_black = two_mesh_node();
        apply_preset(&mut via_black, ColorPreset::Black);
        apply_preset(&mut via_black, ColorPreset::Blue);

        let mut direct = two_mesh_node();
        apply_preset(&mut direct, ColorPreset::Blue);

        assert_eq!(
            via_black.meshes[0].material.roughness,
            direct.meshes[0].material.roughness
        );
        assert_eq!(via_black.meshes[0].material.roughness, STOCK_ROUGHNESS);
    }

    #[test]
    fn red_and_black_have_distinct_finishes() {
        let mut node = two_mesh_node();
        assert_eq!(apply_preset(&mut node, ColorPreset::Red), 2);
        let red = &node.children[0].meshes[0].material;
        assert_eq!(red.emissive_intensity, 0.18);
        assert_eq!(red.emissive, Color::from_hex(0x660000));

        apply_preset(&mut node, ColorPreset::Black);
        let black = &node.meshes[0].material;
        assert_eq!(black.roughness, 0.47);
        assert_eq!(black.emissive_intensity, 0.14);

        apply_preset(&mut node, ColorPreset::Green);
        assert_eq!(node.meshes[0].material.emissive_intensity, 0.05);
        assert_eq!(node.meshes[0].material.base_color, Color::from_hex(0x14341b));
    }

    #[test]
    fn unknown_ids_fall_back_to_coffee() {
        assert_eq!(ColorPreset::resolve("magenta"), ColorPreset::Coffee);
        assert_eq!(ColorPreset::resolve(""), ColorPreset::Coffee);
        assert!("Red".parse::<ColorPreset>().is_err());
        assert_eq!("orange".parse::<ColorPreset>(), Ok(ColorPreset::Orange));
    }

    #[test]
    fn resolve_ignores_case_and_padding() {
        assert_eq!(ColorPreset::resolve("  RED "), ColorPreset::Red);
        assert_eq!(ColorPreset::resolve("Black\n"), ColorPreset::Black);
        assert_eq!(ColorPreset::resolve("re d"), ColorPreset::Coffee);
    }

    #[test]
    fn ids_round_trip() {
        for preset in ColorPreset::ALL {
            assert_eq!(preset.id().parse::<ColorPreset>(), Ok(preset));
        }
    }
}
