//! Viewer configuration
//!
//! Every presentation constant the viewer depends on lives here so a host can
//! pick them explicitly. Defaults reproduce the shipped product page.

use cgmath::Vector3;

use crate::viewer::recolor::ColorPreset;

/// How an asset is scaled and lifted to fit the canonical viewing volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    /// Edge length of the viewing cube the largest dimension is scaled to
    pub target_dimension: f32,
    /// Height of the lowest point above the floor plane
    pub floor_offset: f32,
}

impl Default for FitSettings {
    fn default() -> Self {
        Self {
            target_dimension: 5.0,
            floor_offset: 0.07,
        }
    }
}

/// Whether the asset is shown alone or as a mirrored pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Single,
    Paired,
}

/// Layout parameters of the mirrored pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairingSettings {
    pub mode: PresentationMode,
    /// Gap between the instances as a fraction of the asset width.
    /// Negative values overlap the two instances.
    pub gap_ratio: f32,
    /// Yaw applied to the right instance in degrees; the left one gets the negation
    pub yaw_degrees: f32,
    /// Depth offset applied to the finished group (negative is away from the camera)
    pub depth_offset: f32,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            mode: PresentationMode::Paired,
            gap_ratio: -0.18,
            yaw_degrees: 90.0,
            depth_offset: -1.2,
        }
    }
}

/// Initial camera placement and orbit behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    /// Camera position used when the container is narrower than `narrow_width`
    pub narrow_position: Vector3<f32>,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub narrow_rotate_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 1.25, 7.8),
            target: Vector3::new(0.0, 0.38, 0.0),
            narrow_position: Vector3::new(0.0, 1.5, 13.0),
            fov_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            damping: 0.1,
            rotate_speed: 1.0,
            narrow_rotate_speed: 1.5,
        }
    }
}

/// Rule deciding when the reference grid is hidden
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridVisibilityRule {
    /// Hide the grid while the camera is below `min_height`
    CameraHeight { min_height: f32 },
    /// Hide the grid while the camera looks upward at the floor from below
    ViewDirection,
}

impl Default for GridVisibilityRule {
    fn default() -> Self {
        GridVisibilityRule::CameraHeight { min_height: 0.01 }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub fit: FitSettings,
    pub pairing: PairingSettings,
    pub camera: CameraSettings,
    pub grid_rule: GridVisibilityRule,
    /// Containers narrower than this (in pixels) use the narrow camera
    pub narrow_width: u32,
    /// Yaw step per frame when auto-rotate is on, in radians
    pub auto_rotate_speed: f32,
    pub auto_rotate: bool,
    /// Preset applied to freshly loaded assets; grey by default, `None`
    /// leaves the stock finish
    pub initial_preset: Option<ColorPreset>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fit: FitSettings::default(),
            pairing: PairingSettings::default(),
            camera: CameraSettings::default(),
            grid_rule: GridVisibilityRule::default(),
            narrow_width: 768,
            auto_rotate_speed: 0.01,
            auto_rotate: false,
            initial_preset: Some(ColorPreset::Grey),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: Set the canonical viewing-cube edge length
    pub fn with_target_dimension(mut self, target: f32) -> Self {
        self.fit.target_dimension = target;
        self
    }

    /// Builder pattern: Set the hover height above the floor
    pub fn with_floor_offset(mut self, offset: f32) -> Self {
        self.fit.floor_offset = offset;
        self
    }

    /// Builder pattern: Show a single asset or a mirrored pair
    pub fn with_presentation(mut self, mode: PresentationMode) -> Self {
        self.pairing.mode = mode;
        self
    }

    /// Builder pattern: Set the pair gap as a fraction of asset width
    pub fn with_gap_ratio(mut self, ratio: f32) -> Self {
        self.pairing.gap_ratio = ratio;
        self
    }

    /// Builder pattern: Set the depth offset of the finished group
    pub fn with_depth_offset(mut self, offset: f32) -> Self {
        self.pairing.depth_offset = offset;
        self
    }

    pub fn with_grid_rule(mut self, rule: GridVisibilityRule) -> Self {
        self.grid_rule = rule;
        self
    }

    pub fn with_narrow_width(mut self, width: u32) -> Self {
        self.narrow_width = width;
        self
    }

    pub fn with_auto_rotate(mut self, enabled: bool) -> Self {
        self.auto_rotate = enabled;
        self
    }

    pub fn with_initial_preset(mut self, preset: ColorPreset) -> Self {
        self.initial_preset = Some(preset);
        self
    }

    /// True when a container of `width` pixels counts as narrow
    pub fn is_narrow(&self, width: u32) -> bool {
        width < self.narrow_width
    }
}
