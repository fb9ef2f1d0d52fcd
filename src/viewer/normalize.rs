//! Fits a raw asset into the canonical viewing volume
//!
//! The asset is wrapped in a group node carrying the correction, so the
//! asset's own transforms are left exactly as authored.

use cgmath::Vector3;

use crate::config::FitSettings;
use crate::gfx::bounds::BoundingVolume;
use crate::gfx::scene::node::{Node, Transform};

/// An asset scaled to the viewing cube and resting just above the floor
#[derive(Debug, Clone)]
pub struct NormalizedNode {
    /// Wrapper node; its transform is the fit correction
    pub node: Node,
    /// Uniform scale that was applied
    pub scale: f32,
    /// World-space bounds after the correction
    pub bounds: BoundingVolume,
}

/// The asset has no measurable volume and could not be fitted
///
/// The asset is still handed back, wrapped at the origin without scale
/// correction, so the caller can decide to show it anyway.
#[derive(Debug, thiserror::Error)]
#[error("asset has no measurable geometry")]
pub struct EmptyGeometry {
    pub fallback: Box<Node>,
}

/// Transform that fits `bounds` to the viewing cube of `fit`
///
/// Scales uniformly so the largest dimension equals the target, centers on
/// x and z, and lifts the lowest point to the floor offset. Returns `None`
/// for volumes that cannot be scaled.
pub fn fit_transform(bounds: &BoundingVolume, fit: &FitSettings) -> Option<Transform> {
    if bounds.is_degenerate() {
        return None;
    }
    let scale = fit.target_dimension / bounds.max_dimension();
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let center = bounds.center();
    let mut transform = Transform::IDENTITY;
    transform.set_uniform_scale(scale);
    transform.translation = Vector3::new(
        -center.x * scale,
        -bounds.min.y * scale + fit.floor_offset,
        -center.z * scale,
    );
    transform.is_finite().then_some(transform)
}

/// Normalizes `raw` for presentation
pub fn normalize(raw: Node, fit: &FitSettings) -> Result<NormalizedNode, EmptyGeometry> {
    let bounds = BoundingVolume::from_node(&raw);
    let mut wrapper = Node::group("normalized", vec![raw]);

    let Some(transform) = fit_transform(&bounds, fit) else {
        log::warn!(
            "Asset bounds are degenerate (size {:?}); placing it unscaled at the origin",
            bounds.size()
        );
        return Err(EmptyGeometry {
            fallback: Box::new(wrapper),
        });
    };

    wrapper.transform = transform;
    let fitted = bounds.transform(&transform.matrix());
    log::debug!(
        "Normalized asset: scale {:.4}, size {:?}",
        transform.scale.x,
        fitted.size()
    );

    Ok(NormalizedNode {
        node: wrapper,
        scale: transform.scale.x,
        bounds: fitted,
    })
}
