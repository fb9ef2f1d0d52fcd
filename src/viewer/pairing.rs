//! Builds the mirrored pair presentation from a single normalized asset

use cgmath::{Deg, Rad, Vector3};

use crate::config::{FitSettings, PairingSettings, PresentationMode};
use crate::error::ComposeError;
use crate::gfx::bounds::BoundingVolume;
use crate::gfx::scene::node::Node;

use super::normalize::{fit_transform, NormalizedNode};

pub const LEFT_NODE: &str = "left";
pub const RIGHT_NODE: &str = "right";

/// The composed object placed on stage
///
/// The composition hangs below a turntable node whose origin sits at the
/// horizontal center of the object, so spinning the turntable turns the
/// object in place.
#[derive(Debug, Clone)]
pub struct PresentedObject {
    root: Node,
    mode: PresentationMode,
    scale: f32,
    bounds: BoundingVolume,
}

impl PresentedObject {
    fn on_turntable(
        mut content: Node,
        mode: PresentationMode,
        scale: f32,
        bounds: BoundingVolume,
    ) -> Self {
        let center = bounds.center();
        content.transform.translation.x -= center.x;
        content.transform.translation.z -= center.z;
        let mut root = Node::group("turntable", vec![content]);
        root.transform.translation = Vector3::new(center.x, 0.0, center.z);
        Self {
            root,
            mode,
            scale,
            bounds,
        }
    }

    /// Wraps a node as-is, without any fitting
    ///
    /// Used for assets that could not be measured.
    pub fn unfitted(node: Node, mode: PresentationMode) -> Self {
        let bounds = BoundingVolume::from_node(&node);
        Self::on_turntable(node, mode, 1.0, bounds)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// The composition below the turntable
    pub fn content(&self) -> Option<&Node> {
        self.root.children.first()
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// Uniform scale of the final fit
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// World-space bounds at composition time
    pub fn bounds(&self) -> &BoundingVolume {
        &self.bounds
    }

    /// Left instance of a pair
    pub fn left(&self) -> Option<&Node> {
        self.content()?.child(LEFT_NODE)
    }

    /// Right (mirrored) instance of a pair
    pub fn right(&self) -> Option<&Node> {
        self.content()?.child(RIGHT_NODE)
    }

    /// Spins the object around the vertical axis through its center
    pub fn turn(&mut self, angle: impl Into<Rad<f32>>) {
        self.root.transform.rotate_y(angle);
    }
}

/// Composes the presentation for `asset`
///
/// In paired mode two deep copies are laid out side by side, the right one
/// mirrored, each turned outward by the configured yaw. The group is then
/// fitted again as a whole and pushed back by the depth offset.
pub fn compose(
    asset: NormalizedNode,
    pairing: &PairingSettings,
    fit: &FitSettings,
) -> Result<PresentedObject, ComposeError> {
    let presented = match pairing.mode {
        PresentationMode::Single => {
            let mut node = asset.node;
            node.transform.translation.z += pairing.depth_offset;
            let bounds = BoundingVolume::from_node(&node);
            PresentedObject::on_turntable(node, PresentationMode::Single, asset.scale, bounds)
        }
        PresentationMode::Paired => compose_pair(asset, pairing, fit)?,
    };

    if !presented.root.is_finite() {
        return Err(ComposeError::NonFinite("presented root"));
    }
    Ok(presented)
}

fn compose_pair(
    asset: NormalizedNode,
    pairing: &PairingSettings,
    fit: &FitSettings,
) -> Result<PresentedObject, ComposeError> {
    let width = asset.bounds.size().x;
    if !width.is_finite() {
        return Err(ComposeError::NonFinite("asset width"));
    }
    let gap = pairing.gap_ratio * width;
    let offset = 0.5 * width + 0.5 * gap;

    let mut left = Node::group(LEFT_NODE, vec![asset.node.clone()]);
    left.transform.translation.x = -offset;
    left.transform.set_yaw(Deg(-pairing.yaw_degrees));

    let mut right = Node::group(RIGHT_NODE, vec![asset.node]);
    right.transform.scale.x *= -1.0;
    right.transform.translation.x = offset;
    right.transform.set_yaw(Deg(pairing.yaw_degrees));

    let mut pair = Node::group("pair", vec![left, right]);
    let group_bounds = BoundingVolume::from_node(&pair);
    if !group_bounds.is_empty() && !group_bounds.max_dimension().is_finite() {
        return Err(ComposeError::NonFinite("group bounds"));
    }
    let mut transform = fit_transform(&group_bounds, fit).ok_or(ComposeError::DegenerateGroup)?;
    transform.translation.z += pairing.depth_offset;
    pair.transform = transform;

    log::debug!(
        "Composed pair: width {:.3}, offset ±{:.3}, group scale {:.4}",
        width,
        offset,
        transform.scale.x
    );

    let bounds = group_bounds.transform(&transform.matrix());
    Ok(PresentedObject::on_turntable(
        pair,
        PresentationMode::Paired,
        transform.scale.x,
        bounds,
    ))
}
