//! Tidy-tree layout over the visible projection of a [`Hierarchy`].
//!
//! Subtrees are laid out bottom-up in slot units. Each subtree keeps a contour (leftmost and
//! rightmost offset per depth below its root); a sibling subtree is pushed right until its left
//! contour clears the accumulated right contour at every shared depth. The parent is then
//! centered on the mean of its children's offsets. Final coordinates are `slot * nodeWidth` and
//! `depth * levelHeight`, with the root at the origin.

use crate::model::{Bounds, LayoutPoint, PlacedEdge, PlacedNode, TreeLayout};
use serde::Serialize;
use stemma_core::{Hierarchy, NodeId, StemmaConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutSpacing {
    pub node_width: f64,
    pub level_height: f64,
    /// Minimum distance between siblings, in slots.
    pub sibling_separation: f64,
    /// Minimum distance between neighbours with different parents, in slots.
    pub cousin_separation: f64,
}

impl Default for LayoutSpacing {
    fn default() -> Self {
        Self {
            node_width: 110.0,
            level_height: 145.0,
            sibling_separation: 1.0,
            cousin_separation: 2.0,
        }
    }
}

impl LayoutSpacing {
    pub fn from_config(config: &StemmaConfig) -> Self {
        let d = Self::default();
        Self {
            node_width: config.positive_f64("layout.nodeWidth", d.node_width),
            level_height: config.positive_f64("layout.levelHeight", d.level_height),
            sibling_separation: config
                .positive_f64("layout.siblingSeparation", d.sibling_separation),
            cousin_separation: config.positive_f64("layout.cousinSeparation", d.cousin_separation),
        }
    }
}

/// Per-depth extents of a subtree, relative to the subtree root (index 0 is the root itself).
#[derive(Debug, Clone, Default)]
struct Contour {
    left: Vec<f64>,
    right: Vec<f64>,
}

impl Contour {
    fn leaf() -> Self {
        Self {
            left: vec![0.0],
            right: vec![0.0],
        }
    }
}

/// Lays out every visible node and writes `(x, y)` into each node's [`stemma_core::NodeLayout`].
/// Hidden nodes keep their previous coordinates.
pub fn layout_tree(hierarchy: &mut Hierarchy, spacing: &LayoutSpacing) -> TreeLayout {
    let order = hierarchy.visible_pre_order();
    let mut offset = vec![0.0_f64; hierarchy.len()];
    let mut contours: Vec<Option<Contour>> = vec![None; hierarchy.len()];

    // Reverse pre-order visits every child before its parent.
    for &id in order.iter().rev() {
        let children = hierarchy.children(id);
        if children.is_empty() {
            contours[id.index()] = Some(Contour::leaf());
            continue;
        }

        let mut acc = Contour::default();
        let mut shifts = Vec::with_capacity(children.len());
        for (i, child) in children.iter().enumerate() {
            let sub = contours[child.index()].take().unwrap_or_else(Contour::leaf);
            let shift = if i == 0 {
                0.0
            } else {
                required_shift(&acc, &sub, spacing)
            };
            merge_right(&mut acc, &sub, shift);
            shifts.push(shift);
        }

        let mean = shifts.iter().sum::<f64>() / shifts.len() as f64;
        for (child, shift) in children.iter().zip(&shifts) {
            offset[child.index()] = shift - mean;
        }

        let mut contour = Contour::leaf();
        contour.left.extend(acc.left.iter().map(|v| v - mean));
        contour.right.extend(acc.right.iter().map(|v| v - mean));
        contours[id.index()] = Some(contour);
    }

    let mut slot = vec![0.0_f64; hierarchy.len()];
    let mut depth = vec![0usize; hierarchy.len()];
    let mut nodes = Vec::with_capacity(order.len());
    let mut edges = Vec::with_capacity(order.len().saturating_sub(1));

    // Pre-order visits every parent before its children.
    for &id in &order {
        if let Some(parent) = hierarchy.parent(id) {
            slot[id.index()] = slot[parent.index()] + offset[id.index()];
            depth[id.index()] = depth[parent.index()] + 1;
        }
        let x = slot[id.index()] * spacing.node_width;
        let y = depth[id.index()] as f64 * spacing.level_height;

        let node = hierarchy.node_mut(id);
        node.layout.x = x;
        node.layout.y = y;

        nodes.push(PlacedNode {
            id,
            name: node.name().to_string(),
            depth: depth[id.index()],
            x,
            y,
            collapsed: node.is_collapsed(),
        });
    }

    for placed in &nodes {
        let Some(parent) = hierarchy.parent(placed.id) else {
            continue;
        };
        let p = hierarchy.node(parent).layout;
        edges.push(PlacedEdge {
            parent,
            child: placed.id,
            points: vec![
                LayoutPoint::new(p.x, p.y),
                LayoutPoint::new(placed.x, placed.y),
            ],
        });
    }

    let bounds = Bounds::from_points(nodes.iter().map(|n| (n.x, n.y)));
    tracing::debug!(
        visible = nodes.len(),
        total = hierarchy.len(),
        "tidy layout pass"
    );
    TreeLayout {
        nodes,
        edges,
        bounds,
    }
}

/// Smallest shift that keeps `next` clear of `acc` at every depth both contours reach.
fn required_shift(acc: &Contour, next: &Contour, spacing: &LayoutSpacing) -> f64 {
    let mut shift = f64::NEG_INFINITY;
    for (d, (right, left)) in acc.right.iter().zip(&next.left).enumerate() {
        let sep = if d == 0 {
            spacing.sibling_separation
        } else {
            spacing.cousin_separation
        };
        shift = shift.max(right + sep - left);
    }
    shift
}

fn merge_right(acc: &mut Contour, next: &Contour, shift: f64) {
    for d in 0..next.left.len() {
        if d < acc.left.len() {
            acc.right[d] = next.right[d] + shift;
        } else {
            acc.left.push(next.left[d] + shift);
            acc.right.push(next.right[d] + shift);
        }
    }
}

/// The visible children of `id` with their laid-out x coordinates.
pub fn visible_child_xs(hierarchy: &Hierarchy, id: NodeId) -> Vec<f64> {
    hierarchy
        .children(id)
        .iter()
        .map(|c| hierarchy.node(*c).layout.x)
        .collect()
}
