//! Render-target abstraction and the per-frame visual records handed to it.

use crate::model::{Bounds, LayoutPoint};
use crate::viewport::ViewTransform;
use serde::Serialize;
use stemma_core::{EdgeStyle, NodeId, NodeKey, NodeStyle};

/// Fill used for a collapsed node's box; expanded nodes are white.
pub const COLLAPSED_FILL: &str = "#E5E7EB";
pub const EXPANDED_FILL: &str = "#FFFFFF";

pub const BADGE_RADIUS: f64 = 8.0;
pub const SUBLABEL_FONT_SIZE: f64 = 11.0;
/// Life-span baseline, measured down from the box's bottom edge.
pub const SUBLABEL_OFFSET: f64 = 14.0;

/// An edge is identified by the render key of the child it leads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeKey(pub NodeKey);

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "edge-{}", self.0.get())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeVisual {
    pub key: NodeKey,
    pub node: NodeId,
    pub label: String,
    pub sublabel: Option<String>,
    /// Measured width of `sublabel`; 0 when there is none.
    pub sublabel_width: f64,
    /// Box center.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub font_size: f64,
    pub style: NodeStyle,
    pub collapsed: bool,
    /// 0 while entering from nothing, 1 when settled.
    pub presence: f64,
}

impl NodeVisual {
    pub fn fill(&self) -> &'static str {
        if self.collapsed {
            COLLAPSED_FILL
        } else {
            EXPANDED_FILL
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(
            self.x - self.width / 2.0,
            self.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Badge center relative to the box center.
    pub fn badge_center(&self) -> (f64, f64) {
        (self.width / 2.0 + 2.0, -16.0)
    }

    /// Life-span baseline relative to the box center.
    pub fn sublabel_baseline(&self) -> f64 {
        self.height / 2.0 + SUBLABEL_OFFSET
    }

    /// Everything the node paints: the box, plus the life-span line and the badge when present.
    pub fn render_bounds(&self) -> Bounds {
        let mut b = self.bounds();
        if self.sublabel.is_some() {
            // Ascent of one em above the baseline, a quarter em of descent below it.
            let top = self.y + self.sublabel_baseline() - SUBLABEL_FONT_SIZE;
            b = b.union(&Bounds::from_rect(
                self.x - self.sublabel_width / 2.0,
                top,
                self.sublabel_width,
                SUBLABEL_FONT_SIZE * 1.25,
            ));
        }
        if self.style.badge {
            let (cx, cy) = self.badge_center();
            b = b.union(&Bounds::from_rect(
                self.x + cx - BADGE_RADIUS,
                self.y + cy - BADGE_RADIUS,
                BADGE_RADIUS * 2.0,
                BADGE_RADIUS * 2.0,
            ));
        }
        b
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeVisual {
    pub key: EdgeKey,
    pub source: LayoutPoint,
    pub target: LayoutPoint,
    pub style: EdgeStyle,
    pub presence: f64,
}

impl EdgeVisual {
    pub fn opacity(&self) -> f64 {
        self.style.opacity * self.presence
    }

    /// Vertical cubic link: both control points sit on the midpoint depth.
    pub fn control_points(&self) -> [LayoutPoint; 4] {
        let my = (self.source.y + self.target.y) / 2.0;
        [
            self.source,
            LayoutPoint::new(self.source.x, my),
            LayoutPoint::new(self.target.x, my),
            self.target,
        ]
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.control_points().iter().map(|p| (p.x, p.y)))
    }
}

/// Formats `"{born}–{died} AM"`, with `?` for a missing side; `None` when both are missing.
pub fn life_span_label(born: Option<&str>, died: Option<&str>) -> Option<String> {
    if born.is_none() && died.is_none() {
        return None;
    }
    Some(format!(
        "{}\u{2013}{} AM",
        born.unwrap_or("?"),
        died.unwrap_or("?")
    ))
}

/// Anything that can host the tree scene: an SVG document, a canvas, a test recorder.
///
/// Drawing a key that is already present replaces it.
pub trait RenderTarget {
    fn draw_node(&mut self, node: &NodeVisual);
    fn draw_edge(&mut self, edge: &EdgeVisual);
    fn remove_node(&mut self, key: NodeKey);
    fn remove_edge(&mut self, key: EdgeKey);
    fn apply_transform(&mut self, transform: ViewTransform);
    /// Scene-space bounds of everything currently drawn.
    fn content_bounds(&self) -> Option<Bounds>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    fn draw_node(&mut self, node: &NodeVisual) {
        (**self).draw_node(node)
    }
    fn draw_edge(&mut self, edge: &EdgeVisual) {
        (**self).draw_edge(edge)
    }
    fn remove_node(&mut self, key: NodeKey) {
        (**self).remove_node(key)
    }
    fn remove_edge(&mut self, key: EdgeKey) {
        (**self).remove_edge(key)
    }
    fn apply_transform(&mut self, transform: ViewTransform) {
        (**self).apply_transform(transform)
    }
    fn content_bounds(&self) -> Option<Bounds> {
        (**self).content_bounds()
    }
}
