use serde::{Deserialize, Serialize};
use stemma_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation that returns `self` and `to` exactly at `t = 0` and `t = 1`.
    pub fn lerp(self, to: LayoutPoint, t: f64) -> LayoutPoint {
        LayoutPoint {
            x: self.x * (1.0 - t) + to.x * t,
            y: self.y * (1.0 - t) + to.y * t,
        }
    }
}

impl From<(f64, f64)> for LayoutPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: NodeId,
    pub name: String,
    pub depth: usize,
    pub x: f64,
    pub y: f64,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub points: Vec<LayoutPoint>,
}

/// Output of one layout pass over the visible projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Visible nodes in pre-order.
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<PlacedEdge>,
    /// Bounds of node centers (box extents are a render concern).
    pub bounds: Option<Bounds>,
}

impl TreeLayout {
    pub fn node(&self, id: NodeId) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
