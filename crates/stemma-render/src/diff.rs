//! Keyed reconciliation of the visible tree against what was rendered last pass.
//!
//! A pass yields three explicit sets for nodes and edges. Each [`Change`] carries the visual at
//! the start and at the end of the transition; the [`crate::transition::Animator`] interpolates
//! between the two.

use crate::model::LayoutPoint;
use crate::scene::{EdgeKey, EdgeVisual, NodeVisual, SUBLABEL_FONT_SIZE, life_span_label};
use crate::text::{NodeBoxMetrics, TextMeasurer, TextStyle};
use indexmap::IndexMap;
use serde::Serialize;
use stemma_core::{Hierarchy, NodeId, NodeKey, StyleResolver};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change<V> {
    pub from: V,
    pub to: V,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changes<V> {
    pub entering: Vec<Change<V>>,
    pub updating: Vec<Change<V>>,
    pub exiting: Vec<Change<V>>,
}

impl<V> Default for Changes<V> {
    fn default() -> Self {
        Self {
            entering: Vec::new(),
            updating: Vec::new(),
            exiting: Vec::new(),
        }
    }
}

impl<V> Changes<V> {
    pub fn len(&self) -> usize {
        self.entering.len() + self.updating.len() + self.exiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    /// Node whose toggle triggered the pass; the root on first render.
    pub source: NodeId,
    pub nodes: Changes<NodeVisual>,
    pub edges: Changes<EdgeVisual>,
}

impl RenderPlan {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Everything needed to turn a laid-out node into a [`NodeVisual`].
#[derive(Clone, Copy)]
pub struct VisualBuilder<'a> {
    pub styles: &'a StyleResolver,
    pub boxes: &'a NodeBoxMetrics,
    pub measurer: &'a dyn TextMeasurer,
}

impl VisualBuilder<'_> {
    pub fn node(&self, hierarchy: &Hierarchy, id: NodeId, key: NodeKey, at: LayoutPoint) -> NodeVisual {
        let node = hierarchy.node(id);
        let sublabel = life_span_label(node.born_marker(), node.died_marker());
        let sublabel_width = sublabel.as_deref().map_or(0.0, |text| {
            let style = TextStyle {
                font_size: SUBLABEL_FONT_SIZE,
            };
            self.measurer.measure(text, &style).width
        });
        NodeVisual {
            key,
            node: id,
            label: node.name().to_string(),
            sublabel,
            sublabel_width,
            x: at.x,
            y: at.y,
            width: self.boxes.box_width(self.measurer, node.name()),
            height: self.boxes.height,
            corner_radius: self.boxes.corner_radius,
            font_size: self.boxes.font_size,
            style: self.styles.node_style(hierarchy, id),
            collapsed: node.is_collapsed(),
            presence: 1.0,
        }
    }

    pub fn edge(
        &self,
        hierarchy: &Hierarchy,
        child: NodeId,
        key: EdgeKey,
        source: LayoutPoint,
        target: LayoutPoint,
    ) -> EdgeVisual {
        EdgeVisual {
            key,
            source,
            target,
            style: self.styles.edge_style(hierarchy, child),
            presence: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderDiffer {
    /// Rendered last pass, in the order they were drawn.
    known: IndexMap<NodeKey, NodeId>,
}

impl RenderDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs the current visible projection (positions already written by the layout pass)
    /// against the previous pass, then stashes `(x0, y0)` for every visible node.
    pub fn reconcile(
        &mut self,
        hierarchy: &mut Hierarchy,
        source: NodeId,
        visuals: VisualBuilder<'_>,
    ) -> RenderPlan {
        let visible = hierarchy.visible_pre_order();
        for &id in &visible {
            hierarchy.ensure_key(id);
        }
        let h: &Hierarchy = hierarchy;

        let src = h.node(source).layout;
        let src_prev = LayoutPoint::new(src.x0, src.y0);
        let src_now = LayoutPoint::new(src.x, src.y);

        let mut nodes = Changes::default();
        let mut edges = Changes::default();
        let mut next_known = IndexMap::with_capacity(visible.len());

        for &id in &visible {
            let Some(key) = h.node(id).key() else {
                continue;
            };
            let layout = h.node(id).layout;
            let now = LayoutPoint::new(layout.x, layout.y);
            let to = visuals.node(h, id, key, now);
            let parent = h.parent(id);
            let edge_to = parent.map(|p| {
                let pl = h.node(p).layout;
                visuals.edge(h, id, EdgeKey(key), LayoutPoint::new(pl.x, pl.y), now)
            });

            if self.known.contains_key(&key) {
                let from = NodeVisual {
                    x: layout.x0,
                    y: layout.y0,
                    ..to.clone()
                };
                nodes.updating.push(Change { from, to });
                if let (Some(p), Some(edge_to)) = (parent, edge_to) {
                    let pl = h.node(p).layout;
                    let from = EdgeVisual {
                        source: LayoutPoint::new(pl.x0, pl.y0),
                        target: LayoutPoint::new(layout.x0, layout.y0),
                        ..edge_to.clone()
                    };
                    edges.updating.push(Change { from, to: edge_to });
                }
            } else {
                let from = NodeVisual {
                    x: src_prev.x,
                    y: src_prev.y,
                    presence: 0.0,
                    ..to.clone()
                };
                nodes.entering.push(Change { from, to });
                if let Some(edge_to) = edge_to {
                    let from = EdgeVisual {
                        source: src_prev,
                        target: src_prev,
                        presence: 0.0,
                        ..edge_to.clone()
                    };
                    edges.entering.push(Change { from, to: edge_to });
                }
            }
            next_known.insert(key, id);
        }

        for (&key, &id) in &self.known {
            if next_known.contains_key(&key) {
                continue;
            }
            let layout = h.node(id).layout;
            let last = LayoutPoint::new(layout.x0, layout.y0);
            let from = visuals.node(h, id, key, last);
            let to = NodeVisual {
                x: src_now.x,
                y: src_now.y,
                presence: 0.0,
                ..from.clone()
            };
            nodes.exiting.push(Change { from, to });

            if let Some(p) = h.parent(id) {
                let pl = h.node(p).layout;
                let from = visuals.edge(h, id, EdgeKey(key), LayoutPoint::new(pl.x0, pl.y0), last);
                let to = EdgeVisual {
                    source: src_now,
                    target: src_now,
                    presence: 0.0,
                    ..from.clone()
                };
                edges.exiting.push(Change { from, to });
            }
        }

        for &id in &visible {
            hierarchy.node_mut(id).layout.stash();
        }
        self.known = next_known;

        tracing::debug!(
            source = %source,
            entering = nodes.entering.len(),
            updating = nodes.updating.len(),
            exiting = nodes.exiting.len(),
            "reconciled render pass"
        );
        RenderPlan {
            source,
            nodes,
            edges,
        }
    }
}
