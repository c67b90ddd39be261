//! Branch-key inheritance and the stroke "style contract".
//!
//! Render code consumes [`NodeStyle`] / [`EdgeStyle`]; nothing else reads branch keys or flags to
//! decide how something is drawn.

use crate::config::{DEFAULT_BRANCH, Palette};
use crate::flags::Flag;
use crate::hierarchy::{Hierarchy, NodeId};
use serde::Serialize;

pub const MATERNAL_DASH: &str = "3,4";

/// Nearest defined branch key walking from `id` (inclusive) up to the root, or `DEFAULT`.
pub fn resolve_branch_key(hierarchy: &Hierarchy, id: NodeId) -> &str {
    hierarchy
        .ancestors(id)
        .find_map(|a| hierarchy.node(a).own_branch_key())
        .unwrap_or(DEFAULT_BRANCH)
}

pub fn has_flag(hierarchy: &Hierarchy, id: NodeId, flag: Flag) -> bool {
    hierarchy
        .try_node(id)
        .is_ok_and(|node| node.has_flag(flag))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub branch_key: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub dash: Option<&'static str>,
    pub opacity: f64,
    /// Draw the maternal "M" badge.
    pub badge: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub branch_key: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub dash: Option<&'static str>,
    pub opacity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    palette: Palette,
}

impl StyleResolver {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn node_style(&self, hierarchy: &Hierarchy, id: NodeId) -> NodeStyle {
        let branch_key = resolve_branch_key(hierarchy, id);
        let mainline = has_flag(hierarchy, id, Flag::Mainline);
        let maternal = has_flag(hierarchy, id, Flag::Maternal);
        let uncertain = has_flag(hierarchy, id, Flag::Uncertain);
        NodeStyle {
            branch_key: branch_key.to_string(),
            stroke: self.palette.color(branch_key).to_string(),
            stroke_width: if mainline { 2.5 } else { 1.2 },
            dash: maternal.then_some(MATERNAL_DASH),
            opacity: if uncertain { 0.80 } else { 1.0 },
            badge: maternal,
        }
    }

    /// Styling of the link leading into `child`; the child decides how its parent link looks.
    pub fn edge_style(&self, hierarchy: &Hierarchy, child: NodeId) -> EdgeStyle {
        let branch_key = resolve_branch_key(hierarchy, child);
        let mainline = has_flag(hierarchy, child, Flag::Mainline);
        let maternal = has_flag(hierarchy, child, Flag::Maternal);
        let uncertain = has_flag(hierarchy, child, Flag::Uncertain);
        EdgeStyle {
            branch_key: branch_key.to_string(),
            stroke: self.palette.color(branch_key).to_string(),
            stroke_width: if mainline { 2.5 } else { 1.5 },
            dash: maternal.then_some(MATERNAL_DASH),
            opacity: if uncertain { 0.65 } else { 1.0 },
        }
    }
}
