//! Per-node `expanded ⇄ collapsed` state machine.
//!
//! A transition only moves child ids between `children` and `hidden_children`; descendants keep
//! whatever state they had, so re-expanding shows a subtree exactly as it was left.

use crate::config::{ExpansionMode, ExpansionPolicy};
use crate::hierarchy::{Hierarchy, NodeId, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Collapsed,
    Expanded,
    /// Leaf nodes (no shown and no hidden children) never change state.
    Unchanged,
}

impl Hierarchy {
    /// `expanded → collapsed`. Returns `false` when there was nothing to hide.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        let node = self.node_mut(id);
        if node.visibility == Visibility::Collapsed || node.children.is_empty() {
            return false;
        }
        node.hidden_children = std::mem::take(&mut node.children);
        node.visibility = Visibility::Collapsed;
        true
    }

    /// `collapsed → expanded`, one level only.
    pub fn expand(&mut self, id: NodeId) -> bool {
        let node = self.node_mut(id);
        if node.visibility == Visibility::Expanded {
            return false;
        }
        node.children = std::mem::take(&mut node.hidden_children);
        node.visibility = Visibility::Expanded;
        true
    }

    pub fn toggle(&mut self, id: NodeId) -> ToggleOutcome {
        let outcome = if !self.node(id).has_descendants() {
            ToggleOutcome::Unchanged
        } else if self.node(id).is_collapsed() {
            self.expand(id);
            ToggleOutcome::Expanded
        } else {
            self.collapse(id);
            ToggleOutcome::Collapsed
        };
        tracing::debug!(node = %id, name = self.node(id).name(), ?outcome, "toggle");
        outcome
    }

    /// Collapses `id` and every descendant (hidden ones included).
    pub fn collapse_all(&mut self, id: NodeId) {
        self.collapse(id);
        let hidden = self.node(id).hidden_children.clone();
        for child in hidden {
            self.collapse_all(child);
        }
    }

    /// Expands `id` one level, then recurses into the children that just became visible, so the
    /// whole subtree opens through repeated shallow expansions.
    pub fn expand_all(&mut self, id: NodeId) {
        self.expand(id);
        let shown = self.node(id).children.clone();
        for child in shown {
            self.expand_all(child);
        }
    }

    /// Applies the load-time default. Unresolvable paths are skipped with a warning.
    pub fn apply_expansion_policy(&mut self, policy: &ExpansionPolicy) {
        let root = self.root();
        match policy.mode {
            ExpansionMode::Expanded => self.expand_all(root),
            ExpansionMode::Collapsed => {
                self.collapse_all(root);
                self.expand(root);
            }
        }

        for path in &policy.paths {
            let Some(target) = self.find_path_str(path) else {
                tracing::warn!(path = path.as_str(), "expansion path does not resolve to a node");
                continue;
            };
            let chain: Vec<NodeId> = self.ancestors(target).collect();
            for id in chain.into_iter().rev() {
                self.expand(id);
            }
        }
    }
}
