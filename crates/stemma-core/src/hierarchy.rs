//! Arena-backed genealogy tree.
//!
//! Nodes are created once from a validated [`DocumentNode`] and never removed. Collapsing a node
//! only moves child ids between `children` and `hidden_children`; see [`crate::collapse`].

use crate::document::{DocumentNode, parse_document, parse_document_str};
use crate::flags::{Flag, FlagSet};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;

/// Arena index of a node. Only meaningful for the [`Hierarchy`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Render identity, handed out by [`Hierarchy::next_id`] the first time a node is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey(u64);

impl NodeKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Expanded,
    Collapsed,
}

/// Current and previous position of a node.
///
/// `(x0, y0)` is the position recorded at the end of the last render pass. Entering children
/// start there, and exiting children travel to the collapsing node's `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct NodeLayout {
    pub x: f64,
    pub y: f64,
    pub x0: f64,
    pub y0: f64,
}

impl NodeLayout {
    pub fn stash(&mut self) {
        self.x0 = self.x;
        self.y0 = self.y;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    pub(crate) key: Option<NodeKey>,
    pub(crate) name: String,
    pub(crate) born_marker: Option<String>,
    pub(crate) died_marker: Option<String>,
    pub(crate) branch_key: Option<String>,
    pub(crate) flags: FlagSet,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) hidden_children: Vec<NodeId>,
    pub(crate) visibility: Visibility,
    pub layout: NodeLayout,
}

impl TreeNode {
    pub fn key(&self) -> Option<NodeKey> {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn born_marker(&self) -> Option<&str> {
        self.born_marker.as_deref()
    }

    pub fn died_marker(&self) -> Option<&str> {
        self.died_marker.as_deref()
    }

    /// The branch key defined on this node itself (not inherited).
    pub fn own_branch_key(&self) -> Option<&str> {
        self.branch_key.as_deref()
    }

    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children currently shown (empty while collapsed).
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Children stashed away while collapsed (empty while expanded).
    pub fn hidden_children(&self) -> &[NodeId] {
        &self.hidden_children
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_collapsed(&self) -> bool {
        self.visibility == Visibility::Collapsed
    }

    /// Whether the node has any children, shown or hidden.
    pub fn has_descendants(&self) -> bool {
        !self.children.is_empty() || !self.hidden_children.is_empty()
    }

    /// The full original child list, regardless of visibility.
    pub fn all_children(&self) -> &[NodeId] {
        if self.children.is_empty() {
            &self.hidden_children
        } else {
            &self.children
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Hierarchy {
    nodes: Vec<TreeNode>,
    next_key: u64,
}

impl Hierarchy {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(Self::from_document(&parse_document_str(text)?))
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::from_document(&parse_document(value)?))
    }

    /// Builds the arena in pre-order, wiring parent links on the way down.
    pub fn from_document(doc: &DocumentNode) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut stack: Vec<(&DocumentNode, Option<NodeId>)> = vec![(doc, None)];

        while let Some((entry, parent)) = stack.pop() {
            let id = NodeId(nodes.len());
            nodes.push(TreeNode {
                key: None,
                name: entry.name.clone(),
                born_marker: entry.born_marker.clone(),
                died_marker: entry.died_marker.clone(),
                branch_key: entry.branch_key.clone(),
                flags: entry.flags,
                parent,
                children: Vec::with_capacity(entry.children.len()),
                hidden_children: Vec::new(),
                visibility: Visibility::Expanded,
                layout: NodeLayout::default(),
            });
            if let Some(parent) = parent {
                nodes[parent.0].children.push(id);
            }
            // Reverse so children pop (and get appended to the parent) in document order.
            for child in entry.children.iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        tracing::debug!(nodes = nodes.len(), "built hierarchy");
        Self { nodes, next_key: 0 }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn try_node(&self, id: NodeId) -> Result<&TreeNode> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode { id: id.0 })
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn hidden_children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).hidden_children
    }

    /// Monotonic render-key counter. Keys are never reused.
    pub fn next_id(&mut self) -> NodeKey {
        self.next_key += 1;
        NodeKey(self.next_key)
    }

    /// Returns the node's render key, assigning one on first use.
    pub fn ensure_key(&mut self, id: NodeId) -> NodeKey {
        if let Some(key) = self.nodes[id.0].key {
            return key;
        }
        let key = self.next_id();
        self.nodes[id.0].key = Some(key);
        key
    }

    /// Inclusive ancestor walk: `id`, its parent, ..., the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: Some(id),
        }
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Depth-first pre-order over the whole tree, hidden subtrees included.
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.walk(self.root(), TreeNode::all_children)
    }

    /// Depth-first pre-order over the visible projection: descends through `children` only, so
    /// collapsed nodes are listed but their hidden subtrees are not.
    pub fn visible_pre_order(&self) -> Vec<NodeId> {
        self.walk(self.root(), TreeNode::children)
    }

    /// A node is visible when every proper ancestor is expanded.
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .skip(1)
            .all(|a| self.node(a).visibility == Visibility::Expanded)
    }

    fn walk(&self, start: NodeId, next: fn(&TreeNode) -> &[NodeId]) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(start) {
            return out;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(next(self.node(id)).iter().rev().copied());
        }
        out
    }

    /// Resolves a name path starting at the root (`["Adam", "Seth", "Enosh"]`). Hidden children
    /// are searched too; the first child with a matching name wins.
    pub fn find_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let root = self.root();
        if !self.contains(root) || self.node(root).name != first.as_ref() {
            return None;
        }
        let mut cur = root;
        for segment in rest {
            let segment = segment.as_ref();
            cur = self
                .node(cur)
                .all_children()
                .iter()
                .copied()
                .find(|c| self.node(*c).name == segment)?;
        }
        Some(cur)
    }

    /// Same as [`Hierarchy::find_path`] with a `/`-separated path string.
    pub fn find_path_str(&self, path: &str) -> Option<NodeId> {
        let segments: Vec<&str> = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        self.find_path(&segments)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.pre_order()
            .into_iter()
            .find(|id| self.node(*id).name == name)
    }

    pub fn find_by_key(&self, key: NodeKey) -> Option<NodeId> {
        self.ids().find(|id| self.node(*id).key == Some(key))
    }
}

impl std::ops::Index<NodeId> for Hierarchy {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &Self::Output {
        self.node(id)
    }
}

pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = self.hierarchy.nodes.get(cur.0).and_then(|n| n.parent);
        Some(cur)
    }
}
