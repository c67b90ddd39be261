//! Time-sampled playback of a [`RenderPlan`].
//!
//! Transitions are visual only. Starting a new plan while one is in flight re-bases every track
//! on what is currently displayed, so the last plan wins and nothing queues.

use crate::diff::{Change, RenderPlan};
use crate::model::LayoutPoint;
use crate::scene::{EdgeKey, EdgeVisual, NodeVisual, RenderTarget};
use indexmap::IndexMap;
use std::time::Duration;
use stemma_core::NodeKey;

/// Cubic ease-in-out on `[0, 1]`.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

pub trait Interpolate: Clone {
    /// `self` at `t = 0`, `to` at `t = 1`. Non-numeric fields come from `to`.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

impl Interpolate for NodeVisual {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        NodeVisual {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            presence: lerp(self.presence, to.presence, t),
            ..to.clone()
        }
    }
}

impl Interpolate for EdgeVisual {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        EdgeVisual {
            source: self.source.lerp(to.source, t),
            target: self.target.lerp(to.target, t),
            presence: lerp(self.presence, to.presence, t),
            ..to.clone()
        }
    }
}

#[derive(Debug, Clone)]
struct Track<V> {
    from: V,
    to: V,
    remove_at_end: bool,
}

impl<V: Interpolate> Track<V> {
    fn sample(&self, t: f64) -> V {
        self.from.interpolate(&self.to, t)
    }
}

fn rebase<K, V>(
    displayed: &IndexMap<K, V>,
    key: &K,
    change: &Change<V>,
    remove_at_end: bool,
) -> Track<V>
where
    K: std::hash::Hash + Eq,
    V: Interpolate,
{
    Track {
        from: displayed.get(key).cloned().unwrap_or_else(|| change.from.clone()),
        to: change.to.clone(),
        remove_at_end,
    }
}

#[derive(Debug, Clone)]
pub struct Animator {
    duration: Duration,
    started: Duration,
    nodes: IndexMap<NodeKey, Track<NodeVisual>>,
    edges: IndexMap<EdgeKey, Track<EdgeVisual>>,
    displayed_nodes: IndexMap<NodeKey, NodeVisual>,
    displayed_edges: IndexMap<EdgeKey, EdgeVisual>,
}

impl Animator {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            started: Duration::ZERO,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            displayed_nodes: IndexMap::new(),
            displayed_edges: IndexMap::new(),
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.nodes.is_empty() || !self.edges.is_empty()
    }

    fn is_leaving(&self, key: NodeKey) -> bool {
        self.nodes.get(&key).is_some_and(|track| track.remove_at_end)
    }

    /// Node currently drawn under `p` (scene space), topmost first. Nodes on their way out are
    /// skipped so whatever they are sliding over stays clickable.
    pub fn hit_test(&self, p: LayoutPoint) -> Option<&NodeVisual> {
        self.displayed_nodes.values().rev().find(|n| {
            n.presence > 0.0 && !self.is_leaving(n.key) && n.bounds().contains(p.x, p.y)
        })
    }

    fn progress(&self, now: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Replaces any in-flight transition with `plan`, starting at `now`.
    pub fn begin(&mut self, plan: &RenderPlan, now: Duration) {
        self.settle_displayed(now);

        let mut nodes = IndexMap::new();
        let mut edges = IndexMap::new();
        for change in plan.nodes.entering.iter().chain(&plan.nodes.updating) {
            nodes.insert(change.to.key, rebase(&self.displayed_nodes, &change.to.key, change, false));
        }
        for change in &plan.nodes.exiting {
            nodes.insert(change.to.key, rebase(&self.displayed_nodes, &change.to.key, change, true));
        }
        for change in plan.edges.entering.iter().chain(&plan.edges.updating) {
            edges.insert(change.to.key, rebase(&self.displayed_edges, &change.to.key, change, false));
        }
        for change in &plan.edges.exiting {
            edges.insert(change.to.key, rebase(&self.displayed_edges, &change.to.key, change, true));
        }

        // Exits interrupted before completion still have to finish leaving.
        for (key, track) in std::mem::take(&mut self.nodes) {
            if track.remove_at_end && !nodes.contains_key(&key) {
                let from = self.displayed_nodes.get(&key).cloned().unwrap_or(track.from);
                nodes.insert(key, Track { from, ..track });
            }
        }
        for (key, track) in std::mem::take(&mut self.edges) {
            if track.remove_at_end && !edges.contains_key(&key) {
                let from = self.displayed_edges.get(&key).cloned().unwrap_or(track.from);
                edges.insert(key, Track { from, ..track });
            }
        }

        self.nodes = nodes;
        self.edges = edges;
        self.started = now;
    }

    /// Records where the in-flight tracks are at `now` without drawing.
    fn settle_displayed(&mut self, now: Duration) {
        if !self.is_animating() {
            return;
        }
        let t = ease_cubic_in_out(self.progress(now));
        for (key, track) in &self.nodes {
            self.displayed_nodes.insert(*key, track.sample(t));
        }
        for (key, track) in &self.edges {
            self.displayed_edges.insert(*key, track.sample(t));
        }
    }

    /// Draws the transition state at `now`. Returns `true` while frames remain.
    pub fn frame<T: RenderTarget + ?Sized>(&mut self, now: Duration, target: &mut T) -> bool {
        if !self.is_animating() {
            return false;
        }
        let p = self.progress(now);
        let t = ease_cubic_in_out(p);

        // Edges first so boxes paint over link ends.
        for (key, track) in &self.edges {
            let visual = track.sample(t);
            target.draw_edge(&visual);
            self.displayed_edges.insert(*key, visual);
        }
        for (key, track) in &self.nodes {
            let visual = track.sample(t);
            target.draw_node(&visual);
            self.displayed_nodes.insert(*key, visual);
        }

        if p < 1.0 {
            return true;
        }
        for (key, track) in std::mem::take(&mut self.edges) {
            if track.remove_at_end {
                target.remove_edge(key);
                self.displayed_edges.shift_remove(&key);
            }
        }
        for (key, track) in std::mem::take(&mut self.nodes) {
            if track.remove_at_end {
                target.remove_node(key);
                self.displayed_nodes.shift_remove(&key);
            }
        }
        false
    }

    /// Jumps straight to the end state of the current transition.
    pub fn finish<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        let end = self.started + self.duration;
        self.frame(end, target);
    }

    /// Draws `plan`'s end state with no animation.
    pub fn apply_immediately<T: RenderTarget + ?Sized>(&mut self, plan: &RenderPlan, target: &mut T) {
        self.begin(plan, self.started);
        self.finish(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
        assert!(ease_cubic_in_out(0.75) > 0.75);
    }

    #[test]
    fn easing_clamps_out_of_range_input() {
        assert_eq!(ease_cubic_in_out(-1.0), 0.0);
        assert_eq!(ease_cubic_in_out(2.0), 1.0);
    }
}
