//! Headless SVG render target.
//!
//! [`SvgScene`] keeps the last drawn visual per key and serializes the whole scene on demand, so
//! any frame of a transition can be written to disk.

pub mod util;

use crate::model::Bounds;
use crate::scene::{
    BADGE_RADIUS, EdgeKey, EdgeVisual, NodeVisual, RenderTarget, SUBLABEL_FONT_SIZE,
};
use crate::viewport::ViewTransform;
use indexmap::IndexMap;
use std::fmt::Write as _;
use stemma_core::NodeKey;
use util::{escape_xml_into, fmt, fmt_into, fmt_path_into};

const BADGE_STROKE: &str = "#111827";
const FONT_FAMILY: &str = "system-ui, -apple-system, Segoe UI, sans-serif";

#[derive(Debug, Clone, Default)]
pub struct SvgScene {
    width: f64,
    height: f64,
    transform: ViewTransform,
    nodes: IndexMap<NodeKey, NodeVisual>,
    edges: IndexMap<EdgeKey, EdgeVisual>,
}

impl SvgScene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn node(&self, key: NodeKey) -> Option<&NodeVisual> {
        self.nodes.get(&key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeVisual> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeVisual> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="stemma" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{FONT_FAMILY}">"#,
            w = fmt(self.width),
            h = fmt(self.height),
        );
        let _ = write!(
            out,
            r#"<g class="viewport" transform="{}">"#,
            self.transform.to_svg_attr()
        );

        out.push_str(r#"<g class="links">"#);
        for edge in self.edges.values() {
            render_edge(&mut out, edge);
        }
        out.push_str("</g>");

        out.push_str(r#"<g class="nodes">"#);
        for node in self.nodes.values() {
            render_node(&mut out, node);
        }
        out.push_str("</g></g></svg>\n");
        out
    }
}

fn render_edge(out: &mut String, edge: &EdgeVisual) {
    let [s, c1, c2, t] = edge.control_points();
    let _ = write!(out, r#"<path class="link" data-key="{}" d="M"#, edge.key.0);
    fmt_path_into(out, s.x);
    out.push(',');
    fmt_path_into(out, s.y);
    out.push('C');
    for (i, p) in [c1, c2, t].iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        fmt_path_into(out, p.x);
        out.push(',');
        fmt_path_into(out, p.y);
    }
    out.push_str(r#"" fill="none" stroke=""#);
    escape_xml_into(out, &edge.style.stroke);
    out.push_str(r#"" stroke-width=""#);
    fmt_into(out, edge.style.stroke_width);
    out.push('"');
    if let Some(dash) = edge.style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
    out.push_str(r#" opacity=""#);
    fmt_into(out, edge.opacity());
    out.push_str(r#""/>"#);
}

fn render_node(out: &mut String, node: &NodeVisual) {
    let class = if node.collapsed { "node collapsed" } else { "node" };
    let _ = write!(
        out,
        r#"<g class="{class}" data-key="{}" transform="translate({},{})" opacity="{}">"#,
        node.key,
        fmt(node.x),
        fmt(node.y),
        fmt(node.presence),
    );

    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}" stroke=""#,
        fmt(-node.width / 2.0),
        fmt(-node.height / 2.0),
        fmt(node.width),
        fmt(node.height),
        node.fill(),
        r = fmt(node.corner_radius),
    );
    escape_xml_into(out, &node.style.stroke);
    out.push_str(r#"" stroke-width=""#);
    fmt_into(out, node.style.stroke_width);
    out.push('"');
    if let Some(dash) = node.style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
    // Uncertainty dims the box only; the label and badge stay at full strength.
    out.push_str(r#" opacity=""#);
    fmt_into(out, node.style.opacity);
    out.push_str(r#""/>"#);

    let _ = write!(
        out,
        r#"<text class="label" text-anchor="middle" dy="0.35em" font-size="{}">"#,
        fmt(node.font_size)
    );
    escape_xml_into(out, &node.label);
    out.push_str("</text>");

    if let Some(sublabel) = &node.sublabel {
        let _ = write!(
            out,
            r##"<text class="life-span" text-anchor="middle" y="{}" font-size="{}" fill="#6B7280">"##,
            fmt(node.sublabel_baseline()),
            fmt(SUBLABEL_FONT_SIZE),
        );
        escape_xml_into(out, sublabel);
        out.push_str("</text>");
    }

    if node.style.badge {
        let (cx, cy) = node.badge_center();
        let (cx, cy) = (fmt(cx), fmt(cy));
        let _ = write!(
            out,
            r##"<g class="badge"><circle cx="{cx}" cy="{cy}" r="{r}" fill="#FFFFFF" stroke="{BADGE_STROKE}" stroke-width="1"/><text x="{cx}" y="{cy}" dy="0.35em" text-anchor="middle" font-size="10">M</text></g>"##,
            r = fmt(BADGE_RADIUS),
        );
    }

    out.push_str("</g>");
}

impl RenderTarget for SvgScene {
    fn draw_node(&mut self, node: &NodeVisual) {
        self.nodes.insert(node.key, node.clone());
    }

    fn draw_edge(&mut self, edge: &EdgeVisual) {
        self.edges.insert(edge.key, edge.clone());
    }

    fn remove_node(&mut self, key: NodeKey) {
        self.nodes.shift_remove(&key);
    }

    fn remove_edge(&mut self, key: EdgeKey) {
        self.edges.shift_remove(&key);
    }

    fn apply_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    fn content_bounds(&self) -> Option<Bounds> {
        let nodes = self.nodes.values().map(NodeVisual::render_bounds);
        let edges = self.edges.values().filter_map(EdgeVisual::bounds);
        nodes.chain(edges).reduce(|a, b| a.union(&b))
    }
}
