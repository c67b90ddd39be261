use std::time::Duration;
use stemma_core::{DocumentNode, Flag, Hierarchy, NodeId, StemmaConfig, StyleResolver};
use stemma_render::{
    Animator, LayoutOptions, LayoutPoint, RenderDiffer, RenderPlan, RenderTarget, SvgScene,
    layout_tree,
};

struct Harness {
    hierarchy: Hierarchy,
    differ: RenderDiffer,
    styles: StyleResolver,
    options: LayoutOptions,
}

impl Harness {
    fn new(doc: DocumentNode) -> Self {
        Self {
            hierarchy: Hierarchy::from_document(&doc),
            differ: RenderDiffer::new(),
            styles: StyleResolver::new(StemmaConfig::default().palette()),
            options: LayoutOptions::default(),
        }
    }

    fn pass(&mut self, source: NodeId) -> RenderPlan {
        layout_tree(&mut self.hierarchy, &self.options.spacing);
        self.differ.reconcile(
            &mut self.hierarchy,
            source,
            self.options.visuals(&self.styles),
        )
    }

    fn id(&self, name: &str) -> NodeId {
        self.hierarchy.find_by_name(name).expect(name)
    }
}

fn family() -> DocumentNode {
    DocumentNode::named("Adam").with_children(vec![
        DocumentNode::named("Cain").with_children(vec![DocumentNode::named("Enoch")]),
        DocumentNode::named("Seth").with_children(vec![
            DocumentNode::named("Enosh"),
            DocumentNode::named("Kenan").with_flag(Flag::Maternal),
        ]),
    ])
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn first_pass_enters_everything_from_the_origin() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let plan = t.pass(root);

    assert_eq!(plan.nodes.entering.len(), 6);
    assert!(plan.nodes.updating.is_empty());
    assert!(plan.nodes.exiting.is_empty());
    assert_eq!(plan.edges.entering.len(), 5);
    for change in &plan.nodes.entering {
        assert_eq!((change.from.x, change.from.y), (0.0, 0.0));
        assert_eq!(change.from.presence, 0.0);
        assert_eq!(change.to.presence, 1.0);
    }
    for id in t.hierarchy.visible_pre_order() {
        let l = t.hierarchy.node(id).layout;
        assert_eq!((l.x0, l.y0), (l.x, l.y));
    }
}

#[test]
fn collapse_exits_descendants_toward_the_toggled_node() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    t.pass(root);

    let seth = t.id("Seth");
    t.hierarchy.toggle(seth);
    let plan = t.pass(seth);

    let seth_now = t.hierarchy.node(seth).layout;
    let exiting: Vec<&str> = plan.nodes.exiting.iter().map(|c| c.to.label.as_str()).collect();
    assert_eq!(exiting, vec!["Enosh", "Kenan"]);
    for change in &plan.nodes.exiting {
        assert_eq!((change.to.x, change.to.y), (seth_now.x, seth_now.y));
        assert_eq!(change.to.presence, 0.0);
    }
    for change in &plan.edges.exiting {
        assert_eq!(change.to.source, LayoutPoint::new(seth_now.x, seth_now.y));
        assert_eq!(change.to.target, change.to.source);
    }
    assert_eq!(plan.nodes.updating.len(), 4);
    assert!(plan.nodes.entering.is_empty());

    let seth_visual = plan
        .nodes
        .updating
        .iter()
        .find(|c| c.to.node == seth)
        .expect("Seth updates");
    assert!(seth_visual.to.collapsed);
}

#[test]
fn expand_enters_children_from_the_previous_source_position() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    t.pass(root);
    let seth = t.id("Seth");
    let kenan = t.id("Kenan");
    let key_before = t.hierarchy.node(kenan).key();

    t.hierarchy.toggle(seth);
    t.pass(seth);
    let stashed = t.hierarchy.node(seth).layout;

    t.hierarchy.toggle(seth);
    let plan = t.pass(seth);
    assert_eq!(plan.nodes.entering.len(), 2);
    for change in &plan.nodes.entering {
        assert_eq!((change.from.x, change.from.y), (stashed.x, stashed.y));
    }
    assert_eq!(t.hierarchy.node(kenan).key(), key_before);
}

#[test]
fn updating_nodes_start_from_their_previous_position() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    t.pass(root);
    let cain = t.id("Cain");
    let before = t.hierarchy.node(cain).layout;

    let seth = t.id("Seth");
    t.hierarchy.toggle(seth);
    let plan = t.pass(seth);
    let change = plan
        .nodes
        .updating
        .iter()
        .find(|c| c.to.node == cain)
        .expect("Cain stays visible");
    assert_eq!((change.from.x, change.from.y), (before.x, before.y));
    let after = t.hierarchy.node(cain).layout;
    assert_eq!((change.to.x, change.to.y), (after.x, after.y));
    assert_ne!(before.x, after.x);
}

#[test]
fn animator_plays_plan_and_removes_exited_elements() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    let mut animator = Animator::new(ms(750));

    let first = t.pass(root);
    animator.apply_immediately(&first, &mut scene);
    assert_eq!(scene.node_count(), 6);
    assert_eq!(scene.edge_count(), 5);
    assert!(!animator.is_animating());

    let seth = t.id("Seth");
    t.hierarchy.toggle(seth);
    let plan = t.pass(seth);
    animator.begin(&plan, ms(1000));

    assert!(animator.frame(ms(1375), &mut scene));
    assert_eq!(scene.node_count(), 6);
    let kenan = t.hierarchy.node(t.id("Kenan")).key().expect("key");
    let mid = scene.node(kenan).expect("still drawn");
    assert!(mid.presence > 0.0 && mid.presence < 1.0);

    assert!(!animator.frame(ms(1750), &mut scene));
    assert_eq!(scene.node_count(), 4);
    assert_eq!(scene.edge_count(), 3);
    assert!(scene.node(kenan).is_none());
}

#[test]
fn interrupting_a_transition_starts_from_the_displayed_state() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    let mut animator = Animator::new(ms(750));
    animator.apply_immediately(&t.pass(root), &mut scene);

    let seth = t.id("Seth");
    let cain_key = t.hierarchy.node(t.id("Cain")).key().expect("key");

    t.hierarchy.toggle(seth);
    animator.begin(&t.pass(seth), ms(0));
    animator.frame(ms(300), &mut scene);
    let displayed = scene.node(cain_key).expect("drawn").clone();

    t.hierarchy.toggle(seth);
    animator.begin(&t.pass(seth), ms(300));
    animator.frame(ms(300), &mut scene);
    let restarted = scene.node(cain_key).expect("drawn");
    assert!((restarted.x - displayed.x).abs() < 1e-9);

    animator.frame(ms(1050), &mut scene);
    let settled = scene.node(cain_key).expect("drawn");
    assert_eq!(settled.x, t.hierarchy.node(t.id("Cain")).layout.x);
    assert_eq!(scene.node_count(), 6);
}

#[test]
fn zero_duration_jumps_to_the_end_state() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    let mut animator = Animator::new(Duration::ZERO);
    animator.begin(&t.pass(root), ms(10));
    assert!(!animator.frame(ms(10), &mut scene));
    assert!(scene.nodes().all(|n| n.presence == 1.0));
}

#[test]
fn maternal_nodes_render_dashed_with_a_badge() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    Animator::new(ms(750)).apply_immediately(&t.pass(root), &mut scene);

    let kenan = t.hierarchy.node(t.id("Kenan")).key().expect("key");
    let enosh = t.hierarchy.node(t.id("Enosh")).key().expect("key");
    let svg = scene.to_svg();

    let group = |key: stemma_core::NodeKey| -> String {
        let marker = format!(r#"data-key="{key}" transform"#);
        let start = svg.find(&marker).expect("node group");
        let end = svg[start..].find("</g><g class=\"node").map_or(svg.len(), |e| start + e);
        svg[start..end].to_string()
    };

    let maternal = group(kenan);
    assert!(maternal.contains(r#"stroke-dasharray="3,4""#));
    assert!(maternal.contains(r#"class="badge""#));

    let plain = group(enosh);
    assert!(!plain.contains("stroke-dasharray"));
    assert!(!plain.contains("badge"));

    assert!(svg.contains(r#"<g class="viewport" transform="translate(0,0) scale(1)">"#));
}

#[test]
fn content_bounds_cover_boxes() {
    let mut t = Harness::new(family());
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    Animator::new(ms(750)).apply_immediately(&t.pass(root), &mut scene);

    let bounds = scene.content_bounds().expect("non-empty scene");
    for node in scene.nodes() {
        let b = node.bounds();
        assert!(bounds.contains(b.min_x, b.min_y));
        assert!(bounds.contains(b.max_x, b.max_y));
    }
    assert_eq!(bounds.min_y, -16.0);
}

#[test]
fn content_bounds_include_badge_and_life_span() {
    let eve = DocumentNode {
        born_marker: Some("0".to_string()),
        died_marker: Some("930".to_string()),
        ..DocumentNode::named("Eve").with_flag(Flag::Maternal)
    };
    let mut t = Harness::new(eve);
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    Animator::new(ms(750)).apply_immediately(&t.pass(root), &mut scene);

    let bounds = scene.content_bounds().expect("non-empty scene");
    // Box is 120x32 around the origin; badge circle (r=8) centered at (62, -16).
    assert_eq!(bounds.min_x, -60.0);
    assert_eq!(bounds.max_x, 70.0);
    assert_eq!(bounds.min_y, -24.0);
    // Life-span baseline at 30, with a quarter em of descent at 11px.
    assert!((bounds.max_y - 32.75).abs() < 1e-9, "{bounds:?}");

    let svg = scene.to_svg();
    assert!(svg.contains(r#"<circle cx="62" cy="-16" r="8""#));
    assert!(svg.contains(r#"<text class="life-span" text-anchor="middle" y="30""#));
    assert!(svg.contains("0\u{2013}930 AM"));
}

#[test]
fn uncertain_dims_the_box_but_not_the_label() {
    let doc = DocumentNode::named("Abel").with_flag(Flag::Uncertain);
    let mut t = Harness::new(doc);
    let root = t.hierarchy.root();
    let mut scene = SvgScene::new(900.0, 600.0);
    Animator::new(ms(750)).apply_immediately(&t.pass(root), &mut scene);

    let svg = scene.to_svg();
    assert!(svg.contains(r#"transform="translate(0,0)" opacity="1">"#), "{svg}");
    assert!(svg.contains(r#"stroke-width="1.2" opacity="0.8"/>"#), "{svg}");
}
