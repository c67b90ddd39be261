use futures::executor::block_on;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use stemma::{
    App, FileSource, LayoutPoint, Mount, RenderTarget, StaticSource, StemmaConfig, SvgScene,
    ToggleOutcome, ViewerError, start,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(rel: &str) -> FileSource {
    FileSource::new(workspace_root().join("fixtures").join(rel))
}

fn start_fixture(rel: &str, config: StemmaConfig) -> App<SvgScene> {
    let mount = Mount::new(SvgScene::new(900.0, 600.0)).with_config(config);
    block_on(start(mount, &fixture(rel)))
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn successful_start_clears_status_and_fits_once() {
    let app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    assert_eq!(app.status(), "");
    let viewer = app.viewer().expect("running viewer");

    assert_eq!(viewer.target().node_count(), viewer.hierarchy().len());
    assert!(viewer.viewport().is_fitted());
    assert!(!viewer.is_animating());
    let t = viewer.viewport().transform();
    assert!((0.2..=4.0).contains(&t.k));
    assert_eq!(viewer.target().transform(), t);
}

#[test]
fn missing_render_target_is_reported() {
    let source = StaticSource::ok(r#"{"name":"Adam"}"#);
    let app = block_on(start(Mount::<SvgScene>::detached(), &source));
    assert!(!app.is_running());
    assert_eq!(app.status(), ViewerError::MissingRenderTarget.to_string());
}

#[test]
fn missing_text_measurer_is_a_missing_dependency() {
    let mount = Mount::new(SvgScene::new(900.0, 600.0)).with_measurer(None);
    let app = block_on(start(mount, &StaticSource::ok(r#"{"name":"Adam"}"#)));
    assert!(!app.is_running());
    assert_eq!(app.status(), "required dependency is unavailable: text measurer");
}

#[test]
fn failed_response_is_a_data_load_error() {
    let mount = Mount::new(SvgScene::new(900.0, 600.0));
    let app = block_on(start(mount, &StaticSource::with_status(404, "")));
    assert_eq!(app.status(), "could not load data.json (HTTP 404)");
    assert!(app.viewer().is_none());
}

#[test]
fn unreadable_file_is_a_data_load_error() {
    let app = start_fixture("genealogy/does_not_exist.json", StemmaConfig::default());
    assert!(app.status().starts_with("could not load"));
}

#[test]
fn malformed_document_reports_its_location() {
    let app = start_fixture("malformed/children_not_array.json", StemmaConfig::default());
    assert!(!app.is_running());
    assert!(app.status().contains("$.children[0].children"), "{}", app.status());

    let app = start_fixture("malformed/root_not_object.json", StemmaConfig::default());
    assert!(app.status().starts_with("Malformed document at $"));
}

#[test]
fn try_start_returns_typed_errors() {
    let mount = Mount::new(SvgScene::new(900.0, 600.0));
    let err = match block_on(stemma::try_start(mount, &StaticSource::ok("{\"name\": 7}"))) {
        Ok(_) => panic!("expected malformed input"),
        Err(err) => err,
    };
    assert!(matches!(err, ViewerError::MalformedInput(_)));
}

#[test]
fn clicking_a_node_collapses_it_with_a_transition() {
    let mut app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    let viewer = app.viewer_mut().expect("running viewer");
    let total = viewer.hierarchy().len();

    let noah = viewer.hierarchy().find_by_name("Noah").expect("Noah");
    let pos = viewer.hierarchy().node(noah).layout;
    let screen = viewer
        .viewport()
        .transform()
        .apply(LayoutPoint::new(pos.x, pos.y));

    let outcome = viewer.click(screen, ms(5_000)).expect("click ok");
    assert_eq!(outcome, Some(ToggleOutcome::Collapsed));
    assert!(viewer.hierarchy().node(noah).is_collapsed());
    assert!(viewer.is_animating());
    assert_eq!(viewer.target().node_count(), total);

    assert!(viewer.tick(ms(5_300)));
    assert!(!viewer.tick(ms(5_750)));
    assert_eq!(viewer.target().node_count(), total - 4);

    let outcome = viewer.click(screen, ms(6_000)).expect("click ok");
    assert_eq!(outcome, Some(ToggleOutcome::Expanded));
    viewer.finish_transitions();
    assert_eq!(viewer.target().node_count(), total);
}

#[test]
fn clicking_a_parent_while_its_children_leave_reopens_it() {
    let source = StaticSource::ok(r#"{"name":"A","children":[{"name":"B"},{"name":"C"}]}"#);
    let mut app = block_on(start(Mount::new(SvgScene::new(900.0, 600.0)), &source));
    let viewer = app.viewer_mut().expect("running viewer");
    let a = viewer.hierarchy().root();
    let pos = viewer.hierarchy().node(a).layout;
    let screen = viewer
        .viewport()
        .transform()
        .apply(LayoutPoint::new(pos.x, pos.y));

    let outcome = viewer.click(screen, ms(0)).expect("click ok");
    assert_eq!(outcome, Some(ToggleOutcome::Collapsed));

    // B and C are nearly on top of A but still fading out.
    assert!(viewer.tick(ms(600)));
    let outcome = viewer.click(screen, ms(600)).expect("click ok");
    assert_eq!(outcome, Some(ToggleOutcome::Expanded));

    viewer.finish_transitions();
    assert_eq!(viewer.target().node_count(), 3);
    assert!(viewer.target().nodes().all(|n| n.presence == 1.0));
}

#[test]
fn clicking_empty_space_does_nothing() {
    let mut app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    let viewer = app.viewer_mut().expect("running viewer");
    let outcome = viewer
        .click(LayoutPoint::new(-10_000.0, -10_000.0), ms(100))
        .expect("click ok");
    assert_eq!(outcome, None);
    assert!(!viewer.is_animating());
}

#[test]
fn toggling_a_leaf_is_a_no_op() {
    let mut app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    let viewer = app.viewer_mut().expect("running viewer");
    let abel = viewer.hierarchy().find_by_name("Abel").expect("Abel");
    let outcome = viewer.toggle_node(abel, ms(0)).expect("toggle ok");
    assert_eq!(outcome, ToggleOutcome::Unchanged);
    assert!(!viewer.is_animating());
}

#[test]
fn manual_pan_and_zoom_survive_toggles() {
    let mut app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    let viewer = app.viewer_mut().expect("running viewer");

    viewer.drag(40.0, -25.0);
    let zoomed = viewer.wheel(-250.0, LayoutPoint::new(450.0, 300.0));
    let seth = viewer.hierarchy().find_by_name("Seth").expect("Seth");
    viewer.toggle_node(seth, ms(0)).expect("toggle ok");
    viewer.finish_transitions();

    assert_eq!(viewer.viewport().transform(), zoomed);
    assert_eq!(viewer.target().transform(), zoomed);
}

#[test]
fn wheel_zoom_stays_in_range() {
    let mut app = start_fixture("genealogy/adam_to_shem.json", StemmaConfig::default());
    let viewer = app.viewer_mut().expect("running viewer");
    let anchor = LayoutPoint::new(450.0, 300.0);
    for _ in 0..20 {
        viewer.wheel(-1_000.0, anchor);
    }
    assert_eq!(viewer.viewport().transform().k, 4.0);
    for _ in 0..40 {
        viewer.wheel(1_000.0, anchor);
    }
    assert_eq!(viewer.viewport().transform().k, 0.2);
}

#[test]
fn collapsed_policy_with_paths_limits_the_first_render() {
    let config = StemmaConfig::with_overrides(&serde_json::json!({
        "expansion": { "mode": "collapsed", "paths": ["Adam/Seth/Enosh"] }
    }));
    let app = start_fixture("genealogy/adam_to_shem.json", config);
    assert_eq!(app.status(), "");
    let viewer = app.viewer().expect("running viewer");

    // Adam's three children, Seth's child Enosh, Enosh's child Kenan.
    assert_eq!(viewer.target().node_count(), 6);
    let names: Vec<&str> = viewer.target().nodes().map(|n| n.label.as_str()).collect();
    assert!(names.contains(&"Kenan"));
    assert!(!names.contains(&"Mahalalel"));
}

#[test]
fn custom_measurer_widens_boxes() {
    struct Wide;
    impl stemma::TextMeasurer for Wide {
        fn measure(
            &self,
            text: &str,
            _style: &stemma::TextStyle,
        ) -> stemma::TextMetrics {
            stemma::TextMetrics {
                width: text.len() as f64 * 50.0,
                height: 20.0,
            }
        }
    }

    let mount = Mount::new(SvgScene::new(900.0, 600.0)).with_measurer(Some(Arc::new(Wide)));
    let app = block_on(start(mount, &StaticSource::ok(r#"{"name":"Adam"}"#)));
    let viewer = app.viewer().expect("running viewer");
    let node = viewer.target().nodes().next().expect("root drawn");
    assert_eq!(node.width, 226.0);
    assert!(viewer.target().content_bounds().is_some());
}
