use stemma_core::StemmaConfig;
use stemma_render::{Bounds, LayoutPoint, Viewport};

fn viewport() -> Viewport {
    Viewport::from_config(&StemmaConfig::default()).expect("default viewport")
}

#[test]
fn auto_fit_clamps_large_scale_to_max() {
    let mut vp = viewport();
    // (900 - 50) / 106.25 = 8 and (600 - 50) / 68.75 = 8.
    let bounds = Bounds::from_rect(0.0, 0.0, 106.25, 68.75);
    let t = vp.auto_fit(Some(bounds)).expect("first fit applies");
    assert_eq!(t.k, 4.0);
}

#[test]
fn auto_fit_clamps_small_scale_to_min() {
    let mut vp = viewport();
    let bounds = Bounds::from_rect(0.0, 0.0, 85_000.0, 55_000.0);
    let t = vp.auto_fit(Some(bounds)).expect("first fit applies");
    assert_eq!(t.k, 0.2);
}

#[test]
fn degenerate_bounds_stay_in_range() {
    let vp = viewport();
    let point = Bounds::from_rect(10.0, 10.0, 0.0, 0.0);
    assert_eq!(vp.fit_transform(&point).k, 4.0);
    let line = Bounds::from_rect(0.0, 0.0, 0.0, 1e9);
    assert_eq!(vp.fit_transform(&line).k, 0.2);
}

#[test]
fn auto_fit_centers_the_box() {
    let mut vp = viewport();
    let bounds = Bounds::from_rect(-400.0, -16.0, 800.0, 600.0);
    let t = vp.auto_fit(Some(bounds)).expect("first fit applies");
    let center = t.apply(LayoutPoint::new(0.0, 284.0));
    assert!((center.x - 450.0).abs() < 1e-9);
    assert!((center.y - 300.0).abs() < 1e-9);
    assert!(t.k > 0.2 && t.k < 4.0);
}

#[test]
fn auto_fit_runs_only_once() {
    let mut vp = viewport();
    let bounds = Bounds::from_rect(-400.0, -16.0, 800.0, 600.0);
    assert!(vp.auto_fit(Some(bounds)).is_some());

    vp.pan(25.0, 40.0);
    let manual = vp.transform();
    assert!(vp.auto_fit(Some(Bounds::from_rect(0.0, 0.0, 10.0, 10.0))).is_none());
    assert_eq!(vp.transform(), manual);
}

#[test]
fn screen_to_scene_inverts_the_transform() {
    let mut vp = viewport();
    vp.zoom_to(2.0, LayoutPoint::new(100.0, 100.0));
    vp.pan(-30.0, 12.0);
    let scene = LayoutPoint::new(17.0, -4.5);
    let screen = vp.transform().apply(scene);
    let back = vp.screen_to_scene(screen);
    assert!((back.x - scene.x).abs() < 1e-9);
    assert!((back.y - scene.y).abs() < 1e-9);
}

#[test]
fn config_overrides_change_the_zoom_range() {
    let cfg = StemmaConfig::with_overrides(&serde_json::json!({
        "viewport": { "minScale": 0.5, "maxScale": 8.0 }
    }));
    let mut vp = Viewport::from_config(&cfg).expect("valid range");
    assert_eq!(vp.scale_range(), (0.5, 8.0));
    let bounds = Bounds::from_rect(0.0, 0.0, 106.25, 68.75);
    assert_eq!(vp.auto_fit(Some(bounds)).map(|t| t.k), Some(8.0));
}
