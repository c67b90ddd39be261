//! Session lifecycle and interaction handlers.

use crate::source::DocumentSource;
use crate::{Result, ViewerError};
use std::sync::Arc;
use std::time::Duration;
use stemma_core::{Hierarchy, NodeId, NodeKey, StemmaConfig, StyleResolver, ToggleOutcome};
use stemma_render::{
    Animator, DeterministicTextMeasurer, LayoutOptions, LayoutPoint, RenderDiffer, RenderTarget,
    TextMeasurer, ViewTransform, Viewport, layout_tree,
};

/// Wheel delta (in pixels) that doubles or halves the scale.
const WHEEL_PIXELS_PER_OCTAVE: f64 = 500.0;

/// Everything the viewer needs from its host before a document is loaded.
pub struct Mount<T> {
    pub target: Option<T>,
    pub measurer: Option<Arc<dyn TextMeasurer>>,
    pub config: StemmaConfig,
}

impl<T> Mount<T> {
    pub fn new(target: T) -> Self {
        Self {
            target: Some(target),
            measurer: Some(Arc::new(DeterministicTextMeasurer::default())),
            config: StemmaConfig::default(),
        }
    }

    /// A mount whose render target could not be found.
    pub fn detached() -> Self {
        Self {
            target: None,
            measurer: Some(Arc::new(DeterministicTextMeasurer::default())),
            config: StemmaConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StemmaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_measurer(mut self, measurer: Option<Arc<dyn TextMeasurer>>) -> Self {
        self.measurer = measurer;
        self
    }
}

/// Result of [`start`]: the status surface plus the running viewer, if any.
pub struct App<T> {
    status: String,
    viewer: Option<Viewer<T>>,
}

impl<T> App<T> {
    /// Empty on success, otherwise the error message.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn viewer(&self) -> Option<&Viewer<T>> {
        self.viewer.as_ref()
    }

    pub fn viewer_mut(&mut self) -> Option<&mut Viewer<T>> {
        self.viewer.as_mut()
    }
}

/// Top-level initialization. Never fails: errors are logged and reported through
/// [`App::status`], and no viewer is created.
pub async fn start<T, S>(mount: Mount<T>, source: &S) -> App<T>
where
    T: RenderTarget,
    S: DocumentSource,
{
    match try_start(mount, source).await {
        Ok(viewer) => App {
            status: String::new(),
            viewer: Some(viewer),
        },
        Err(err) => {
            tracing::error!(error = %err, "viewer initialization failed");
            App {
                status: err.to_string(),
                viewer: None,
            }
        }
    }
}

pub async fn try_start<T, S>(mount: Mount<T>, source: &S) -> Result<Viewer<T>>
where
    T: RenderTarget,
    S: DocumentSource,
{
    let Mount {
        target,
        measurer,
        config,
    } = mount;
    let target = target.ok_or(ViewerError::MissingRenderTarget)?;
    let measurer = measurer.ok_or_else(|| ViewerError::MissingDependency {
        name: "text measurer".to_string(),
    })?;
    let viewport = Viewport::from_config(&config)?;
    let policy = config.expansion().map_err(stemma_render::Error::from)?;

    let text = source.load().await?;
    let mut hierarchy = Hierarchy::from_json_str(&text)?;
    hierarchy.apply_expansion_policy(&policy);
    tracing::debug!(nodes = hierarchy.len(), "document loaded");

    let mut viewer = Viewer {
        hierarchy,
        differ: RenderDiffer::new(),
        animator: Animator::new(config.transition_duration()),
        viewport,
        styles: StyleResolver::new(config.palette()),
        options: LayoutOptions::from_config(&config, measurer),
        target,
        config,
    };
    viewer.first_render();
    Ok(viewer)
}

pub struct Viewer<T> {
    hierarchy: Hierarchy,
    differ: RenderDiffer,
    animator: Animator,
    viewport: Viewport,
    styles: StyleResolver,
    options: LayoutOptions,
    target: T,
    config: StemmaConfig,
}

impl<T: RenderTarget> Viewer<T> {
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &StemmaConfig {
        &self.config
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Renders without animation and fits the viewport to the settled scene.
    fn first_render(&mut self) {
        let root = self.hierarchy.root();
        layout_tree(&mut self.hierarchy, &self.options.spacing);
        let plan = self.differ.reconcile(
            &mut self.hierarchy,
            root,
            self.options.visuals(&self.styles),
        );
        self.animator.apply_immediately(&plan, &mut self.target);
        self.viewport.auto_fit(self.target.content_bounds());
        self.target.apply_transform(self.viewport.transform());
    }

    /// Toggles `id` and starts the transition at `now`.
    pub fn toggle_node(&mut self, id: NodeId, now: Duration) -> Result<ToggleOutcome> {
        self.hierarchy
            .try_node(id)
            .map_err(stemma_render::Error::from)?;
        let outcome = self.hierarchy.toggle(id);
        if outcome == ToggleOutcome::Unchanged {
            return Ok(outcome);
        }

        layout_tree(&mut self.hierarchy, &self.options.spacing);
        let plan = self.differ.reconcile(
            &mut self.hierarchy,
            id,
            self.options.visuals(&self.styles),
        );
        self.animator.begin(&plan, now);
        self.animator.frame(now, &mut self.target);
        Ok(outcome)
    }

    pub fn toggle_key(&mut self, key: NodeKey, now: Duration) -> Result<ToggleOutcome> {
        let id = self
            .hierarchy
            .find_by_key(key)
            .ok_or(stemma_render::Error::UnknownNodeKey { key })?;
        self.toggle_node(id, now)
    }

    /// Pointer click in screen coordinates. Toggles the visible node under the pointer, if any.
    pub fn click(&mut self, screen: LayoutPoint, now: Duration) -> Result<Option<ToggleOutcome>> {
        let scene = self.viewport.screen_to_scene(screen);
        let Some(key) = self.animator.hit_test(scene).map(|n| n.key) else {
            return Ok(None);
        };
        let Some(id) = self.hierarchy.find_by_key(key) else {
            return Ok(None);
        };
        if !self.hierarchy.is_visible(id) {
            return Ok(None);
        }
        self.toggle_node(id, now).map(Some)
    }

    /// Pans by a screen-space delta.
    pub fn drag(&mut self, dx: f64, dy: f64) -> ViewTransform {
        let t = self.viewport.pan(dx, dy);
        self.target.apply_transform(t);
        t
    }

    /// Zooms around `anchor`; positive `delta_y` zooms out.
    pub fn wheel(&mut self, delta_y: f64, anchor: LayoutPoint) -> ViewTransform {
        let factor = 2f64.powf(-delta_y / WHEEL_PIXELS_PER_OCTAVE);
        let t = self.viewport.zoom_by(factor, anchor);
        self.target.apply_transform(t);
        t
    }

    /// Advances transitions to `now`. Returns `true` while more frames are needed.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.animator.frame(now, &mut self.target)
    }

    pub fn finish_transitions(&mut self) {
        self.animator.finish(&mut self.target);
    }
}
