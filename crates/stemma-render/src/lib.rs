#![forbid(unsafe_code)]
//! Headless rendering pipeline for stemma genealogy trees.
//!
//! A pass runs [`layout::layout_tree`] over the visible projection, reconciles the result with
//! [`diff::RenderDiffer`], and plays the resulting plan through a [`transition::Animator`] onto any
//! [`scene::RenderTarget`] (for example [`svg::SvgScene`]).

pub mod diff;
pub mod layout;
pub mod model;
pub mod scene;
pub mod svg;
pub mod text;
pub mod transition;
pub mod viewport;

pub use diff::{Change, Changes, RenderDiffer, RenderPlan, VisualBuilder};
pub use layout::{LayoutSpacing, layout_tree};
pub use model::{Bounds, LayoutPoint, PlacedEdge, PlacedNode, TreeLayout};
pub use scene::{EdgeKey, EdgeVisual, NodeVisual, RenderTarget};
pub use svg::SvgScene;
pub use text::{DeterministicTextMeasurer, NodeBoxMetrics, TextMeasurer, TextMetrics, TextStyle};
pub use transition::Animator;
pub use viewport::{ViewTransform, Viewport};

use std::sync::Arc;
use stemma_core::{StemmaConfig, StyleResolver};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no node is rendered under key {key}")]
    UnknownNodeKey { key: stemma_core::NodeKey },
    #[error("invalid viewport: {message}")]
    InvalidViewport { message: String },
    #[error(transparent)]
    Core(#[from] stemma_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Geometry and measurement settings shared by every render pass.
#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer>,
    pub spacing: LayoutSpacing,
    pub boxes: NodeBoxMetrics,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            spacing: LayoutSpacing::default(),
            boxes: NodeBoxMetrics::default(),
        }
    }
}

impl LayoutOptions {
    pub fn from_config(config: &StemmaConfig, text_measurer: Arc<dyn TextMeasurer>) -> Self {
        Self {
            text_measurer,
            spacing: LayoutSpacing::from_config(config),
            boxes: NodeBoxMetrics::from_config(config),
        }
    }

    pub fn visuals<'a>(&'a self, styles: &'a StyleResolver) -> VisualBuilder<'a> {
        VisualBuilder {
            styles,
            boxes: &self.boxes,
            measurer: self.text_measurer.as_ref(),
        }
    }
}
