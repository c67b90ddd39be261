#![forbid(unsafe_code)]

//! `stemma` runs an interactive, collapsible genealogy tree on top of any
//! [`RenderTarget`](stemma_render::RenderTarget).
//!
//! A session starts with [`start`], which loads the document, renders the first frame and fits
//! the viewport once. User input then flows through [`Viewer::click`], [`Viewer::drag`] and
//! [`Viewer::wheel`]; [`Viewer::tick`] advances running transitions.

pub mod error;
pub mod source;
pub mod viewer;

pub use error::{Result, ViewerError};
pub use source::{DocumentSource, FileSource, StaticSource};
pub use viewer::{App, Mount, Viewer, start, try_start};

pub use stemma_core::{Hierarchy, NodeId, NodeKey, StemmaConfig, ToggleOutcome};
pub use stemma_render::{
    DeterministicTextMeasurer, LayoutPoint, RenderTarget, SvgScene, TextMeasurer, TextMetrics,
    TextStyle, ViewTransform, Viewport,
};
