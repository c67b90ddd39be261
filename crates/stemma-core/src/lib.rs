#![forbid(unsafe_code)]

//! Genealogy model layer (headless).
//!
//! - [`document`]: shape checks for the nested JSON document
//! - [`hierarchy`]: the node arena with parent links and lazily assigned render keys
//! - [`collapse`]: the per-node expand/collapse state machine
//! - [`style`]: branch-key inheritance and the stroke style contract
//! - [`config`]: value-backed configuration with defaults

pub mod collapse;
pub mod config;
pub mod document;
pub mod error;
pub mod flags;
pub mod hierarchy;
pub mod style;

pub use collapse::ToggleOutcome;
pub use config::{DEFAULT_BRANCH, ExpansionMode, ExpansionPolicy, Palette, StemmaConfig};
pub use document::{DocumentNode, parse_document, parse_document_str};
pub use error::{Error, Result};
pub use flags::{Flag, FlagSet};
pub use hierarchy::{Hierarchy, NodeId, NodeKey, NodeLayout, TreeNode, Visibility};
pub use style::{EdgeStyle, NodeStyle, StyleResolver, has_flag, resolve_branch_key};

#[cfg(test)]
mod tests;
