//! Page model
//!
//! This module provides the element tree the navigators walk. It includes:
//! - ElementNode: serializable snapshot of one element, tagged once by a Classifier
//! - PageTree: live arena of elements with stable handles and structural mutation
//! - Outline: the node-level queries (first child, siblings, parent) over any OutlineSource

pub mod element;
pub mod outline;
pub mod tree;

pub use element::{Classifier, ElementNode};
pub use outline::{DEFAULT_MAX_WALK_STEPS, Outline, OutlineSource};
pub use tree::{NodeId, PageTree};

use crate::error::Result;

/// Load a page tree from a JSON snapshot file
pub fn load_page(path: impl AsRef<std::path::Path>, classifier: Classifier) -> Result<PageTree> {
    let json = std::fs::read_to_string(path)?;
    PageTree::from_json(&json, classifier)
}
