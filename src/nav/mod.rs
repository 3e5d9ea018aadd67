//! Keyboard navigation
//!
//! - CommentNavigator: walks the visible comment outline
//! - ListingNavigator: ordinal cursor over post rows, with hide and ignore
//! - SelectionRenderer: marks the selected node on the page

pub mod comments;
pub mod cursor;
pub mod listing;
pub mod render;

pub use comments::CommentNavigator;
pub use cursor::Cursor;
pub use listing::{IgnoreUndo, LISTING_TABLE_ID, ListingNavigator};
pub use render::{Highlight, SelectionRenderer, StyleRenderer};
