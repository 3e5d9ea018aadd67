//! Page sessions
//!
//! A [`PageSession`] owns the page tree, the navigator picked for it, the store and the
//! command registry, and turns key presses, clicks and external removals into navigator
//! operations.

pub mod config;
pub mod session;
pub mod state;

pub use config::{CollapsedDescent, NavConfig, ViewKind};
pub use session::PageSession;
pub use state::{COMMENT_AREA_CLASS, PageState, PageView};
