//! # link-nav
//!
//! Keyboard navigation for link-aggregator pages: a cursor over post listings and over
//! collapsible comment trees, subreddit filtering backed by a persisted store, and usage
//! counters written in batches.
//!
//! ## Features
//!
//! - **Comment navigation**: walk the visible comment outline with down/up/first/last,
//!   collapse and expand comments, locate the comment under a click
//! - **Listing navigation**: ordinal cursor over post rows that stays in place when rows go away
//! - **Filtering**: hide posts, ignore whole subreddits (with undo), drop ignored rows on load
//! - **Store**: ignored subreddits and counters behind a JSON message protocol
//!
//! ## Usage
//!
//! ```rust,no_run
//! use link_nav::{NavConfig, PageSession, PageTree, Store};
//! use link_nav::dom::Classifier;
//!
//! # fn main() -> link_nav::Result<()> {
//! let json = std::fs::read_to_string("page.json")?;
//! let tree = PageTree::from_json(&json, Classifier::default())?;
//! let mut session = PageSession::open(tree, Store::in_memory(), NavConfig::default())?;
//!
//! // Keys are resolved through the configured bindings
//! session.handle_key("j")?;
//! session.handle_key("x")?;
//! println!("selected: {:?}", session.selected_id());
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Command System
//!
//! ```rust,no_run
//! # use link_nav::{NavConfig, PageSession, PageTree, Store, ElementNode};
//! # fn main() -> link_nav::Result<()> {
//! # let tree = PageTree::new(ElementNode::new("body"));
//! # let mut session = PageSession::open(tree, Store::in_memory(), NavConfig::default())?;
//! use serde_json::json;
//!
//! session.execute("move_last", json!({}))?;
//! session.execute("locate", json!({"id": "thing_t1_abc"}))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: page tree, element tagging and the outline queries
//! - [`nav`]: cursors, navigators and selection rendering
//! - [`commands`]: named commands with typed parameters
//! - [`page`]: page sessions and configuration
//! - [`store`]: ignored subreddits, counters and the message protocol
//! - [`error`]: error types and result aliases

pub mod commands;
pub mod dom;
pub mod error;
pub mod nav;
pub mod page;
pub mod store;

pub use commands::{Command, CommandContext, CommandRegistry, CommandResult};
pub use dom::{ElementNode, NodeId, Outline, OutlineSource, PageTree};
pub use error::{NavError, Result};
pub use nav::{CommentNavigator, Cursor, ListingNavigator, SelectionRenderer};
pub use page::{CollapsedDescent, NavConfig, PageSession};
pub use store::{JsonFileBackend, Request, Response, Store};
