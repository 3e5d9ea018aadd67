use crate::dom::{Classifier, DEFAULT_MAX_WALK_STEPS};
use crate::error::{NavError, Result};
use crate::nav::Highlight;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What "move down" does on a collapsed comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapsedDescent {
    /// Collapsed comments hide their replies: go to the next sibling, or up and over
    #[default]
    Skip,
    /// Enter the replies of a collapsed comment anyway
    Enter,
}

/// Which navigator a key binding applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Listing,
    Comments,
}

/// Options for a page session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    /// Collapsed-comment descent policy
    pub collapsed_descent: CollapsedDescent,

    /// Upper bound on elements visited by one outline query
    pub max_walk_steps: usize,

    /// Class names used to tag elements
    pub classifier: Classifier,

    /// Marker applied to the selected comment
    pub comment_highlight: Highlight,

    /// Marker applied to the selected listing row
    pub listing_highlight: Highlight,

    /// Delay before buffered counter increments are written (milliseconds)
    pub flush_window_ms: u64,

    /// How long an ignored subreddit can be restored (milliseconds)
    pub undo_timeout_ms: u64,

    /// Key to command bindings on listing pages
    pub listing_keys: IndexMap<String, String>,

    /// Key to command bindings on comment pages
    pub comment_keys: IndexMap<String, String>,
}

fn bindings(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(key, command)| (key.to_string(), command.to_string()))
        .collect()
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            collapsed_descent: CollapsedDescent::Skip,
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            classifier: Classifier::default(),
            comment_highlight: Highlight::comment(),
            listing_highlight: Highlight::listing(),
            flush_window_ms: 1500,
            undo_timeout_ms: 5000,
            listing_keys: bindings(&[
                ("Home", "move_first"),
                ("End", "move_last"),
                ("j", "move_down"),
                ("k", "move_up"),
                ("h", "hide"),
                ("i", "ignore_subreddit"),
                ("u", "undo_ignore"),
            ]),
            comment_keys: bindings(&[
                ("Home", "move_first"),
                ("End", "move_last"),
                ("j", "move_down"),
                ("k", "move_up"),
                ("x", "toggle_collapse"),
            ]),
        }
    }
}

impl NavConfig {
    /// Create new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from a JSON file; missing fields keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| NavError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the navigators cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_walk_steps == 0 {
            return Err(NavError::Config("max_walk_steps must be positive".to_string()));
        }
        if self.classifier.node_classes.is_empty() {
            return Err(NavError::Config("classifier needs at least one node class".to_string()));
        }
        Ok(())
    }

    /// Set the collapsed-comment descent policy
    pub fn collapsed_descent(mut self, policy: CollapsedDescent) -> Self {
        self.collapsed_descent = policy;
        self
    }

    /// Set the outline walk bound
    pub fn max_walk_steps(mut self, steps: usize) -> Self {
        self.max_walk_steps = steps;
        self
    }

    /// Set the counter flush window
    pub fn flush_window(mut self, window: Duration) -> Self {
        self.flush_window_ms = window.as_millis() as u64;
        self
    }

    /// Set the undo window for ignored subreddits
    pub fn undo_timeout(mut self, timeout: Duration) -> Self {
        self.undo_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Bind a key to a command for one view
    pub fn bind(mut self, view: ViewKind, key: impl Into<String>, command: impl Into<String>) -> Self {
        self.keys_mut(view).insert(key.into(), command.into());
        self
    }

    pub fn flush_window_duration(&self) -> Duration {
        Duration::from_millis(self.flush_window_ms)
    }

    pub fn undo_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.undo_timeout_ms)
    }

    /// Command bound to `key` for `view`
    pub fn command_for(&self, view: ViewKind, key: &str) -> Option<&str> {
        self.keys(view).get(key).map(String::as_str)
    }

    fn keys(&self, view: ViewKind) -> &IndexMap<String, String> {
        match view {
            ViewKind::Listing => &self.listing_keys,
            ViewKind::Comments => &self.comment_keys,
        }
    }

    fn keys_mut(&mut self, view: ViewKind) -> &mut IndexMap<String, String> {
        match view {
            ViewKind::Listing => &mut self.listing_keys,
            ViewKind::Comments => &mut self.comment_keys,
        }
    }
}
