//! Persisted state: ignored subreddits and per-subreddit counters
//!
//! - Store: the document plus a buffer of counter increments written in batches
//! - Backend: where the document lives (memory or a JSON file)
//! - Request / Response: the action-tagged message protocol spoken by the options page
//! - StagedChanges: add/remove staging in front of `set_ignored_names`

pub mod backend;
pub mod import;
pub mod message;
pub mod staging;
pub mod stats;

pub use backend::{Backend, JsonFileBackend, MemoryBackend};
pub use import::{normalize_sub, parse_import};
pub use message::{Request, Response, StatEntry};
pub use staging::{Change, StagedChanges};
pub use stats::PendingStats;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

/// Default delay before buffered counter increments are written
pub const DEFAULT_FLUSH_WINDOW: Duration = Duration::from_millis(1500);

/// The persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreData {
    #[serde(default)]
    pub ignored: BTreeSet<String>,

    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
}

pub struct Store {
    backend: Box<dyn Backend>,
    data: StoreData,
    pending: PendingStats,
}

impl Store {
    /// Load the store from `backend`
    pub fn open(mut backend: impl Backend + 'static, flush_window: Duration) -> Result<Self> {
        let data = backend.load()?;
        log::info!(
            "store loaded: {} ignored, {} counters",
            data.ignored.len(),
            data.stats.len()
        );
        Ok(Self { backend: Box::new(backend), data, pending: PendingStats::new(flush_window) })
    }

    /// Empty store that lives in memory only
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            data: StoreData::default(),
            pending: PendingStats::new(DEFAULT_FLUSH_WINDOW),
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.backend.save(&self.data)
    }

    /// Ignored names, sorted
    pub fn ignored_names(&self) -> Vec<String> {
        self.data.ignored.iter().cloned().collect()
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.data.ignored.contains(name)
    }

    /// Replace the ignored list
    pub fn set_ignored_names<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data.ignored = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.is_empty())
            .collect();
        self.persist()
    }

    /// Add one name; returns whether it was new
    pub fn add_ignored(&mut self, name: &str) -> Result<bool> {
        if name.is_empty() || !self.data.ignored.insert(name.to_string()) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove one name; returns whether it was present
    pub fn remove_ignored(&mut self, name: &str) -> Result<bool> {
        if !self.data.ignored.remove(name) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Ignored names as a pretty JSON array
    pub fn export_ignored(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.ignored_names())?)
    }

    /// Replace the ignored list with the names found in `text` (see [`parse_import`])
    pub fn import_ignored(&mut self, text: &str) -> Result<usize> {
        let names = parse_import(text)?;
        let count = names.len();
        self.set_ignored_names(names)?;
        Ok(count)
    }

    /// Buffer a counter increment; empty names are ignored
    pub fn increment_counter(&mut self, name: &str, delta: i64) -> Result<()> {
        self.increment_counter_at(name, delta, Instant::now())
    }

    pub fn increment_counter_at(&mut self, name: &str, delta: i64, now: Instant) -> Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        self.pending.add(name, delta, now);
        self.poll_at(now)?;
        Ok(())
    }

    /// Write the buffered increments if their window has closed; returns whether it wrote
    pub fn poll_at(&mut self, now: Instant) -> Result<bool> {
        if !self.pending.is_due(now) {
            return Ok(false);
        }
        self.flush_pending()?;
        Ok(true)
    }

    /// Write the buffered increments now
    pub fn flush_pending(&mut self) -> Result<()> {
        let batch = self.pending.take();
        if batch.is_empty() {
            return Ok(());
        }
        for (name, delta) in &batch {
            *self.data.stats.entry(name.clone()).or_insert(0) += delta;
        }
        log::debug!("flushing {} counter updates", batch.len());
        self.persist()
    }

    /// The host is about to suspend: write everything that is buffered
    pub fn suspend(&mut self) -> Result<()> {
        log::debug!("suspend: flushing pending counters");
        self.flush_pending()
    }

    /// Increments not written yet
    pub fn pending(&self) -> &PendingStats {
        &self.pending
    }

    /// Persisted counters
    pub fn counters(&self) -> &BTreeMap<String, i64> {
        &self.data.stats
    }

    /// Persisted counters, highest first
    pub fn counters_by_count(&self) -> Vec<(String, i64)> {
        let mut counters: Vec<_> = self.data.stats.iter().map(|(n, c)| (n.clone(), *c)).collect();
        counters.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counters
    }

    pub fn reset_counters(&mut self) -> Result<()> {
        self.data.stats.clear();
        self.persist()
    }

    /// Drop one counter; returns whether it existed
    pub fn clear_counter(&mut self, name: &str) -> Result<bool> {
        if self.data.stats.remove(name).is_none() {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Err(e) = self.flush_pending() {
            log::error!("failed to flush pending counters: {}", e);
        }
    }
}
