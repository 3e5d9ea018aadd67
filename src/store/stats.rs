use indexmap::IndexMap;
use std::time::{Duration, Instant};

/// Counter increments waiting to be written.
///
/// The first increment after a flush opens a window; increments arriving inside it are
/// merged, and the whole batch becomes due when the window closes.
#[derive(Debug, Clone)]
pub struct PendingStats {
    counts: IndexMap<String, i64>,
    window: Duration,
    deadline: Option<Instant>,
}

impl PendingStats {
    pub fn new(window: Duration) -> Self {
        Self { counts: IndexMap::new(), window, deadline: None }
    }

    /// Buffer `delta` for `name`
    pub fn add(&mut self, name: &str, delta: i64, now: Instant) {
        *self.counts.entry(name.to_string()).or_insert(0) += delta;
        if self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
    }

    /// Whether the batch should be written at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// When the current batch becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Drain the batch, closing the window
    pub fn take(&mut self) -> IndexMap<String, i64> {
        self.deadline = None;
        std::mem::take(&mut self.counts)
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.counts.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &i64)> {
        self.counts.iter()
    }
}
