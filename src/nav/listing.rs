//! Ordinal cursor over the rows of a post listing.
//!
//! The navigator keeps a snapshot of the row handles. Any structural change (hide, ignore,
//! external removal) is followed by a fresh snapshot, after which the cursor returns to the
//! same row when it survived, else to the same index clamped to the new length.

use crate::dom::{NodeId, PageTree};
use crate::error::Result;
use crate::nav::render::{SelectionRenderer, StyleRenderer};
use crate::page::config::NavConfig;
use crate::store::Store;
use std::time::{Duration, Instant};

/// Id of the element holding the listing rows
pub const LISTING_TABLE_ID: &str = "siteTable";

/// A subreddit ignore that can still be reverted
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreUndo {
    /// The detached row, kept alive until the undo is applied or discarded
    pub row: NodeId,
    pub parent: NodeId,
    pub next_sibling: Option<NodeId>,
    pub subreddit: String,
    pub expires_at: Instant,
}

impl IgnoreUndo {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Give up on the undo and free the detached row
    pub fn discard(self, tree: &mut PageTree) {
        if tree.contains(self.row) && !tree.is_attached(self.row) {
            if let Err(e) = tree.remove(self.row) {
                log::debug!("could not free ignored row: {}", e);
            }
        }
    }
}

/// Navigator for the rows of `#siteTable`
pub struct ListingNavigator<R: SelectionRenderer = StyleRenderer> {
    rows: Vec<NodeId>,
    pos: usize,

    /// Row currently carrying the highlight
    marked: Option<NodeId>,

    renderer: R,
    undo_timeout: Duration,
}

impl ListingNavigator<StyleRenderer> {
    pub fn new(config: &NavConfig) -> Self {
        Self::with_renderer(config, StyleRenderer::new(config.listing_highlight.clone()))
    }
}

impl<R: SelectionRenderer> ListingNavigator<R> {
    pub fn with_renderer(config: &NavConfig, renderer: R) -> Self {
        Self {
            rows: Vec::new(),
            pos: 0,
            marked: None,
            renderer,
            undo_timeout: config.undo_timeout_duration(),
        }
    }

    /// Row handles of the last snapshot
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    /// Highlighted row
    pub fn current(&self) -> Option<NodeId> {
        self.marked
    }

    /// Re-read the rows: node children of the listing table, in order
    pub fn snapshot(&mut self, tree: &PageTree) {
        self.rows = match tree.find_by_id(LISTING_TABLE_ID) {
            Some(table) => tree
                .children(table)
                .iter()
                .copied()
                .filter(|&row| tree.get(row).is_some_and(|e| e.is_node))
                .collect(),
            None => Vec::new(),
        };
        log::debug!("listing snapshot: {} rows", self.rows.len());
    }

    /// Drop the rows of ignored subreddits from the page, then snapshot.
    ///
    /// Returns the number of rows removed.
    pub fn refresh(&mut self, tree: &mut PageTree, store: &Store) -> usize {
        self.snapshot(tree);

        let ignored: Vec<NodeId> = self
            .rows
            .iter()
            .copied()
            .filter(|&row| {
                tree.get(row)
                    .and_then(|e| e.data("subreddit"))
                    .is_some_and(|sub| store.is_ignored(sub))
            })
            .collect();

        for &row in &ignored {
            if self.marked == Some(row) {
                self.marked = None;
            }
            if let Err(e) = tree.remove(row) {
                log::warn!("could not remove ignored row: {}", e);
            }
        }
        if !ignored.is_empty() {
            log::info!("removed {} rows of ignored subreddits", ignored.len());
            self.snapshot(tree);
        }
        ignored.len()
    }

    /// Highlight the row at `index`; out of range is a no-op
    pub fn move_to(&mut self, tree: &mut PageTree, index: usize) -> bool {
        let Some(&row) = self.rows.get(index) else {
            return false;
        };
        self.pos = index;
        if self.marked == Some(row) {
            return false;
        }

        if let Some(previous) = self.marked.take() {
            if tree.contains(previous) {
                self.renderer.unmark(tree, previous);
            }
        }
        self.renderer.mark(tree, row);
        self.marked = Some(row);
        true
    }

    pub fn move_first(&mut self, tree: &mut PageTree) -> bool {
        self.move_to(tree, 0)
    }

    pub fn move_last(&mut self, tree: &mut PageTree) -> bool {
        match self.rows.len().checked_sub(1) {
            Some(last) => self.move_to(tree, last),
            None => false,
        }
    }

    pub fn move_down(&mut self, tree: &mut PageTree) -> bool {
        self.move_to(tree, self.pos + 1)
    }

    pub fn move_up(&mut self, tree: &mut PageTree) -> bool {
        match self.pos.checked_sub(1) {
            Some(previous) => self.move_to(tree, previous),
            None => false,
        }
    }

    /// Highlight the row containing `element`
    pub fn locate(&mut self, tree: &mut PageTree, element: NodeId) -> bool {
        let Some(row) = tree.closest(element, |e| e.is_node) else {
            return false;
        };
        match self.rows.iter().position(|&r| r == row) {
            Some(index) => self.move_to(tree, index),
            None => false,
        }
    }

    fn current_row(&self, tree: &PageTree) -> Option<NodeId> {
        self.rows.get(self.pos).copied().filter(|&row| tree.is_attached(row))
    }

    /// Activate the hide control of the current row; on success count the hide under the
    /// row's subreddit, remove the row and keep the cursor at the same index
    pub fn hide_current(&mut self, tree: &mut PageTree, store: &mut Store, now: Instant) -> bool {
        let Some(row) = self.current_row(tree) else {
            return false;
        };
        let control = tree.descendants(row).into_iter().find(|&element| {
            tree.get(element)
                .is_some_and(|e| e.data("event-action") == Some("hide"))
        });
        let Some(control) = control else {
            log::warn!("row {:?} has no hide control", row);
            return false;
        };
        if !tree.activate(control) {
            log::warn!("hide on row {:?} was suppressed", row);
            return false;
        }

        if let Some(subreddit) = tree.get(row).and_then(|e| e.data("subreddit")).map(str::to_string) {
            if let Err(e) = store.increment_counter_at(&subreddit, 1, now) {
                log::error!("failed to count hide for {}: {}", subreddit, e);
            }
        }

        if let Err(e) = tree.remove(row) {
            log::warn!("could not remove hidden row: {}", e);
        }
        self.resync(tree, store);
        true
    }

    /// Ignore the subreddit of the current row: persist it, count it, take the row off the
    /// page. The returned token restores the row until it expires.
    pub fn ignore_current(&mut self, tree: &mut PageTree, store: &mut Store, now: Instant) -> Option<IgnoreUndo> {
        let row = self.current_row(tree)?;
        let subreddit = tree.get(row)?.data("subreddit")?.to_string();
        let parent = tree.parent(row)?;
        let next_sibling = tree.next_sibling(row);

        if let Err(e) = store.add_ignored(&subreddit) {
            log::error!("failed to ignore {}: {}", subreddit, e);
            return None;
        }
        if let Err(e) = store.increment_counter_at(&subreddit, 1, now) {
            log::error!("failed to count ignore for {}: {}", subreddit, e);
        }

        self.renderer.unmark(tree, row);
        self.marked = None;
        if let Err(e) = tree.detach(row) {
            log::warn!("could not detach ignored row: {}", e);
        }
        self.resync(tree, store);
        log::info!("ignored r/{}", subreddit);

        Some(IgnoreUndo { row, parent, next_sibling, subreddit, expires_at: now + self.undo_timeout })
    }

    /// Revert an ignore: put the row where it was, un-ignore the subreddit and take back its
    /// count. An expired token is discarded and `false` returned. When the row cannot be put
    /// back the token is discarded and the subreddit stays ignored.
    pub fn undo_ignore(
        &mut self,
        tree: &mut PageTree,
        store: &mut Store,
        undo: IgnoreUndo,
        now: Instant,
    ) -> Result<bool> {
        if undo.is_expired(now) {
            log::debug!("undo for r/{} expired", undo.subreddit);
            undo.discard(tree);
            return Ok(false);
        }

        if let Err(e) = tree.insert_before(undo.parent, undo.row, undo.next_sibling) {
            log::warn!("could not put back the row of r/{}: {}", undo.subreddit, e);
            undo.discard(tree);
            return Err(e);
        }

        // While the name stays ignored, the resync below takes the row off again.
        if let Err(e) = store.remove_ignored(&undo.subreddit) {
            self.resync(tree, store);
            return Err(e);
        }
        store.increment_counter_at(&undo.subreddit, -1, now)?;
        store.flush_pending()?;

        self.resync(tree, store);
        log::info!("restored r/{}", undo.subreddit);
        Ok(true)
    }

    /// Re-snapshot after the rows changed under the cursor
    pub fn resync(&mut self, tree: &mut PageTree, store: &Store) {
        let kept = self.marked.filter(|&row| tree.is_attached(row));
        if kept.is_none() {
            self.marked = None;
        }
        self.refresh(tree, store);

        let index = kept
            .and_then(|row| self.rows.iter().position(|&r| r == row))
            .unwrap_or_else(|| self.pos.min(self.rows.len().saturating_sub(1)));
        self.pos = index;
        self.move_to(tree, index);
    }

    /// Mutation adapter: `removed` was taken out of the page by someone else
    pub fn on_removed(&mut self, tree: &mut PageTree, store: &Store, removed: NodeId) {
        if self.rows.contains(&removed) || self.marked == Some(removed) {
            log::debug!("listing row {:?} removed externally", removed);
        }
        self.resync(tree, store);
    }
}
