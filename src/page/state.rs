use crate::dom::{NodeId, PageTree};
use crate::nav::{CommentNavigator, IgnoreUndo, LISTING_TABLE_ID, ListingNavigator};
use crate::page::config::{NavConfig, ViewKind};
use crate::store::Store;
use serde_json::{Value, json};
use std::time::Instant;

/// Class of the container holding the comment tree
pub const COMMENT_AREA_CLASS: &str = "nestedlisting";

/// The navigator active on a page
pub enum PageView {
    Listing(ListingNavigator),
    Comments(CommentNavigator),
    /// Neither a listing nor a comment page; every command is a no-op
    Inert,
}

impl PageView {
    /// Pick the navigator for `tree`: comment pages win over listings
    pub fn detect(tree: &PageTree, config: &NavConfig) -> Self {
        if let Some(area) = tree.find_first_by_class(tree.root(), COMMENT_AREA_CLASS) {
            log::debug!("comment page detected");
            return PageView::Comments(CommentNavigator::new(config).with_scope(area));
        }
        if tree.find_by_id(LISTING_TABLE_ID).is_some() {
            log::debug!("listing page detected");
            return PageView::Listing(ListingNavigator::new(config));
        }
        log::debug!("no navigable content on page");
        PageView::Inert
    }

    pub fn kind(&self) -> Option<ViewKind> {
        match self {
            PageView::Listing(_) => Some(ViewKind::Listing),
            PageView::Comments(_) => Some(ViewKind::Comments),
            PageView::Inert => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageView::Listing(_) => "listing",
            PageView::Comments(_) => "comments",
            PageView::Inert => "inert",
        }
    }
}

/// Everything a command can touch
pub struct PageState {
    pub tree: PageTree,
    pub view: PageView,
    pub store: Store,
    pub config: NavConfig,

    /// Last ignore, restorable until it expires
    pub pending_undo: Option<IgnoreUndo>,
}

impl PageState {
    /// Detect the view and place the cursor on the first node
    pub fn new(mut tree: PageTree, store: Store, config: NavConfig) -> Self {
        let mut view = PageView::detect(&tree, &config);
        match &mut view {
            PageView::Listing(nav) => {
                nav.refresh(&mut tree, &store);
                nav.move_first(&mut tree);
            }
            PageView::Comments(nav) => {
                nav.initialize(&mut tree);
            }
            PageView::Inert => {}
        }
        Self { tree, view, store, config, pending_undo: None }
    }

    /// Selected element, if any
    pub fn selected(&self) -> Option<NodeId> {
        match &self.view {
            PageView::Listing(nav) => nav.current(),
            PageView::Comments(nav) => nav.current(&self.tree),
            PageView::Inert => None,
        }
    }

    /// `id` attribute of the selected element
    pub fn selected_id(&self) -> Option<String> {
        self.selected()
            .and_then(|node| self.tree.get(node))
            .and_then(|element| element.id().cloned())
    }

    /// Selection summary returned by commands
    pub fn describe_selection(&self) -> Value {
        let mut summary = json!({
            "view": self.view.name(),
            "selected": self.selected_id(),
        });
        if let PageView::Listing(nav) = &self.view {
            summary["position"] = json!(nav.pos());
            summary["total"] = json!(nav.total());
        }
        summary
    }

    /// Drop an expired undo token and write counters that are due
    pub fn tick(&mut self, now: Instant) {
        if self.pending_undo.as_ref().is_some_and(|undo| undo.is_expired(now)) {
            if let Some(undo) = self.pending_undo.take() {
                log::debug!("undo window for r/{} closed", undo.subreddit);
                undo.discard(&mut self.tree);
            }
        }
        if let Err(e) = self.store.poll_at(now) {
            log::error!("failed to write counters: {}", e);
        }
    }
}
