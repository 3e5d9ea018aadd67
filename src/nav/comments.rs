//! Cursor over a comment tree.
//!
//! "Down" walks the visible outline in document order: first reply, else next sibling, else
//! the next sibling of the closest ancestor that has one. "Up" goes to the previous sibling,
//! else to the parent. Neither ever fails; at the boundaries the cursor stays put.

use crate::dom::{NodeId, Outline, PageTree};
use crate::nav::cursor::Cursor;
use crate::nav::render::{SelectionRenderer, StyleRenderer};
use crate::page::config::{CollapsedDescent, NavConfig};

/// Navigator for the comment tree of a page
pub struct CommentNavigator<R: SelectionRenderer = StyleRenderer> {
    cursor: Cursor,

    /// Container the outline is rooted at; the whole page when unset
    scope: Option<NodeId>,

    renderer: R,
    descent: CollapsedDescent,
    max_walk_steps: usize,
}

impl CommentNavigator<StyleRenderer> {
    pub fn new(config: &NavConfig) -> Self {
        Self::with_renderer(config, StyleRenderer::new(config.comment_highlight.clone()))
    }
}

impl<R: SelectionRenderer> CommentNavigator<R> {
    pub fn with_renderer(config: &NavConfig, renderer: R) -> Self {
        Self {
            cursor: Cursor::Empty,
            scope: None,
            renderer,
            descent: config.collapsed_descent,
            max_walk_steps: config.max_walk_steps,
        }
    }

    /// Restrict navigation to the nodes below `scope`
    pub fn with_scope(mut self, scope: NodeId) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Selected node, if it is still part of the page
    pub fn current(&self, tree: &PageTree) -> Option<NodeId> {
        self.cursor.current().filter(|&node| tree.is_attached(node))
    }

    fn outline<'t>(&self, tree: &'t PageTree) -> Outline<'t, PageTree> {
        Outline::with_limit(tree, self.max_walk_steps)
    }

    fn in_scope(&self, tree: &PageTree, node: NodeId) -> bool {
        tree.is_attached(node) && self.scope.is_none_or(|scope| tree.is_within(node, scope))
    }

    /// Select the first node of the outline when nothing is selected yet
    pub fn initialize(&mut self, tree: &mut PageTree) -> Option<NodeId> {
        if let Some(current) = self.current(tree) {
            return Some(current);
        }
        let first = self.first(tree)?;
        self.select(tree, first);
        Some(first)
    }

    fn first(&self, tree: &PageTree) -> Option<NodeId> {
        let scope = self.scope.unwrap_or_else(|| tree.root());
        self.outline(tree).first_node(scope)
    }

    /// Make `node` the current node. Selecting the current node again changes nothing.
    pub fn select(&mut self, tree: &mut PageTree, node: NodeId) -> bool {
        if self.cursor.is_at(node) {
            return false;
        }
        if !self.in_scope(tree, node) {
            log::debug!("ignoring selection of {:?}: not in the outline", node);
            return false;
        }

        if let Some(previous) = self.cursor.current() {
            if tree.contains(previous) {
                self.renderer.unmark(tree, previous);
            }
        }
        self.cursor = Cursor::Positioned(node);
        self.renderer.mark(tree, node);
        true
    }

    /// Node "down" would move to from `from`
    pub fn next_visible(&self, tree: &PageTree, from: NodeId) -> Option<NodeId> {
        let outline = self.outline(tree);

        let child = match self.descent {
            CollapsedDescent::Skip => outline.first_visible_child(from),
            CollapsedDescent::Enter => outline.first_child_node(from),
        };
        child
            .or_else(|| outline.next_visible_sibling(from))
            .or_else(|| self.next_after_subtree(tree, from))
    }

    /// First node following the subtree of `node`: the next sibling of the closest ancestor
    /// that has one
    fn next_after_subtree(&self, tree: &PageTree, node: NodeId) -> Option<NodeId> {
        let outline = self.outline(tree);
        let mut current = node;
        for _ in 0..self.max_walk_steps {
            let parent = outline.parent(current)?;
            if !self.in_scope(tree, parent) {
                return None;
            }
            if let Some(sibling) = outline.next_visible_sibling(parent) {
                return Some(sibling);
            }
            current = parent;
        }
        log::warn!("ascent from {:?} exceeded {} steps", node, self.max_walk_steps);
        None
    }

    /// Node "up" would move to from `from`
    pub fn previous_visible(&self, tree: &PageTree, from: NodeId) -> Option<NodeId> {
        let outline = self.outline(tree);
        outline
            .previous_visible_sibling(from)
            .or_else(|| outline.parent(from))
            .filter(|&node| self.in_scope(tree, node))
    }

    pub fn move_down(&mut self, tree: &mut PageTree) -> bool {
        let Some(current) = self.current(tree) else {
            return false;
        };
        match self.next_visible(tree, current) {
            Some(next) => self.select(tree, next),
            None => {
                log::debug!("already at the last visible comment");
                false
            }
        }
    }

    pub fn move_up(&mut self, tree: &mut PageTree) -> bool {
        let Some(current) = self.current(tree) else {
            return false;
        };
        match self.previous_visible(tree, current) {
            Some(previous) => self.select(tree, previous),
            None => {
                log::debug!("already at the first comment");
                false
            }
        }
    }

    pub fn move_first(&mut self, tree: &mut PageTree) -> bool {
        match self.first(tree) {
            Some(first) => self.select(tree, first),
            None => false,
        }
    }

    /// Select the last visible node: the last top-level node, then its last visible reply,
    /// repeatedly
    pub fn move_last(&mut self, tree: &mut PageTree) -> bool {
        let Some(mut last) = self.first(tree) else {
            return false;
        };
        let outline = self.outline(tree);
        let mut steps = 0;
        loop {
            while let Some(next) = outline.next_visible_sibling(last) {
                last = next;
                steps += 1;
            }
            let child = match self.descent {
                CollapsedDescent::Skip => outline.first_visible_child(last),
                CollapsedDescent::Enter => outline.first_child_node(last),
            };
            match child {
                Some(child) if steps < self.max_walk_steps => {
                    last = child;
                    steps += 1;
                }
                _ => break,
            }
        }
        self.select(tree, last)
    }

    /// Flip the collapse state of the current node through its expand control.
    ///
    /// The cursor never moves. Returns `false` when there is no current node, the control is
    /// missing or the activation was suppressed.
    pub fn toggle_collapse(&mut self, tree: &mut PageTree) -> bool {
        let Some(current) = self.current(tree) else {
            return false;
        };
        let control = {
            let outline = self.outline(tree);
            tree.descendants(current).into_iter().find(|&element| {
                tree.get(element).is_some_and(|e| e.has_class("expand"))
                    && outline.closest_node(element) == Some(current)
            })
        };
        let Some(control) = control else {
            log::warn!("comment {:?} has no collapse control", current);
            return false;
        };
        if !tree.activate(control) {
            log::warn!("collapse toggle on {:?} was suppressed", current);
            return false;
        }
        true
    }

    /// Select the node containing `element` (e.g. the target of a click)
    pub fn locate(&mut self, tree: &mut PageTree, element: NodeId) -> bool {
        if !tree.is_attached(element) {
            return false;
        }
        match self.outline(tree).closest_node(element) {
            Some(node) if self.in_scope(tree, node) => self.select(tree, node),
            _ => false,
        }
    }

    /// Keep the cursor valid before `removed` is taken out of the page.
    ///
    /// When the current node lies in the removed subtree the cursor moves to the nearest
    /// following visible node, else to the previous one, else it is cleared.
    pub fn before_remove(&mut self, tree: &mut PageTree, removed: NodeId) {
        let Some(current) = self.cursor.current() else {
            return;
        };
        if !tree.contains(current) || !tree.is_within(current, removed) {
            return;
        }

        let outline = self.outline(tree);
        let replacement = outline
            .next_visible_sibling(removed)
            .or_else(|| self.next_after_subtree(tree, removed))
            .or_else(|| self.previous_visible(tree, removed))
            .filter(|&node| !tree.is_within(node, removed));

        match replacement {
            Some(node) => {
                self.select(tree, node);
            }
            None => {
                self.renderer.unmark(tree, current);
                self.cursor = Cursor::Empty;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;
    use crate::nav::render::recording::{Event, RecordingRenderer};

    fn comment(id: &str, replies: Vec<ElementNode>) -> ElementNode {
        let mut listing = ElementNode::new("div").with_class("sitetable listing");
        for reply in replies {
            listing.add_child(reply);
            listing.add_child(ElementNode::new("div").with_class("clearleft"));
        }
        ElementNode::new("div")
            .with_attribute("id", id)
            .with_class("thing comment")
            .with_children(vec![
                ElementNode::new("p").with_class("tagline").with_children(vec![
                    ElementNode::new("a").with_class("expand").with_text("[–]"),
                ]),
                ElementNode::new("div").with_class("entry").with_text(id),
                ElementNode::new("div").with_class("child").with_children(vec![listing]),
            ])
    }

    /// `Top1[Reply1a[Reply2a], Reply1b]`, `Top2[]`
    fn sample_tree() -> PageTree {
        PageTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_attribute("id", "siteTable").with_children(vec![
                ElementNode::new("div").with_attribute("id", "post").with_class("thing link"),
            ]),
            ElementNode::new("div").with_class("sitetable nestedlisting").with_children(vec![
                comment(
                    "top1",
                    vec![comment("reply1a", vec![comment("reply2a", vec![])]), comment("reply1b", vec![])],
                ),
                ElementNode::new("div").with_class("clearleft"),
                comment("top2", vec![]),
            ]),
        ]))
    }

    fn id(tree: &PageTree, name: &str) -> NodeId {
        tree.find_by_id(name).unwrap()
    }

    fn navigator(tree: &PageTree, config: &NavConfig) -> CommentNavigator<RecordingRenderer> {
        let scope = tree.find_first_by_class(tree.root(), "nestedlisting").unwrap();
        CommentNavigator::with_renderer(config, RecordingRenderer::default()).with_scope(scope)
    }

    #[test]
    fn test_initialize_selects_first_comment() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());

        assert!(nav.cursor().is_empty());
        assert_eq!(nav.initialize(&mut tree), Some(id(&tree, "top1")));
        assert_eq!(nav.cursor(), Cursor::Positioned(id(&tree, "top1")));
        assert_eq!(nav.initialize(&mut tree), Some(id(&tree, "top1")));
    }

    #[test]
    fn test_initialize_on_empty_outline() {
        let mut tree = PageTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_class("nestedlisting"),
        ]));
        let mut nav = navigator(&tree, &NavConfig::default());

        assert_eq!(nav.initialize(&mut tree), None);
        assert!(nav.cursor().is_empty());
        assert!(!nav.move_down(&mut tree));
        assert!(!nav.move_up(&mut tree));
        assert!(!nav.toggle_collapse(&mut tree));
    }

    #[test]
    fn test_move_down_walks_outline() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        nav.initialize(&mut tree);

        let expected = ["reply1a", "reply2a", "reply1b", "top2"];
        for name in expected {
            assert!(nav.move_down(&mut tree));
            assert_eq!(nav.cursor().current(), Some(id(&tree, name)));
        }

        assert!(!nav.move_down(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));
    }

    #[test]
    fn test_move_up_prefers_sibling_then_parent() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let top2 = id(&tree, "top2");
        nav.select(&mut tree, top2);

        assert!(nav.move_up(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top1")));
        assert!(!nav.move_up(&mut tree));

        let reply1b = id(&tree, "reply1b");
        nav.select(&mut tree, reply1b);
        assert!(nav.move_up(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1a")));
        assert!(nav.move_up(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top1")));

        let reply2a = id(&tree, "reply2a");
        nav.select(&mut tree, reply2a);
        assert!(nav.move_up(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1a")));
    }

    #[test]
    fn test_down_then_up_round_trip() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());

        // Holds wherever down moved into a first reply.
        for start in ["top1", "reply1a"] {
            let start = id(&tree, start);
            nav.select(&mut tree, start);
            assert!(nav.move_down(&mut tree));
            assert!(nav.move_up(&mut tree));
            assert_eq!(nav.cursor().current(), Some(start));
        }

        // Up from Reply1b prefers its sibling Reply1a over Reply2a.
        let reply2a = id(&tree, "reply2a");
        nav.select(&mut tree, reply2a);
        nav.move_down(&mut tree);
        nav.move_up(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1a")));

        // After an ascent, up lands on the previous sibling, not the start.
        let reply1b = id(&tree, "reply1b");
        nav.select(&mut tree, reply1b);
        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));
        nav.move_up(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top1")));
    }

    #[test]
    fn test_collapsed_comment_is_skipped_over() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let top1 = id(&tree, "top1");
        tree.set_collapsed(id(&tree, "reply1a"), true);
        nav.select(&mut tree, top1);

        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1a")));
        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1b")));

        tree.set_collapsed(top1, true);
        nav.select(&mut tree, top1);
        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));
    }

    #[test]
    fn test_enter_policy_descends_into_collapsed() {
        let mut tree = sample_tree();
        let config = NavConfig::default().collapsed_descent(CollapsedDescent::Enter);
        let mut nav = navigator(&tree, &config);
        let top1 = id(&tree, "top1");
        tree.set_collapsed(top1, true);
        nav.select(&mut tree, top1);

        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1a")));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut tree = sample_tree();
        let renderer = RecordingRenderer::default();
        let scope = tree.find_first_by_class(tree.root(), "nestedlisting").unwrap();
        let mut nav = CommentNavigator::with_renderer(&NavConfig::default(), renderer.clone()).with_scope(scope);
        let top1 = id(&tree, "top1");
        let top2 = id(&tree, "top2");

        assert!(nav.select(&mut tree, top1));
        assert!(!nav.select(&mut tree, top1));
        assert_eq!(renderer.take(), vec![Event::Mark(top1)]);

        assert!(nav.select(&mut tree, top2));
        assert_eq!(renderer.take(), vec![Event::Unmark(top1), Event::Mark(top2)]);
    }

    #[test]
    fn test_style_renderer_moves_highlight() {
        let mut tree = sample_tree();
        let scope = tree.find_first_by_class(tree.root(), "nestedlisting").unwrap();
        let mut nav = CommentNavigator::new(&NavConfig::default()).with_scope(scope);
        nav.initialize(&mut tree);
        nav.move_down(&mut tree);

        let top1 = tree.get(id(&tree, "top1")).unwrap();
        let reply1a = tree.get(id(&tree, "reply1a")).unwrap();
        assert_eq!(top1.style_property("border-left"), Some("unset".to_string()));
        assert_eq!(reply1a.style_property("border-left"), Some("3px solid yellow".to_string()));
    }

    #[test]
    fn test_toggle_collapse_keeps_cursor() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let top1 = id(&tree, "top1");
        nav.select(&mut tree, top1);

        assert!(nav.toggle_collapse(&mut tree));
        assert!(tree.get(top1).unwrap().collapsed);
        assert!(!tree.get(id(&tree, "reply1a")).unwrap().collapsed);
        assert_eq!(nav.cursor().current(), Some(top1));

        nav.move_down(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));

        nav.select(&mut tree, top1);
        assert!(nav.toggle_collapse(&mut tree));
        assert!(!tree.get(top1).unwrap().collapsed);
    }

    #[test]
    fn test_toggle_collapse_failures_leave_cursor() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let top2 = id(&tree, "top2");
        nav.select(&mut tree, top2);

        let control = tree.find_first_by_class(top2, "expand").unwrap();
        tree.get_mut(control).unwrap().add_attribute("disabled", "");
        assert!(!nav.toggle_collapse(&mut tree));
        assert!(!tree.get(top2).unwrap().collapsed);

        tree.remove(control).unwrap();
        assert!(!nav.toggle_collapse(&mut tree));
        assert_eq!(nav.cursor().current(), Some(top2));
    }

    #[test]
    fn test_locate_selects_enclosing_comment() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let reply2a = id(&tree, "reply2a");
        let entry = tree.find_first_by_class(reply2a, "entry").unwrap();

        assert!(nav.locate(&mut tree, entry));
        assert_eq!(nav.cursor().current(), Some(reply2a));

        // Clicks outside the comment area are ignored.
        let post = id(&tree, "post");
        assert!(!nav.locate(&mut tree, post));
        let root = tree.root();
        assert!(!nav.locate(&mut tree, root));
        assert_eq!(nav.cursor().current(), Some(reply2a));
    }

    #[test]
    fn test_move_first_and_last() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        nav.initialize(&mut tree);

        assert!(nav.move_last(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));
        assert!(nav.move_first(&mut tree));
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top1")));

        let top2 = id(&tree, "top2");
        let group = tree.find_first_by_class(top2, "sitetable").unwrap();
        tree.append_child(group, comment("reply2b", vec![])).unwrap();
        nav.move_last(&mut tree);
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply2b")));
    }

    #[test]
    fn test_before_remove_advances_cursor() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let reply1a = id(&tree, "reply1a");
        let reply2a = id(&tree, "reply2a");
        nav.select(&mut tree, reply2a);

        nav.before_remove(&mut tree, reply1a);
        tree.remove(reply1a).unwrap();
        assert_eq!(nav.cursor().current(), Some(id(&tree, "reply1b")));

        let reply1b = id(&tree, "reply1b");
        nav.before_remove(&mut tree, reply1b);
        tree.remove(reply1b).unwrap();
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top2")));

        let top2 = id(&tree, "top2");
        nav.before_remove(&mut tree, top2);
        tree.remove(top2).unwrap();
        assert_eq!(nav.cursor().current(), Some(id(&tree, "top1")));

        let top1 = id(&tree, "top1");
        nav.before_remove(&mut tree, top1);
        tree.remove(top1).unwrap();
        assert!(nav.cursor().is_empty());
    }

    #[test]
    fn test_stale_cursor_is_a_no_op() {
        let mut tree = sample_tree();
        let mut nav = navigator(&tree, &NavConfig::default());
        let reply1b = id(&tree, "reply1b");
        nav.select(&mut tree, reply1b);

        tree.remove(reply1b).unwrap();
        assert!(!nav.move_down(&mut tree));
        assert!(!nav.move_up(&mut tree));
        assert_eq!(nav.current(&tree), None);

        assert_eq!(nav.initialize(&mut tree), Some(id(&tree, "top1")));
    }
}
