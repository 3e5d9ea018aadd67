//! Outline model: a read-only view of the navigable nodes of a page.
//!
//! Nothing is cached. Every query re-derives its answer from the live structure, so a node
//! removed between two queries simply yields `None` on the next one. Wrappers (elements that
//! are not nodes) are walked through and never returned.

/// Default bound on the number of elements a single query may visit
pub const DEFAULT_MAX_WALK_STEPS: usize = 100_000;

/// Structural view of an element tree, as exposed by whoever owns the page
pub trait OutlineSource {
    type Id: Copy + Eq + std::fmt::Debug;

    /// Whether the element is still part of the page
    fn contains(&self, id: Self::Id) -> bool;

    fn parent_element(&self, id: Self::Id) -> Option<Self::Id>;

    fn first_element_child(&self, id: Self::Id) -> Option<Self::Id>;

    fn next_element_sibling(&self, id: Self::Id) -> Option<Self::Id>;

    fn previous_element_sibling(&self, id: Self::Id) -> Option<Self::Id>;

    /// "Is a node" capability tag
    fn is_node(&self, id: Self::Id) -> bool;

    /// Whether the element holds the replies of its owning node
    fn is_child_group(&self, id: Self::Id) -> bool;

    fn is_collapsed(&self, id: Self::Id) -> bool;
}

/// Outline queries over an [`OutlineSource`]
pub struct Outline<'a, T: OutlineSource + ?Sized> {
    source: &'a T,
    max_steps: usize,
}

impl<'a, T: OutlineSource + ?Sized> Outline<'a, T> {
    pub fn new(source: &'a T) -> Self {
        Self::with_limit(source, DEFAULT_MAX_WALK_STEPS)
    }

    /// Create an outline whose walks give up after `max_steps` visited elements
    pub fn with_limit(source: &'a T, max_steps: usize) -> Self {
        Self { source, max_steps: max_steps.max(1) }
    }

    fn guard_tripped(&self, query: &str, from: T::Id) -> Option<T::Id> {
        log::warn!("{} from {:?} exceeded {} steps, giving up", query, from, self.max_steps);
        None
    }

    /// First reply of `node`, or `None` when `node` is collapsed
    pub fn first_visible_child(&self, node: T::Id) -> Option<T::Id> {
        if !self.source.contains(node) || self.source.is_collapsed(node) {
            return None;
        }
        self.first_child_node(node)
    }

    /// First node found inside a child group below `node`, ignoring collapse state
    pub fn first_child_node(&self, node: T::Id) -> Option<T::Id> {
        if !self.source.contains(node) {
            return None;
        }

        let mut current = self.source.first_element_child(node);
        let mut steps = 0;
        while let Some(element) = current {
            steps += 1;
            if steps > self.max_steps {
                return self.guard_tripped("first_child_node", node);
            }
            if self.source.is_node(element) && self.inside_group(element, node) {
                return Some(element);
            }
            current = self.next_in_document(element, node);
        }
        None
    }

    /// Whether a child group lies strictly between `element` and `scope`
    fn inside_group(&self, element: T::Id, scope: T::Id) -> bool {
        let mut current = self.source.parent_element(element);
        let mut steps = 0;
        while let Some(ancestor) = current {
            steps += 1;
            if ancestor == scope || steps > self.max_steps {
                return false;
            }
            if self.source.is_child_group(ancestor) {
                return true;
            }
            current = self.source.parent_element(ancestor);
        }
        false
    }

    /// Next node at the same level, skipping wrappers
    pub fn next_visible_sibling(&self, node: T::Id) -> Option<T::Id> {
        if !self.source.contains(node) {
            return None;
        }
        self.walk_siblings(node, "next_visible_sibling", |s, id| s.next_element_sibling(id))
    }

    /// Previous node at the same level, skipping wrappers
    pub fn previous_visible_sibling(&self, node: T::Id) -> Option<T::Id> {
        if !self.source.contains(node) {
            return None;
        }
        self.walk_siblings(node, "previous_visible_sibling", |s, id| s.previous_element_sibling(id))
    }

    fn walk_siblings(
        &self,
        node: T::Id,
        query: &str,
        step: impl Fn(&T, T::Id) -> Option<T::Id>,
    ) -> Option<T::Id> {
        let mut current = step(self.source, node);
        let mut steps = 0;
        while let Some(candidate) = current {
            steps += 1;
            if steps > self.max_steps {
                return self.guard_tripped(query, node);
            }
            if self.source.is_node(candidate) {
                return Some(candidate);
            }
            current = step(self.source, candidate);
        }
        None
    }

    /// Nearest ancestor that is a node; `None` at the outline root
    pub fn parent(&self, node: T::Id) -> Option<T::Id> {
        if !self.source.contains(node) {
            return None;
        }
        let up = self.source.parent_element(node)?;
        self.closest_node(up)
    }

    /// `element` itself when it is a node, else its nearest node ancestor
    pub fn closest_node(&self, element: T::Id) -> Option<T::Id> {
        let mut current = Some(element);
        let mut steps = 0;
        while let Some(candidate) = current {
            steps += 1;
            if steps > self.max_steps {
                return self.guard_tripped("closest_node", element);
            }
            if self.source.is_node(candidate) {
                return Some(candidate);
            }
            current = self.source.parent_element(candidate);
        }
        None
    }

    /// First node below `scope` in document order
    pub fn first_node(&self, scope: T::Id) -> Option<T::Id> {
        if !self.source.contains(scope) {
            return None;
        }
        let mut current = self.source.first_element_child(scope);
        let mut steps = 0;
        while let Some(element) = current {
            steps += 1;
            if steps > self.max_steps {
                return self.guard_tripped("first_node", scope);
            }
            if self.source.is_node(element) {
                return Some(element);
            }
            current = self.next_in_document(element, scope);
        }
        None
    }

    /// Pre-order successor of `element` that stays below `scope`
    fn next_in_document(&self, element: T::Id, scope: T::Id) -> Option<T::Id> {
        if let Some(child) = self.source.first_element_child(element) {
            return Some(child);
        }
        let mut current = element;
        let mut steps = 0;
        loop {
            if current == scope {
                return None;
            }
            if let Some(next) = self.source.next_element_sibling(current) {
                return Some(next);
            }
            current = self.source.parent_element(current)?;
            steps += 1;
            if steps > self.max_steps {
                return None;
            }
        }
    }
}
