use crate::dom::element::{Classifier, ElementNode};
use crate::dom::outline::OutlineSource;
use crate::error::{NavError, Result};
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

new_key_type! {
    /// Stable handle to an element of a [`PageTree`]. Handles of removed elements go stale.
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct Entry {
    /// Element data; `element.children` is always empty inside the arena
    element: ElementNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Live element tree of a page.
///
/// Elements keep their identity across mutation: detaching an element and
/// inserting it again hands back the same [`NodeId`].
#[derive(Debug, Clone)]
pub struct PageTree {
    entries: SlotMap<NodeId, Entry>,

    /// Root element of the page
    root: NodeId,

    /// Tags applied to every element entering the tree
    classifier: Classifier,
}

impl PageTree {
    /// Create a tree with the default classifier
    pub fn new(root: ElementNode) -> Self {
        Self::from_element(root, Classifier::default())
    }

    /// Build a tree from a nested snapshot, tagging every element once
    pub fn from_element(root: ElementNode, classifier: Classifier) -> Self {
        let mut entries = SlotMap::with_key();
        let root = Self::insert_subtree(&mut entries, &classifier, root, None);
        Self { entries, root, classifier }
    }

    /// Parse a JSON snapshot (the serialized form of [`ElementNode`])
    pub fn from_json(json: &str, classifier: Classifier) -> Result<Self> {
        let root: ElementNode = serde_json::from_str(json)
            .map_err(|e| NavError::SnapshotFailed(format!("Failed to parse page JSON: {}", e)))?;
        Ok(Self::from_element(root, classifier))
    }

    fn insert_subtree(
        entries: &mut SlotMap<NodeId, Entry>,
        classifier: &Classifier,
        element: ElementNode,
        parent: Option<NodeId>,
    ) -> NodeId {
        let mut top = None;
        let mut stack = vec![(element, parent)];

        while let Some((mut element, parent)) = stack.pop() {
            element.classify(classifier);
            let children = std::mem::take(&mut element.children);
            let id = entries.insert(Entry { element, parent, children: Vec::new() });

            match parent.and_then(|p| entries.get_mut(p)) {
                Some(parent_entry) if top.is_some() => parent_entry.children.push(id),
                _ => top = Some(id),
            }

            for child in children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }

        // The loop runs at least once, so `top` is always set here.
        top.unwrap_or_default()
    }

    /// Root element handle
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Classifier used for elements entering the tree
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Element data by handle
    pub fn get(&self, id: NodeId) -> Option<&ElementNode> {
        self.entries.get(id).map(|e| &e.element)
    }

    /// Mutable element data by handle
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        self.entries.get_mut(id).map(|e| &mut e.element)
    }

    /// Whether the handle still refers to an element, attached or not
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(id)
    }

    /// Whether the element is reachable from the root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        for _ in 0..=self.entries.len() {
            if current == self.root {
                return true;
            }
            match self.entries.get(current).and_then(|e| e.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    /// Parent element
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(id)?.parent
    }

    /// Ordered child elements
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entries.get(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// First child element
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    fn sibling_offset(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&c| c == id)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    /// Following sibling element
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, 1)
    }

    /// Preceding sibling element
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_offset(id, -1)
    }

    /// Append a new subtree below `parent` and return the handle of its root
    pub fn append_child(&mut self, parent: NodeId, element: ElementNode) -> Result<NodeId> {
        if !self.entries.contains_key(parent) {
            return Err(NavError::ElementNotFound("append target is gone".to_string()));
        }
        let id = Self::insert_subtree(&mut self.entries, &self.classifier, element, Some(parent));
        if let Some(parent_entry) = self.entries.get_mut(parent) {
            parent_entry.children.push(id);
        }
        Ok(id)
    }

    /// Unlink an element (and its subtree) from its parent, keeping its handle valid
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(NavError::ElementNotFound("the root cannot be detached".to_string()));
        }
        let parent = self
            .entries
            .get_mut(id)
            .ok_or_else(|| NavError::ElementNotFound("element is gone".to_string()))?
            .parent
            .take();

        if let Some(parent_entry) = parent.and_then(|p| self.entries.get_mut(p)) {
            parent_entry.children.retain(|&c| c != id);
        }
        Ok(())
    }

    /// Insert a detached element below `parent`, before `before` when that is still a child of
    /// `parent`, otherwise at the end
    pub fn insert_before(&mut self, parent: NodeId, id: NodeId, before: Option<NodeId>) -> Result<()> {
        if !self.entries.contains_key(parent) {
            return Err(NavError::ElementNotFound("insert target is gone".to_string()));
        }
        match self.entries.get(id) {
            None => return Err(NavError::ElementNotFound("element is gone".to_string())),
            Some(entry) if entry.parent.is_some() || id == self.root => {
                return Err(NavError::ElementNotFound("element is still attached".to_string()));
            }
            Some(_) => {}
        }
        if self.is_within(parent, id) {
            return Err(NavError::ElementNotFound("cannot insert an element into itself".to_string()));
        }

        let siblings = &mut self.entries[parent].children;
        let position = before
            .and_then(|b| siblings.iter().position(|&c| c == b))
            .unwrap_or(siblings.len());
        siblings.insert(position, id);
        self.entries[id].parent = Some(parent);
        Ok(())
    }

    /// Remove an element and its subtree for good, returning the removed element without
    /// its children
    pub fn remove(&mut self, id: NodeId) -> Result<ElementNode> {
        self.detach(id)?;
        for node in self.descendants(id) {
            self.entries.remove(node);
        }
        self.entries
            .remove(id)
            .map(|entry| entry.element)
            .ok_or_else(|| NavError::ElementNotFound("element is gone".to_string()))
    }

    /// Whether `id` is `ancestor` or lies below it
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        for _ in 0..=self.entries.len() {
            match current {
                Some(node) if node == ancestor => return true,
                Some(node) => current = self.parent(node),
                None => return false,
            }
        }
        false
    }

    /// All elements below `id` in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            found.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }

    /// Find an element by its `id` attribute
    pub fn find_by_id(&self, element_id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.get(n).and_then(|e| e.id()).is_some_and(|id| id == element_id))
    }

    /// First element below `scope` carrying `class_name`, in document order
    pub fn find_first_by_class(&self, scope: NodeId, class_name: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| self.get(n).is_some_and(|e| e.has_class(class_name)))
    }

    /// Nearest element, starting at `id` itself, that satisfies `predicate`
    pub fn closest(&self, id: NodeId, predicate: impl Fn(&ElementNode) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        for _ in 0..=self.entries.len() {
            let node = current?;
            if predicate(self.get(node)?) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Write one inline style property
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if let Some(element) = self.get_mut(id) {
            element.set_style_property(property, value);
        }
    }

    /// Set the collapse flag of a node, keeping its class list in sync
    pub fn set_collapsed(&mut self, id: NodeId, collapsed: bool) {
        let class = self.classifier.collapsed_class.clone();
        if let Some(element) = self.get_mut(id) {
            element.collapsed = collapsed;
            if collapsed {
                element.add_class(&class);
            } else {
                element.remove_class(&class);
            }
        }
    }

    /// Simulate a user activation (click) of an element.
    ///
    /// Returns `false` when the activation is suppressed: the element is gone, detached or
    /// disabled. An `expand` control toggles the collapse state of the node owning it.
    pub fn activate(&mut self, id: NodeId) -> bool {
        if !self.is_attached(id) {
            log::debug!("activation of a detached element ignored");
            return false;
        }
        let Some(element) = self.get(id) else {
            return false;
        };
        if element.is_disabled() {
            log::debug!("activation suppressed on {}", element.to_simple_string());
            return false;
        }

        if element.has_class("expand") {
            let owner = self.parent(id).and_then(|p| self.closest(p, |e| e.is_node));
            if let Some(owner) = owner {
                let collapsed = self.get(owner).is_some_and(|e| e.collapsed);
                self.set_collapsed(owner, !collapsed);
            }
        }
        true
    }

    /// Rebuild the nested snapshot rooted at `id`
    pub fn to_element(&self, id: NodeId) -> Option<ElementNode> {
        self.get(id)?;
        let order: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();

        // Children come after their parent in document order, so walking backwards
        // finishes every child before its parent needs it.
        let mut built: HashMap<NodeId, ElementNode> = HashMap::with_capacity(order.len());
        for &node in order.iter().rev() {
            let Some(mut element) = self.get(node).cloned() else {
                continue;
            };
            element.children = self.children(node).iter().filter_map(|child| built.remove(child)).collect();
            built.insert(node, element);
        }
        built.remove(&id)
    }

    /// Convert the page tree to JSON
    pub fn to_json(&self) -> Result<String> {
        let root = self
            .to_element(self.root)
            .ok_or_else(|| NavError::SnapshotFailed("page has no root".to_string()))?;
        serde_json::to_string_pretty(&root)
            .map_err(|e| NavError::SnapshotFailed(format!("Failed to serialize page to JSON: {}", e)))
    }

    /// Count attached elements
    pub fn count_elements(&self) -> usize {
        1 + self.descendants(self.root).len()
    }
}

impl OutlineSource for PageTree {
    type Id = NodeId;

    fn contains(&self, id: NodeId) -> bool {
        self.is_attached(id)
    }

    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id)
    }

    fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.first_child(id)
    }

    fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.next_sibling(id)
    }

    fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.previous_sibling(id)
    }

    fn is_node(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.is_node)
    }

    fn is_child_group(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.is_child_group)
    }

    fn is_collapsed(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.collapsed)
    }
}
