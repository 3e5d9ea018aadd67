use crate::dom::{NodeId, PageTree};
use serde::{Deserialize, Serialize};

/// Applies and clears the visual marker of the selected node
pub trait SelectionRenderer {
    fn mark(&mut self, tree: &mut PageTree, node: NodeId);

    fn unmark(&mut self, tree: &mut PageTree, node: NodeId);
}

/// Inline style property written on the selected node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    pub property: String,
    pub value: String,
}

impl Highlight {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self { property: property.into(), value: value.into() }
    }

    /// Left border used on comments
    pub fn comment() -> Self {
        Self::new("border-left", "3px solid yellow")
    }

    /// Background used on listing rows
    pub fn listing() -> Self {
        Self::new("background-color", "yellow")
    }
}

/// Renderer writing a [`Highlight`] into the node's `style` attribute
#[derive(Debug, Clone)]
pub struct StyleRenderer {
    highlight: Highlight,
}

impl StyleRenderer {
    pub fn new(highlight: Highlight) -> Self {
        Self { highlight }
    }
}

impl SelectionRenderer for StyleRenderer {
    fn mark(&mut self, tree: &mut PageTree, node: NodeId) {
        tree.set_style(node, &self.highlight.property, &self.highlight.value);
    }

    fn unmark(&mut self, tree: &mut PageTree, node: NodeId) {
        tree.set_style(node, &self.highlight.property, "unset");
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        Mark(NodeId),
        Unmark(NodeId),
    }

    /// Renderer that only records calls; clones share the log
    #[derive(Debug, Clone, Default)]
    pub struct RecordingRenderer {
        pub events: Rc<RefCell<Vec<Event>>>,
    }

    impl RecordingRenderer {
        pub fn take(&self) -> Vec<Event> {
            std::mem::take(&mut *self.events.borrow_mut())
        }
    }

    impl SelectionRenderer for RecordingRenderer {
        fn mark(&mut self, _tree: &mut PageTree, node: NodeId) {
            self.events.borrow_mut().push(Event::Mark(node));
        }

        fn unmark(&mut self, _tree: &mut PageTree, node: NodeId) {
            self.events.borrow_mut().push(Event::Unmark(node));
        }
    }
}
