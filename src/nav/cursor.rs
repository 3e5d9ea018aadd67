use crate::dom::NodeId;

/// The navigator's notion of "current node"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Nothing selected yet
    #[default]
    Empty,
    /// `NodeId` is the selected node
    Positioned(NodeId),
}

impl Cursor {
    pub fn current(&self) -> Option<NodeId> {
        match self {
            Cursor::Empty => None,
            Cursor::Positioned(node) => Some(*node),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cursor::Empty)
    }

    pub fn is_at(&self, node: NodeId) -> bool {
        self.current() == Some(node)
    }
}
