use crate::commands::{CommandContext, CommandRegistry, CommandResult};
use crate::dom::{ElementNode, NodeId, PageTree};
use crate::error::{NavError, Result};
use crate::page::config::NavConfig;
use crate::page::state::{PageState, PageView};
use crate::store::Store;
use serde_json::Value;
use std::time::Instant;

/// A page wired to its navigator, the store and the command registry
pub struct PageSession {
    state: PageState,

    /// Commands reachable from keys and [`PageSession::execute`]
    registry: CommandRegistry,
}

impl PageSession {
    /// Open a session on `tree`: detect the page kind and select the first node
    pub fn open(tree: PageTree, store: Store, config: NavConfig) -> Result<Self> {
        config.validate()?;
        let state = PageState::new(tree, store, config);
        log::info!(
            "page session opened: {} view, {} elements",
            state.view.name(),
            state.tree.count_elements()
        );
        Ok(Self { state, registry: CommandRegistry::with_defaults() })
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn tree(&self) -> &PageTree {
        &self.state.tree
    }

    pub fn view(&self) -> &PageView {
        &self.state.view
    }

    pub fn store(&self) -> &Store {
        &self.state.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.state.store
    }

    pub fn config(&self) -> &NavConfig {
        &self.state.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// Selected element
    pub fn selected(&self) -> Option<NodeId> {
        self.state.selected()
    }

    /// `id` attribute of the selected element
    pub fn selected_id(&self) -> Option<String> {
        self.state.selected_id()
    }

    /// Run the command bound to `key`. Unbound keys and inert pages yield `None`.
    pub fn handle_key(&mut self, key: &str) -> Result<Option<CommandResult>> {
        self.handle_key_at(key, Instant::now())
    }

    pub fn handle_key_at(&mut self, key: &str, now: Instant) -> Result<Option<CommandResult>> {
        let Some(kind) = self.state.view.kind() else {
            return Ok(None);
        };
        let Some(command) = self.state.config.command_for(kind, key).map(str::to_string) else {
            log::debug!("key {:?} is not bound", key);
            return Ok(None);
        };
        self.execute_at(&command, Value::Null, now).map(Some)
    }

    /// Pointer click on `element`: select the node containing it
    pub fn handle_click(&mut self, element: NodeId) -> bool {
        let state = &mut self.state;
        match &mut state.view {
            PageView::Listing(nav) => nav.locate(&mut state.tree, element),
            PageView::Comments(nav) => nav.locate(&mut state.tree, element),
            PageView::Inert => false,
        }
    }

    /// Execute a command by name
    pub fn execute(&mut self, name: &str, params: Value) -> Result<CommandResult> {
        self.execute_at(name, params, Instant::now())
    }

    pub fn execute_at(&mut self, name: &str, params: Value, now: Instant) -> Result<CommandResult> {
        self.state.tick(now);
        let mut context = CommandContext::at(&mut self.state, now);
        self.registry.execute(name, params, &mut context)
    }

    /// Advance time without input: expire the undo window, write due counters
    pub fn tick(&mut self, now: Instant) {
        self.state.tick(now);
    }

    /// Remove `node` from the page on behalf of someone else, keeping the cursor valid
    pub fn remove_node(&mut self, node: NodeId) -> Result<ElementNode> {
        let state = &mut self.state;
        if !state.tree.is_attached(node) {
            return Err(NavError::ElementNotFound("element is not on the page".to_string()));
        }
        match &mut state.view {
            PageView::Comments(nav) => {
                nav.before_remove(&mut state.tree, node);
                state.tree.remove(node)
            }
            PageView::Listing(nav) => {
                let removed = state.tree.remove(node)?;
                nav.on_removed(&mut state.tree, &state.store, node);
                Ok(removed)
            }
            PageView::Inert => state.tree.remove(node),
        }
    }

    /// The host is going away: write buffered counters now
    pub fn suspend(&mut self) -> Result<()> {
        self.state.store.suspend()
    }

    /// Current page as a JSON snapshot
    pub fn snapshot_json(&self) -> Result<String> {
        self.state.tree.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, NoParams};
    use crate::page::ViewKind;

    fn listing() -> PageTree {
        PageTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_attribute("id", "siteTable").with_children(vec![
                ElementNode::new("div")
                    .with_attribute("id", "a")
                    .with_attribute("data-subreddit", "rust")
                    .with_class("thing link"),
                ElementNode::new("div")
                    .with_attribute("id", "b")
                    .with_attribute("data-subreddit", "pics")
                    .with_class("thing link"),
            ]),
        ]))
    }

    /// Comment page holding one chain of `depth` nested replies
    fn deep_thread(depth: usize) -> PageTree {
        let mut node = ElementNode::new("div").with_attribute("id", "c-last").with_class("thing comment");
        for level in (0..depth - 1).rev() {
            let replies = ElementNode::new("div").with_class("child").with_children(vec![node]);
            node = ElementNode::new("div")
                .with_attribute("id", format!("c{}", level))
                .with_class("thing comment")
                .with_children(vec![replies]);
        }
        PageTree::new(ElementNode::new("body").with_children(vec![
            ElementNode::new("div").with_class("commentarea").with_children(vec![
                ElementNode::new("div").with_class("sitetable nestedlisting").with_children(vec![node]),
            ]),
        ]))
    }

    #[derive(Default)]
    struct Echo;

    impl Command for Echo {
        type Params = NoParams;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Report the selection without moving"
        }

        fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
            Ok(context.selection_result(false))
        }
    }

    #[test]
    fn test_open_listing_selects_first_row() {
        let session = PageSession::open(listing(), Store::in_memory(), NavConfig::default()).unwrap();

        assert_eq!(session.view().kind(), Some(ViewKind::Listing));
        assert_eq!(session.selected_id(), Some("a".to_string()));
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let config = NavConfig::default().max_walk_steps(0);
        assert!(PageSession::open(listing(), Store::in_memory(), config).is_err());
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut session = PageSession::open(listing(), Store::in_memory(), NavConfig::default()).unwrap();

        assert!(session.handle_key("q").unwrap().is_none());
        assert!(session.handle_key("x").unwrap().is_none());
        assert_eq!(session.handle_key("j").unwrap().unwrap().data.unwrap()["selected"], "b");
    }

    #[test]
    fn test_custom_binding() {
        let config = NavConfig::default().bind(ViewKind::Listing, "ArrowDown", "move_down");
        let mut session = PageSession::open(listing(), Store::in_memory(), config).unwrap();

        session.handle_key("ArrowDown").unwrap();
        assert_eq!(session.selected_id(), Some("b".to_string()));
    }

    #[test]
    fn test_binding_to_unknown_command_errors() {
        let config = NavConfig::default().bind(ViewKind::Listing, "r", "reload");
        let mut session = PageSession::open(listing(), Store::in_memory(), config).unwrap();

        assert!(matches!(session.handle_key("r"), Err(NavError::UnknownCommand(_))));
    }

    #[test]
    fn test_inert_page() {
        let tree = PageTree::new(ElementNode::new("body").with_children(vec![ElementNode::new("p")]));
        let mut session = PageSession::open(tree, Store::in_memory(), NavConfig::default()).unwrap();

        assert!(session.view().kind().is_none());
        assert!(session.handle_key("j").unwrap().is_none());
        let p = session.tree().children(session.tree().root())[0];
        assert!(!session.handle_click(p));
    }

    #[test]
    fn test_remove_node_on_listing() {
        let mut session = PageSession::open(listing(), Store::in_memory(), NavConfig::default()).unwrap();
        let a = session.tree().find_by_id("a").unwrap();

        let removed = session.remove_node(a).unwrap();
        assert_eq!(removed.id(), Some(&"a".to_string()));
        assert_eq!(session.selected_id(), Some("b".to_string()));
        assert!(session.remove_node(a).is_err());
    }

    #[test]
    fn test_suspend_writes_counters() {
        let mut session = PageSession::open(listing(), Store::in_memory(), NavConfig::default()).unwrap();
        session.store_mut().increment_counter("rust", 2).unwrap();
        assert!(session.store().counters().is_empty());

        session.suspend().unwrap();
        assert_eq!(session.store().counters().get("rust"), Some(&2));
    }

    #[test]
    fn test_registered_command_can_be_bound() {
        let config = NavConfig::default().bind(ViewKind::Listing, "e", "echo");
        let mut session = PageSession::open(listing(), Store::in_memory(), config).unwrap();
        session.registry_mut().register(Echo);

        let result = session.handle_key("e").unwrap().unwrap();
        assert!(result.success);
        let data = result.data.unwrap();
        assert_eq!(data["selected"], "a");
        assert_eq!(data["moved"], false);
    }

    #[test]
    fn test_remove_top_of_deep_thread() {
        let mut session = PageSession::open(deep_thread(5_000), Store::in_memory(), NavConfig::default()).unwrap();
        assert_eq!(session.selected_id(), Some("c0".to_string()));
        let top = session.tree().find_by_id("c0").unwrap();

        let removed = session.remove_node(top).unwrap();
        assert_eq!(removed.id(), Some(&"c0".to_string()));
        assert!(session.selected().is_none());
        assert!(session.tree().find_by_id("c-last").is_none());
    }
}
