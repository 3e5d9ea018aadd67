use crate::commands::{Command, CommandContext, CommandResult};
use crate::error::{NavError, Result};
use crate::page::PageView;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the locate command
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocateParams {
    /// `id` attribute of the clicked element
    pub id: String,
}

/// Select the node containing a clicked element
#[derive(Default)]
pub struct LocateCommand;

impl Command for LocateCommand {
    type Params = LocateParams;

    fn name(&self) -> &str {
        "locate"
    }

    fn description(&self) -> &str {
        "Select the post or comment containing the element with the given id"
    }

    fn execute_typed(&self, params: LocateParams, context: &mut CommandContext) -> Result<CommandResult> {
        let state = &mut *context.state;
        let element = state
            .tree
            .find_by_id(&params.id)
            .ok_or_else(|| NavError::ElementNotFound(format!("No element with id '{}'", params.id)))?;

        let moved = match &mut state.view {
            PageView::Listing(nav) => nav.locate(&mut state.tree, element),
            PageView::Comments(nav) => nav.locate(&mut state.tree, element),
            PageView::Inert => false,
        };
        Ok(context.selection_result(moved))
    }
}
