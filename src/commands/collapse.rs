use crate::commands::{Command, CommandContext, CommandResult, NoParams};
use crate::error::Result;
use crate::page::PageView;
use serde_json::json;

/// Collapse or expand the selected comment
#[derive(Default)]
pub struct ToggleCollapseCommand;

impl Command for ToggleCollapseCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "toggle_collapse"
    }

    fn description(&self) -> &str {
        "Collapse or expand the selected comment; the selection stays put"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        let state = &mut *context.state;
        let PageView::Comments(nav) = &mut state.view else {
            return Ok(CommandResult::failure("collapse is only available on comment pages"));
        };
        if !nav.toggle_collapse(&mut state.tree) {
            return Ok(CommandResult::failure("the selected comment could not be toggled"));
        }

        let collapsed = nav
            .current(&state.tree)
            .and_then(|node| state.tree.get(node))
            .is_some_and(|e| e.collapsed);
        let mut result = context.selection_result(false);
        if let Some(data) = result.data.as_mut() {
            data["collapsed"] = json!(collapsed);
        }
        Ok(result)
    }
}
