use crate::commands::{Command, CommandContext, CommandResult, NoParams};
use crate::error::Result;
use crate::page::PageView;

/// Hide the selected post through its own hide control
#[derive(Default)]
pub struct HideCommand;

impl Command for HideCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "hide"
    }

    fn description(&self) -> &str {
        "Hide the selected post and select the one that takes its place"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        let now = context.now;
        let state = &mut *context.state;
        let PageView::Listing(nav) = &mut state.view else {
            return Ok(CommandResult::failure("hide is only available on listing pages"));
        };

        let hidden = nav.current().and_then(|row| state.tree.get(row)).and_then(|e| e.id().cloned());
        if !nav.hide_current(&mut state.tree, &mut state.store, now) {
            return Ok(CommandResult::failure("the selected post could not be hidden"));
        }

        let mut result = context.selection_result(true);
        if let Some(data) = result.data.as_mut() {
            data["hidden"] = serde_json::json!(hidden);
        }
        Ok(result)
    }
}
