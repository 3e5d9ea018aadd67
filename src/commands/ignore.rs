use crate::commands::{Command, CommandContext, CommandResult, NoParams};
use crate::error::Result;
use crate::page::PageView;
use serde_json::json;

/// Ignore the subreddit of the selected post
#[derive(Default)]
pub struct IgnoreSubredditCommand;

impl Command for IgnoreSubredditCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "ignore_subreddit"
    }

    fn description(&self) -> &str {
        "Ignore the subreddit of the selected post and remove its posts from the page"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        let now = context.now;
        let state = &mut *context.state;
        let PageView::Listing(nav) = &mut state.view else {
            return Ok(CommandResult::failure("ignore is only available on listing pages"));
        };

        let Some(undo) = nav.ignore_current(&mut state.tree, &mut state.store, now) else {
            return Ok(CommandResult::failure("the selected post has no subreddit to ignore"));
        };

        let subreddit = undo.subreddit.clone();
        // Only the latest ignore can be undone.
        if let Some(previous) = state.pending_undo.replace(undo) {
            previous.discard(&mut state.tree);
        }

        let mut result = context.selection_result(true);
        if let Some(data) = result.data.as_mut() {
            data["ignored"] = json!(subreddit);
            data["undo_ms"] = json!(context.state.config.undo_timeout_ms);
        }
        Ok(result)
    }
}

/// Restore the last ignored subreddit while its undo window is open
#[derive(Default)]
pub struct UndoIgnoreCommand;

impl Command for UndoIgnoreCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "undo_ignore"
    }

    fn description(&self) -> &str {
        "Undo the last subreddit ignore"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        let now = context.now;
        let state = &mut *context.state;
        let PageView::Listing(nav) = &mut state.view else {
            return Ok(CommandResult::failure("nothing to undo"));
        };
        let Some(undo) = state.pending_undo.take() else {
            return Ok(CommandResult::failure("nothing to undo"));
        };

        let subreddit = undo.subreddit.clone();
        if !nav.undo_ignore(&mut state.tree, &mut state.store, undo, now)? {
            return Ok(CommandResult::failure(format!("undo for {} expired", subreddit)));
        }

        let mut result = context.selection_result(false);
        if let Some(data) = result.data.as_mut() {
            data["restored"] = json!(subreddit);
        }
        Ok(result)
    }
}
