use crate::commands::{Command, CommandContext, CommandResult, NoParams};
use crate::error::Result;
use crate::page::PageView;

#[derive(Debug, Clone, Copy)]
enum Direction {
    First,
    Last,
    Down,
    Up,
}

/// Shared body of the four movement commands. Hitting a boundary is not a failure: the
/// result reports `moved: false`.
fn run(direction: Direction, context: &mut CommandContext) -> Result<CommandResult> {
    let state = &mut *context.state;
    let moved = match &mut state.view {
        PageView::Listing(nav) => match direction {
            Direction::First => nav.move_first(&mut state.tree),
            Direction::Last => nav.move_last(&mut state.tree),
            Direction::Down => nav.move_down(&mut state.tree),
            Direction::Up => nav.move_up(&mut state.tree),
        },
        PageView::Comments(nav) => match direction {
            Direction::First => nav.move_first(&mut state.tree),
            Direction::Last => nav.move_last(&mut state.tree),
            Direction::Down => nav.move_down(&mut state.tree),
            Direction::Up => nav.move_up(&mut state.tree),
        },
        PageView::Inert => false,
    };
    Ok(context.selection_result(moved))
}

/// Select the first node
#[derive(Default)]
pub struct MoveFirstCommand;

impl Command for MoveFirstCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "move_first"
    }

    fn description(&self) -> &str {
        "Select the first post or comment"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        run(Direction::First, context)
    }
}

/// Select the last visible node
#[derive(Default)]
pub struct MoveLastCommand;

impl Command for MoveLastCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "move_last"
    }

    fn description(&self) -> &str {
        "Select the last visible post or comment"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        run(Direction::Last, context)
    }
}

#[derive(Default)]
pub struct MoveDownCommand;

impl Command for MoveDownCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "move_down"
    }

    fn description(&self) -> &str {
        "Select the next visible post or comment"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        run(Direction::Down, context)
    }
}

#[derive(Default)]
pub struct MoveUpCommand;

impl Command for MoveUpCommand {
    type Params = NoParams;

    fn name(&self) -> &str {
        "move_up"
    }

    fn description(&self) -> &str {
        "Select the previous post, or the previous sibling or parent comment"
    }

    fn execute_typed(&self, _params: NoParams, context: &mut CommandContext) -> Result<CommandResult> {
        run(Direction::Up, context)
    }
}
