//! Commands bound to keys and clicks
//!
//! Every command takes typed parameters (deserialized from JSON, described by a JSON schema)
//! and runs against a [`CommandContext`]. The [`CommandRegistry`] erases the parameter types
//! so commands can be looked up and executed by name.

pub mod collapse;
pub mod hide;
pub mod ignore;
pub mod locate;
pub mod movement;

pub use collapse::ToggleCollapseCommand;
pub use hide::HideCommand;
pub use ignore::{IgnoreSubredditCommand, UndoIgnoreCommand};
pub use locate::{LocateCommand, LocateParams};
pub use movement::{MoveDownCommand, MoveFirstCommand, MoveLastCommand, MoveUpCommand};

use crate::error::{NavError, Result};
use crate::page::PageState;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Parameters of commands that take none
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Outcome of a command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    /// Whether the command took effect
    pub success: bool,

    /// Result data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Why the command did not take effect
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// What a command runs against
pub struct CommandContext<'a> {
    pub state: &'a mut PageState,

    /// Time of the input event
    pub now: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(state: &'a mut PageState) -> Self {
        Self::at(state, Instant::now())
    }

    pub fn at(state: &'a mut PageState, now: Instant) -> Self {
        Self { state, now }
    }

    /// Success carrying the current selection, plus whether it moved
    pub fn selection_result(&self, moved: bool) -> CommandResult {
        let mut data = self.state.describe_selection();
        data["moved"] = Value::Bool(moved);
        CommandResult::success_with(data)
    }
}

/// A command with typed parameters
pub trait Command {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut CommandContext) -> Result<CommandResult>;
}

/// Object-safe face of [`Command`]
pub trait DynCommand {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> Value;

    fn execute(&self, params: Value, context: &mut CommandContext) -> Result<CommandResult>;
}

impl<T: Command> DynCommand for T {
    fn name(&self) -> &str {
        Command::name(self)
    }

    fn description(&self) -> &str {
        Command::description(self)
    }

    fn parameters_schema(&self) -> Value {
        Command::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut CommandContext) -> Result<CommandResult> {
        let params = if params.is_null() { Value::Object(Default::default()) } else { params };
        let typed: T::Params = serde_json::from_value(params).map_err(|e| NavError::InvalidParams {
            command: Command::name(self).to_string(),
            reason: e.to_string(),
        })?;
        self.execute_typed(typed, context)
    }
}

/// Commands by name, in registration order
#[derive(Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, Box<dyn DynCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(MoveFirstCommand);
        registry.register(MoveLastCommand);
        registry.register(MoveDownCommand);
        registry.register(MoveUpCommand);
        registry.register(HideCommand);
        registry.register(IgnoreSubredditCommand);
        registry.register(UndoIgnoreCommand);
        registry.register(ToggleCollapseCommand);
        registry.register(LocateCommand);
        registry
    }

    /// Add a command, replacing any command of the same name
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        let name = Command::name(&command).to_string();
        self.commands.insert(name, Box::new(command));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynCommand> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Name, description and parameter schema of every command
    pub fn describe(&self) -> Vec<Value> {
        self.commands
            .values()
            .map(|c| {
                serde_json::json!({
                    "name": c.name(),
                    "description": c.description(),
                    "parameters": c.parameters_schema(),
                })
            })
            .collect()
    }

    pub fn execute(&self, name: &str, params: Value, context: &mut CommandContext) -> Result<CommandResult> {
        let command = self
            .get(name)
            .ok_or_else(|| NavError::UnknownCommand(name.to_string()))?;
        log::debug!("executing {}", name);
        command.execute(params, context)
    }
}
