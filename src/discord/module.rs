// A module is the unit the registry consumes: the top-level commands and event
// handlers one discovery run (or one explicit builder) produced. Subcommands are
// not listed separately; they live inside their category.

use crate::core::commands::CommandType;
use crate::discord::commands::{CategoryCommand, Command, SubCommand};
use crate::discord::events::EventHandler;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleError {
    #[error("A {kind} command named `{name}` is already in this module")]
    DuplicateCommand { kind: CommandType, name: String },

    #[error("Category `{category}` already has a subcommand named `{name}`")]
    DuplicateSubcommand { category: String, name: String },

    #[error("Command names must not be empty")]
    EmptyName,
}

/// Immutable bundle of commands and event handlers.
#[derive(Clone, Debug, Default)]
pub struct Module {
    commands: Vec<Arc<Command>>,
    events: Vec<EventHandler>,
}

impl Module {
    pub fn builder() -> ModuleBuilder {
        ModuleBuilder::default()
    }

    /// Assemble a module from commands whose names are already assigned.
    pub(crate) fn from_parts(commands: Vec<Command>, events: Vec<EventHandler>) -> Self {
        Self {
            commands: commands.into_iter().map(Arc::new).collect(),
            events,
        }
    }

    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    pub fn events(&self) -> &[EventHandler] {
        &self.events
    }

    /// First top-level command with this name, of any kind.
    pub fn command(&self, name: &str) -> Option<&Command> {
        self.commands
            .iter()
            .map(Arc::as_ref)
            .find(|c| c.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }
}

/// Explicit registration: every command is given its name here.
///
/// ```ignore
/// let module = Module::builder()
///     .command("ping", NormalCommand::new("Check the bot is alive", ping))?
///     .command("mod", CategoryCommand::new("Moderation").subcommand("ban", ban)?)?
///     .event(EventHandler::new(EventName::READY, on_ready))
///     .build();
/// ```
#[derive(Default)]
pub struct ModuleBuilder {
    commands: Vec<Command>,
    events: Vec<EventHandler>,
}

impl ModuleBuilder {
    pub fn command(
        mut self,
        name: impl Into<String>,
        command: impl Into<Command>,
    ) -> Result<Self, ModuleError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModuleError::EmptyName);
        }

        let mut command = command.into();
        let kind = command.command_type();
        if self
            .commands
            .iter()
            .any(|c| c.command_type() == kind && c.name() == name)
        {
            return Err(ModuleError::DuplicateCommand { kind, name });
        }

        command.set_name(name);
        self.commands.push(command);
        Ok(self)
    }

    /// Shorthand for registering a category built from `(name, subcommand)` pairs.
    pub fn category(
        self,
        name: impl Into<String>,
        category: CategoryCommand,
        subcommands: impl IntoIterator<Item = (String, SubCommand)>,
    ) -> Result<Self, ModuleError> {
        let name = name.into();
        let mut category = category;
        category.set_name(name.clone());
        for (sub_name, sub) in subcommands {
            category.insert_subcommand(sub_name, sub)?;
        }
        self.command(name, category)
    }

    pub fn event(mut self, handler: EventHandler) -> Self {
        self.events.push(handler);
        self
    }

    pub fn build(self) -> Module {
        Module::from_parts(self.commands, self.events)
    }
}
