// The command model.
//
// A command is one of four concrete kinds. They are a plain enum rather than a
// trait object: the registry needs to know which table a command goes in, and
// routing needs to know whether to look for a subcommand, so both just match.
//
// Names are never chosen by the command author. Discovery assigns the file base
// name, the module builder assigns the name it is given, and nothing else can
// change it afterwards.

pub mod category;
pub mod context_menu;
pub mod handler;
pub mod invocation;
pub mod normal;

pub use category::CategoryCommand;
pub use context_menu::{MessageContextMenuCommand, UserContextMenuCommand};
pub use handler::{handler, Handler};
pub use invocation::{Invocation, PlatformInteraction};
pub use normal::{NormalCommand, SubCommand};

use crate::core::commands::{CommandDeclaration, CommandType};

#[derive(Clone, Debug)]
pub enum Command {
    Normal(NormalCommand),
    Category(CategoryCommand),
    UserMenu(UserContextMenuCommand),
    MessageMenu(MessageContextMenuCommand),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Normal(c) => c.name(),
            Command::Category(c) => c.name(),
            Command::UserMenu(c) => c.name(),
            Command::MessageMenu(c) => c.name(),
        }
    }

    /// Which kind of interaction invokes this command (and so which registry table holds it).
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Normal(_) | Command::Category(_) => CommandType::ChatInput,
            Command::UserMenu(_) => CommandType::User,
            Command::MessageMenu(_) => CommandType::Message,
        }
    }

    /// Human-readable kind, used in configuration error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Command::Normal(_) => "NormalCommand",
            Command::Category(_) => "CategoryCommand",
            Command::UserMenu(_) => "UserContextMenuCommand",
            Command::MessageMenu(_) => "MessageContextMenuCommand",
        }
    }

    pub fn as_category(&self) -> Option<&CategoryCommand> {
        match self {
            Command::Category(c) => Some(c),
            _ => None,
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Command::Normal(c) => c.set_name(name),
            Command::Category(c) => c.set_name(name),
            Command::UserMenu(c) => c.set_name(name),
            Command::MessageMenu(c) => c.set_name(name),
        }
    }

    /// Pure conversion to the platform's command schema.
    pub fn to_declaration(&self) -> CommandDeclaration {
        match self {
            Command::Normal(c) => c.to_declaration(),
            Command::Category(c) => c.to_declaration(),
            Command::UserMenu(c) => c.to_declaration(),
            Command::MessageMenu(c) => c.to_declaration(),
        }
    }

    /// Find the handler that should run for an invocation of this command.
    /// Categories resolve through the picked subcommand; `None` means a routing miss.
    pub fn resolve(&self, subcommand: Option<&str>) -> Option<&Handler> {
        match self {
            Command::Normal(c) => Some(c.handler()),
            Command::Category(c) => c.route(subcommand),
            Command::UserMenu(c) => Some(c.handler()),
            Command::MessageMenu(c) => Some(c.handler()),
        }
    }
}

impl From<NormalCommand> for Command {
    fn from(command: NormalCommand) -> Self {
        Command::Normal(command)
    }
}

impl From<CategoryCommand> for Command {
    fn from(command: CategoryCommand) -> Self {
        Command::Category(command)
    }
}

impl From<UserContextMenuCommand> for Command {
    fn from(command: UserContextMenuCommand) -> Self {
        Command::UserMenu(command)
    }
}

impl From<MessageContextMenuCommand> for Command {
    fn from(command: MessageContextMenuCommand) -> Self {
        Command::MessageMenu(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler {
        handler(|_: Invocation| async { Ok(()) })
    }

    #[test]
    fn test_command_type_picks_the_table() {
        let normal: Command = NormalCommand::new("Ping", noop()).into();
        let category: Command = CategoryCommand::new("Tools").into();
        let user: Command = UserContextMenuCommand::new(noop()).into();
        let message: Command = MessageContextMenuCommand::new(noop()).into();

        assert_eq!(normal.command_type(), CommandType::ChatInput);
        assert_eq!(category.command_type(), CommandType::ChatInput);
        assert_eq!(user.command_type(), CommandType::User);
        assert_eq!(message.command_type(), CommandType::Message);
    }

    #[test]
    fn test_set_name_reaches_every_kind() {
        let mut command: Command = UserContextMenuCommand::new(noop()).into();
        assert_eq!(command.name(), "");

        command.set_name("Inspect");
        assert_eq!(command.name(), "Inspect");
        assert_eq!(command.to_declaration().name, "Inspect");
    }

    #[test]
    fn test_resolve_normal_ignores_subcommand() {
        let command: Command = NormalCommand::new("Ping", noop()).into();
        assert!(command.resolve(None).is_some());
        assert!(command.resolve(Some("anything")).is_some());

        let empty: Command = CategoryCommand::new("Tools").into();
        assert!(empty.resolve(Some("anything")).is_none());
    }
}
