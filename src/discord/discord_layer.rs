// Discord layer - the command model, gateway events, and the machinery that
// turns modules into a live registry and routes interactions to handlers.

#[path = "commands/command_model.rs"]
pub mod commands;

#[path = "events/event_handler.rs"]
pub mod events;

pub mod bot;
pub mod dispatcher;
pub mod module;
pub mod publisher;
pub mod registry;

/// Error type returned by command and event handlers.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub use bot::{Bot, BotOptions};
pub use commands::{
    handler, CategoryCommand, Command, Handler, Invocation, MessageContextMenuCommand,
    NormalCommand, PlatformInteraction, SubCommand, UserContextMenuCommand,
};
pub use dispatcher::{on_error, DispatchOutcome, Dispatcher, ErrorHandler, HandlerFailure};
pub use events::{EventCallback, EventHandler, EventName, InvalidEventName};
pub use module::{Module, ModuleBuilder, ModuleError};
pub use publisher::{CommandPublisher, PublishScope};
pub use registry::Registry;
