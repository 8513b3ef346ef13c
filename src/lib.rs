//! Command and event modules for serenity bots.
//!
//! A bot is a set of [`Module`]s: slash commands, categories of subcommands,
//! user and message context-menu commands, and gateway event handlers. Modules
//! come from a directory tree ([`Discovery`]) or are built in code
//! ([`ModuleBuilder`]). A [`Bot`] publishes their declarations in one batch and
//! routes every interaction to the matching handler.

#[path = "core/core_layer.rs"]
pub mod core;
#[path = "discord/discord_layer.rs"]
pub mod discord;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub use crate::core::commands::{Choice, CommandOption, OptionKind, Permissions};
pub use crate::core::config::BotConfig;
pub use crate::core::diagnostics::{Diagnostic, DiagnosticSink, RecordingSink, TracingSink};
pub use crate::discord::{
    handler, on_error, Bot, BotOptions, CategoryCommand, Command, DispatchOutcome, Dispatcher,
    Error, EventHandler, EventName, HandlerFailure, InvalidEventName, Invocation,
    MessageContextMenuCommand, Module, ModuleBuilder, ModuleError, NormalCommand, PublishScope,
    SubCommand, UserContextMenuCommand,
};
pub use crate::infra::discovery::{
    Discovery, DiscoveryError, Export, HandlerTable, Layout, ManifestLoader, ModuleLoader,
    SourceFile,
};
pub use crate::infra::publisher::HttpPublisher;
