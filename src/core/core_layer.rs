// The core module holds everything that does not need a live Discord client.
// The command schema is plain serde data (permissions reuse serenity's flags),
// diagnostics go through a trait, and config is read from the environment.

#[path = "commands/command_schema.rs"]
pub mod commands;

#[path = "diagnostics/diagnostic_sink.rs"]
pub mod diagnostics;

#[path = "config/bot_config.rs"]
pub mod config;
