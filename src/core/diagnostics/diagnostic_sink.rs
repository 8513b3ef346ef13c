// Non-fatal anomalies the registry and dispatcher run into.
// None of these ever stop the bot; they are reported and execution carries on.
// The host picks where they go by handing a sink to the bot at construction.

use crate::core::commands::CommandType;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A later module registered a command under a name that was already taken.
    CommandOverridden { kind: CommandType, name: String },
    /// The platform delivered an interaction for a name nobody registered.
    UnknownCommand { kind: CommandType, name: String },
    /// A category was invoked with a subcommand it does not contain.
    UnknownSubcommand {
        category: String,
        subcommand: Option<String>,
    },
    /// A handler failed and no error handler was configured to take the failure.
    UnhandledFailure { command: String, error: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Default sink: routing anomalies become warnings, failures become errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::CommandOverridden { kind, name } => {
                tracing::warn!(kind = %kind, command = %name, "Command registered twice; later registration wins");
            }
            Diagnostic::UnknownCommand { kind, name } => {
                tracing::warn!(kind = %kind, command = %name, "No handler registered for command");
            }
            Diagnostic::UnknownSubcommand {
                category,
                subcommand,
            } => {
                tracing::warn!(
                    category = %category,
                    subcommand = subcommand.as_deref().unwrap_or("<none>"),
                    "No handler registered for subcommand"
                );
            }
            Diagnostic::UnhandledFailure { command, error } => {
                tracing::error!(command = %command, error = %error, "Command handler failed");
            }
        }
    }
}

/// Keeps every diagnostic in memory so tests (and hosts) can inspect them.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.report(Diagnostic::UnknownCommand {
            kind: CommandType::ChatInput,
            name: "ping".to_string(),
        });
        sink.report(Diagnostic::UnknownSubcommand {
            category: "mod".to_string(),
            subcommand: Some("warn".to_string()),
        });

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], Diagnostic::UnknownCommand { .. }));
        assert!(matches!(entries[1], Diagnostic::UnknownSubcommand { .. }));
    }
}
