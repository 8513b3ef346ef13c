// Name-indexed command tables, one per interaction kind.
//
// Tables only ever grow. Registering a name that already exists in the same
// table replaces the old command (later modules win) and reports a diagnostic.
// Each entry remembers when it was registered so publishing has a stable order.

use crate::core::commands::{CommandDeclaration, CommandType};
use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::discord::commands::Command;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct Registered {
    sequence: u64,
    command: Arc<Command>,
}

pub struct Registry {
    chat_input: DashMap<String, Registered>,
    user: DashMap<String, Registered>,
    message: DashMap<String, Registered>,
    next_sequence: AtomicU64,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Registry {
    pub fn new(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            chat_input: DashMap::new(),
            user: DashMap::new(),
            message: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            diagnostics,
        }
    }

    fn table(&self, kind: CommandType) -> &DashMap<String, Registered> {
        match kind {
            CommandType::ChatInput => &self.chat_input,
            CommandType::User => &self.user,
            CommandType::Message => &self.message,
        }
    }

    /// Register a command in the table for its kind. Returns the command it replaced, if any.
    pub fn insert(&self, command: Arc<Command>) -> Option<Arc<Command>> {
        let kind = command.command_type();
        let name = command.name().to_string();
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);

        let previous = self
            .table(kind)
            .insert(name.clone(), Registered { sequence, command })
            .map(|old| old.command);

        if previous.is_some() {
            self.diagnostics
                .report(Diagnostic::CommandOverridden { kind, name: name.clone() });
        }
        tracing::debug!(kind = %kind, command = %name, "Registered command");

        previous
    }

    pub fn get(&self, kind: CommandType, name: &str) -> Option<Arc<Command>> {
        self.table(kind)
            .get(name)
            .map(|entry| Arc::clone(&entry.command))
    }

    pub fn len(&self) -> usize {
        self.chat_input.len() + self.user.len() + self.message.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every registered command: chat-input first, then user menus, then message
    /// menus, each in registration order.
    pub fn commands(&self) -> Vec<Arc<Command>> {
        [CommandType::ChatInput, CommandType::User, CommandType::Message]
            .into_iter()
            .flat_map(|kind| {
                let mut entries: Vec<Registered> = self
                    .table(kind)
                    .iter()
                    .map(|entry| entry.value().clone())
                    .collect();
                entries.sort_by_key(|entry| entry.sequence);
                entries.into_iter().map(|entry| entry.command)
            })
            .collect()
    }

    /// The full declaration list for a bulk overwrite.
    pub fn declarations(&self) -> Vec<CommandDeclaration> {
        self.commands()
            .iter()
            .map(|command| command.to_declaration())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::RecordingSink;
    use crate::discord::commands::{
        handler, Invocation, MessageContextMenuCommand, NormalCommand, UserContextMenuCommand,
    };

    fn named(mut command: Command, name: &str) -> Arc<Command> {
        command.set_name(name);
        Arc::new(command)
    }

    fn normal(description: &str) -> Command {
        NormalCommand::new(description, handler(|_: Invocation| async { Ok(()) })).into()
    }

    #[test]
    fn test_later_registration_wins_and_is_reported() {
        let sink = Arc::new(RecordingSink::new());
        let registry = Registry::new(sink.clone());

        let first = named(normal("First"), "ping");
        let second = named(normal("Second"), "ping");

        assert!(registry.insert(first.clone()).is_none());
        let replaced = registry.insert(second.clone()).unwrap();

        assert!(Arc::ptr_eq(&replaced, &first));
        let current = registry.get(CommandType::ChatInput, "ping").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::CommandOverridden {
                kind: CommandType::ChatInput,
                name: "ping".to_string(),
            }]
        );
    }

    #[test]
    fn test_tables_are_independent() {
        let sink = Arc::new(RecordingSink::new());
        let registry = Registry::new(sink.clone());
        let noop = handler(|_: Invocation| async { Ok(()) });

        registry.insert(named(normal("Show"), "inspect"));
        registry.insert(named(UserContextMenuCommand::new(noop.clone()).into(), "inspect"));
        registry.insert(named(MessageContextMenuCommand::new(noop).into(), "inspect"));

        assert_eq!(registry.len(), 3);
        assert!(sink.entries().is_empty());
        assert!(registry.get(CommandType::User, "inspect").is_some());
        assert!(registry.get(CommandType::Message, "missing").is_none());
    }

    #[test]
    fn test_declarations_follow_kind_then_registration_order() {
        let registry = Registry::new(Arc::new(RecordingSink::new()));
        let noop = handler(|_: Invocation| async { Ok(()) });

        registry.insert(named(UserContextMenuCommand::new(noop).into(), "Inspect"));
        registry.insert(named(normal("Ping"), "ping"));
        registry.insert(named(normal("Echo"), "echo"));

        let names: Vec<String> = registry
            .declarations()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["ping", "echo", "Inspect"]);
    }
}
