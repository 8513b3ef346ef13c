use crate::discord::commands::{handler, Handler, Invocation};
use crate::discord::events::EventCallback;
use crate::discord::Error;
use serenity::all::{Context, FullEvent};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Handlers registered in code, looked up by manifests at discovery time.
///
/// Command keys are the file's base name (`ping`), or `category/name` for
/// subcommands (`mod/ban`). Event keys default to the event identifier.
#[derive(Clone, Default)]
pub struct HandlerTable {
    commands: HashMap<String, Handler>,
    events: HashMap<String, EventCallback>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command<F, Fut>(self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        self.command_handler(key, handler(f))
    }

    pub fn command_handler(mut self, key: impl Into<String>, handler: Handler) -> Self {
        self.commands.insert(key.into(), handler);
        self
    }

    pub fn event<F, Fut>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn(Context, Arc<FullEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Error>> + Send + 'static,
    {
        let callback: EventCallback = Arc::new(move |ctx, event| Box::pin(f(ctx, event)));
        self.events.insert(key.into(), callback);
        self
    }

    pub fn get_command(&self, key: &str) -> Option<Handler> {
        self.commands.get(key).cloned()
    }

    pub fn get_event(&self, key: &str) -> Option<EventCallback> {
        self.events.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        let mut events: Vec<&str> = self.events.keys().map(String::as_str).collect();
        commands.sort_unstable();
        events.sort_unstable();
        f.debug_struct("HandlerTable")
            .field("commands", &commands)
            .field("events", &events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandType;

    #[tokio::test]
    async fn test_lookup_by_key() {
        let table = HandlerTable::new()
            .command("ping", |_: Invocation| async { Ok(()) })
            .command("mod/ban", |_: Invocation| async { Err("banned".into()) })
            .event("ready", |_, _| async { Ok(()) });

        assert_eq!(table.len(), 3);
        assert!(table.get_event("ready").is_some());
        assert!(table.get_command("ban").is_none());

        let ban = table.get_command("mod/ban").unwrap();
        let err = ban(Invocation::detached(CommandType::ChatInput, "mod"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "banned");
    }

    #[test]
    fn test_later_registration_replaces_earlier() {
        let first = handler(|_: Invocation| async { Ok(()) });
        let second = handler(|_: Invocation| async { Ok(()) });
        let table = HandlerTable::new()
            .command_handler("ping", first)
            .command_handler("ping", second.clone());

        assert_eq!(table.len(), 1);
        assert!(Arc::ptr_eq(&table.get_command("ping").unwrap(), &second));
    }
}
