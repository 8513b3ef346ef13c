// Routes gateway traffic to the handlers modules registered.
//
// Command interactions are looked up by (kind, name) in the registry and run
// exactly once. Nothing a handler does can escape into serenity's event loop:
// errors and panics are caught here and handed to the error handler, or to the
// diagnostic sink when the host didn't configure one.

use crate::core::diagnostics::{Diagnostic, DiagnosticSink};
use crate::discord::commands::{Command, Invocation};
use crate::discord::events::{EventHandler, EventName};
use crate::discord::module::Module;
use crate::discord::registry::Registry;
use crate::discord::Error;
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use serenity::all::{Context, FullEvent, Interaction};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Everything an error handler gets to see about a failed command.
pub struct HandlerFailure {
    pub command: Arc<Command>,
    pub invocation: Invocation,
    pub error: Error,
}

pub type ErrorHandler = Arc<dyn Fn(HandlerFailure) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure into an [`ErrorHandler`].
pub fn on_error<F, Fut>(f: F) -> ErrorHandler
where
    F: Fn(HandlerFailure) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |failure| Box::pin(f(failure)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran and returned `Ok`.
    Handled,
    /// No command with that name in the table for the interaction's kind.
    UnknownCommand,
    /// The category exists but has no subcommand by the picked name.
    UnknownSubcommand,
    /// The handler ran and failed (error or panic).
    Failed,
}

pub struct Dispatcher {
    registry: Registry,
    subscriptions: DashMap<EventName, Vec<EventHandler>>,
    on_error: Option<ErrorHandler>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl Dispatcher {
    pub fn new(diagnostics: Arc<dyn DiagnosticSink>, on_error: Option<ErrorHandler>) -> Self {
        Self {
            registry: Registry::new(Arc::clone(&diagnostics)),
            subscriptions: DashMap::new(),
            on_error,
            diagnostics,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Merge modules into the registry and subscribe their event handlers.
    ///
    /// Commands replace same-named commands of the same kind. Event handlers are
    /// additive: every subscription runs, in the order it was added.
    /// Calls from separate tasks must not interleave.
    pub fn add_modules<I>(&self, modules: I)
    where
        I: IntoIterator<Item = Module>,
    {
        for module in modules {
            self.add_module(&module);
        }
    }

    pub fn add_module(&self, module: &Module) {
        for command in module.commands() {
            self.registry.insert(Arc::clone(command));
        }

        for handler in module.events() {
            self.subscriptions
                .entry(handler.event().clone())
                .or_default()
                .push(handler.clone());
        }

        tracing::info!(
            commands = module.commands().len(),
            events = module.events().len(),
            "Module added"
        );
    }

    /// Handlers subscribed to `event`, in subscription order.
    pub fn subscribers(&self, event: &str) -> Vec<EventHandler> {
        self.subscriptions
            .get(event)
            .map(|handlers| handlers.value().clone())
            .unwrap_or_default()
    }

    /// Route one command invocation. Never fails; the outcome says what happened.
    pub async fn dispatch(&self, invocation: Invocation) -> DispatchOutcome {
        let kind = invocation.kind();
        let Some(command) = self.registry.get(kind, invocation.command_name()) else {
            self.diagnostics.report(Diagnostic::UnknownCommand {
                kind,
                name: invocation.command_name().to_string(),
            });
            return DispatchOutcome::UnknownCommand;
        };

        let Some(handler) = command.resolve(invocation.subcommand_name()).cloned() else {
            self.diagnostics.report(Diagnostic::UnknownSubcommand {
                category: command.name().to_string(),
                subcommand: invocation.subcommand_name().map(str::to_string),
            });
            return DispatchOutcome::UnknownSubcommand;
        };

        tracing::debug!(
            kind = %kind,
            command = %command.name(),
            subcommand = invocation.subcommand_name().unwrap_or(""),
            "Dispatching command"
        );

        let result = AssertUnwindSafe(handler(invocation.clone()))
            .catch_unwind()
            .await;

        let error = match result {
            Ok(Ok(())) => return DispatchOutcome::Handled,
            Ok(Err(error)) => error,
            Err(panic) => Error::from(panic_message(panic)),
        };

        self.report_failure(command, invocation, error).await;
        DispatchOutcome::Failed
    }

    async fn report_failure(&self, command: Arc<Command>, invocation: Invocation, error: Error) {
        match &self.on_error {
            Some(on_error) => {
                on_error(HandlerFailure {
                    command,
                    invocation,
                    error,
                })
                .await;
            }
            None => {
                self.diagnostics.report(Diagnostic::UnhandledFailure {
                    command: command.name().to_string(),
                    error: error.to_string(),
                });
            }
        }
    }

    /// Entry point for every gateway event serenity delivers.
    pub async fn handle_event(&self, ctx: Context, event: FullEvent) {
        if let FullEvent::InteractionCreate {
            interaction: Interaction::Command(command),
        } = &event
        {
            match Invocation::from_interaction(ctx.clone(), command.clone()) {
                Some(invocation) => {
                    self.dispatch(invocation).await;
                }
                None => {
                    tracing::debug!(command = %command.data.name, "Ignoring unsupported command type");
                }
            }
        }

        let name = EventName::of(&event);
        let handlers = self.subscribers(name.as_str());
        if handlers.is_empty() {
            return;
        }

        let event = Arc::new(event);
        run_subscribers(
            name.as_str(),
            handlers
                .into_iter()
                .map(|handler| (handler.callback())(ctx.clone(), Arc::clone(&event))),
        )
        .await;
    }
}

/// Run event handlers one after another. A failing or panicking handler is
/// logged and the rest still run. Returns how many failed.
async fn run_subscribers<I, Fut>(name: &str, runs: I) -> usize
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<(), Error>>,
{
    let mut failed = 0;
    for run in runs {
        let error = match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => continue,
            Ok(Err(error)) => error,
            Err(panic) => Error::from(panic_message(panic)),
        };
        tracing::error!(event = name, error = %error, "Event handler failed");
        failed += 1;
    }
    failed
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Handler panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Handler panicked: {message}")
    } else {
        "Handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::CommandType;
    use crate::core::diagnostics::RecordingSink;
    use crate::discord::commands::{handler, CategoryCommand, NormalCommand, SubCommand};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counting(counter: &Arc<AtomicUsize>) -> crate::discord::Handler {
        let counter = Arc::clone(counter);
        handler(move |_: Invocation| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn failing() -> crate::discord::Handler {
        handler(|_: Invocation| async { Err::<(), Error>("database unavailable".into()) })
    }

    fn chat(name: &str) -> Invocation {
        Invocation::detached(CommandType::ChatInput, name)
    }

    #[tokio::test]
    async fn test_dispatch_runs_matching_handler_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(Arc::new(RecordingSink::new()), None);
        dispatcher.add_modules([Module::builder()
            .command("ping", NormalCommand::new("Ping", counting(&hits)))
            .unwrap()
            .build()]);

        assert_eq!(dispatcher.dispatch(chat("ping")).await, DispatchOutcome::Handled);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_command_is_a_quiet_miss() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(sink.clone(), None);

        assert_eq!(
            dispatcher.dispatch(chat("ghost")).await,
            DispatchOutcome::UnknownCommand
        );
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::UnknownCommand {
                kind: CommandType::ChatInput,
                name: "ghost".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_kind_selects_the_table() {
        let hits = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(Arc::new(RecordingSink::new()), None);
        dispatcher.add_modules([Module::builder()
            .command("inspect", NormalCommand::new("Inspect", counting(&hits)))
            .unwrap()
            .build()]);

        let outcome = dispatcher
            .dispatch(Invocation::detached(CommandType::User, "inspect"))
            .await;
        assert_eq!(outcome, DispatchOutcome::UnknownCommand);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_category_routes_to_subcommand() {
        let bans = Arc::new(AtomicUsize::new(0));
        let kicks = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(sink.clone(), None);
        dispatcher.add_modules([Module::builder()
            .category(
                "mod",
                CategoryCommand::new("Moderation"),
                [
                    ("ban".to_string(), SubCommand::new("Ban", counting(&bans))),
                    ("kick".to_string(), SubCommand::new("Kick", counting(&kicks))),
                ],
            )
            .unwrap()
            .build()]);

        let outcome = dispatcher.dispatch(chat("mod").with_subcommand("kick")).await;
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(kicks.load(Ordering::SeqCst), 1);
        assert_eq!(bans.load(Ordering::SeqCst), 0);

        let outcome = dispatcher.dispatch(chat("mod").with_subcommand("warn")).await;
        assert_eq!(outcome, DispatchOutcome::UnknownSubcommand);
        assert_eq!(bans.load(Ordering::SeqCst) + kicks.load(Ordering::SeqCst), 1);
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::UnknownSubcommand {
                category: "mod".to_string(),
                subcommand: Some("warn".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_later_dispatch() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(sink.clone(), None);
        dispatcher.add_modules([Module::builder()
            .command("broken", NormalCommand::new("Always fails", failing()))
            .unwrap()
            .command("ping", NormalCommand::new("Ping", counting(&hits)))
            .unwrap()
            .build()]);

        assert_eq!(dispatcher.dispatch(chat("broken")).await, DispatchOutcome::Failed);
        assert_eq!(dispatcher.dispatch(chat("ping")).await, DispatchOutcome::Handled);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::UnhandledFailure {
                command: "broken".to_string(),
                error: "database unavailable".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingSink::new()), None);
        let boom = handler(|_: Invocation| async {
            if true {
                panic!("boom");
            }
            Ok(())
        });
        dispatcher.add_modules([Module::builder()
            .command("boom", NormalCommand::new("Panics", boom))
            .unwrap()
            .build()]);

        assert_eq!(dispatcher.dispatch(chat("boom")).await, DispatchOutcome::Failed);
    }

    #[tokio::test]
    async fn test_error_handler_receives_command_and_invocation() {
        let seen: Arc<Mutex<Vec<(String, Option<String>, String)>>> = Arc::default();
        let sink = Arc::new(RecordingSink::new());
        let recorder = Arc::clone(&seen);
        let dispatcher = Dispatcher::new(
            sink.clone(),
            Some(on_error(move |failure: HandlerFailure| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().push((
                        failure.command.name().to_string(),
                        failure.invocation.subcommand_name().map(str::to_string),
                        failure.error.to_string(),
                    ));
                }
            })),
        );
        dispatcher.add_modules([Module::builder()
            .category(
                "db",
                CategoryCommand::new("Database"),
                [("migrate".to_string(), SubCommand::new("Migrate", failing()))],
            )
            .unwrap()
            .build()]);

        let outcome = dispatcher.dispatch(chat("db").with_subcommand("migrate")).await;

        assert_eq!(outcome, DispatchOutcome::Failed);
        assert_eq!(
            seen.lock().unwrap().clone(),
            vec![(
                "db".to_string(),
                Some("migrate".to_string()),
                "database unavailable".to_string()
            )]
        );
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_later_module_overrides_command() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = Dispatcher::new(sink.clone(), None);

        dispatcher.add_modules([
            Module::builder()
                .command("ping", NormalCommand::new("Old ping", counting(&first)))
                .unwrap()
                .build(),
            Module::builder()
                .command("ping", NormalCommand::new("New ping", counting(&second)))
                .unwrap()
                .build(),
        ]);

        dispatcher.dispatch(chat("ping")).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.registry().len(), 1);
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::CommandOverridden {
                kind: CommandType::ChatInput,
                name: "ping".to_string(),
            }]
        );
    }

    #[test]
    fn test_event_subscriptions_are_additive_and_ordered() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingSink::new()), None);
        let first = EventHandler::new(EventName::READY, |_, _| async { Ok(()) });
        let second = EventHandler::new(EventName::READY, |_, _| async { Ok(()) });
        let other = EventHandler::new(EventName::MESSAGE, |_, _| async { Ok(()) });

        dispatcher.add_modules([
            Module::builder().event(first.clone()).event(other).build(),
            Module::builder().event(second.clone()).build(),
        ]);

        let ready = dispatcher.subscribers("ready");
        assert_eq!(ready.len(), 2);
        assert!(Arc::ptr_eq(ready[0].callback(), first.callback()));
        assert!(Arc::ptr_eq(ready[1].callback(), second.callback()));
        assert_eq!(dispatcher.subscribers("message").len(), 1);
        assert!(dispatcher.subscribers("typing_start").is_empty());
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_stop_the_rest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);

        let runs: Vec<BoxFuture<'static, Result<(), Error>>> = vec![
            async { panic!("boom") }.boxed(),
            async { Err(Error::from("nope")) }.boxed(),
            async move {
                counted.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            }
            .boxed(),
        ];

        let failed = run_subscribers("guild_member_update", runs).await;
        assert_eq!(failed, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
