// The surface a bot author actually touches.
//
// 1. Build options (application id, token, intents, error handler)
// 2. Add modules (from discovery or the module builder)
// 3. Publish the command list once
// 4. Start the gateway client with the dispatcher plugged in as its framework

use crate::core::diagnostics::{DiagnosticSink, TracingSink};
use crate::discord::dispatcher::{Dispatcher, ErrorHandler};
use crate::discord::module::Module;
use crate::discord::publisher::{CommandPublisher, PublishScope};
use crate::infra::publisher::HttpPublisher;
use async_trait::async_trait;
use serenity::all::{ApplicationId, ClientBuilder, Context, FullEvent, GatewayIntents};
use serenity::framework::Framework;
use std::sync::Arc;

pub struct BotOptions {
    pub application_id: ApplicationId,
    pub token: String,
    pub intents: GatewayIntents,
    pub scope: PublishScope,
    pub on_error: Option<ErrorHandler>,
    pub diagnostics: Arc<dyn DiagnosticSink>,
}

impl BotOptions {
    pub fn new(application_id: ApplicationId, token: impl Into<String>) -> Self {
        Self {
            application_id,
            token: token.into(),
            intents: GatewayIntents::non_privileged(),
            scope: PublishScope::Global,
            on_error: None,
            diagnostics: Arc::new(TracingSink),
        }
    }

    pub fn intents(mut self, intents: GatewayIntents) -> Self {
        self.intents = intents;
        self
    }

    pub fn scope(mut self, scope: PublishScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn on_error(mut self, on_error: ErrorHandler) -> Self {
        self.on_error = Some(on_error);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

pub struct Bot<P = HttpPublisher> {
    application_id: ApplicationId,
    token: String,
    intents: GatewayIntents,
    dispatcher: Arc<Dispatcher>,
    publisher: P,
}

impl Bot<HttpPublisher> {
    pub fn new(options: BotOptions) -> Self {
        let publisher = HttpPublisher::new(&options.token, options.application_id, options.scope);
        Self::with_publisher(options, publisher)
    }
}

impl<P: CommandPublisher> Bot<P> {
    pub fn with_publisher(options: BotOptions, publisher: P) -> Self {
        Self {
            application_id: options.application_id,
            token: options.token,
            intents: options.intents,
            dispatcher: Arc::new(Dispatcher::new(options.diagnostics, options.on_error)),
            publisher,
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn add_modules<I>(&self, modules: I)
    where
        I: IntoIterator<Item = Module>,
    {
        self.dispatcher.add_modules(modules);
    }

    /// Replace the platform's command set with everything currently registered.
    /// Call once after the last `add_modules`; transport errors come back untouched.
    pub async fn refresh_commands(&self) -> Result<usize, serenity::Error> {
        let declarations = self.dispatcher.registry().declarations();
        tracing::info!(count = declarations.len(), "Refreshing application commands");
        self.publisher.replace_commands(&declarations).await
    }

    /// Log in and run the gateway client until it shuts down.
    pub async fn start(&self) -> Result<(), serenity::Error> {
        let framework = DispatchFramework {
            dispatcher: Arc::clone(&self.dispatcher),
        };

        let mut client = ClientBuilder::new(&self.token, self.intents)
            .application_id(self.application_id)
            .framework(framework)
            .await?;

        tracing::info!("Starting gateway client");
        client.start().await
    }
}

/// Hands every gateway event serenity receives to the dispatcher.
struct DispatchFramework {
    dispatcher: Arc<Dispatcher>,
}

#[async_trait]
impl Framework for DispatchFramework {
    async fn dispatch(&self, ctx: Context, event: FullEvent) {
        self.dispatcher.handle_event(ctx, event).await;
    }
}
