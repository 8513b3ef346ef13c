use crate::core::commands::CommandDeclaration;
use crate::discord::publisher::{CommandPublisher, PublishScope};
use async_trait::async_trait;
use serenity::all::{ApplicationId, GuildId, Http};
use std::sync::Arc;

/// Publishes through serenity's bulk-overwrite endpoints (`PUT .../commands`).
pub struct HttpPublisher {
    http: Arc<Http>,
    scope: PublishScope,
}

impl HttpPublisher {
    /// Build a publisher with its own HTTP client for `token`.
    pub fn new(token: &str, application_id: ApplicationId, scope: PublishScope) -> Self {
        let http = Http::new(token);
        http.set_application_id(application_id);
        Self::with_http(Arc::new(http), scope)
    }

    /// Reuse an existing client (it must already know the application id).
    pub fn with_http(http: Arc<Http>, scope: PublishScope) -> Self {
        Self { http, scope }
    }

    pub fn scope(&self) -> PublishScope {
        self.scope
    }
}

#[async_trait]
impl CommandPublisher for HttpPublisher {
    async fn replace_commands(
        &self,
        declarations: &[CommandDeclaration],
    ) -> Result<usize, serenity::Error> {
        let registered = match self.scope {
            PublishScope::Global => self.http.create_global_commands(&declarations).await?,
            PublishScope::Guild(guild_id) => {
                self.http
                    .create_guild_commands(GuildId::new(guild_id), &declarations)
                    .await?
            }
        };

        tracing::info!(
            scope = ?self.scope,
            count = registered.len(),
            "Published application commands"
        );
        Ok(registered.len())
    }
}
