// Port for publishing command declarations to the platform.
// The registry only knows it has a list to send; `infra` decides how it gets there.

use crate::core::commands::CommandDeclaration;
use async_trait::async_trait;

/// Where a bulk overwrite lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishScope {
    /// Every guild the application is in. Can take a while to propagate.
    #[default]
    Global,
    /// One guild only; changes show up immediately, handy while developing.
    Guild(u64),
}

#[async_trait]
pub trait CommandPublisher: Send + Sync {
    /// Replace the platform's entire command set with `declarations`.
    /// Returns how many commands the platform now has registered.
    async fn replace_commands(
        &self,
        declarations: &[CommandDeclaration],
    ) -> Result<usize, serenity::Error>;
}
