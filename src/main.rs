// Demo bot: discovers the modules under BOT_MODULES_DIR (demo_bot/ by default),
// publishes their commands and connects to the gateway.
//
// 1. Load configuration
// 2. Discover modules, binding manifests to the handlers in demo_handlers.rs
// 3. Publish the command list in one batch
// 4. Start the client

mod demo_handlers;

use discord_modules::{
    on_error, Bot, BotConfig, BotOptions, Discovery, ManifestLoader, PublishScope,
};
use serenity::all::ApplicationId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    let discovery = Discovery::new(ManifestLoader::new(demo_handlers::handlers()));
    let module = discovery.discover(&config.modules_dir).await?;

    let scope = config
        .dev_guild_id
        .map_or(PublishScope::Global, PublishScope::Guild);

    let options = BotOptions::new(ApplicationId::new(config.application_id), config.token)
        .scope(scope)
        .on_error(on_error(|failure| async move {
            tracing::error!(
                command = %failure.command.name(),
                subcommand = ?failure.invocation.subcommand_name(),
                error = %failure.error,
                "Command failed"
            );
        }));

    let bot = Bot::new(options);
    bot.add_modules([module]);

    let published = bot.refresh_commands().await?;
    tracing::info!(published, "Commands are live");

    bot.start().await?;
    Ok(())
}
