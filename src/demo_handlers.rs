// Handlers for the modules under demo_bot/. The manifests there describe each
// command; this table supplies the code they run.

use discord_modules::{Error, HandlerTable, Invocation};
use serenity::all::{
    CommandInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
    FullEvent, ResolvedOption, ResolvedTarget, ResolvedValue, User,
};
use std::sync::Arc;

pub fn handlers() -> HandlerTable {
    HandlerTable::new()
        .command("ping", ping)
        .command("mod/ban", ban)
        .command("mod/kick", kick)
        .command("avatar", avatar)
        .command("quote", quote)
        .event("ready", ready)
}

async fn ping(invocation: Invocation) -> Result<(), Error> {
    let platform = invocation.platform()?;
    reply(&platform.ctx, &platform.interaction, "Pong!").await
}

async fn ban(invocation: Invocation) -> Result<(), Error> {
    let platform = invocation.platform()?;
    let interaction = &platform.interaction;
    let guild_id = interaction
        .guild_id
        .ok_or("Moderation commands only work in a server")?;
    let target = target_user(interaction).ok_or("No member given")?;

    match reason(interaction) {
        Some(reason) => {
            guild_id
                .ban_with_reason(&platform.ctx.http, target.id, 0, &reason)
                .await?
        }
        None => guild_id.ban(&platform.ctx.http, target.id, 0).await?,
    }
    tracing::info!(guild = %guild_id, user = %target.id, "Banned member");
    reply(&platform.ctx, interaction, &format!("Banned {}.", target.name)).await
}

async fn kick(invocation: Invocation) -> Result<(), Error> {
    let platform = invocation.platform()?;
    let interaction = &platform.interaction;
    let guild_id = interaction
        .guild_id
        .ok_or("Moderation commands only work in a server")?;
    let target = target_user(interaction).ok_or("No member given")?;

    guild_id.kick(&platform.ctx.http, target.id).await?;
    tracing::info!(guild = %guild_id, user = %target.id, "Kicked member");
    reply(&platform.ctx, interaction, &format!("Kicked {}.", target.name)).await
}

async fn avatar(invocation: Invocation) -> Result<(), Error> {
    let platform = invocation.platform()?;
    let content = match platform.interaction.data.target() {
        Some(ResolvedTarget::User(user, _)) => format!("{}'s avatar: {}", user.name, user.face()),
        _ => return Err("avatar needs a user target".into()),
    };
    reply(&platform.ctx, &platform.interaction, &content).await
}

async fn quote(invocation: Invocation) -> Result<(), Error> {
    let platform = invocation.platform()?;
    let content = match platform.interaction.data.target() {
        Some(ResolvedTarget::Message(message)) => {
            format!("> {}\n- {}", message.content, message.author.name)
        }
        _ => return Err("quote needs a message target".into()),
    };
    reply(&platform.ctx, &platform.interaction, &content).await
}

async fn ready(_ctx: Context, event: Arc<FullEvent>) -> Result<(), Error> {
    if let FullEvent::Ready { data_about_bot } = event.as_ref() {
        tracing::info!(
            user = %data_about_bot.user.name,
            guilds = data_about_bot.guilds.len(),
            "Connected to Discord"
        );
    }
    Ok(())
}

/// Options passed to whichever subcommand was invoked.
fn subcommand_options(interaction: &CommandInteraction) -> Vec<ResolvedOption<'_>> {
    interaction
        .data
        .options()
        .into_iter()
        .find_map(|option| match option.value {
            ResolvedValue::SubCommand(nested) => Some(nested),
            _ => None,
        })
        .unwrap_or_default()
}

fn target_user(interaction: &CommandInteraction) -> Option<User> {
    subcommand_options(interaction)
        .into_iter()
        .find_map(|option| match option.value {
            ResolvedValue::User(user, _) => Some(user.clone()),
            _ => None,
        })
}

fn reason(interaction: &CommandInteraction) -> Option<String> {
    subcommand_options(interaction)
        .into_iter()
        .find_map(|option| match option.value {
            ResolvedValue::String(text) if option.name == "reason" => Some(text.to_string()),
            _ => None,
        })
}

async fn reply(ctx: &Context, interaction: &CommandInteraction, content: &str) -> Result<(), Error> {
    let message = CreateInteractionResponseMessage::new().content(content);
    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await?;
    Ok(())
}
