// The interaction-shaped value every command handler receives.
//
// Live invocations wrap the serenity context and interaction so handlers can
// respond. Detached invocations carry only the routing fields; the dispatcher
// never needs more than those, which keeps routing testable without a gateway.

use crate::core::commands::CommandType;
use crate::discord::Error;
use serenity::all::{
    CommandDataOptionValue, CommandInteraction, CommandType as PlatformCommandType, Context,
};
use std::fmt;
use std::sync::Arc;

/// The serenity handles behind a live invocation.
#[derive(Clone)]
pub struct PlatformInteraction {
    pub ctx: Context,
    pub interaction: CommandInteraction,
}

#[derive(Clone)]
pub struct Invocation {
    kind: CommandType,
    command_name: String,
    subcommand_name: Option<String>,
    platform: Option<Arc<PlatformInteraction>>,
}

impl Invocation {
    /// Classify a gateway interaction. Returns `None` for command types this
    /// crate doesn't route (entry points and future kinds).
    pub fn from_interaction(ctx: Context, interaction: CommandInteraction) -> Option<Self> {
        let kind = match interaction.data.kind {
            PlatformCommandType::ChatInput => CommandType::ChatInput,
            PlatformCommandType::User => CommandType::User,
            PlatformCommandType::Message => CommandType::Message,
            _ => return None,
        };

        // A category invocation carries its selected subcommand as the first option.
        let subcommand_name = match kind {
            CommandType::ChatInput => interaction.data.options.first().and_then(|option| {
                match option.value {
                    CommandDataOptionValue::SubCommand(_) => Some(option.name.clone()),
                    _ => None,
                }
            }),
            _ => None,
        };

        Some(Self {
            kind,
            command_name: interaction.data.name.clone(),
            subcommand_name,
            platform: Some(Arc::new(PlatformInteraction { ctx, interaction })),
        })
    }

    /// An invocation with no gateway behind it.
    pub fn detached(kind: CommandType, command_name: impl Into<String>) -> Self {
        Self {
            kind,
            command_name: command_name.into(),
            subcommand_name: None,
            platform: None,
        }
    }

    pub fn with_subcommand(mut self, name: impl Into<String>) -> Self {
        self.subcommand_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> CommandType {
        self.kind
    }

    pub fn is_chat_input(&self) -> bool {
        self.kind == CommandType::ChatInput
    }

    pub fn is_user_menu(&self) -> bool {
        self.kind == CommandType::User
    }

    pub fn is_message_menu(&self) -> bool {
        self.kind == CommandType::Message
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn subcommand_name(&self) -> Option<&str> {
        self.subcommand_name.as_deref()
    }

    /// The serenity context and interaction, for handlers that need to reply.
    pub fn platform(&self) -> Result<&PlatformInteraction, Error> {
        self.platform
            .as_deref()
            .ok_or_else(|| "Invocation is not attached to a gateway interaction".into())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("kind", &self.kind)
            .field("command_name", &self.command_name)
            .field("subcommand_name", &self.subcommand_name)
            .field(
                "interaction_id",
                &self.platform.as_ref().map(|p| p.interaction.id.get()),
            )
            .finish()
    }
}
