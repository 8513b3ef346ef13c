// JSON module files.
//
//   { "type": "command", "description": "Check latency", "options": [...],
//     "permissions": ["MANAGE_GUILD"], "handler": "ping" }
//
// `type` is one of command, category, subcommand, user_menu, message_menu, event.
// `handler` defaults to the file's lookup key. A `name` field may be present but
// is never used; the file name decides.

use super::handler_table::HandlerTable;
use super::{DiscoveryError, Export, ModuleLoader, SourceFile};
use crate::core::commands::{permissions_from_names, CommandOption, Localizations, Permissions};
use crate::discord::commands::{
    CategoryCommand, Handler, MessageContextMenuCommand, NormalCommand, SubCommand,
    UserContextMenuCommand,
};
use crate::discord::events::{EventHandler, EventName};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Manifest {
    Command(CommandManifest),
    Category(CategoryManifest),
    Subcommand(SubcommandManifest),
    UserMenu(ContextMenuManifest),
    MessageMenu(ContextMenuManifest),
    Event(EventManifest),
}

#[derive(Debug, Deserialize)]
pub struct CommandManifest {
    #[serde(default)]
    pub name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub name_localizations: Localizations,
    #[serde(default)]
    pub description_localizations: Localizations,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    /// Absent: anyone may use it. Present but empty: administrators only.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub handler: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryManifest {
    #[serde(default)]
    pub name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub name_localizations: Localizations,
    #[serde(default)]
    pub description_localizations: Localizations,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SubcommandManifest {
    #[serde(default)]
    pub name: Option<String>,
    pub description: String,
    #[serde(default)]
    pub name_localizations: Localizations,
    #[serde(default)]
    pub description_localizations: Localizations,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub handler: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContextMenuManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_localizations: Localizations,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default)]
    pub handler: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventManifest {
    pub event: String,
    #[serde(default)]
    pub handler: Option<String>,
}

impl Manifest {
    fn declared_name(&self) -> Option<&str> {
        match self {
            Manifest::Command(m) => m.name.as_deref(),
            Manifest::Category(m) => m.name.as_deref(),
            Manifest::Subcommand(m) => m.name.as_deref(),
            Manifest::UserMenu(m) | Manifest::MessageMenu(m) => m.name.as_deref(),
            Manifest::Event(_) => None,
        }
    }
}

/// Loads JSON manifests and binds them to handlers from a [`HandlerTable`].
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    handlers: HandlerTable,
}

impl ManifestLoader {
    pub fn new(handlers: HandlerTable) -> Self {
        Self { handlers }
    }

    /// Turn manifest text for `source` into its export.
    pub fn parse(&self, source: &SourceFile, text: &str) -> Result<Export, DiscoveryError> {
        let manifest: Manifest =
            serde_json::from_str(text).map_err(|err| DiscoveryError::Malformed {
                path: source.path.clone(),
                source: err,
            })?;

        if let Some(declared) = manifest.declared_name() {
            if declared != source.name {
                tracing::debug!(
                    path = %source.path.display(),
                    declared,
                    name = %source.name,
                    "Ignoring declared name in favour of the file name"
                );
            }
        }

        let export = match manifest {
            Manifest::Command(m) => {
                let handler = self.command_handler(source, m.handler.as_deref())?;
                let mut command = NormalCommand::new(m.description, handler)
                    .with_options(m.options)
                    .with_name_localizations(m.name_localizations)
                    .with_description_localizations(m.description_localizations);
                if let Some(permissions) = permissions(source, m.permissions)? {
                    command = command.with_permissions(permissions);
                }
                Export::Command(command.into())
            }
            Manifest::Category(m) => {
                let mut category = CategoryCommand::new(m.description)
                    .with_name_localizations(m.name_localizations)
                    .with_description_localizations(m.description_localizations);
                if let Some(permissions) = permissions(source, m.permissions)? {
                    category = category.with_permissions(permissions);
                }
                Export::Command(category.into())
            }
            Manifest::Subcommand(m) => {
                let handler = self.command_handler(source, m.handler.as_deref())?;
                let subcommand = SubCommand::new(m.description, handler)
                    .with_options(m.options)
                    .with_name_localizations(m.name_localizations)
                    .with_description_localizations(m.description_localizations);
                Export::SubCommand(subcommand)
            }
            Manifest::UserMenu(m) => {
                let handler = self.command_handler(source, m.handler.as_deref())?;
                let mut command =
                    UserContextMenuCommand::new(handler).with_name_localizations(m.name_localizations);
                if let Some(permissions) = permissions(source, m.permissions)? {
                    command = command.with_permissions(permissions);
                }
                Export::Command(command.into())
            }
            Manifest::MessageMenu(m) => {
                let handler = self.command_handler(source, m.handler.as_deref())?;
                let mut command = MessageContextMenuCommand::new(handler)
                    .with_name_localizations(m.name_localizations);
                if let Some(permissions) = permissions(source, m.permissions)? {
                    command = command.with_permissions(permissions);
                }
                Export::Command(command.into())
            }
            Manifest::Event(m) => Export::Event(self.event_handler(source, m)?),
        };

        Ok(export)
    }

    fn command_handler(
        &self,
        source: &SourceFile,
        key: Option<&str>,
    ) -> Result<Handler, DiscoveryError> {
        let key = key.unwrap_or(&source.key);
        self.handlers
            .get_command(key)
            .ok_or_else(|| DiscoveryError::MissingHandler {
                path: source.path.clone(),
                key: key.to_string(),
            })
    }

    fn event_handler(
        &self,
        source: &SourceFile,
        manifest: EventManifest,
    ) -> Result<EventHandler, DiscoveryError> {
        if manifest.event != source.name {
            return Err(DiscoveryError::EventMismatch {
                path: source.path.clone(),
                file_name: source.name.clone(),
                declared: manifest.event,
            });
        }

        let event: EventName =
            manifest
                .event
                .parse()
                .map_err(|err| DiscoveryError::InvalidEvent {
                    path: source.path.clone(),
                    source: err,
                })?;

        let key = manifest.handler.as_deref().unwrap_or(event.as_str());
        let callback = self
            .handlers
            .get_event(key)
            .ok_or_else(|| DiscoveryError::MissingHandler {
                path: source.path.clone(),
                key: key.to_string(),
            })?;

        Ok(EventHandler::from_callback(event, callback))
    }
}

fn permissions(
    source: &SourceFile,
    names: Option<Vec<String>>,
) -> Result<Option<Permissions>, DiscoveryError> {
    names
        .map(|names| {
            permissions_from_names(&names).map_err(|err| DiscoveryError::Permission {
                path: source.path.clone(),
                source: err,
            })
        })
        .transpose()
}

#[async_trait]
impl ModuleLoader for ManifestLoader {
    async fn load(&self, source: &SourceFile) -> Result<Export, DiscoveryError> {
        let text = fs::read_to_string(&source.path)
            .await
            .map_err(|err| DiscoveryError::Io {
                path: source.path.clone(),
                source: err,
            })?;
        self.parse(source, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::{CommandType, OptionType};
    use crate::discord::commands::{Command, Invocation};
    use std::path::PathBuf;

    fn source(name: &str, key: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(format!("bot/commands/{key}.json")),
            name: name.to_string(),
            key: key.to_string(),
        }
    }

    fn loader() -> ManifestLoader {
        ManifestLoader::new(
            HandlerTable::new()
                .command("ping", |_: Invocation| async { Ok(()) })
                .command("avatar", |_: Invocation| async { Ok(()) })
                .command("shared", |_: Invocation| async { Ok(()) })
                .event("ready", |_, _| async { Ok(()) }),
        )
    }

    fn command(export: Export) -> Command {
        match export {
            Export::Command(command) => command,
            other => panic!("expected a command, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_command_manifest_with_options_and_permissions() {
        let text = r#"{
            "type": "command",
            "description": "Check latency",
            "description_localizations": { "de": "Latenz prüfen" },
            "permissions": ["manage_guild", "BAN_MEMBERS"],
            "options": [
                { "type": "integer", "name": "count", "description": "How many", "min_value": 1 }
            ]
        }"#;

        let mut command = command(loader().parse(&source("ping", "ping"), text).unwrap());
        command.set_name("ping");
        let declaration = command.to_declaration();

        assert_eq!(declaration.kind, CommandType::ChatInput);
        assert_eq!(declaration.description_localizations["de"], "Latenz prüfen");
        assert_eq!(declaration.options[0].kind, OptionType::Integer);
        assert_eq!(
            declaration.default_member_permissions.as_deref(),
            Some((Permissions::MANAGE_GUILD | Permissions::BAN_MEMBERS).bits().to_string().as_str())
        );
    }

    #[test]
    fn test_empty_permission_list_restricts_to_admins() {
        let text = r#"{ "type": "category", "description": "Admin", "permissions": [] }"#;
        let command = command(loader().parse(&source("admin", "admin"), text).unwrap());
        assert_eq!(
            command.to_declaration().default_member_permissions.as_deref(),
            Some("0")
        );
    }

    #[test]
    fn test_unknown_permission_is_rejected() {
        let text = r#"{ "type": "command", "description": "Ping", "permissions": ["FLY"] }"#;
        let err = loader().parse(&source("ping", "ping"), text).err().unwrap();
        assert!(matches!(err, DiscoveryError::Permission { .. }));
    }

    #[test]
    fn test_context_menu_manifests() {
        let user = r#"{ "type": "user_menu" }"#;
        let message = r#"{ "type": "message_menu", "handler": "shared" }"#;

        let user = command(loader().parse(&source("avatar", "avatar"), user).unwrap());
        let message = command(loader().parse(&source("quote", "quote"), message).unwrap());

        assert_eq!(user.command_type(), CommandType::User);
        assert_eq!(message.command_type(), CommandType::Message);
    }

    #[test]
    fn test_explicit_handler_key() {
        let text = r#"{ "type": "command", "description": "Echo", "handler": "missing" }"#;
        let err = loader().parse(&source("echo", "echo"), text).err().unwrap();
        assert!(matches!(err, DiscoveryError::MissingHandler { ref key, .. } if key == "missing"));
    }

    #[test]
    fn test_event_manifest() {
        let export = loader()
            .parse(&source("ready", "ready"), r#"{ "type": "event", "event": "ready" }"#)
            .unwrap();
        match export {
            Export::Event(handler) => assert_eq!(handler.event(), &EventName::READY),
            other => panic!("expected an event handler, got {}", other.type_name()),
        }

        let err = loader()
            .parse(&source("Warp", "Warp"), r#"{ "type": "event", "event": "Warp" }"#)
            .err()
            .unwrap();
        assert!(matches!(err, DiscoveryError::InvalidEvent { .. }));
    }

    #[test]
    fn test_unknown_manifest_type() {
        let err = loader()
            .parse(&source("ping", "ping"), r#"{ "type": "widget" }"#)
            .err()
            .unwrap();
        assert!(matches!(err, DiscoveryError::Malformed { .. }));
    }
}
