// Standalone commands and the subcommands nested under a category.
// Both share one body; the only difference is that a subcommand may not carry
// its own permission gate, so converting to a subcommand drops it.

use super::handler::Handler;
use crate::core::commands::{
    permission_bits, CommandDeclaration, CommandOption, CommandType, Localizations,
    OptionDeclaration, OptionType, Permissions,
};
use std::fmt;

/// Fields shared by every text-input command with its own handler.
#[derive(Clone)]
struct CommandBody {
    name: String,
    name_localizations: Localizations,
    description: String,
    description_localizations: Localizations,
    options: Vec<CommandOption>,
    handler: Handler,
}

impl CommandBody {
    fn new(description: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: String::new(),
            name_localizations: Localizations::new(),
            description: description.into(),
            description_localizations: Localizations::new(),
            options: Vec::new(),
            handler,
        }
    }

    fn option_declarations(&self) -> Vec<OptionDeclaration> {
        self.options.iter().map(CommandOption::to_declaration).collect()
    }
}

impl fmt::Debug for CommandBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBody")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("options", &self.options.len())
            .finish_non_exhaustive()
    }
}

// Builder methods are identical for both command shapes.
macro_rules! body_builders {
    ($ty:ty) => {
        impl $ty {
            /// The name discovery (or the module builder) assigned. Empty until then.
            pub fn name(&self) -> &str {
                &self.body.name
            }

            pub fn description(&self) -> &str {
                &self.body.description
            }

            pub fn options(&self) -> &[CommandOption] {
                &self.body.options
            }

            pub fn handler(&self) -> &Handler {
                &self.body.handler
            }

            pub fn name_localizations(&self) -> &Localizations {
                &self.body.name_localizations
            }

            pub fn description_localizations(&self) -> &Localizations {
                &self.body.description_localizations
            }

            pub fn option(mut self, option: CommandOption) -> Self {
                self.body.options.push(option);
                self
            }

            pub fn with_options(mut self, options: impl IntoIterator<Item = CommandOption>) -> Self {
                self.body.options.extend(options);
                self
            }

            pub fn localize_name(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
                self.body.name_localizations.insert(locale.into(), text.into());
                self
            }

            pub fn localize_description(
                mut self,
                locale: impl Into<String>,
                text: impl Into<String>,
            ) -> Self {
                self.body
                    .description_localizations
                    .insert(locale.into(), text.into());
                self
            }

            pub fn with_name_localizations(mut self, localizations: Localizations) -> Self {
                self.body.name_localizations = localizations;
                self
            }

            pub fn with_description_localizations(mut self, localizations: Localizations) -> Self {
                self.body.description_localizations = localizations;
                self
            }

            pub(crate) fn set_name(&mut self, name: impl Into<String>) {
                self.body.name = name.into();
            }
        }
    };
}

/// A standalone chat-input command.
#[derive(Clone, Debug)]
pub struct NormalCommand {
    body: CommandBody,
    permissions: Option<Permissions>,
}

/// A command that only exists inside a [`CategoryCommand`](super::CategoryCommand).
#[derive(Clone, Debug)]
pub struct SubCommand {
    body: CommandBody,
}

body_builders!(NormalCommand);
body_builders!(SubCommand);

impl NormalCommand {
    pub fn new(description: impl Into<String>, handler: Handler) -> Self {
        Self {
            body: CommandBody::new(description, handler),
            permissions: None,
        }
    }

    /// Require these member permissions by default. `None` (the default) lets everyone use it.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn permissions(&self) -> Option<Permissions> {
        self.permissions
    }

    /// Nest this command under a category. The permission gate does not survive.
    pub fn to_subcommand(&self) -> SubCommand {
        SubCommand {
            body: self.body.clone(),
        }
    }

    pub fn to_declaration(&self) -> CommandDeclaration {
        CommandDeclaration {
            kind: CommandType::ChatInput,
            name: self.body.name.clone(),
            name_localizations: self.body.name_localizations.clone(),
            description: self.body.description.clone(),
            description_localizations: self.body.description_localizations.clone(),
            options: self.body.option_declarations(),
            default_member_permissions: self.permissions.map(permission_bits),
        }
    }
}

impl SubCommand {
    pub fn new(description: impl Into<String>, handler: Handler) -> Self {
        Self {
            body: CommandBody::new(description, handler),
        }
    }

    /// Lift this subcommand to a standalone command. Permissions must be supplied
    /// again; `None` means no requirement, whatever the command had before.
    pub fn to_normal_command(&self, permissions: Option<Permissions>) -> NormalCommand {
        NormalCommand {
            body: self.body.clone(),
            permissions,
        }
    }

    /// Subcommands are declared as options of type `SUB_COMMAND` on their category.
    pub fn to_declaration(&self) -> OptionDeclaration {
        let mut declaration = OptionDeclaration::new(
            OptionType::SubCommand,
            &self.body.name,
            &self.body.description,
        );
        declaration.name_localizations = self.body.name_localizations.clone();
        declaration.description_localizations = self.body.description_localizations.clone();
        declaration.options = self.body.option_declarations();
        declaration
    }
}
