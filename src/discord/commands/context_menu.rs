// Right-click commands on a user or a message. They take no options and no
// description; the platform shows the name straight in the context menu.

use super::handler::Handler;
use crate::core::commands::{
    permission_bits, CommandDeclaration, CommandType, Localizations, Permissions,
};
use std::fmt;

macro_rules! context_menu_command {
    ($(#[$meta:meta])* $ty:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $ty {
            name: String,
            name_localizations: Localizations,
            permissions: Option<Permissions>,
            handler: Handler,
        }

        impl $ty {
            pub fn new(handler: Handler) -> Self {
                Self {
                    name: String::new(),
                    name_localizations: Localizations::new(),
                    permissions: None,
                    handler,
                }
            }

            pub fn with_permissions(mut self, permissions: Permissions) -> Self {
                self.permissions = Some(permissions);
                self
            }

            pub fn with_name_localizations(mut self, localizations: Localizations) -> Self {
                self.name_localizations = localizations;
                self
            }

            pub fn name(&self) -> &str {
                &self.name
            }

            pub fn permissions(&self) -> Option<Permissions> {
                self.permissions
            }

            pub fn handler(&self) -> &Handler {
                &self.handler
            }

            pub(crate) fn set_name(&mut self, name: impl Into<String>) {
                self.name = name.into();
            }

            pub fn to_declaration(&self) -> CommandDeclaration {
                CommandDeclaration {
                    kind: $kind,
                    name: self.name.clone(),
                    name_localizations: self.name_localizations.clone(),
                    description: String::new(),
                    description_localizations: Localizations::new(),
                    options: Vec::new(),
                    default_member_permissions: self.permissions.map(permission_bits),
                }
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    .field("name", &self.name)
                    .field("permissions", &self.permissions)
                    .finish_non_exhaustive()
            }
        }
    };
}

context_menu_command!(
    /// Invoked on a selected user ("Apps" menu on a member).
    UserContextMenuCommand,
    CommandType::User
);

context_menu_command!(
    /// Invoked on a selected message.
    MessageContextMenuCommand,
    CommandType::Message
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::commands::handler::handler;
    use crate::discord::commands::invocation::Invocation;

    #[test]
    fn test_menu_declarations_use_their_own_type() {
        let noop = handler(|_: Invocation| async { Ok(()) });

        let mut user = UserContextMenuCommand::new(noop.clone())
            .with_permissions(Permissions::KICK_MEMBERS);
        user.set_name("Inspect");
        let mut message = MessageContextMenuCommand::new(noop);
        message.set_name("Report");

        let user = user.to_declaration();
        assert_eq!(user.kind, CommandType::User);
        assert_eq!(user.name, "Inspect");
        assert!(user.description.is_empty());
        assert_eq!(user.default_member_permissions.as_deref(), Some("2"));

        let message = message.to_declaration();
        assert_eq!(message.kind, CommandType::Message);
        assert_eq!(message.default_member_permissions, None);
    }
}
