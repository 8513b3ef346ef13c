use super::handler::Handler;
use super::normal::SubCommand;
use crate::core::commands::{
    permission_bits, CommandDeclaration, CommandType, Localizations, Permissions,
};
use crate::discord::module::ModuleError;
use std::collections::BTreeMap;

/// A chat-input command with no handler of its own: it routes to one of its
/// subcommands based on the subcommand the user picked.
///
/// Subcommands are kept sorted by name, which is also the order they are declared
/// to the platform. Once the category is inside a [`Module`](crate::discord::Module)
/// the map can no longer change.
#[derive(Clone, Debug)]
pub struct CategoryCommand {
    name: String,
    name_localizations: Localizations,
    description: String,
    description_localizations: Localizations,
    permissions: Option<Permissions>,
    subcommands: BTreeMap<String, SubCommand>,
}

impl CategoryCommand {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            name_localizations: Localizations::new(),
            description: description.into(),
            description_localizations: Localizations::new(),
            permissions: None,
            subcommands: BTreeMap::new(),
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

    pub fn with_description_localizations(mut self, localizations: Localizations) -> Self {
        self.description_localizations = localizations;
        self
    }

    /// Add a subcommand under `name`. A name can only be used once per category.
    pub fn subcommand(
        mut self,
        name: impl Into<String>,
        subcommand: SubCommand,
    ) -> Result<Self, ModuleError> {
        self.insert_subcommand(name.into(), subcommand)?;
        Ok(self)
    }

    pub(crate) fn insert_subcommand(
        &mut self,
        name: String,
        mut subcommand: SubCommand,
    ) -> Result<(), ModuleError> {
        if self.subcommands.contains_key(&name) {
            return Err(ModuleError::DuplicateSubcommand {
                category: self.name.clone(),
                name,
            });
        }
        subcommand.set_name(name.clone());
        self.subcommands.insert(name, subcommand);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn permissions(&self) -> Option<Permissions> {
        self.permissions
    }

    pub fn subcommand_names(&self) -> impl Iterator<Item = &str> {
        self.subcommands.keys().map(String::as_str)
    }

    pub fn subcommands(&self) -> impl Iterator<Item = &SubCommand> {
        self.subcommands.values()
    }

    pub fn get(&self, name: &str) -> Option<&SubCommand> {
        self.subcommands.get(name)
    }

    pub fn len(&self) -> usize {
        self.subcommands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcommands.is_empty()
    }

    /// The handler for the picked subcommand, if the category has one by that name.
    pub fn route(&self, subcommand: Option<&str>) -> Option<&Handler> {
        subcommand
            .and_then(|name| self.subcommands.get(name))
            .map(SubCommand::handler)
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn to_declaration(&self) -> CommandDeclaration {
        CommandDeclaration {
            kind: CommandType::ChatInput,
            name: self.name.clone(),
            name_localizations: self.name_localizations.clone(),
            description: self.description.clone(),
            description_localizations: self.description_localizations.clone(),
            options: self.subcommands.values().map(SubCommand::to_declaration).collect(),
            default_member_permissions: self.permissions.map(permission_bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::{CommandOption, OptionType};
    use crate::discord::commands::handler::handler;
    use crate::discord::commands::invocation::Invocation;

    fn sub(description: &str) -> SubCommand {
        SubCommand::new(description, handler(|_: Invocation| async { Ok(()) }))
    }

    #[test]
    fn test_declaration_embeds_subcommands_in_name_order() {
        let mut category = CategoryCommand::new("Moderation tools")
            .with_permissions(Permissions::MODERATE_MEMBERS)
            .subcommand("kick", sub("Kick a member"))
            .unwrap()
            .subcommand(
                "ban",
                sub("Ban a member").option(CommandOption::user("target", "Who").required()),
            )
            .unwrap();
        category.set_name("mod");

        let declaration = category.to_declaration();
        assert_eq!(declaration.name, "mod");
        assert_eq!(declaration.options.len(), 2);
        assert_eq!(declaration.options[0].name, "ban");
        assert_eq!(declaration.options[0].kind, OptionType::SubCommand);
        assert_eq!(declaration.options[0].options.len(), 1);
        assert_eq!(declaration.options[1].name, "kick");
        assert_eq!(
            declaration.default_member_permissions,
            Some(Permissions::MODERATE_MEMBERS.bits().to_string())
        );
    }

    #[test]
    fn test_localizations_reach_the_declaration() {
        let names = Localizations::from([("de".to_string(), "moderation".to_string())]);
        let descriptions = Localizations::from([("de".to_string(), "Werkzeuge".to_string())]);
        let mut category = CategoryCommand::new("Moderation tools")
            .with_name_localizations(names.clone())
            .with_description_localizations(descriptions.clone())
            .subcommand("ban", sub("Ban a member").localize_name("de", "bannen"))
            .unwrap();
        category.set_name("mod");

        let declaration = category.to_declaration();
        assert_eq!(declaration.name_localizations, names);
        assert_eq!(declaration.description_localizations, descriptions);
        assert_eq!(declaration.options[0].name_localizations["de"], "bannen");
    }

    #[test]
    fn test_duplicate_subcommand_is_rejected() {
        let result = CategoryCommand::new("Moderation tools")
            .subcommand("ban", sub("Ban"))
            .unwrap()
            .subcommand("ban", sub("Ban again"));

        assert!(matches!(
            result,
            Err(ModuleError::DuplicateSubcommand { ref name, .. }) if name == "ban"
        ));
    }

    #[test]
    fn test_route_misses_without_panicking() {
        let category = CategoryCommand::new("Moderation tools")
            .subcommand("ban", sub("Ban"))
            .unwrap();

        assert!(category.route(Some("ban")).is_some());
        assert!(category.route(Some("warn")).is_none());
        assert!(category.route(None).is_none());
    }
}
