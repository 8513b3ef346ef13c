// Wire shapes for the platform's application-command schema.
// These are what `Command::to_declaration` produces and what the publisher sends
// in one bulk-overwrite call. Empty collections are skipped so the payload stays
// identical to what the platform echoes back.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Locale code (`"de"`, `"pt-BR"`, ...) to translated text.
/// A BTreeMap keeps serialization order stable between publishes.
pub type Localizations = BTreeMap<String, String>;

/// The three kinds of invocable command, which also name the three registry tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    ChatInput,
    User,
    Message,
}

impl CommandType {
    pub fn code(self) -> u8 {
        match self {
            CommandType::ChatInput => 1,
            CommandType::User => 2,
            CommandType::Message => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandType::ChatInput => "chat-input",
            CommandType::User => "user-menu",
            CommandType::Message => "message-menu",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CommandType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Platform option type codes. `SubCommand` only ever appears inside a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionType {
    SubCommand,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl OptionType {
    pub fn code(self) -> u8 {
        match self {
            OptionType::SubCommand => 1,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
        }
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A min/max bound. Integer options keep integer bounds, number options keep floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ValueBound {
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceDeclaration {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: Localizations,
    pub value: ChoiceValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDeclaration {
    #[serde(rename = "type")]
    pub kind: OptionType,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: Localizations,
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: Localizations,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceDeclaration>,
    /// Nested options; only populated for subcommand entries.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDeclaration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<ValueBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<ValueBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
}

impl OptionDeclaration {
    /// A bare declaration of the given kind; callers fill in kind-specific fields.
    pub fn new(kind: OptionType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            name_localizations: Localizations::new(),
            description: description.into(),
            description_localizations: Localizations::new(),
            required: false,
            choices: Vec::new(),
            options: Vec::new(),
            channel_types: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
        }
    }
}

/// One top-level entry in the bulk-overwrite payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandDeclaration {
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub name_localizations: Localizations,
    /// Context-menu commands carry no description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub description_localizations: Localizations,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDeclaration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
}
