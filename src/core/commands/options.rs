use super::declaration::{
    ChoiceDeclaration, ChoiceValue, Localizations, OptionDeclaration, OptionType, ValueBound,
};
use serde::Deserialize;

/// A fixed choice offered for a string, integer or number option.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice<T> {
    pub name: String,
    #[serde(default)]
    pub name_localizations: Localizations,
    pub value: T,
}

impl<T> Choice<T> {
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            name_localizations: Localizations::new(),
            value,
        }
    }
}

/// A typed argument of a command or subcommand.
///
/// Manifests spell options as flat objects with a `type` tag:
/// `{ "type": "user", "name": "target", "description": "Who", "required": true }`.
/// An unknown `type` fails deserialization, so a bad option rejects the whole module.
/// Nothing answers autocomplete requests, so an `autocomplete` key is never published.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub name_localizations: Localizations,
    #[serde(default)]
    pub description_localizations: Localizations,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: OptionKind,
}

/// The discriminated option kind, carrying only the fields that kind accepts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    Boolean,
    User,
    Channel {
        #[serde(default)]
        channel_types: Vec<u8>,
    },
    Role,
    Attachment,
    Mentionable,
    String {
        #[serde(default)]
        choices: Vec<Choice<String>>,
        #[serde(default)]
        min_length: Option<u16>,
        #[serde(default)]
        max_length: Option<u16>,
    },
    Integer {
        #[serde(default)]
        choices: Vec<Choice<i64>>,
        #[serde(default)]
        min_value: Option<i64>,
        #[serde(default)]
        max_value: Option<i64>,
    },
    Number {
        #[serde(default)]
        choices: Vec<Choice<f64>>,
        #[serde(default)]
        min_value: Option<f64>,
        #[serde(default)]
        max_value: Option<f64>,
    },
}

impl OptionKind {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionKind::Boolean => OptionType::Boolean,
            OptionKind::User => OptionType::User,
            OptionKind::Channel { .. } => OptionType::Channel,
            OptionKind::Role => OptionType::Role,
            OptionKind::Attachment => OptionType::Attachment,
            OptionKind::Mentionable => OptionType::Mentionable,
            OptionKind::String { .. } => OptionType::String,
            OptionKind::Integer { .. } => OptionType::Integer,
            OptionKind::Number { .. } => OptionType::Number,
        }
    }
}

impl CommandOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            name_localizations: Localizations::new(),
            description_localizations: Localizations::new(),
            required: false,
            kind,
        }
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Boolean)
    }

    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::User)
    }

    pub fn role(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Role)
    }

    pub fn channel(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::Channel {
                channel_types: Vec::new(),
            },
        )
    }

    pub fn attachment(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Attachment)
    }

    pub fn mentionable(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::Mentionable)
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::String {
                choices: Vec::new(),
                min_length: None,
                max_length: None,
            },
        )
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::Integer {
                choices: Vec::new(),
                min_value: None,
                max_value: None,
            },
        )
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            OptionKind::Number {
                choices: Vec::new(),
                min_value: None,
                max_value: None,
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn localize_description(
        mut self,
        locale: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.description_localizations
            .insert(locale.into(), text.into());
        self
    }

    /// Convert to the platform's option shape. The kind tag is carried across as-is.
    pub fn to_declaration(&self) -> OptionDeclaration {
        let mut declaration =
            OptionDeclaration::new(self.kind.option_type(), &self.name, &self.description);
        declaration.name_localizations = self.name_localizations.clone();
        declaration.description_localizations = self.description_localizations.clone();
        declaration.required = self.required;

        match &self.kind {
            OptionKind::Boolean
            | OptionKind::User
            | OptionKind::Role
            | OptionKind::Attachment
            | OptionKind::Mentionable => {}
            OptionKind::Channel { channel_types } => {
                declaration.channel_types = channel_types.clone();
            }
            OptionKind::String {
                choices,
                min_length,
                max_length,
            } => {
                declaration.choices = choices
                    .iter()
                    .map(|c| choice_declaration(c, ChoiceValue::String(c.value.clone())))
                    .collect();
                declaration.min_length = *min_length;
                declaration.max_length = *max_length;
            }
            OptionKind::Integer {
                choices,
                min_value,
                max_value,
            } => {
                declaration.choices = choices
                    .iter()
                    .map(|c| choice_declaration(c, ChoiceValue::Integer(c.value)))
                    .collect();
                declaration.min_value = min_value.map(ValueBound::Integer);
                declaration.max_value = max_value.map(ValueBound::Integer);
            }
            OptionKind::Number {
                choices,
                min_value,
                max_value,
            } => {
                declaration.choices = choices
                    .iter()
                    .map(|c| choice_declaration(c, ChoiceValue::Number(c.value)))
                    .collect();
                declaration.min_value = min_value.map(ValueBound::Number);
                declaration.max_value = max_value.map(ValueBound::Number);
            }
        }

        declaration
    }
}

fn choice_declaration<T>(choice: &Choice<T>, value: ChoiceValue) -> ChoiceDeclaration {
    ChoiceDeclaration {
        name: choice.name.clone(),
        name_localizations: choice.name_localizations.clone(),
        value,
    }
}
