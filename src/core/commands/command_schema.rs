// The declarative half of the command model.
// These types describe what the platform is told about a command, not how it runs.

pub mod declaration;
pub mod options;
pub mod permissions;

pub use declaration::{
    ChoiceDeclaration, ChoiceValue, CommandDeclaration, CommandType, Localizations,
    OptionDeclaration, OptionType, ValueBound,
};
pub use options::{Choice, CommandOption, OptionKind};
pub use permissions::{
    permission_bits, permission_from_name, permissions_from_names, Permissions, UnknownPermission,
};
