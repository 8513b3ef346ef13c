// Member permissions are serenity's own bitflags type, so every flag the
// platform defines can be asked for by name.
//
// A command with no gate (`None`) is open to everyone. An empty set is how the
// platform spells "administrators only": `"0"`.

pub use serenity::all::Permissions;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown permission name `{0}`")]
pub struct UnknownPermission(pub String);

/// Look up one flag by its constant name, ignoring case (`"manage_guild"` works).
pub fn permission_from_name(name: &str) -> Option<Permissions> {
    Permissions::from_name(&name.trim().to_ascii_uppercase())
}

/// Combine a list of permission names into one set.
pub fn permissions_from_names<I, S>(names: I) -> Result<Permissions, UnknownPermission>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .try_fold(Permissions::empty(), |acc, name| {
            let name = name.as_ref();
            permission_from_name(name)
                .map(|perm| acc | perm)
                .ok_or_else(|| UnknownPermission(name.to_string()))
        })
}

/// The decimal string `default_member_permissions` carries.
pub fn permission_bits(permissions: Permissions) -> String {
    permissions.bits().to_string()
}
