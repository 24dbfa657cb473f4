//! User and collaborator types.

use std::fmt;

use serde::Serialize;

/// Opaque backend user identifier.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access level granted to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Edit => "edit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "view" => Some(Permission::View),
            "edit" => Some(Permission::Edit),
            _ => None,
        }
    }
}

/// A non-owner user with access to an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct Collaborator {
    pub user: UserId,
    /// Display name when the API populated the user reference.
    pub name: Option<String>,
    pub permission: Permission,
}

impl Collaborator {
    pub fn new(user: UserId, permission: Permission) -> Self {
        Self {
            user,
            name: None,
            permission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_parse() {
        assert_eq!(Permission::parse("view"), Some(Permission::View));
        assert_eq!(Permission::parse("edit"), Some(Permission::Edit));
        assert_eq!(Permission::parse("admin"), None);
    }

    #[test]
    fn user_id_display() {
        let id = UserId::new("64ab");
        assert_eq!(id.to_string(), "64ab");
        assert_eq!(format!("{id:?}"), "UserId(64ab)");
    }
}
