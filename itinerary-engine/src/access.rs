//! Per-user access to shared itineraries.
//!
//! Ownership is implicit in the itinerary's owner reference; everyone else
//! gets access through a collaborator row or, read-only, through the
//! itinerary being public.

use serde::Serialize;

use crate::domain::{Itinerary, Permission, UserId};

/// What a user may do with an itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    None,
    View,
    Edit,
    Owner,
}

/// An action that needs permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Read,
    /// Change days, stops, expenses, budget or itinerary details.
    Modify,
    /// Remove a collaborator row.
    RemoveCollaborator(UserId),
    Delete,
}

impl Role {
    /// Whether a user holding this role may perform the action.
    ///
    /// `user` is needed to let collaborators remove their own row.
    pub fn allows(&self, action: &Action, user: Option<&UserId>) -> bool {
        match action {
            Action::Read => *self >= Role::View,
            Action::Modify => *self >= Role::Edit,
            Action::Delete => *self == Role::Owner,
            Action::RemoveCollaborator(target) => {
                *self == Role::Owner || (*self >= Role::View && user == Some(target))
            }
        }
    }

    pub fn can_read(&self) -> bool {
        *self >= Role::View
    }

    pub fn can_edit(&self) -> bool {
        *self >= Role::Edit
    }

    pub fn is_owner(&self) -> bool {
        *self == Role::Owner
    }
}

/// Resolve a user's role on an itinerary.
///
/// `user` is `None` for anonymous visitors, who can only view public
/// itineraries.
pub fn resolve_role(user: Option<&UserId>, itinerary: &Itinerary) -> Role {
    let Some(user) = user else {
        return if itinerary.is_public {
            Role::View
        } else {
            Role::None
        };
    };

    if *user == itinerary.owner {
        return Role::Owner;
    }

    let permission = itinerary
        .collaborators
        .iter()
        .filter(|c| c.user == *user)
        .map(|c| c.permission)
        .max_by_key(|p| matches!(p, Permission::Edit));

    match permission {
        Some(Permission::Edit) => Role::Edit,
        Some(Permission::View) => Role::View,
        None if itinerary.is_public => Role::View,
        None => Role::None,
    }
}

/// One row of the member list shown on an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user: UserId,
    pub name: Option<String>,
    pub role: Role,
}

/// Owner first, then collaborators. The owner is never listed twice, even
/// if a collaborator row erroneously names them.
pub fn members(itinerary: &Itinerary) -> Vec<Member> {
    let owner = Member {
        user: itinerary.owner.clone(),
        name: itinerary.owner_name.clone(),
        role: Role::Owner,
    };

    std::iter::once(owner)
        .chain(
            itinerary
                .collaborators
                .iter()
                .filter(|c| c.user != itinerary.owner)
                .map(|c| Member {
                    user: c.user.clone(),
                    name: c.name.clone(),
                    role: match c.permission {
                        Permission::Edit => Role::Edit,
                        Permission::View => Role::View,
                    },
                }),
        )
        .collect()
}
