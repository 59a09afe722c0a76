//! Actor context for core operations
//!
//! Every mutating operation takes an explicit [`Actor`]; the core never reads
//! ambient session state. Role and party values coming from the boundary are
//! parsed into closed enums, unknown values are rejected.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Which side of a connection the actor represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Customer,
    Organization,
}

impl Party {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Organization => "organization",
        }
    }

    /// The opposite side of the connection
    pub fn counterpart(self) -> Self {
        match self {
            Self::Customer => Self::Organization,
            Self::Organization => Self::Customer,
        }
    }
}

impl FromStr for Party {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "organization" => Ok(Self::Organization),
            _ => Err(Error::InvalidState(format!(
                "Unsupported party '{}'",
                value
            ))),
        }
    }
}

/// Permission level an actor holds within their company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Member,
    Viewer,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Viewer => "viewer",
        }
    }

    pub fn can_decide_connections(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn can_manage_contracts(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn can_edit_reports(self) -> bool {
        matches!(self, Self::Admin | Self::Member)
    }

    pub fn can_confirm_reports(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn can_share_reports(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn can_delete_reports(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl FromStr for ActorRole {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "viewer" => Ok(Self::Viewer),
            _ => Err(Error::InvalidState(format!(
                "Unsupported role '{}'",
                value
            ))),
        }
    }
}

/// Identity and permission context of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub party: Party,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: Uuid, party: Party, role: ActorRole) -> Self {
        Self {
            user_id,
            party,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(ActorRole::from_str("admin").unwrap(), ActorRole::Admin);
        assert_eq!(ActorRole::from_str(" Member ").unwrap(), ActorRole::Member);
        assert!(matches!(
            ActorRole::from_str("superuser"),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_parse_party() {
        assert_eq!(Party::from_str("customer").unwrap(), Party::Customer);
        assert!(matches!(
            Party::from_str("vendor"),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_counterpart() {
        assert_eq!(Party::Customer.counterpart(), Party::Organization);
        assert_eq!(Party::Organization.counterpart(), Party::Customer);
    }

    #[test]
    fn test_capabilities() {
        assert!(ActorRole::Admin.can_decide_connections());
        assert!(!ActorRole::Member.can_decide_connections());
        assert!(ActorRole::Member.can_edit_reports());
        assert!(!ActorRole::Viewer.can_edit_reports());
        assert!(!ActorRole::Member.can_share_reports());
    }
}
