use core::str::FromStr;

use serde::{Deserialize, Serialize};

use clubhouse_core::DomainError;

/// Capability token checked before a club-scoped operation runs.
///
/// Tokens follow the `resource.action` format (e.g. `"member.add"`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "club.read")]
    ClubRead,
    #[serde(rename = "club.update")]
    ClubUpdate,
    #[serde(rename = "club.delete")]
    ClubDelete,
    #[serde(rename = "member.add")]
    MemberAdd,
    #[serde(rename = "member.update")]
    MemberUpdate,
    #[serde(rename = "member.remove")]
    MemberRemove,
    #[serde(rename = "event.write")]
    EventWrite,
    #[serde(rename = "event.update")]
    EventUpdate,
    #[serde(rename = "event.delete")]
    EventDelete,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::ClubRead,
        Permission::ClubUpdate,
        Permission::ClubDelete,
        Permission::MemberAdd,
        Permission::MemberUpdate,
        Permission::MemberRemove,
        Permission::EventWrite,
        Permission::EventUpdate,
        Permission::EventDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ClubRead => "club.read",
            Permission::ClubUpdate => "club.update",
            Permission::ClubDelete => "club.delete",
            Permission::MemberAdd => "member.add",
            Permission::MemberUpdate => "member.update",
            Permission::MemberRemove => "member.remove",
            Permission::EventWrite => "event.write",
            Permission::EventUpdate => "event.update",
            Permission::EventDelete => "event.delete",
        }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| DomainError::validation(format!("unknown permission '{s}'")))
    }
}
