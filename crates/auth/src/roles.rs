use core::str::FromStr;

use serde::{Deserialize, Serialize};

use clubhouse_core::DomainError;

/// Role a user holds within one club.
///
/// The set is closed; it is persisted as its snake_case name. Hyphenated
/// spellings (`club-admin`) are accepted when parsing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    #[serde(alias = "club-admin")]
    ClubAdmin,
    #[serde(alias = "mail-admin")]
    MailAdmin,
    #[serde(alias = "social-admin")]
    SocialAdmin,
    Member,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Owner,
        Role::Admin,
        Role::ClubAdmin,
        Role::MailAdmin,
        Role::SocialAdmin,
        Role::Member,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::ClubAdmin => "club_admin",
            Role::MailAdmin => "mail_admin",
            Role::SocialAdmin => "social_admin",
            Role::Member => "member",
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Role::Owner)
    }

    /// Whether the role may be handed out through member add/update.
    ///
    /// Ownership is only ever granted by creating a club.
    pub fn is_assignable(&self) -> bool {
        !self.is_owner()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}
