//! `clubhouse-auth`: club-scoped role-based authorization (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: membership
//! lookups arrive through the [`MembershipLookup`] trait and identity arrives
//! through a [`TokenVerifier`].

pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod permissions;
pub mod roles;

pub use authorize::{
    guard_owner_membership, AuthorizationEngine, AuthzError, Decision, DenyReason, LookupError,
    MembershipLookup,
};
pub use catalog::{PermissionCatalog, RoleDefinition};
pub use claims::{validate_claims, Hs256TokenVerifier, TokenClaims, TokenError, TokenVerifier};
pub use permissions::Permission;
pub use roles::Role;
