//! Static role → permission catalog.
//!
//! Built once at process start and shared read-only (`Arc<PermissionCatalog>`).
//! A role's permission set never varies per club or per user.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{Permission, Role};

/// Role definition with its granted permissions (for inspection/display).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub permissions: Vec<&'static str>,
    pub description: &'static str,
}

/// Immutable mapping from role to the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCatalog {
    grants: BTreeMap<Role, BTreeSet<Permission>>,
}

impl PermissionCatalog {
    /// Build a catalog from an explicit table. Roles absent from the table grant nothing.
    pub fn from_table<I, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        let grants = table
            .into_iter()
            .map(|(role, perms)| (role, perms.into_iter().collect()))
            .collect();
        Self { grants }
    }

    /// The catalog every deployment runs with.
    pub fn standard() -> Self {
        use Permission::*;

        Self::from_table([
            (Role::Owner, Permission::ALL.to_vec()),
            (
                Role::Admin,
                vec![
                    ClubRead, ClubUpdate, MemberAdd, MemberUpdate, MemberRemove, EventWrite,
                    EventUpdate, EventDelete,
                ],
            ),
            (
                Role::ClubAdmin,
                vec![
                    ClubRead, ClubUpdate, MemberAdd, MemberUpdate, MemberRemove, EventWrite,
                    EventUpdate, EventDelete,
                ],
            ),
            (Role::MailAdmin, vec![ClubRead, MemberAdd, MemberUpdate]),
            (
                Role::SocialAdmin,
                vec![ClubRead, EventWrite, EventUpdate, EventDelete],
            ),
            (Role::Member, vec![ClubRead]),
        ])
    }

    pub fn permissions_of(&self, role: Role) -> BTreeSet<Permission> {
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    /// Permissions for a persisted role name. Unknown names grant nothing.
    pub fn permissions_of_name(&self, name: &str) -> BTreeSet<Permission> {
        match name.parse::<Role>() {
            Ok(role) => self.permissions_of(role),
            Err(_) => BTreeSet::new(),
        }
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|perms| perms.contains(&permission))
    }

    pub fn definitions(&self) -> Vec<RoleDefinition> {
        Role::ALL
            .into_iter()
            .map(|role| RoleDefinition {
                name: role.as_str(),
                permissions: self
                    .permissions_of(role)
                    .into_iter()
                    .map(|p| p.as_str())
                    .collect(),
                description: role_description(role),
            })
            .collect()
    }
}

impl Default for PermissionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::Owner => "Creator of the club; the only role allowed to delete it",
        Role::Admin => "Full club administration except deletion",
        Role::ClubAdmin => "Manages club details, members and events",
        Role::MailAdmin => "Manages the member list",
        Role::SocialAdmin => "Manages club events",
        Role::Member => "Read-only access to the club",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        prop::sample::select(Permission::ALL.to_vec())
    }

    #[test]
    fn only_owner_can_delete_a_club() {
        let catalog = PermissionCatalog::standard();
        let holders: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|r| catalog.has_permission(*r, Permission::ClubDelete))
            .collect();
        assert_eq!(holders, vec![Role::Owner]);
    }

    #[test]
    fn owner_holds_every_permission() {
        let catalog = PermissionCatalog::standard();
        for p in Permission::ALL {
            assert!(catalog.has_permission(Role::Owner, p), "owner lacks {p}");
        }
    }

    #[test]
    fn member_is_read_only() {
        let catalog = PermissionCatalog::standard();
        assert_eq!(
            catalog.permissions_of(Role::Member),
            BTreeSet::from([Permission::ClubRead])
        );
    }

    #[test]
    fn unknown_role_name_grants_nothing() {
        let catalog = PermissionCatalog::standard();
        assert!(catalog.permissions_of_name("root").is_empty());
        assert!(catalog.permissions_of_name("").is_empty());
        assert!(!catalog.permissions_of_name("owner").is_empty());
    }

    #[test]
    fn role_missing_from_table_is_deny_all() {
        let catalog = PermissionCatalog::from_table([(Role::Owner, vec![Permission::ClubRead])]);
        assert!(catalog.permissions_of(Role::Admin).is_empty());
        assert!(!catalog.has_permission(Role::Admin, Permission::ClubRead));
    }

    #[test]
    fn definitions_cover_every_role() {
        let defs = PermissionCatalog::standard().definitions();
        assert_eq!(defs.len(), Role::ALL.len());
        let social = defs.iter().find(|d| d.name == "social_admin").unwrap();
        assert!(social.permissions.contains(&"event.write"));
        assert!(!social.permissions.contains(&"member.add"));
    }

    proptest! {
        #[test]
        fn has_permission_is_pure(role in any_role(), perm in any_permission()) {
            let catalog = PermissionCatalog::standard();
            let first = catalog.has_permission(role, perm);
            prop_assert_eq!(first, catalog.has_permission(role, perm));
            prop_assert_eq!(first, PermissionCatalog::standard().has_permission(role, perm));
            prop_assert_eq!(first, catalog.permissions_of(role).contains(&perm));
        }

        #[test]
        fn lower_roles_never_exceed_owner(role in any_role()) {
            let catalog = PermissionCatalog::standard();
            let owner = catalog.permissions_of(Role::Owner);
            prop_assert!(catalog.permissions_of(role).is_subset(&owner));
        }
    }
}
