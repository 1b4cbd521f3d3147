use std::collections::BTreeSet;

use indexmap::IndexMap;

use crate::{
    DataAccess, NETWORK_CAPABILITIES, QuillCapabilityError, Role, RoleDefinition,
    SUPER_ADMIN_ROLE, Settings, TenantScope, builtin_roles,
};

/// The roles defined for one tenant.
///
/// A registry is a snapshot: it is built once per tenant scope and never
/// modified in place. [`RoleRegistry::with_role`] and
/// [`RoleRegistry::without_role`] return new snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRegistry {
    roles: IndexMap<String, Role>,
}

/// Number of principals holding each role in a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCounts {
    /// Principals with at least one role
    pub total: u64,
    /// Count per role, in registry order
    pub by_role: IndexMap<String, u64>,
}

impl RoleRegistry {
    /// A registry holding exactly `roles`, in the given order
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles
                .into_iter()
                .map(|role| (role.name().to_string(), role))
                .collect(),
        }
    }

    /// The built-in roles, optionally overlaid with persisted definitions,
    /// plus the virtual super-admin role when `multi_tenant` is set.
    ///
    /// A persisted definition that shares its name with a built-in replaces
    /// the built-in's capabilities but keeps its position. Other persisted
    /// roles follow the built-ins in persisted order.
    pub fn build(definitions: impl IntoIterator<Item = RoleDefinition>, multi_tenant: bool) -> Self {
        let mut roles: IndexMap<String, Role> = builtin_roles()
            .into_iter()
            .map(|role| (role.name().to_string(), role))
            .collect();

        for definition in definitions {
            if definition.name == SUPER_ADMIN_ROLE {
                tracing::warn!(
                    role = SUPER_ADMIN_ROLE,
                    "Ignoring persisted definition of the virtual super-admin role"
                );
                continue;
            }
            if definition.name.is_empty() {
                tracing::warn!("Ignoring persisted role definition without a name");
                continue;
            }
            let role = Role::from_definition(definition);
            roles.insert(role.name().to_string(), role);
        }

        let mut registry = Self { roles };
        if multi_tenant {
            let super_admin = registry.synthesize_super_admin();
            registry
                .roles
                .insert(SUPER_ADMIN_ROLE.to_string(), super_admin);
        }
        registry
    }

    /// Load the registry for `scope` from the persisted definitions
    pub async fn load<D>(
        data: &D,
        scope: TenantScope,
        settings: &Settings,
    ) -> Result<Self, QuillCapabilityError>
    where
        D: DataAccess,
    {
        let definitions = data.role_definitions(scope).await.map_err(Into::into)?;
        let registry = Self::build(definitions, settings.is_multi_tenant());

        tracing::debug!(
            tenant = %scope,
            roles = registry.len(),
            "Resolved role registry"
        );

        Ok(registry)
    }

    fn synthesize_super_admin(&self) -> Role {
        let mut capabilities: BTreeSet<String> = self
            .roles
            .values()
            .flat_map(|role| role.capabilities().iter().cloned())
            .collect();
        capabilities.extend(NETWORK_CAPABILITIES.iter().map(|c| c.to_string()));

        Role::new(SUPER_ADMIN_ROLE, capabilities).with_display_name("Super Admin")
    }

    /// Look up a role by its exact name
    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    /// Look up a role the caller expects to exist
    pub fn require(&self, name: &str) -> Result<&Role, QuillCapabilityError> {
        self.get(name)
            .ok_or_else(|| QuillCapabilityError::UnknownRole(name.to_string()))
    }

    /// The virtual super-admin role, present in multi-tenant registries only
    pub fn super_admin(&self) -> Option<&Role> {
        self.get(SUPER_ADMIN_ROLE)
    }

    /// Every role, built-ins first
    pub fn all(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Every role name, built-ins first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Number of roles
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the registry holds no role
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// A new snapshot in which `role` is added, or replaces the role of the
    /// same name in place
    pub fn with_role(&self, role: Role) -> Self {
        let mut roles = self.roles.clone();
        roles.insert(role.name().to_string(), role);
        Self { roles }
    }

    /// A new snapshot without the role called `name`
    pub fn without_role(&self, name: &str) -> Self {
        let mut roles = self.roles.clone();
        roles.shift_remove(name);
        Self { roles }
    }

    /// Count the principals holding each role in `scope`. Roles nobody holds
    /// are reported with a count of zero.
    pub async fn count_by_role<D>(
        &self,
        data: &D,
        scope: TenantScope,
    ) -> Result<RoleCounts, QuillCapabilityError>
    where
        D: DataAccess,
    {
        let counted = data.count_users_by_role(scope).await.map_err(Into::into)?;
        let by_role: IndexMap<String, u64> = self
            .names()
            .filter(|name| *name != SUPER_ADMIN_ROLE)
            .map(|name| (name.to_string(), counted.get(name).copied().unwrap_or(0)))
            .collect();
        let total = data.count_users(scope).await.map_err(Into::into)?;

        Ok(RoleCounts { total, by_role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryDataAccess, PrincipalId, TenantId};

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    use wasm_bindgen_test::wasm_bindgen_test;

    #[test]
    fn it_lists_builtins_first_then_persisted_roles() {
        let registry = RoleRegistry::build(
            [
                RoleDefinition::granting("shop_manager", ["manage_shop"]),
                RoleDefinition::granting("editor", ["read"]),
            ],
            false,
        );

        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            [
                "administrator",
                "editor",
                "author",
                "contributor",
                "subscriber",
                "shop_manager"
            ]
        );
        assert!(!registry.require("editor").unwrap().has("edit_posts"));
        assert!(registry.super_admin().is_none());
    }

    #[test]
    fn it_never_defaults_unknown_names() {
        let registry = RoleRegistry::build([], false);

        assert!(registry.get("Administrator").is_none());
        assert_eq!(
            registry.require("ghost").unwrap_err(),
            QuillCapabilityError::UnknownRole("ghost".into())
        );
    }

    #[test]
    fn it_synthesizes_a_super_admin_role_for_networks() {
        let registry = RoleRegistry::build(
            [RoleDefinition::granting("shop_manager", ["manage_shop"])],
            true,
        );
        let super_admin = registry.super_admin().unwrap();

        assert!(super_admin.is_super_admin());
        assert!(super_admin.has("manage_shop"));
        assert!(super_admin.has("manage_options"));
        assert!(super_admin.has("manage_network"));
        assert!(super_admin.has("create_sites"));
        assert_eq!(registry.names().last(), Some(SUPER_ADMIN_ROLE));
    }

    #[test]
    fn it_refuses_to_persist_the_super_admin_role() {
        let registry = RoleRegistry::build(
            [RoleDefinition::granting(SUPER_ADMIN_ROLE, ["read"])],
            false,
        );

        assert!(registry.super_admin().is_none());
    }

    #[test]
    fn it_edits_by_snapshot() {
        let registry = RoleRegistry::build([], false);
        let extended = registry.with_role(Role::new("auditor", ["read", "list_users"]));
        let reduced = extended.without_role("contributor");

        assert!(registry.get("auditor").is_none());
        assert!(extended.get("auditor").is_some());
        assert!(reduced.get("contributor").is_none());
        assert_eq!(reduced.len(), registry.len());
    }

    #[cfg_attr(all(target_arch = "wasm32", target_os = "unknown"), wasm_bindgen_test)]
    #[cfg_attr(not(target_arch = "wasm32"), tokio::test)]
    async fn it_counts_principals_per_role() -> anyhow::Result<()> {
        let data = MemoryDataAccess::default();
        let scope = TenantScope::new(TenantId::MAIN);
        data.insert_user(PrincipalId(1), scope, ["administrator"]).await;
        data.insert_user(PrincipalId(2), scope, ["editor", "author"]).await;
        data.insert_user(PrincipalId(3), scope, ["editor"]).await;

        let registry = RoleRegistry::load(&data, scope, &Settings::default()).await?;
        let counts = registry.count_by_role(&data, scope).await?;

        assert_eq!(counts.total, 3);
        assert_eq!(counts.by_role.get("editor"), Some(&2));
        assert_eq!(counts.by_role.get("author"), Some(&1));
        assert_eq!(counts.by_role.get("subscriber"), Some(&0));
        assert_eq!(counts.by_role.keys().next().map(String::as_str), Some("administrator"));

        Ok(())
    }
}
