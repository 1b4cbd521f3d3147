use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::{CapabilitySet, DataAccess, EXIST, QuillCapabilityError, RoleRegistry, Settings};

/// Identity of a user. Zero is the anonymous principal.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PrincipalId(pub u64);

impl PrincipalId {
    /// The anonymous principal
    pub const ANONYMOUS: PrincipalId = PrincipalId(0);

    /// Whether this is the anonymous principal
    pub fn is_anonymous(&self) -> bool {
        self.0 == 0
    }
}

impl Display for PrincipalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a tenant (a site of a network).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl TenantId {
    /// The main site, and the only one of a single-tenant installation
    pub const MAIN: TenantId = TenantId(1);
}

impl Default for TenantId {
    fn default() -> Self {
        TenantId::MAIN
    }
}

/// The tenant against which roles and capabilities are resolved.
///
/// The scope is passed explicitly wherever it matters instead of being read
/// from an ambient "current site".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TenantScope {
    tenant: TenantId,
}

impl TenantScope {
    /// Scope for `tenant`
    pub fn new(tenant: TenantId) -> Self {
        Self { tenant }
    }

    /// The tenant in scope
    pub fn tenant(&self) -> TenantId {
        self.tenant
    }
}

impl From<TenantId> for TenantScope {
    fn from(tenant: TenantId) -> Self {
        Self::new(tenant)
    }
}

impl Display for TenantScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tenant.0)
    }
}

/// The user on whose behalf a decision is made, resolved against one
/// tenant scope.
///
/// The effective capability set is computed on first use and then kept for
/// the lifetime of the value, so one principal may be checked many times
/// without recomputing it.
#[derive(Debug, Clone)]
pub struct Principal {
    id: PrincipalId,
    scope: TenantScope,
    roles: BTreeSet<String>,
    super_admin: bool,
    overrides: BTreeMap<String, bool>,
    capabilities: OnceCell<Arc<CapabilitySet>>,
}

impl Principal {
    /// A principal with no roles, no overrides and no network authority
    pub fn new(id: PrincipalId, scope: TenantScope) -> Self {
        Self {
            id,
            scope,
            roles: BTreeSet::new(),
            super_admin: false,
            overrides: BTreeMap::new(),
            capabilities: OnceCell::new(),
        }
    }

    /// The anonymous principal
    pub fn anonymous(scope: TenantScope) -> Self {
        Self::new(PrincipalId::ANONYMOUS, scope)
    }

    /// Grant a role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self.capabilities = OnceCell::new();
        self
    }

    /// Set the network super-admin flag
    pub fn with_super_admin(mut self, super_admin: bool) -> Self {
        self.super_admin = super_admin;
        self.capabilities = OnceCell::new();
        self
    }

    /// Add a user level override: `true` grants, `false` denies
    pub fn with_override(mut self, capability: impl Into<String>, granted: bool) -> Self {
        self.overrides.insert(capability.into(), granted);
        self.capabilities = OnceCell::new();
        self
    }

    /// Resolve a principal through the data access collaborator.
    ///
    /// A user that does not exist is treated as anonymous. The super-admin
    /// flag is only ever set in a multi-tenant installation.
    pub async fn load<D>(
        data: &D,
        id: PrincipalId,
        scope: TenantScope,
        settings: &Settings,
    ) -> Result<Self, QuillCapabilityError>
    where
        D: DataAccess,
    {
        if id.is_anonymous() {
            return Ok(Self::anonymous(scope));
        }

        let Some(roles) = data.user_roles(id, scope).await.map_err(Into::into)? else {
            tracing::debug!(principal = %id, tenant = %scope, "Unknown principal treated as anonymous");
            return Ok(Self::anonymous(scope));
        };

        let super_admin = if settings.is_multi_tenant() {
            data.super_admins().await.map_err(Into::into)?.contains(&id)
        } else {
            false
        };
        let overrides = data.user_overrides(id).await.map_err(Into::into)?;

        Ok(Self {
            id,
            scope,
            roles,
            super_admin,
            overrides,
            capabilities: OnceCell::new(),
        })
    }

    /// Identity of the principal
    pub fn id(&self) -> PrincipalId {
        self.id
    }

    /// Tenant the principal was resolved against
    pub fn scope(&self) -> TenantScope {
        self.scope
    }

    /// Role names held in scope
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// User level capability overrides
    pub fn overrides(&self) -> &BTreeMap<String, bool> {
        &self.overrides
    }

    /// Whether the principal is anonymous
    pub fn is_anonymous(&self) -> bool {
        self.id.is_anonymous()
    }

    /// Whether the principal holds network wide authority
    pub fn is_super_admin(&self) -> bool {
        self.super_admin
    }

    /// The effective capability set, computed against `registry` on first
    /// use and reused afterwards
    pub async fn capabilities(&self, registry: &RoleRegistry) -> Arc<CapabilitySet> {
        self.capabilities
            .get_or_init(|| async { Arc::new(effective_capabilities(self, registry)) })
            .await
            .clone()
    }

    /// Whether the effective set has already been computed
    pub fn has_resolved_capabilities(&self) -> bool {
        self.capabilities.initialized()
    }

    /// The effective set, if already computed
    pub fn resolved_capabilities(&self) -> Option<Arc<CapabilitySet>> {
        self.capabilities.get().cloned()
    }
}

/// Compute the effective capability set of `principal`.
///
/// The union of every held role that exists in `registry`, plus the virtual
/// super-admin role for super-admins, plus user level grants. User level
/// denials are applied last and win over any role grant of the same name.
pub fn effective_capabilities(principal: &Principal, registry: &RoleRegistry) -> CapabilitySet {
    let mut capabilities = CapabilitySet::new();

    if principal.is_anonymous() {
        return capabilities;
    }

    capabilities.insert(EXIST);

    for name in principal.roles() {
        match registry.get(name) {
            Some(role) => capabilities.union_with(role.capabilities()),
            None => tracing::debug!(
                principal = %principal.id(),
                role = %name,
                "Skipping role missing from registry"
            ),
        }
    }

    if principal.is_super_admin() {
        if let Some(role) = registry.super_admin() {
            capabilities.union_with(role.capabilities());
        }
    }

    for (capability, granted) in principal.overrides() {
        if *granted {
            capabilities.insert(capability.clone());
        }
    }
    for (capability, granted) in principal.overrides() {
        if !*granted {
            capabilities.remove(capability);
        }
    }

    capabilities
}
