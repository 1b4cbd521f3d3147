use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::{
    CommentRecord, ConfigScope, PostRecord, PrincipalId, QuillCapabilityError, RoleDefinition,
    TenantId, TenantScope, TermRecord,
};

use super::DataAccess;

#[derive(Debug, Default)]
struct MemoryState {
    posts: HashMap<u64, PostRecord>,
    comments: HashMap<u64, CommentRecord>,
    terms: HashMap<u64, TermRecord>,
    user_roles: HashMap<(PrincipalId, TenantScope), BTreeSet<String>>,
    overrides: HashMap<PrincipalId, BTreeMap<String, bool>>,
    super_admins: BTreeSet<PrincipalId>,
    tenants: BTreeSet<TenantId>,
    role_definitions: HashMap<TenantScope, Vec<RoleDefinition>>,
    config: HashMap<(ConfigScope, String), Value>,
    unavailable: Option<String>,
}

/// A trivial implementation of [DataAccess] where all records are kept in
/// memory and never persisted.
///
/// Clones share the same records, so a test can keep a handle and change
/// object state between two checks.
#[derive(Debug, Clone)]
pub struct MemoryDataAccess {
    state: Arc<RwLock<MemoryState>>,
}

impl Default for MemoryDataAccess {
    fn default() -> Self {
        let state = MemoryState {
            tenants: BTreeSet::from([TenantId::MAIN]),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

impl MemoryDataAccess {
    /// Store a post
    pub async fn insert_post(&self, post: PostRecord) {
        self.state.write().await.posts.insert(post.id, post);
    }

    /// Remove a post
    pub async fn remove_post(&self, id: u64) {
        self.state.write().await.posts.remove(&id);
    }

    /// Store a comment on `post_id`
    pub async fn insert_comment(&self, id: u64, post_id: u64) {
        self.state
            .write()
            .await
            .comments
            .insert(id, CommentRecord { id, post_id });
    }

    /// Store a term of `taxonomy`
    pub async fn insert_term(&self, id: u64, taxonomy: impl Into<String>) {
        self.state.write().await.terms.insert(
            id,
            TermRecord {
                id,
                taxonomy: taxonomy.into(),
            },
        );
    }

    /// Store a user holding `roles` in `scope`
    pub async fn insert_user<I, S>(&self, id: PrincipalId, scope: TenantScope, roles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .write()
            .await
            .user_roles
            .insert((id, scope), roles.into_iter().map(Into::into).collect());
    }

    /// Store a user level grant or denial
    pub async fn insert_override(&self, id: PrincipalId, capability: impl Into<String>, granted: bool) {
        self.state
            .write()
            .await
            .overrides
            .entry(id)
            .or_default()
            .insert(capability.into(), granted);
    }

    /// Add a principal to the network's super-admins
    pub async fn insert_super_admin(&self, id: PrincipalId) {
        self.state.write().await.super_admins.insert(id);
    }

    /// Register a tenant. The main tenant exists from the start.
    pub async fn insert_tenant(&self, id: TenantId) {
        self.state.write().await.tenants.insert(id);
    }

    /// Append a persisted role definition for `scope`
    pub async fn insert_role_definition(&self, scope: TenantScope, definition: RoleDefinition) {
        self.state
            .write()
            .await
            .role_definitions
            .entry(scope)
            .or_default()
            .push(definition);
    }

    /// Set a configuration value
    pub async fn set_config(&self, scope: ConfigScope, name: impl Into<String>, value: Value) {
        self.state
            .write()
            .await
            .config
            .insert((scope, name.into()), value);
    }

    /// Make every subsequent read fail with `message`, or recover with `None`
    pub async fn set_unavailable(&self, message: Option<&str>) {
        self.state.write().await.unavailable = message.map(str::to_string);
    }

    fn check_available(state: &MemoryState) -> Result<(), QuillCapabilityError> {
        match &state.unavailable {
            Some(message) => Err(QuillCapabilityError::DataAccess(message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DataAccess for MemoryDataAccess {
    type Error = QuillCapabilityError;

    async fn post(&self, id: u64) -> Result<Option<PostRecord>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.posts.get(&id).cloned())
    }

    async fn comment(&self, id: u64) -> Result<Option<CommentRecord>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.comments.get(&id).cloned())
    }

    async fn term(&self, id: u64) -> Result<Option<TermRecord>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.terms.get(&id).cloned())
    }

    async fn user_roles(
        &self,
        id: PrincipalId,
        scope: TenantScope,
    ) -> Result<Option<BTreeSet<String>>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        if let Some(roles) = state.user_roles.get(&(id, scope)) {
            return Ok(Some(roles.clone()));
        }
        // A user that exists elsewhere in the network holds no role here.
        let known = state.user_roles.keys().any(|(user, _)| *user == id)
            || state.super_admins.contains(&id);
        Ok(known.then(BTreeSet::new))
    }

    async fn user_overrides(&self, id: PrincipalId) -> Result<BTreeMap<String, bool>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.overrides.get(&id).cloned().unwrap_or_default())
    }

    async fn super_admins(&self) -> Result<BTreeSet<PrincipalId>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.super_admins.clone())
    }

    async fn tenant_exists(&self, id: TenantId) -> Result<bool, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.tenants.contains(&id))
    }

    async fn role_definitions(
        &self,
        scope: TenantScope,
    ) -> Result<Vec<RoleDefinition>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.role_definitions.get(&scope).cloned().unwrap_or_default())
    }

    async fn config_value(
        &self,
        scope: ConfigScope,
        name: &str,
    ) -> Result<Option<Value>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state.config.get(&(scope, name.to_string())).cloned())
    }

    async fn count_users_by_role(
        &self,
        scope: TenantScope,
    ) -> Result<BTreeMap<String, u64>, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        let mut counts = BTreeMap::new();
        for ((_, user_scope), roles) in state.user_roles.iter() {
            if *user_scope != scope {
                continue;
            }
            for role in roles {
                *counts.entry(role.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_users(&self, scope: TenantScope) -> Result<u64, Self::Error> {
        let state = self.state.read().await;
        Self::check_available(&state)?;
        Ok(state
            .user_roles
            .iter()
            .filter(|((_, user_scope), roles)| *user_scope == scope && !roles.is_empty())
            .count() as u64)
    }
}
