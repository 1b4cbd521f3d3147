use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    ConditionalSend, ConditionalSync, PrincipalId, QuillCapabilityError, RoleDefinition, TenantId,
    TenantScope,
};

mod memory;
pub use memory::*;

/// The state of a post that capability rules depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Post id
    pub id: u64,
    /// Author, or [`PrincipalId::ANONYMOUS`] when the post has none
    pub author: PrincipalId,
    /// Name of the post type
    pub post_type: String,
    /// Name of the post status
    pub status: String,
    /// Parent post id, zero for none
    #[serde(default)]
    pub parent: u64,
    /// For trashed posts, the status the post had before it was trashed
    #[serde(default)]
    pub trashed_status: Option<String>,
}

impl PostRecord {
    /// A post of type `post_type` authored by `author` with `status`
    pub fn new(
        id: u64,
        author: PrincipalId,
        post_type: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author,
            post_type: post_type.into(),
            status: status.into(),
            parent: 0,
            trashed_status: None,
        }
    }

    /// Set the parent post
    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent = parent;
        self
    }

    /// Record the status the post had before being trashed
    pub fn with_trashed_status(mut self, status: impl Into<String>) -> Self {
        self.trashed_status = Some(status.into());
        self
    }

    /// Whether `principal` is the (non-anonymous) author of the post
    pub fn is_authored_by(&self, principal: PrincipalId) -> bool {
        !self.author.is_anonymous() && self.author == principal
    }
}

/// The state of a comment that capability rules depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Comment id
    pub id: u64,
    /// Post the comment belongs to
    pub post_id: u64,
}

/// The state of a taxonomy term that capability rules depend on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    /// Term id
    pub id: u64,
    /// Name of the taxonomy the term belongs to
    pub taxonomy: String,
}

/// Where a configuration value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigScope {
    /// An option of a single tenant
    Tenant(TenantId),
    /// An option shared by the whole network
    Network,
}

/// A [DataAccess] is a read-only facade over the storage holding users,
/// content, roles and options. The engine never writes through it.
///
/// Every read is performed fresh; implementations must not assume the
/// engine caches anything between calls.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DataAccess: ConditionalSync {
    /// The error type produced by this [DataAccess]
    type Error: Into<QuillCapabilityError> + ConditionalSend;

    /// Fetch a post
    async fn post(&self, id: u64) -> Result<Option<PostRecord>, Self::Error>;

    /// Fetch a comment
    async fn comment(&self, id: u64) -> Result<Option<CommentRecord>, Self::Error>;

    /// Fetch a taxonomy term
    async fn term(&self, id: u64) -> Result<Option<TermRecord>, Self::Error>;

    /// The role names a user holds in `scope`, or `None` if the user does
    /// not exist
    async fn user_roles(
        &self,
        id: PrincipalId,
        scope: TenantScope,
    ) -> Result<Option<BTreeSet<String>>, Self::Error>;

    /// User level capability grants (`true`) and denials (`false`)
    async fn user_overrides(&self, id: PrincipalId) -> Result<BTreeMap<String, bool>, Self::Error>;

    /// The network's super-admins
    async fn super_admins(&self) -> Result<BTreeSet<PrincipalId>, Self::Error>;

    /// Whether a tenant with this id exists
    async fn tenant_exists(&self, id: TenantId) -> Result<bool, Self::Error>;

    /// Persisted role definitions for `scope`, in persisted order
    async fn role_definitions(&self, scope: TenantScope)
    -> Result<Vec<RoleDefinition>, Self::Error>;

    /// A configuration value, if set
    async fn config_value(&self, scope: ConfigScope, name: &str)
    -> Result<Option<Value>, Self::Error>;

    /// Number of users holding each role in `scope`
    async fn count_users_by_role(
        &self,
        scope: TenantScope,
    ) -> Result<BTreeMap<String, u64>, Self::Error>;

    /// Number of users holding at least one role in `scope`
    async fn count_users(&self, scope: TenantScope) -> Result<u64, Self::Error>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<T> DataAccess for Arc<T>
where
    T: DataAccess + ?Sized,
{
    type Error = T::Error;

    async fn post(&self, id: u64) -> Result<Option<PostRecord>, Self::Error> {
        self.as_ref().post(id).await
    }

    async fn comment(&self, id: u64) -> Result<Option<CommentRecord>, Self::Error> {
        self.as_ref().comment(id).await
    }

    async fn term(&self, id: u64) -> Result<Option<TermRecord>, Self::Error> {
        self.as_ref().term(id).await
    }

    async fn user_roles(
        &self,
        id: PrincipalId,
        scope: TenantScope,
    ) -> Result<Option<BTreeSet<String>>, Self::Error> {
        self.as_ref().user_roles(id, scope).await
    }

    async fn user_overrides(&self, id: PrincipalId) -> Result<BTreeMap<String, bool>, Self::Error> {
        self.as_ref().user_overrides(id).await
    }

    async fn super_admins(&self) -> Result<BTreeSet<PrincipalId>, Self::Error> {
        self.as_ref().super_admins().await
    }

    async fn tenant_exists(&self, id: TenantId) -> Result<bool, Self::Error> {
        self.as_ref().tenant_exists(id).await
    }

    async fn role_definitions(
        &self,
        scope: TenantScope,
    ) -> Result<Vec<RoleDefinition>, Self::Error> {
        self.as_ref().role_definitions(scope).await
    }

    async fn config_value(
        &self,
        scope: ConfigScope,
        name: &str,
    ) -> Result<Option<Value>, Self::Error> {
        self.as_ref().config_value(scope, name).await
    }

    async fn count_users_by_role(
        &self,
        scope: TenantScope,
    ) -> Result<BTreeMap<String, u64>, Self::Error> {
        self.as_ref().count_users_by_role(scope).await
    }

    async fn count_users(&self, scope: TenantScope) -> Result<u64, Self::Error> {
        self.as_ref().count_users(scope).await
    }
}

/// Loose truthiness of a stored option: `false`, `0`, `""`, `"0"`, `null`,
/// empty arrays and empty objects are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

/// Interpret a stored option as an id
pub fn as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
