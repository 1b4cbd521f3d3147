use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    Actor, Argument, CapabilityRequest, CapabilitySet, ContentRegistry, DataAccess,
    FilterPipeline, MetaCapabilityResolver, Principal, PrincipalId, QuillCapabilityError,
    Requirements, RoleRegistry, Settings, TenantScope,
};

/// The outcome of one authorization check, with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The action that was checked
    pub action: String,
    /// The primitive capabilities the action resolved to
    pub required: Requirements,
    /// Required capabilities the principal does not hold
    pub missing: Vec<String>,
    /// Whether the principal may perform the action
    pub allowed: bool,
}

/// One answer of [`AuthorizationChecker::bulk_can`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDecision {
    /// The request that was checked
    pub request: CapabilityRequest,
    /// Whether the principal may perform it
    pub allowed: bool,
}

/// Answers "may this principal perform this action?".
///
/// The checker ties the [MetaCapabilityResolver] to role resolution: it
/// resolves the action into primitive capabilities, computes the principal's
/// effective capability set and compares the two. It holds no mutable state
/// and may be shared between tasks.
///
/// ```
/// # use quill_capability::*;
/// # async fn example() -> Result<(), QuillCapabilityError> {
/// let data = MemoryDataAccess::default();
/// let scope = TenantScope::default();
/// data.insert_user(PrincipalId(7), scope, ["author"]).await;
/// data.insert_post(PostRecord::new(1, PrincipalId(7), "post", "draft")).await;
///
/// let checker = AuthorizationChecker::new(data, Settings::default());
/// let author = checker.principal(PrincipalId(7), scope).await?;
///
/// assert!(checker.can("edit_post", &author, &[Argument::from(1)]).await?);
/// assert!(!checker.can("edit_others_posts", &author, &[]).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationChecker<D> {
    resolver: MetaCapabilityResolver<D>,
}

impl<D> AuthorizationChecker<D>
where
    D: DataAccess,
{
    /// A checker over `data` with the built-in content types and no filters
    pub fn new(data: D, settings: Settings) -> Self {
        Self {
            resolver: MetaCapabilityResolver::new(data, settings),
        }
    }

    /// Replace the content registry
    pub fn with_content(self, content: ContentRegistry) -> Self {
        Self {
            resolver: self.resolver.with_content(content),
        }
    }

    /// Replace the filter pipeline
    pub fn with_filters(self, filters: FilterPipeline) -> Self {
        Self {
            resolver: self.resolver.with_filters(filters),
        }
    }

    /// The underlying resolver
    pub fn resolver(&self) -> &MetaCapabilityResolver<D> {
        &self.resolver
    }

    /// Installation settings
    pub fn settings(&self) -> &Settings {
        self.resolver.settings()
    }

    /// Scope used when a caller names no tenant
    pub fn default_scope(&self) -> TenantScope {
        TenantScope::new(self.settings().default_tenant)
    }

    /// A fresh snapshot of the roles defined for `scope`
    pub async fn roles(&self, scope: TenantScope) -> Result<RoleRegistry, QuillCapabilityError> {
        RoleRegistry::load(self.resolver.data(), scope, self.settings()).await
    }

    /// Load a principal's roles, overrides and network authority in `scope`
    pub async fn principal(
        &self,
        id: PrincipalId,
        scope: TenantScope,
    ) -> Result<Principal, QuillCapabilityError> {
        Principal::load(self.resolver.data(), id, scope, self.settings()).await
    }

    /// The effective capability set of `principal`, computed once per
    /// principal value
    pub async fn capabilities(
        &self,
        principal: &Principal,
    ) -> Result<Arc<CapabilitySet>, QuillCapabilityError> {
        if let Some(capabilities) = principal.resolved_capabilities() {
            return Ok(capabilities);
        }
        let registry = self.roles(principal.scope()).await?;
        Ok(principal.capabilities(&registry).await)
    }

    /// The primitive capabilities `action` requires of `principal`
    pub async fn check(
        &self,
        action: &str,
        principal: &Principal,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        let capabilities = self.capabilities(principal).await?;
        self.resolver
            .resolve(action, Actor::new(principal, &capabilities), arguments)
            .await
    }

    /// Whether `principal` may perform `action`
    pub async fn can(
        &self,
        action: &str,
        principal: &Principal,
        arguments: &[Argument],
    ) -> Result<bool, QuillCapabilityError> {
        Ok(self.explain(action, principal, arguments).await?.allowed)
    }

    /// Decide whether `principal` may perform `action`, reporting what was
    /// required and what is missing
    pub async fn explain(
        &self,
        action: &str,
        principal: &Principal,
        arguments: &[Argument],
    ) -> Result<Decision, QuillCapabilityError> {
        let capabilities = self.capabilities(principal).await?;
        let required = self
            .resolver
            .resolve(action, Actor::new(principal, &capabilities), arguments)
            .await?;
        let decision = decide(action, required, &capabilities);

        tracing::debug!(
            principal = %principal.id(),
            tenant = %principal.scope(),
            action,
            allowed = decision.allowed,
            "Authorization decision"
        );

        Ok(decision)
    }

    /// Check several requests for one principal, reusing its effective
    /// capability set. Answers keep the order of `requests`.
    pub async fn bulk_can<I>(
        &self,
        principal: &Principal,
        requests: I,
    ) -> Result<Vec<BulkDecision>, QuillCapabilityError>
    where
        I: IntoIterator,
        I::Item: Into<CapabilityRequest>,
    {
        let capabilities = self.capabilities(principal).await?;
        let actor = Actor::new(principal, &capabilities);

        let mut decisions = Vec::new();
        for request in requests {
            let request = request.into();
            let required = self
                .resolver
                .resolve(&request.action, actor, &request.arguments)
                .await?;
            let allowed = decide(&request.action, required, &capabilities).allowed;
            decisions.push(BulkDecision { request, allowed });
        }
        Ok(decisions)
    }

    /// Whether the principal `id`, resolved against `scope`, may perform
    /// `action` there
    pub async fn can_for_tenant(
        &self,
        id: PrincipalId,
        scope: TenantScope,
        action: &str,
        arguments: &[Argument],
    ) -> Result<bool, QuillCapabilityError> {
        let principal = self.principal(id, scope).await?;
        self.can(action, &principal, arguments).await
    }

    /// Whether the author of `post_id` may perform `action`. A post that does
    /// not exist has no author, who may do nothing.
    pub async fn author_can(
        &self,
        post_id: u64,
        action: &str,
        arguments: &[Argument],
    ) -> Result<bool, QuillCapabilityError> {
        let Some(post) = self.resolver.data().post(post_id).await.map_err(Into::into)? else {
            return Ok(false);
        };
        let author = self.principal(post.author, self.default_scope()).await?;
        self.can(action, &author, arguments).await
    }
}

fn decide(action: &str, required: Requirements, capabilities: &CapabilitySet) -> Decision {
    let missing: Vec<String> = capabilities
        .missing(&required)
        .into_iter()
        .map(str::to_string)
        .collect();
    let allowed = !required.is_denied() && missing.is_empty();

    Decision {
        action: action.to_string(),
        required,
        missing,
        allowed,
    }
}
