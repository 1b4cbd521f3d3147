//! Meta capability resolution.
//!
//! A meta capability names an action on an object ("edit post 42"). The
//! [MetaCapabilityResolver] turns it into the ordered list of primitive
//! capabilities a principal must hold, consulting the current state of the
//! object through [DataAccess] and finally handing the list to the
//! [FilterPipeline].
//!
//! Rules are grouped by family in the submodules; the dispatch table lives in
//! [MetaAction].

use serde_json::Value;

use crate::{
    Argument, BoxedFuture, CapabilitySet, ConfigScope, ContentRegistry, DataAccess, FilterContext,
    FilterPipeline, PostRecord, Principal, PrincipalId, QuillCapabilityError, Requirements,
    Settings, TenantScope,
};

mod action;
pub use action::*;

mod environment;
mod meta;
mod network;
mod post;
mod term;
mod user;

/// Reusable block capabilities are granted through their post equivalents.
const BLOCK_CAPABILITIES: [&str; 10] = [
    "edit_blocks",
    "edit_others_blocks",
    "publish_blocks",
    "read_private_blocks",
    "delete_blocks",
    "delete_private_blocks",
    "delete_published_blocks",
    "delete_others_blocks",
    "edit_private_blocks",
    "edit_published_blocks",
];

/// The principal an action is resolved for, together with its effective
/// capability set.
///
/// A few rules depend on what the principal may do elsewhere (editing a
/// user in a network requires passing `manage_network_users`), which is why
/// the set travels with the principal.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    /// The principal
    pub principal: &'a Principal,
    /// Its effective capabilities
    pub capabilities: &'a CapabilitySet,
}

impl<'a> Actor<'a> {
    /// Pair a principal with its effective capability set
    pub fn new(principal: &'a Principal, capabilities: &'a CapabilitySet) -> Self {
        Self {
            principal,
            capabilities,
        }
    }

    fn scope(&self) -> TenantScope {
        self.principal.scope()
    }
}

/// Maps meta capabilities to primitive capability requirements.
#[derive(Debug, Clone)]
pub struct MetaCapabilityResolver<D> {
    data: D,
    content: ContentRegistry,
    settings: Settings,
    filters: FilterPipeline,
}

impl<D> MetaCapabilityResolver<D>
where
    D: DataAccess,
{
    /// A resolver over `data` with the built-in content types and no filters
    pub fn new(data: D, settings: Settings) -> Self {
        Self {
            data,
            content: ContentRegistry::default(),
            settings,
            filters: FilterPipeline::default(),
        }
    }

    /// Replace the content registry
    pub fn with_content(mut self, content: ContentRegistry) -> Self {
        self.content = content;
        self
    }

    /// Replace the filter pipeline
    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    /// The data access collaborator
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Installation settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registered content types
    pub fn content(&self) -> &ContentRegistry {
        &self.content
    }

    /// Registered filters
    pub fn filters(&self) -> &FilterPipeline {
        &self.filters
    }

    /// Resolve `action` for `actor` into the primitive capabilities it
    /// requires.
    ///
    /// Unrecognised actions require themselves. Denial is expressed as a
    /// list containing [`crate::DO_NOT_ALLOW`]; errors are reserved for
    /// missing required arguments, data access failures and filter
    /// failures.
    pub fn resolve<'a>(
        &'a self,
        action: &'a str,
        actor: Actor<'a>,
        arguments: &'a [Argument],
    ) -> BoxedFuture<'a, Result<Requirements, QuillCapabilityError>> {
        Box::pin(async move {
            let requirements = match MetaAction::from_name(action) {
                Some(rule) => self.apply_rule(rule, action, actor, arguments).await?,
                None => {
                    if let Some(target) = self.content.meta_alias(action) {
                        return self.resolve(target, actor, arguments).await;
                    }
                    fallthrough(action)
                }
            };

            let context = FilterContext {
                action,
                principal: actor.principal,
                arguments,
                scope: actor.scope(),
            };
            let requirements = self.filters.apply(requirements, &context).await?;

            tracing::debug!(
                principal = %actor.principal.id(),
                tenant = %actor.scope(),
                action,
                requirements = %requirements,
                "Resolved meta capability"
            );

            Ok(requirements)
        })
    }

    async fn apply_rule(
        &self,
        rule: MetaAction,
        action: &str,
        actor: Actor<'_>,
        arguments: &[Argument],
    ) -> Result<Requirements, QuillCapabilityError> {
        match rule {
            MetaAction::ChangePost(change) => self.change_post(change, action, actor, arguments).await,
            MetaAction::ReadPost => self.read_post(action, actor, arguments).await,
            MetaAction::PublishPost => self.publish_post(action, arguments).await,
            MetaAction::ObjectMeta(_, kind) => self.object_meta(kind, action, actor, arguments).await,
            MetaAction::EditComment => self.edit_comment(action, actor, arguments).await,
            MetaAction::Term(operation) => self.term(operation, action, actor, arguments).await,
            MetaAction::Taxonomy(operation) => {
                self.taxonomy(operation, action, actor, arguments).await
            }
            MetaAction::Fixed(capability) => Ok(Requirements::one(capability)),
            MetaAction::EditUser => self.edit_user(action, actor, arguments).await,
            MetaAction::DeleteUser => self.delete_user(actor, arguments).await,
            MetaAction::RemoveUser => self.remove_user(actor, arguments).await,
            MetaAction::PromoteUser => self.promote_user(action, actor, arguments).await,
            MetaAction::CreateUsers => self.create_users(actor).await,
            MetaAction::AppPassword => self.app_password(action, actor, arguments).await,
            MetaAction::Network => self.network(action, actor, arguments).await,
            MetaAction::SetupNetwork => Ok(self.setup_network()),
            MetaAction::DeleteSite => Ok(self.delete_site()),
            MetaAction::Privacy => Ok(self.privacy()),
            MetaAction::UnfilteredHtml => Ok(self.unfiltered_html(actor)),
            MetaAction::EditFiles => Ok(self.edit_files(action, actor)),
            MetaAction::FileMods => Ok(self.file_mods(action, actor)),
            MetaAction::Languages => Ok(self.languages(actor)),
            MetaAction::UpdateEnvironment => Ok(self.update_environment(actor)),
            MetaAction::UnfilteredUpload => Ok(self.unfiltered_upload(actor)),
            MetaAction::ActivatePlugins => self.activate_plugins().await,
            MetaAction::ManageLinks => self.manage_links(actor).await,
        }
    }

    /// Whether `actor` satisfies the resolution of `action`
    async fn actor_can(&self, actor: Actor<'_>, action: &str) -> Result<bool, QuillCapabilityError> {
        let requirements = self.resolve(action, actor, &[]).await?;
        Ok(actor.capabilities.satisfies(&requirements))
    }

    async fn post(&self, id: u64) -> Result<Option<PostRecord>, QuillCapabilityError> {
        self.data.post(id).await.map_err(Into::into)
    }

    async fn tenant_option(
        &self,
        scope: TenantScope,
        name: &str,
    ) -> Result<Option<Value>, QuillCapabilityError> {
        self.data
            .config_value(ConfigScope::Tenant(scope.tenant()), name)
            .await
            .map_err(Into::into)
    }

    async fn network_option(&self, name: &str) -> Result<Option<Value>, QuillCapabilityError> {
        self.data
            .config_value(ConfigScope::Network, name)
            .await
            .map_err(Into::into)
    }

    /// Whether `id` is a network super-admin. Always false outside a
    /// multi-tenant network.
    async fn is_super_admin(&self, id: PrincipalId) -> Result<bool, QuillCapabilityError> {
        if !self.settings.is_multi_tenant() {
            return Ok(false);
        }
        Ok(self
            .data
            .super_admins()
            .await
            .map_err(Into::into)?
            .contains(&id))
    }
}

/// Requirements of an action no rule recognises
fn fallthrough(action: &str) -> Requirements {
    if BLOCK_CAPABILITIES.contains(&action) {
        Requirements::one(action.replace("_blocks", "_posts"))
    } else {
        Requirements::one(action)
    }
}

/// The object id at `position`, or `None` when the argument is present but
/// names no object
fn object_id(
    action: &str,
    arguments: &[Argument],
    position: usize,
) -> Result<Option<u64>, QuillCapabilityError> {
    Ok(crate::argument::required(action, arguments, position)?.as_object_id())
}
