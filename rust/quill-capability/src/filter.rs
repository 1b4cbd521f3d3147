use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use async_trait::async_trait;

use crate::{Argument, ConditionalSync, Principal, QuillCapabilityError, Requirements, TenantScope};

/// What a filter gets to see about the action being resolved.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The action that was resolved
    pub action: &'a str,
    /// The principal the action is resolved for
    pub principal: &'a Principal,
    /// The action's positional arguments
    pub arguments: &'a [Argument],
    /// The tenant the resolution happens in
    pub scope: TenantScope,
}

/// An extension point that may rewrite the requirements resolved for an
/// action: append to them, remove from them or replace them outright.
///
/// Filters may do asynchronous work, e.g. consult a database. They are
/// still applied one after another, never concurrently.
///
/// ```
/// use async_trait::async_trait;
/// use quill_capability::{CapabilityFilter, FilterContext, QuillCapabilityError, Requirements};
///
/// struct ModeratorsMayEditComments;
///
/// #[cfg_attr(not(target_arch = "wasm32"), async_trait)]
/// #[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
/// impl CapabilityFilter for ModeratorsMayEditComments {
///     async fn filter(
///         &self,
///         requirements: Requirements,
///         context: &FilterContext<'_>,
///     ) -> Result<Requirements, QuillCapabilityError> {
///         if context.action == "edit_comment" && !requirements.is_denied() {
///             return Ok(Requirements::one("moderate_comments"));
///         }
///         Ok(requirements)
///     }
/// }
/// ```
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CapabilityFilter: ConditionalSync {
    /// Rewrite `requirements`
    async fn filter(
        &self,
        requirements: Requirements,
        context: &FilterContext<'_>,
    ) -> Result<Requirements, QuillCapabilityError>;
}

/// Adapter turning a synchronous closure into a [CapabilityFilter].
pub struct FnFilter<F>(F);

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<F> CapabilityFilter for FnFilter<F>
where
    F: Fn(Requirements, &FilterContext<'_>) -> Requirements + ConditionalSync,
{
    async fn filter(
        &self,
        requirements: Requirements,
        context: &FilterContext<'_>,
    ) -> Result<Requirements, QuillCapabilityError> {
        Ok((self.0)(requirements, context))
    }
}

struct Registration {
    priority: i32,
    filter: Arc<dyn CapabilityFilter>,
}

/// The ordered set of filters applied after every built-in resolution.
///
/// Filters run in ascending priority; filters sharing a priority run in
/// registration order. Each receives the output of the one before it.
#[derive(Default, Clone)]
pub struct FilterPipeline {
    registrations: Vec<Arc<Registration>>,
}

/// Priority used when registration order is all that matters
pub const DEFAULT_PRIORITY: i32 = 10;

impl FilterPipeline {
    /// An empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter at `priority`
    pub fn register(&mut self, priority: i32, filter: impl CapabilityFilter + 'static) -> &mut Self {
        let registration = Arc::new(Registration {
            priority,
            filter: Arc::new(filter),
        });
        // Stable insertion after every registration of equal or lower priority.
        let position = self
            .registrations
            .partition_point(|existing| existing.priority <= priority);
        self.registrations.insert(position, registration);
        self
    }

    /// Register a synchronous closure at `priority`
    pub fn register_fn<F>(&mut self, priority: i32, filter: F) -> &mut Self
    where
        F: Fn(Requirements, &FilterContext<'_>) -> Requirements + ConditionalSync + 'static,
    {
        self.register(priority, FnFilter(filter))
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether no filter is registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Run `requirements` through every filter in order
    pub async fn apply(
        &self,
        mut requirements: Requirements,
        context: &FilterContext<'_>,
    ) -> Result<Requirements, QuillCapabilityError> {
        for registration in &self.registrations {
            let filtered = registration.filter.filter(requirements, context).await?;
            tracing::trace!(
                action = context.action,
                priority = registration.priority,
                requirements = %filtered,
                "Applied capability filter"
            );
            requirements = filtered;
        }
        Ok(requirements)
    }
}

impl Debug for FilterPipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field(
                "priorities",
                &self
                    .registrations
                    .iter()
                    .map(|registration| registration.priority)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
