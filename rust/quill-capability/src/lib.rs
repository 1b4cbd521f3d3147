#![warn(missing_docs)]

//! This crate decides whether a principal may perform an action in a
//! multi-author publishing system.
//!
//! Actions come in two kinds. Primitive capabilities (`edit_posts`,
//! `manage_options`) are held directly through roles. Meta capabilities
//! (`edit_post` for post 42, `delete_user` for user 7) depend on the object
//! they target and are first resolved into a list of primitive capabilities
//! by the [MetaCapabilityResolver]. The [AuthorizationChecker] ties the two
//! together:
//!
//! ```rust
//! # use quill_capability::*;
//! # async fn example() -> Result<(), QuillCapabilityError> {
//! let data = MemoryDataAccess::default();
//! let scope = TenantScope::default();
//! data.insert_user(PrincipalId(2), scope, ["editor"]).await;
//! data.insert_user(PrincipalId(3), scope, ["contributor"]).await;
//! data.insert_post(PostRecord::new(10, PrincipalId(3), "post", "publish")).await;
//!
//! let checker = AuthorizationChecker::new(data, Settings::default());
//! let editor = checker.principal(PrincipalId(2), scope).await?;
//!
//! let required = checker.check("edit_post", &editor, &[Argument::from(10)]).await?;
//! assert_eq!(required, ["edit_others_posts", "edit_published_posts"]);
//! assert!(checker.can("edit_post", &editor, &[Argument::from(10)]).await?);
//! # Ok(())
//! # }
//! ```
//!
//! All object state is read through a [DataAccess] implementation supplied by
//! the embedder; [MemoryDataAccess] keeps everything in memory. Embedders
//! adjust resolution through the [FilterPipeline].

mod sync;
pub use sync::*;

mod error;
pub use error::*;

mod settings;
pub use settings::*;

mod capability;
pub use capability::*;

mod argument;
pub use argument::*;

mod role;
pub use role::*;

mod registry;
pub use registry::*;

mod principal;
pub use principal::*;

pub mod content;
pub use content::*;

mod data;
pub use data::*;

mod filter;
pub use filter::*;

mod resolver;
pub use resolver::*;

mod checker;
pub use checker::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
