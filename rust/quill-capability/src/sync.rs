//! Cross-target bound compatibility traits
//!
//! Resolution code is async so that the data access collaborator and the
//! filter pipeline may await I/O. On `wasm32-unknown-unknown` the traits below
//! add no bound at all; on native targets they stand for `Send` or
//! `Send + Sync` so a checker can be shared between tasks.

use std::future::Future;
use std::pin::Pin;

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSend for S where S: Send {}

#[allow(missing_docs)]
#[cfg(not(target_arch = "wasm32"))]
pub trait ConditionalSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<S> ConditionalSync for S where S: Send + Sync {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSend {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSend for S {}

#[allow(missing_docs)]
#[cfg(target_arch = "wasm32")]
pub trait ConditionalSync {}

#[cfg(target_arch = "wasm32")]
impl<S> ConditionalSync for S {}

/// A heap allocated future, `Send` wherever the target allows it.
///
/// Meta capability rules frequently defer to the resolution of another
/// action (a comment defers to its post, a term to its taxonomy), which
/// makes the resolver recursive. Recursive async functions need their
/// future boxed.
#[cfg(not(target_arch = "wasm32"))]
pub type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A heap allocated future, `Send` wherever the target allows it.
#[cfg(target_arch = "wasm32")]
pub type BoxedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
