//! The asynchronous operation a mutation controller wraps.
//!
//! The controller knows nothing about transports or payload shapes. It hands
//! the caller's request to an [`Operation`] and waits for exactly one outcome.

use futures::future::{TryFuture, TryFutureExt};
use std::future::Future;

/// An injected asynchronous write operation.
///
/// Any `Fn(Req) -> impl Future<Output = Result<T, E>>` is an operation, so
/// async closures can be passed straight to the controller. Implement the
/// trait by hand when the operation carries its own dependencies.
///
/// # Example
///
/// ```
/// use composable_mutation_core::Operation;
///
/// # tokio_test::block_on(async {
/// let create = |name: String| async move {
///     if name.is_empty() {
///         Err("name required")
///     } else {
///         Ok(format!("ws_{}", name.len()))
///     }
/// };
///
/// assert_eq!(create.call("Acme".to_string()).await, Ok("ws_4".to_string()));
/// assert_eq!(create.call(String::new()).await, Err("name required"));
/// # });
/// ```
pub trait Operation<Req>: Send + Sync {
    /// Value produced when the operation resolves
    type Output: Send;

    /// Error raised when the operation fails
    type Error: Send + Sync;

    /// Run the operation with the caller's request
    fn call(
        &self,
        request: Req,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<F, Fut, Req> Operation<Req> for F
where
    F: Fn(Req) -> Fut + Send + Sync,
    Fut: TryFuture + Send,
    Fut::Ok: Send,
    Fut::Error: Send + Sync,
{
    type Output = Fut::Ok;
    type Error = Fut::Error;

    fn call(
        &self,
        request: Req,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send {
        TryFutureExt::into_future(self(request))
    }
}
