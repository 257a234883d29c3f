//! # Composable Mutation Runtime
//!
//! Runtime for the mutation lifecycle controller.
//!
//! A [`Mutation`] wraps one injected [`Operation`] and drives every call to it
//! through the same state sequence, storing the latest outcome and firing the
//! caller's lifecycle callbacks along the way.
//!
//! ## Consuming State
//!
//! - **Polling**: [`Mutation::state`], [`Mutation::status`] and the derived
//!   `is_*` flags
//! - **Reactive**: [`Mutation::subscribe`] for the latest state (re-render
//!   trigger), [`Mutation::subscribe_transitions`] for every status change
//! - **Per call**: `on_success`, `on_error` and `on_settled` in
//!   [`MutateOptions`]
//!
//! ## Example
//!
//! ```
//! use composable_mutation_core::MutateOptions;
//! use composable_mutation_runtime::Mutation;
//!
//! # tokio_test::block_on(async {
//! let create = Mutation::new(|name: String| async move {
//!     if name.is_empty() {
//!         Err("name required".to_string())
//!     } else {
//!         Ok("ws_123".to_string())
//!     }
//! });
//!
//! let id = create
//!     .mutate("Acme".to_string(), MutateOptions::new().on_success(|id: &String| println!("{id}")))
//!     .await;
//!
//! assert_eq!(id, Ok(Some("ws_123".to_string())));
//! assert!(create.is_settled());
//! assert_eq!(create.data().as_deref(), Some("ws_123"));
//! # });
//! ```

use composable_mutation_core::{
    MutateHooks, MutateOptions, MutationState, MutationStatus, Operation,
};
use std::sync::Arc;

/// Prometheus metrics for observability
pub mod metrics;

/// Configuration for a [`Mutation`]
///
/// # Example
///
/// ```
/// use composable_mutation_runtime::MutationConfig;
///
/// let config = MutationConfig::default()
///     .with_name("create_workspace")
///     .with_transition_capacity(64);
/// assert_eq!(config.name, "create_workspace");
/// ```
#[derive(Debug, Clone)]
pub struct MutationConfig {
    /// Label used in tracing spans and metrics
    pub name: String,
    /// How many status transitions a lagging transition subscriber may fall behind
    pub transition_capacity: usize,
}

impl MutationConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(name: impl Into<String>, transition_capacity: usize) -> Self {
        Self {
            name: name.into(),
            transition_capacity: transition_capacity.max(1),
        }
    }

    /// Set the controller name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the transition broadcast capacity (at least 1)
    #[must_use]
    pub fn with_transition_capacity(mut self, capacity: usize) -> Self {
        self.transition_capacity = capacity.max(1);
        self
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            name: "mutation".to_string(),
            transition_capacity: 16,
        }
    }
}

/// Mutation module - the lifecycle controller
pub mod mutation {
    use super::{
        Arc, MutateHooks, MutateOptions, MutationConfig, MutationState, MutationStatus, Operation,
    };
    use crate::metrics::MutationMetrics;
    use std::marker::PhantomData;
    use std::time::Instant;
    use tokio::sync::{broadcast, watch};

    /// State type observed for an operation `O` called with `Req`
    pub type StateOf<Req, O> =
        MutationState<<O as Operation<Req>>::Output, <O as Operation<Req>>::Error>;

    struct Inner<Req, O>
    where
        O: Operation<Req>,
    {
        operation: O,
        config: MutationConfig,
        state: watch::Sender<StateOf<Req, O>>,
        transitions: broadcast::Sender<MutationStatus>,
        _request: PhantomData<fn(Req)>,
    }

    /// One running `mutate` call; runs the settle step when dropped.
    struct Invocation<'a, Req, O>
    where
        O: Operation<Req>,
    {
        mutation: &'a Mutation<Req, O>,
        hooks: MutateHooks<O::Output, O::Error>,
        started: Instant,
        completed: bool,
    }

    impl<'a, Req, O> Invocation<'a, Req, O>
    where
        O: Operation<Req>,
    {
        fn new(mutation: &'a Mutation<Req, O>, hooks: MutateHooks<O::Output, O::Error>) -> Self {
            Self {
                mutation,
                hooks,
                started: Instant::now(),
                completed: false,
            }
        }
    }

    impl<Req, O> Drop for Invocation<'_, Req, O>
    where
        O: Operation<Req>,
    {
        fn drop(&mut self) {
            self.mutation.transition(MutationState::settle);
            let elapsed = self.started.elapsed();
            MutationMetrics::record_settled(self.mutation.name(), elapsed);
            if self.completed {
                tracing::debug!(elapsed_ms = elapsed.as_millis(), "Mutation settled");
            } else {
                tracing::debug!(
                    elapsed_ms = elapsed.as_millis(),
                    "Mutation dropped before the operation finished, settling"
                );
            }
            self.hooks.settled();
        }
    }

    /// The mutation lifecycle controller
    ///
    /// Owns the observable state for one call site. Cloning is cheap and every
    /// clone drives and observes the same controller.
    ///
    /// # Type Parameters
    ///
    /// - `Req`: Request payload, forwarded verbatim to the operation
    /// - `O`: The injected operation
    ///
    /// # Concurrency
    ///
    /// There is no single-flight guard. A second [`mutate`](Self::mutate)
    /// issued while one is pending resets the state to pending again;
    /// whichever operation finishes last determines the final state, and each
    /// invocation still fires its own callbacks. Callers that need exclusive
    /// invocations should check [`is_pending`](Self::is_pending) first.
    pub struct Mutation<Req, O>
    where
        O: Operation<Req>,
    {
        inner: Arc<Inner<Req, O>>,
    }

    impl<Req, O> Clone for Mutation<Req, O>
    where
        O: Operation<Req>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<Req, O> std::fmt::Debug for Mutation<Req, O>
    where
        O: Operation<Req>,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Mutation")
                .field("name", &self.inner.config.name)
                .field("status", &self.inner.state.borrow().status)
                .finish_non_exhaustive()
        }
    }

    impl<Req, O> Mutation<Req, O>
    where
        O: Operation<Req>,
    {
        /// Create an idle controller around `operation` with default configuration
        #[must_use]
        pub fn new(operation: O) -> Self {
            Self::with_config(operation, MutationConfig::default())
        }

        /// Create an idle controller with custom configuration
        #[must_use]
        pub fn with_config(operation: O, config: MutationConfig) -> Self {
            let (state, _) = watch::channel(MutationState::new());
            let (transitions, _) = broadcast::channel(config.transition_capacity.max(1));

            Self {
                inner: Arc::new(Inner {
                    operation,
                    config,
                    state,
                    transitions,
                    _request: PhantomData,
                }),
            }
        }

        /// Controller name from its configuration
        #[must_use]
        pub fn name(&self) -> &str {
            &self.inner.config.name
        }

        /// Current status
        #[must_use]
        pub fn status(&self) -> MutationStatus {
            self.inner.state.borrow().status
        }

        /// Failure of the last failed invocation
        #[must_use]
        pub fn error(&self) -> Option<Arc<O::Error>> {
            self.inner.state.borrow().error.clone()
        }

        /// Check if status is idle
        #[must_use]
        pub fn is_idle(&self) -> bool {
            self.status().is_idle()
        }

        /// Check if status is pending
        #[must_use]
        pub fn is_pending(&self) -> bool {
            self.status().is_pending()
        }

        /// Check if status is success
        #[must_use]
        pub fn is_success(&self) -> bool {
            self.status().is_success()
        }

        /// Check if status is error
        #[must_use]
        pub fn is_error(&self) -> bool {
            self.status().is_error()
        }

        /// Check if status is settled
        #[must_use]
        pub fn is_settled(&self) -> bool {
            self.status().is_settled()
        }

        /// Watch the latest state
        ///
        /// The receiver is marked changed on every transition. Intermediate
        /// states may be coalesced if the observer is slower than the
        /// controller; use [`subscribe_transitions`](Self::subscribe_transitions)
        /// to see every step.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<StateOf<Req, O>> {
            self.inner.state.subscribe()
        }

        /// Receive every status transition, in order
        ///
        /// Only transitions made after subscribing are delivered.
        #[must_use]
        pub fn subscribe_transitions(&self) -> broadcast::Receiver<MutationStatus> {
            self.inner.transitions.subscribe()
        }

        /// Apply one state change and notify observers.
        fn transition<F>(&self, f: F)
        where
            F: FnOnce(&mut StateOf<Req, O>),
        {
            // Publish under the watch lock so both channels agree on order.
            self.inner.state.send_modify(|state| {
                f(state);
                let status = state.status;
                tracing::trace!(%status, "Mutation transitioned");
                // No transition subscribers is fine.
                let _ = self.inner.transitions.send(status);
            });
        }
    }

    impl<Req, O> Mutation<Req, O>
    where
        O: Operation<Req>,
        O::Output: Clone,
    {
        /// Snapshot of the current state
        #[must_use]
        pub fn state(&self) -> StateOf<Req, O> {
            self.inner.state.borrow().clone()
        }

        /// Outcome of the last successful invocation
        #[must_use]
        pub fn data(&self) -> Option<O::Output> {
            self.inner.state.borrow().data.clone()
        }

        /// Invoke the operation with `request`
        ///
        /// Runs one full lifecycle:
        /// 1. Clear `data` and `error`, go `Pending`
        /// 2. Await the operation
        /// 3. On success store `data`, go `Success`, fire `on_success`
        /// 4. On failure store `error`, go `Error`, fire `on_error`
        /// 5. Go `Settled`, fire `on_settled`
        ///
        /// Each state change is published before the matching callback runs,
        /// and `on_settled` always runs before this method returns.
        ///
        /// If the returned future is dropped while the operation is still
        /// running, the invocation settles on drop: status goes `Settled`
        /// with no outcome recorded and `on_settled` fires. `on_success` and
        /// `on_error` do not fire for a dropped invocation.
        ///
        /// # Returns
        ///
        /// - `Ok(Some(data))` when the operation resolves
        /// - `Ok(None)` when it fails and `rethrow` is off
        ///
        /// # Errors
        ///
        /// Returns the operation's own error, the same `Arc` stored in state
        /// and passed to `on_error`, when it fails and `rethrow` is on. The
        /// controller never produces errors of its own.
        #[tracing::instrument(skip_all, name = "mutation_mutate", fields(mutation = %self.inner.config.name))]
        pub async fn mutate(
            &self,
            request: Req,
            options: MutateOptions<O::Output, O::Error>,
        ) -> Result<Option<O::Output>, Arc<O::Error>> {
            let name = self.name();
            self.transition(MutationState::begin);
            MutationMetrics::record_started(name);
            tracing::debug!("Mutation started");

            // Settles on drop, so an abandoned call still ends in `Settled`.
            let mut invocation = Invocation::new(self, options.into_parts());

            let outcome = match self.inner.operation.call(request).await {
                Ok(data) => {
                    self.transition(|state| state.resolve(data.clone()));
                    MutationMetrics::record_success(name);
                    invocation.hooks.success(&data);
                    Ok(Some(data))
                },
                Err(error) => {
                    let error = Arc::new(error);
                    let rethrow = invocation.hooks.rethrow;
                    self.transition(|state| state.reject(Arc::clone(&error)));
                    MutationMetrics::record_failure(name, rethrow);
                    invocation.hooks.error(&error);
                    if rethrow { Err(error) } else { Ok(None) }
                },
            };

            invocation.completed = true;
            drop(invocation);

            outcome
        }

        /// Invoke the operation without callbacks
        ///
        /// Failures are captured in state only; the result is `None` when the
        /// operation fails.
        pub async fn mutate_silently(&self, request: Req) -> Option<O::Output> {
            self.mutate(request, MutateOptions::new())
                .await
                .ok()
                .flatten()
        }
    }
}

pub use mutation::{Mutation, StateOf};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = MutationConfig::default();
        assert_eq!(config.name, "mutation");
        assert_eq!(config.transition_capacity, 16);
    }

    #[test]
    fn config_capacity_is_at_least_one() {
        assert_eq!(MutationConfig::new("m", 0).transition_capacity, 1);
        assert_eq!(
            MutationConfig::default()
                .with_transition_capacity(0)
                .transition_capacity,
            1
        );
    }

    #[tokio::test]
    async fn new_controller_is_idle() {
        let mutation = Mutation::new(|n: u32| async move { Ok::<_, String>(n) });

        assert!(mutation.is_idle());
        let state = mutation.state();
        assert!(state.data.is_none());
        assert!(state.error.is_none());
        assert_eq!(mutation.name(), "mutation");
    }

    #[tokio::test]
    async fn success_settles_with_data() {
        let mutation = Mutation::new(|n: u32| async move { Ok::<_, String>(n * 2) });

        let result = mutation.mutate(21, MutateOptions::new()).await;

        assert_eq!(result, Ok(Some(42)));
        assert_eq!(mutation.status(), MutationStatus::Settled);
        assert_eq!(mutation.data(), Some(42));
        assert!(mutation.error().is_none());
    }

    #[tokio::test]
    async fn failure_without_rethrow_resolves_to_none() {
        let mutation = Mutation::new(|_: u32| async move { Err::<u32, _>("boom".to_string()) });

        let result = mutation.mutate(1, MutateOptions::new()).await;

        assert_eq!(result, Ok(None));
        assert!(mutation.is_settled());
        assert!(mutation.data().is_none());
        assert_eq!(mutation.error().as_deref().map(String::as_str), Some("boom"));
    }

    #[tokio::test]
    async fn mutate_silently_swallows_failure() {
        let mutation = Mutation::new(|n: u32| async move {
            if n == 0 { Err("zero".to_string()) } else { Ok(n) }
        });

        assert_eq!(mutation.mutate_silently(3).await, Some(3));
        assert_eq!(mutation.mutate_silently(0).await, None);
        assert!(mutation.error().is_some());
    }

    #[tokio::test]
    async fn debug_includes_name_and_status() {
        let mutation = Mutation::with_config(
            |n: u32| async move { Ok::<_, String>(n) },
            MutationConfig::default().with_name("create_workspace"),
        );
        let rendered = format!("{mutation:?}");
        assert!(rendered.contains("create_workspace"));
        assert!(rendered.contains("Idle"));
    }
}
