//! An operation that replays scripted outcomes.

use super::lock;
use composable_mutation_core::Operation;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// One scripted call
struct Step<T, E> {
    outcome: Result<T, E>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Releases a gated call.
///
/// Dropping the gate without opening it also releases the call.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    /// Let the gated call complete
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

/// Operation that answers each call with the next scripted outcome.
///
/// Clones share the script and the request log, so a test can keep one clone
/// while the controller owns another.
///
/// # Panics
///
/// A call made after the script is exhausted panics inside the returned
/// future.
///
/// # Example
///
/// ```
/// use composable_mutation_core::Operation;
/// use composable_mutation_testing::ScriptedOperation;
///
/// # tokio_test::block_on(async {
/// let op = ScriptedOperation::<&str, u32, String>::new()
///     .resolves(1)
///     .rejects("boom".to_string());
///
/// assert_eq!(op.call("a").await, Ok(1));
/// assert_eq!(op.call("b").await, Err("boom".to_string()));
/// assert_eq!(op.requests(), vec!["a", "b"]);
/// # });
/// ```
pub struct ScriptedOperation<Req, T, E> {
    script: Arc<Mutex<VecDeque<Step<T, E>>>>,
    requests: Arc<Mutex<Vec<Req>>>,
}

impl<Req, T, E> ScriptedOperation<Req, T, E> {
    /// Operation with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a call that resolves to `value`
    #[must_use]
    pub fn resolves(self, value: T) -> Self {
        self.push(Ok(value), None);
        self
    }

    /// Append a call that fails with `error`
    #[must_use]
    pub fn rejects(self, error: E) -> Self {
        self.push(Err(error), None);
        self
    }

    /// Append a call that completes with `outcome` once the returned gate opens
    #[must_use]
    pub fn gated(&self, outcome: Result<T, E>) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.push(outcome, Some(rx));
        Gate(tx)
    }

    /// Number of scripted calls not yet made
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }

    /// Number of calls made so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn push(&self, outcome: Result<T, E>, gate: Option<oneshot::Receiver<()>>) {
        lock(&self.script).push_back(Step { outcome, gate });
    }
}

impl<Req: Clone, T, E> ScriptedOperation<Req, T, E> {
    /// Requests received so far, in call order
    #[must_use]
    pub fn requests(&self) -> Vec<Req> {
        lock(&self.requests).clone()
    }
}

impl<Req, T, E> Default for ScriptedOperation<Req, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, T, E> Clone for ScriptedOperation<Req, T, E> {
    fn clone(&self) -> Self {
        Self {
            script: Arc::clone(&self.script),
            requests: Arc::clone(&self.requests),
        }
    }
}

impl<Req, T, E> Operation<Req> for ScriptedOperation<Req, T, E>
where
    Req: Send,
    T: Send,
    E: Send + Sync,
{
    type Output = T;
    type Error = E;

    #[allow(clippy::panic)] // Test support: an unscripted call is a broken test
    fn call(&self, request: Req) -> impl Future<Output = Result<T, E>> + Send {
        lock(&self.requests).push(request);
        let step = lock(&self.script).pop_front();

        async move {
            let Some(step) = step else {
                panic!("ScriptedOperation called more times than scripted");
            };
            if let Some(gate) = step.gate {
                let _ = gate.await;
            }
            step.outcome
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order() {
        let op = ScriptedOperation::<u32, &str, &str>::new()
            .resolves("first")
            .rejects("second");

        assert_eq!(op.remaining(), 2);
        assert_eq!(op.call(1).await, Ok("first"));
        assert_eq!(op.call(2).await, Err("second"));
        assert_eq!(op.remaining(), 0);
        assert_eq!(op.requests(), vec![1, 2]);
    }

    #[tokio::test]
    async fn gated_call_waits_for_gate() {
        let op = ScriptedOperation::<(), u32, String>::new();
        let gate = op.gated(Ok(7));

        let call = tokio::spawn({
            let op = op.clone();
            async move { op.call(()).await }
        });

        tokio::task::yield_now().await;
        assert!(!call.is_finished());

        gate.open();
        assert_eq!(call.await.unwrap(), Ok(7));
        assert_eq!(op.call_count(), 1);
    }
}
