//! Per-invocation options for a mutation.

use std::sync::Arc;

/// Callback fired with the resolved value
type SuccessCallback<T> = Box<dyn FnOnce(&T) + Send>;

/// Callback fired with the captured failure
type ErrorCallback<E> = Box<dyn FnOnce(&Arc<E>) + Send>;

/// Callback fired once the invocation has settled
type SettledCallback = Box<dyn FnOnce() + Send>;

/// Lifecycle callbacks and flags for one `mutate` call.
///
/// Every field is optional. Missing callbacks are no-ops and `rethrow`
/// defaults to `false`, in which case a failure is captured in state,
/// reported to `on_error`, and the call resolves to `Ok(None)`.
///
/// # Example
///
/// ```
/// use composable_mutation_core::MutateOptions;
///
/// let options = MutateOptions::<String, std::io::Error>::new()
///     .on_success(|id| println!("created {id}"))
///     .on_error(|err| eprintln!("failed: {err}"))
///     .on_settled(|| println!("done"));
///
/// assert!(!options.rethrows());
/// ```
pub struct MutateOptions<T, E> {
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback<E>>,
    on_settled: Option<SettledCallback>,
    rethrow: bool,
}

impl<T, E> MutateOptions<T, E> {
    /// Options with no callbacks and `rethrow` off
    #[must_use]
    pub const fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
            on_settled: None,
            rethrow: false,
        }
    }

    /// Run `f` with the resolved value
    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Run `f` with the captured failure
    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Arc<E>) + Send + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    /// Run `f` once the invocation has settled, whatever the outcome
    #[must_use]
    pub fn on_settled<F>(mut self, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_settled = Some(Box::new(f));
        self
    }

    /// Return failures to the caller instead of swallowing them
    #[must_use]
    pub const fn rethrow(mut self, rethrow: bool) -> Self {
        self.rethrow = rethrow;
        self
    }

    /// Whether failures are returned to the caller
    #[must_use]
    pub const fn rethrows(&self) -> bool {
        self.rethrow
    }

    /// Split into the individual hooks, consuming the options.
    #[must_use]
    pub fn into_parts(self) -> MutateHooks<T, E> {
        MutateHooks {
            on_success: self.on_success,
            on_error: self.on_error,
            on_settled: self.on_settled,
            rethrow: self.rethrow,
        }
    }
}

impl<T, E> Default for MutateOptions<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for MutateOptions<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutateOptions")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_settled", &self.on_settled.is_some())
            .field("rethrow", &self.rethrow)
            .finish()
    }
}

/// The hooks of a [`MutateOptions`], taken apart so a controller can fire
/// each one at its own point in the lifecycle.
#[allow(clippy::module_name_repetitions)]
pub struct MutateHooks<T, E> {
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback<E>>,
    on_settled: Option<SettledCallback>,
    /// Whether failures are returned to the caller
    pub rethrow: bool,
}

impl<T, E> MutateHooks<T, E> {
    /// Fire `on_success`, if set
    pub fn success(&mut self, data: &T) {
        if let Some(f) = self.on_success.take() {
            f(data);
        }
    }

    /// Fire `on_error`, if set
    pub fn error(&mut self, error: &Arc<E>) {
        if let Some(f) = self.on_error.take() {
            f(error);
        }
    }

    /// Fire `on_settled`, if set
    pub fn settled(&mut self) {
        if let Some(f) = self.on_settled.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn defaults_are_noops() {
        let options = MutateOptions::<u32, String>::default();
        assert!(!options.rethrows());

        let mut hooks = options.into_parts();
        hooks.success(&1);
        hooks.error(&Arc::new("boom".to_string()));
        hooks.settled();
        assert!(!hooks.rethrow);
    }

    #[test]
    fn hooks_fire_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut hooks = MutateOptions::<u32, String>::new()
            .on_settled(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .into_parts();

        hooks.settled();
        hooks.settled();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_shows_which_hooks_are_set() {
        let options = MutateOptions::<u32, String>::new()
            .on_success(|_| {})
            .rethrow(true);
        let rendered = format!("{options:?}");
        assert!(rendered.contains("on_success: true"));
        assert!(rendered.contains("on_error: false"));
        assert!(rendered.contains("rethrow: true"));
    }
}
