//! Records which lifecycle callbacks fired, in order.

use super::lock;
use composable_mutation_core::{MutateOptions, MutationStatus};
use std::sync::{Arc, Mutex};

/// A callback firing
#[derive(Debug)]
pub enum CallbackEvent<T, E> {
    /// `on_success` fired with this value
    Success(T),
    /// `on_error` fired with this error
    Error(Arc<E>),
    /// `on_settled` fired
    Settled,
}

impl<T, E> CallbackEvent<T, E> {
    /// Short name of the callback
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Error(_) => "error",
            Self::Settled => "settled",
        }
    }
}

/// Reads the controller status at the moment a callback fires
type StatusProbe = Arc<dyn Fn() -> MutationStatus + Send + Sync>;

/// A recorded firing and the controller status seen when it happened
type Entry<T, E> = (CallbackEvent<T, E>, Option<MutationStatus>);

/// Builds [`MutateOptions`] whose callbacks record into a shared log.
///
/// One recorder can hand out options for several invocations; the log keeps
/// every firing across all of them. Clones share the log.
pub struct CallbackRecorder<T, E> {
    log: Arc<Mutex<Vec<Entry<T, E>>>>,
    probe: Option<StatusProbe>,
}

impl<T, E> CallbackRecorder<T, E>
where
    T: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    /// Recorder with an empty log
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            probe: None,
        }
    }

    /// Also record the status returned by `probe` at each firing
    #[must_use]
    pub fn with_status_probe<P>(mut self, probe: P) -> Self
    where
        P: Fn() -> MutationStatus + Send + Sync + 'static,
    {
        self.probe = Some(Arc::new(probe));
        self
    }

    /// Options with all three callbacks recording and `rethrow` off
    #[must_use]
    pub fn options(&self) -> MutateOptions<T, E> {
        let on_success = self.clone();
        let on_error = self.clone();
        let on_settled = self.clone();

        MutateOptions::new()
            .on_success(move |data: &T| on_success.record(CallbackEvent::Success(data.clone())))
            .on_error(move |error: &Arc<E>| {
                on_error.record(CallbackEvent::Error(Arc::clone(error)));
            })
            .on_settled(move || on_settled.record(CallbackEvent::Settled))
    }

    /// Options with all three callbacks recording and `rethrow` on
    #[must_use]
    pub fn rethrowing(&self) -> MutateOptions<T, E> {
        self.options().rethrow(true)
    }

    /// Callback kinds in firing order
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        lock(&self.log).iter().map(|(event, _)| event.kind()).collect()
    }

    /// Statuses seen by the probe, in firing order
    #[must_use]
    pub fn observed_statuses(&self) -> Vec<Option<MutationStatus>> {
        lock(&self.log).iter().map(|(_, status)| *status).collect()
    }

    /// Values passed to `on_success`
    #[must_use]
    pub fn successes(&self) -> Vec<T> {
        lock(&self.log)
            .iter()
            .filter_map(|(event, _)| match event {
                CallbackEvent::Success(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Errors passed to `on_error`
    #[must_use]
    pub fn errors(&self) -> Vec<Arc<E>> {
        lock(&self.log)
            .iter()
            .filter_map(|(event, _)| match event {
                CallbackEvent::Error(error) => Some(Arc::clone(error)),
                _ => None,
            })
            .collect()
    }

    /// How many times `on_settled` fired
    #[must_use]
    pub fn settled_count(&self) -> usize {
        lock(&self.log)
            .iter()
            .filter(|(event, _)| matches!(event, CallbackEvent::Settled))
            .count()
    }
}

impl<T, E> CallbackRecorder<T, E> {
    fn record(&self, event: CallbackEvent<T, E>) {
        let status = self.probe.as_ref().map(|probe| probe());
        lock(&self.log).push((event, status));
    }
}

impl<T, E> Clone for CallbackRecorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
            probe: self.probe.clone(),
        }
    }
}

impl<T, E> Default for CallbackRecorder<T, E>
where
    T: Clone + Send + 'static,
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
