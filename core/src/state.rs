//! Observable state of a mutation controller.
//!
//! [`MutationState`] is what a view reads: the current [`MutationStatus`],
//! the last successful outcome and the last failure. The boolean flags
//! (`is_pending()` and friends) are projections of `status` and are never
//! stored, so they cannot disagree with it.

use crate::status::MutationStatus;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// Snapshot of a mutation controller's state.
///
/// # Type Parameters
///
/// - `T`: The operation's success value
/// - `E`: The operation's error type
///
/// The failure is held behind an [`Arc`] so the value stored here, the value
/// handed to `on_error`, and the value returned to a rethrowing caller are one
/// and the same allocation.
///
/// # Invariants
///
/// - `data` and `error` are never both present.
/// - Both are cleared when a new invocation begins.
#[derive(Debug)]
pub struct MutationState<T, E> {
    /// Current lifecycle status
    pub status: MutationStatus,

    /// Outcome of the last successful invocation
    pub data: Option<T>,

    /// Failure of the last failed invocation
    pub error: Option<Arc<E>>,
}

impl<T, E> MutationState<T, E> {
    /// Create an idle state with no outcome
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
        }
    }

    /// Check if status is idle
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.status.is_idle()
    }

    /// Check if status is pending
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Check if status is success
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.status.is_error()
    }

    /// Check if status is settled
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.status.is_settled()
    }

    /// Start a new invocation: clear the previous outcome and go pending.
    pub fn begin(&mut self) {
        self.data = None;
        self.error = None;
        self.status = MutationStatus::Pending;
    }

    /// Record a successful outcome.
    pub fn resolve(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.status = MutationStatus::Success;
    }

    /// Record a failure.
    pub fn reject(&mut self, error: Arc<E>) {
        self.data = None;
        self.error = Some(error);
        self.status = MutationStatus::Error;
    }

    /// Finish the invocation, keeping whatever outcome was recorded.
    pub const fn settle(&mut self) {
        self.status = MutationStatus::Settled;
    }
}

impl<T, E> Default for MutationState<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

// Manual impl: `Arc<E>` is Clone for any `E`, derive would demand `E: Clone`.
impl<T: Clone, E> Clone for MutationState<T, E> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

impl<T, E> Serialize for MutationState<T, E>
where
    T: Serialize,
    E: std::fmt::Display,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("MutationState", 3)?;
        s.serialize_field("status", &self.status)?;
        s.serialize_field("data", &self.data)?;
        s.serialize_field("error", &self.error.as_ref().map(ToString::to_string))?;
        s.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type State = MutationState<String, String>;

    fn any_status() -> impl Strategy<Value = MutationStatus> {
        proptest::sample::select(MutationStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn flags_track_status(status in any_status()) {
            let state = State { status, data: None, error: None };
            prop_assert_eq!(state.is_idle(), status == MutationStatus::Idle);
            prop_assert_eq!(state.is_pending(), status == MutationStatus::Pending);
            prop_assert_eq!(state.is_success(), status == MutationStatus::Success);
            prop_assert_eq!(state.is_error(), status == MutationStatus::Error);
            prop_assert_eq!(state.is_settled(), status == MutationStatus::Settled);
        }

        #[test]
        fn outcomes_stay_exclusive(outcomes in proptest::collection::vec(any::<bool>(), 1..20)) {
            let mut state = State::new();
            for ok in outcomes {
                state.begin();
                prop_assert!(state.data.is_none() && state.error.is_none());
                if ok {
                    state.resolve("ws".to_string());
                } else {
                    state.reject(Arc::new("boom".to_string()));
                }
                state.settle();
                prop_assert!(state.is_settled());
                prop_assert!(state.data.is_some() != state.error.is_some());
            }
        }
    }

    #[test]
    fn begin_clears_previous_outcome() {
        let mut state = State::new();
        state.resolve("ws_1".to_string());
        state.settle();

        state.begin();
        assert!(state.is_pending());
        assert!(state.data.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn serializes_error_as_display() {
        let mut state = State::new();
        state.reject(Arc::new("name required".to_string()));
        state.settle();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "settled");
        assert!(json["data"].is_null());
        assert_eq!(json["error"], "name required");
    }
}
