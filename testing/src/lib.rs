//! # Composable Mutation Testing
//!
//! Testing utilities and helpers for the mutation lifecycle controller.
//!
//! This crate provides:
//! - [`ScriptedOperation`]: an operation that replays scripted outcomes, with
//!   optional gates so a test decides when each call completes
//! - [`CallbackRecorder`]: options whose callbacks record what fired, in order
//! - Helpers for draining transition streams and enabling test logging
//!
//! ## Example
//!
//! ```
//! use composable_mutation_runtime::Mutation;
//! use composable_mutation_testing::{CallbackRecorder, ScriptedOperation};
//!
//! # tokio_test::block_on(async {
//! let operation = ScriptedOperation::<&str, String, String>::new().resolves("ws_123".to_string());
//! let mutation = Mutation::new(operation.clone());
//! let recorder = CallbackRecorder::new();
//!
//! let result = mutation.mutate("Acme", recorder.options()).await;
//!
//! assert_eq!(result, Ok(Some("ws_123".to_string())));
//! assert_eq!(recorder.kinds(), vec!["success", "settled"]);
//! assert_eq!(operation.requests(), vec!["Acme"]);
//! # });
//! ```

use composable_mutation_core::MutationStatus;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Scripted operations
pub mod mocks;

/// Callback recording
pub mod recorder;

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Test helpers and utilities.
pub mod helpers {
    use super::{MutationStatus, broadcast};

    /// Drain every transition currently buffered in `rx`.
    ///
    /// Stops at the first empty, lagged or closed result, so call it after
    /// the invocations under test have finished.
    #[must_use]
    pub fn drain_transitions(rx: &mut broadcast::Receiver<MutationStatus>) -> Vec<MutationStatus> {
        let mut seen = Vec::new();
        while let Ok(status) = rx.try_recv() {
            seen.push(status);
        }
        seen
    }

    /// The transitions a single invocation goes through.
    #[must_use]
    pub const fn lifecycle(success: bool) -> [MutationStatus; 3] {
        [
            MutationStatus::Pending,
            if success {
                MutationStatus::Success
            } else {
                MutationStatus::Error
            },
            MutationStatus::Settled,
        ]
    }

    /// Route `tracing` output to the test harness.
    ///
    /// Honours `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

pub use helpers::{drain_transitions, init_test_tracing, lifecycle};
pub use mocks::{Gate, ScriptedOperation};
pub use recorder::{CallbackEvent, CallbackRecorder};
