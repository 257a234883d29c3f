//! # Composable Mutation Core
//!
//! Core types for the mutation lifecycle controller.
//!
//! A *mutation* is a single request/response write operation issued to a
//! remote backend. This crate describes the pieces a controller needs to track
//! one: where it is in its lifecycle, what it produced, and how the caller
//! wants to hear about it. Running the state machine lives in the runtime
//! crate.
//!
//! ## Core Concepts
//!
//! - **Status**: `idle → pending → success | error → settled`
//! - **State**: The status plus the last outcome (`data`) or failure (`error`)
//! - **Operation**: The injected async function that performs the write
//! - **Options**: Per-call lifecycle callbacks and the `rethrow` flag
//!
//! ## Example
//!
//! ```
//! use composable_mutation_core::{MutateOptions, MutationState, MutationStatus};
//!
//! let state: MutationState<String, std::io::Error> = MutationState::default();
//! assert_eq!(state.status, MutationStatus::Idle);
//! assert!(state.is_idle());
//!
//! let options = MutateOptions::<String, std::io::Error>::new()
//!     .on_success(|id| println!("created {id}"))
//!     .rethrow(true);
//! assert!(options.rethrows());
//! ```

/// Lifecycle status of a mutation
pub mod status;

/// Observable mutation state and its derived flags
pub mod state;

/// The injected asynchronous operation
pub mod operation;

/// Per-invocation callbacks and flags
pub mod options;

pub use operation::Operation;
pub use options::{MutateHooks, MutateOptions};
pub use state::MutationState;
pub use status::MutationStatus;
