//! Create-workspace feature
//!
//! The write path behind the "create workspace" form: a [`Mutation`] around
//! a [`WorkspaceBackend`], plus the lookup the workspace page performs once
//! it has an ID.

use composable_mutation_core::Operation;
use composable_mutation_runtime::{Mutation, MutationConfig};
use std::future::Future;
use std::sync::Arc;

/// Workspace storage backends
pub mod backend;
/// Domain types
pub mod types;

pub use backend::{InMemoryWorkspaces, WorkspaceBackend};
pub use types::{CreateWorkspace, ParseWorkspaceIdError, Workspace, WorkspaceError, WorkspaceId};

/// Operation that creates a workspace through a backend
#[derive(Clone)]
pub struct CreateWorkspaceOperation {
    backend: Arc<dyn WorkspaceBackend>,
}

impl CreateWorkspaceOperation {
    /// Wrap `backend`
    #[must_use]
    pub fn new(backend: Arc<dyn WorkspaceBackend>) -> Self {
        Self { backend }
    }
}

impl Operation<CreateWorkspace> for CreateWorkspaceOperation {
    type Output = WorkspaceId;
    type Error = WorkspaceError;

    fn call(
        &self,
        request: CreateWorkspace,
    ) -> impl Future<Output = Result<WorkspaceId, WorkspaceError>> + Send {
        self.backend.create(request)
    }
}

/// Controller type returned by [`create_workspace`]
pub type CreateWorkspaceMutation = Mutation<CreateWorkspace, CreateWorkspaceOperation>;

/// Mutation controller for creating workspaces
///
/// One per form instance; create a fresh one when the form mounts.
///
/// # Example
///
/// ```
/// use composable_mutation_core::MutateOptions;
/// use std::sync::Arc;
/// use workspaces::{CreateWorkspace, InMemoryWorkspaces, create_workspace};
///
/// # tokio_test::block_on(async {
/// let create = create_workspace(Arc::new(InMemoryWorkspaces::starting_at(123)));
///
/// let id = create
///     .mutate(CreateWorkspace::named("Acme"), MutateOptions::new())
///     .await
///     .unwrap();
///
/// assert_eq!(id.unwrap().as_str(), "ws_123");
/// assert!(create.is_settled());
/// # });
/// ```
#[must_use]
pub fn create_workspace(backend: Arc<dyn WorkspaceBackend>) -> CreateWorkspaceMutation {
    Mutation::with_config(
        CreateWorkspaceOperation::new(backend),
        MutationConfig::default().with_name("create_workspace"),
    )
}

/// Fetch the workspace a page was opened for
///
/// # Errors
///
/// - `NotFound`: no workspace has this ID
/// - `Backend`: the lookup failed
pub async fn get_workspace(
    backend: &dyn WorkspaceBackend,
    id: &WorkspaceId,
) -> Result<Workspace, WorkspaceError> {
    backend
        .get(id)
        .await?
        .ok_or_else(|| WorkspaceError::NotFound(id.clone()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use composable_mutation_core::{MutateOptions, MutationStatus};
    use composable_mutation_testing::{CallbackRecorder, drain_transitions, lifecycle};

    fn backend() -> Arc<InMemoryWorkspaces> {
        Arc::new(InMemoryWorkspaces::starting_at(123))
    }

    #[tokio::test]
    async fn creates_acme() {
        let backend = backend();
        let create = create_workspace(backend.clone());
        let recorder = CallbackRecorder::<WorkspaceId, WorkspaceError>::new();
        let mut transitions = create.subscribe_transitions();

        let result = create
            .mutate(CreateWorkspace::named("Acme"), recorder.options())
            .await;

        let id = WorkspaceId::new("ws_123");
        assert_eq!(result, Ok(Some(id.clone())));
        assert_eq!(recorder.successes(), vec![id.clone()]);
        assert_eq!(recorder.settled_count(), 1);
        assert_eq!(drain_transitions(&mut transitions), lifecycle(true));

        let state = create.state();
        assert_eq!(state.status, MutationStatus::Settled);
        assert_eq!(state.data, Some(id.clone()));
        assert!(state.error.is_none());

        let workspace = get_workspace(backend.as_ref(), &id).await.unwrap();
        assert_eq!(workspace.name, "Acme");
    }

    #[tokio::test]
    async fn blank_name_is_rethrown() {
        let create = create_workspace(backend());
        let recorder = CallbackRecorder::<WorkspaceId, WorkspaceError>::new();

        let error = create
            .mutate(CreateWorkspace::named(""), recorder.rethrowing())
            .await
            .expect_err("validation failure should be rethrown");

        assert_eq!(
            *error,
            WorkspaceError::Validation("name required".to_string())
        );
        assert_eq!(error.to_string(), "name required");
        assert!(Arc::ptr_eq(&error, &recorder.errors()[0]));
        assert_eq!(recorder.kinds(), vec!["error", "settled"]);

        let state = create.state();
        assert!(state.is_settled());
        assert!(state.data.is_none());
        assert!(Arc::ptr_eq(&error, state.error.as_ref().unwrap()));
    }

    #[tokio::test]
    async fn state_serializes_for_views() {
        let create = create_workspace(backend());
        create
            .mutate(CreateWorkspace::named(""), MutateOptions::new())
            .await
            .unwrap();

        let json = serde_json::to_value(create.state()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "settled", "data": null, "error": "name required" })
        );
    }

    #[tokio::test]
    async fn unknown_workspace_is_not_found() {
        let backend = backend();
        let id = WorkspaceId::new("ws_404");

        let result = get_workspace(backend.as_ref(), &id).await;

        assert_eq!(result, Err(WorkspaceError::NotFound(id)));
    }
}
