//! Backends that store workspaces.

use crate::types::{CreateWorkspace, Workspace, WorkspaceError, WorkspaceId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Remote store of workspaces.
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so the backend can be shared
/// as `Arc<dyn WorkspaceBackend>`.
pub trait WorkspaceBackend: Send + Sync {
    /// Create a workspace and return its new ID.
    ///
    /// # Errors
    ///
    /// - `Validation`: the request is malformed (e.g. blank name)
    /// - `Backend`: storage failed
    fn create(
        &self,
        request: CreateWorkspace,
    ) -> Pin<Box<dyn Future<Output = Result<WorkspaceId, WorkspaceError>> + Send + '_>>;

    /// Look up a workspace by ID.
    ///
    /// # Errors
    ///
    /// - `Backend`: storage failed
    fn get<'a>(
        &'a self,
        id: &'a WorkspaceId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Workspace>, WorkspaceError>> + Send + 'a>>;
}

/// In-memory workspace backend for demos and tests.
///
/// Issues IDs as `ws_<n>` from a counter.
#[derive(Debug)]
pub struct InMemoryWorkspaces {
    workspaces: RwLock<HashMap<WorkspaceId, Workspace>>,
    next_id: AtomicU64,
}

impl InMemoryWorkspaces {
    /// Empty backend issuing `ws_1` first
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Empty backend issuing `ws_<first>` first
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            workspaces: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(first),
        }
    }

    /// Number of stored workspaces
    pub async fn len(&self) -> usize {
        self.workspaces.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.workspaces.read().await.is_empty()
    }
}

impl Default for InMemoryWorkspaces {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceBackend for InMemoryWorkspaces {
    fn create(
        &self,
        request: CreateWorkspace,
    ) -> Pin<Box<dyn Future<Output = Result<WorkspaceId, WorkspaceError>> + Send + '_>> {
        Box::pin(async move {
            let name = request.name.trim();
            if name.is_empty() {
                return Err(WorkspaceError::Validation("name required".to_string()));
            }

            let id = WorkspaceId::new(format!(
                "ws_{}",
                self.next_id.fetch_add(1, Ordering::SeqCst)
            ));
            let workspace = Workspace {
                id: id.clone(),
                name: name.to_string(),
            };
            self.workspaces.write().await.insert(id.clone(), workspace);

            tracing::debug!(workspace_id = %id, "Workspace created");
            Ok(id)
        })
    }

    fn get<'a>(
        &'a self,
        id: &'a WorkspaceId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Workspace>, WorkspaceError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.workspaces.read().await.get(id).cloned()) })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_sequential_ids() {
        let backend = InMemoryWorkspaces::starting_at(123);

        let first = backend.create(CreateWorkspace::named("Acme")).await.unwrap();
        let second = backend.create(CreateWorkspace::named("Globex")).await.unwrap();

        assert_eq!(first.as_str(), "ws_123");
        assert_eq!(second.as_str(), "ws_124");
        assert_eq!(backend.len().await, 2);
    }

    #[tokio::test]
    async fn rejects_blank_names() {
        let backend = InMemoryWorkspaces::new();

        let result = backend.create(CreateWorkspace::named("   ")).await;

        assert_eq!(
            result,
            Err(WorkspaceError::Validation("name required".to_string()))
        );
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn get_returns_stored_workspace() {
        let backend = InMemoryWorkspaces::new();
        let id = backend.create(CreateWorkspace::named(" Acme ")).await.unwrap();

        let workspace = backend.get(&id).await.unwrap().unwrap();
        assert_eq!(workspace.name, "Acme");
        assert!(backend.get(&WorkspaceId::new("ws_404")).await.unwrap().is_none());
    }
}
