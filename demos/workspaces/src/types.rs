//! Domain types for workspaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `WorkspaceId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid workspace ID: {0}")]
pub struct ParseWorkspaceIdError(String);

/// Identifier the backend assigns to a workspace, e.g. `"ws_123"`.
///
/// # Validation
///
/// - `FromStr::from_str()`: rejects empty input (use for route parameters)
/// - `new()`: no validation (use for backend-issued IDs)
///
/// ```
/// use workspaces::WorkspaceId;
///
/// let id: WorkspaceId = "ws_123".parse().unwrap();
/// assert_eq!(id, WorkspaceId::new("ws_123"));
/// assert!("".parse::<WorkspaceId>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create a new `WorkspaceId` without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WorkspaceId {
    type Err = ParseWorkspaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseWorkspaceIdError(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

/// Request payload for creating a workspace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkspace {
    /// Display name; must not be blank
    pub name: String,
}

impl CreateWorkspace {
    /// Request a workspace called `name`
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A stored workspace
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Backend-issued identifier
    pub id: WorkspaceId,
    /// Display name
    pub name: String,
}

/// Errors raised by a workspace backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceError {
    /// The request was rejected before reaching storage
    #[error("{0}")]
    Validation(String),

    /// No workspace has this ID
    #[error("Workspace not found: {0}")]
    NotFound(WorkspaceId),

    /// The backend itself failed
    #[error("Backend error: {0}")]
    Backend(String),
}
