//! Create-workspace demo binary
//!
//! Runs the create-workspace controller against an in-memory backend: one
//! successful creation, then a blank name with `rethrow` set, then prints
//! the recorded Prometheus metrics.

use anyhow::Context;
use composable_mutation_core::MutateOptions;
use composable_mutation_runtime::metrics::PrometheusMetrics;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workspaces::{
    CreateWorkspace, InMemoryWorkspaces, WorkspaceError, WorkspaceId, create_workspace,
    get_workspace,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "workspaces=debug,composable_mutation_runtime=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut metrics = PrometheusMetrics::new();
    metrics.install()?;

    let backend = Arc::new(InMemoryWorkspaces::starting_at(123));
    let create = create_workspace(backend.clone());

    // Stand-in for a view re-rendering on every transition.
    let mut transitions = create.subscribe_transitions();
    let view = tokio::spawn(async move {
        while let Ok(status) = transitions.recv().await {
            tracing::info!(%status, "View re-rendered");
        }
    });

    let id = create
        .mutate(
            CreateWorkspace::named("Acme"),
            MutateOptions::new()
                .on_success(|id: &WorkspaceId| tracing::info!(workspace_id = %id, "Workspace created"))
                .on_settled(|| tracing::info!("Create settled")),
        )
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?
        .context("create resolved without an ID")?;
    println!("state: {}", serde_json::to_string(&create.state())?);

    let workspace = get_workspace(backend.as_ref(), &id).await?;
    println!("opened workspace {} ({})", workspace.name, workspace.id);

    let rejected = create
        .mutate(
            CreateWorkspace::named(""),
            MutateOptions::new()
                .on_error(|e: &Arc<WorkspaceError>| tracing::warn!(error = %e, "Create failed"))
                .on_settled(|| tracing::info!("Create settled"))
                .rethrow(true),
        )
        .await;
    if let Err(e) = rejected {
        println!("rethrown to caller: {e}");
    }
    println!("state: {}", serde_json::to_string(&create.state())?);

    drop(create);
    view.await?;

    if let Some(rendered) = metrics.render() {
        println!("\n--- metrics ---\n{rendered}");
    }
    Ok(())
}
