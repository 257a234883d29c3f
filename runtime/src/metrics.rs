//! Prometheus metrics for mutation controllers.
//!
//! Every controller records how many invocations it started, how they ended
//! and how long the injected operation took. Metrics are labelled with the
//! controller's configured name.
//!
//! # Example
//!
//! ```rust,no_run
//! use composable_mutation_runtime::metrics::PrometheusMetrics;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metrics = PrometheusMetrics::new();
//! metrics.install()?;
//!
//! // Later, e.g. from the application's `/metrics` handler
//! let body = metrics.render().unwrap_or_default();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder for mutation metrics.
///
/// Serving the rendered text is left to the application's own HTTP surface.
#[derive(Default)]
pub struct PrometheusMetrics {
    handle: Option<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Recorder that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a recorder is already installed (e.g. by another test), this logs a
    /// warning and succeeds without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Whether this instance owns the installed recorder.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.handle.is_some()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this instance did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "mutations_started_total",
        "Total number of mutation invocations started"
    );
    describe_counter!(
        "mutations_succeeded_total",
        "Total number of mutation invocations that resolved"
    );
    describe_counter!(
        "mutations_failed_total",
        "Total number of mutation invocations that failed"
    );
    describe_counter!(
        "mutations_rethrown_total",
        "Total number of failures returned to the caller"
    );
    describe_histogram!(
        "mutation_duration_seconds",
        "Time from invocation start to settle"
    );
}

/// Mutation metrics recorder.
pub struct MutationMetrics;

impl MutationMetrics {
    /// Record an invocation start.
    pub fn record_started(name: &str) {
        counter!("mutations_started_total", "mutation" => name.to_owned()).increment(1);
    }

    /// Record a resolved invocation.
    pub fn record_success(name: &str) {
        counter!("mutations_succeeded_total", "mutation" => name.to_owned()).increment(1);
    }

    /// Record a failed invocation.
    pub fn record_failure(name: &str, rethrown: bool) {
        counter!("mutations_failed_total", "mutation" => name.to_owned()).increment(1);
        if rethrown {
            counter!("mutations_rethrown_total", "mutation" => name.to_owned()).increment(1);
        }
    }

    /// Record the time an invocation took to settle.
    pub fn record_settled(name: &str, duration: Duration) {
        histogram!("mutation_duration_seconds", "mutation" => name.to_owned())
            .record(duration.as_secs_f64());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Mutation, MutationConfig};

    #[test]
    fn test_uninstalled_renders_nothing() {
        let metrics = PrometheusMetrics::new();
        assert!(!metrics.is_installed());
        assert!(metrics.render().is_none());
    }

    #[tokio::test]
    async fn test_mutations_are_recorded() {
        let mut metrics = PrometheusMetrics::new();
        metrics.install().unwrap();

        let mutation = Mutation::with_config(
            |n: u32| async move { if n == 0 { Err("zero".to_string()) } else { Ok(n) } },
            MutationConfig::default().with_name("metered"),
        );
        mutation.mutate_silently(1).await;
        mutation.mutate_silently(0).await;
        MutationMetrics::record_failure("metered", true);

        // Another test may own the recorder, in which case there is no handle.
        if let Some(rendered) = metrics.render() {
            assert!(rendered.contains("mutations_started_total{mutation=\"metered\"} 2"));
            assert!(rendered.contains("mutations_succeeded_total{mutation=\"metered\"} 1"));
            assert!(rendered.contains("mutations_failed_total{mutation=\"metered\"} 2"));
            assert!(rendered.contains("mutations_rethrown_total{mutation=\"metered\"} 1"));
            assert!(rendered.contains("mutation_duration_seconds"));
        }
    }
}
