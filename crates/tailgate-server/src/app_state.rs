//! Shared application state.
//!
//! Built once by the agent and cloned into the RPC service and the ops router. Cloning is cheap
//! (everything is behind `Arc`).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tailgate_core::{CommitLog, PolicyDecisionPoint, ProfileStore};

use crate::obs::GatewayMetrics;
use crate::policy::AuthorizationGate;

#[derive(Clone)]
pub struct AppState {
    log: Arc<CommitLog>,
    profiles: Arc<dyn ProfileStore>,
    gate: AuthorizationGate,
    metrics: Arc<GatewayMetrics>,
    shutdown: CancellationToken,
    stream_buffer: usize,
}

impl AppState {
    pub fn new(
        log: Arc<CommitLog>,
        profiles: Arc<dyn ProfileStore>,
        policy: Arc<dyn PolicyDecisionPoint>,
        shutdown: CancellationToken,
        stream_buffer: usize,
    ) -> Self {
        let metrics = Arc::new(GatewayMetrics::default());
        let gate = AuthorizationGate::new(policy, Arc::clone(&metrics));
        Self {
            log,
            profiles,
            gate,
            metrics,
            shutdown,
            stream_buffer: stream_buffer.max(1),
        }
    }

    pub fn log(&self) -> &Arc<CommitLog> {
        &self.log
    }

    pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
        &self.profiles
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Root token; tails attach child tokens so shutdown ends them.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Point-in-time gauges rendered next to the registry.
    pub async fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let profiles = u64::try_from(self.profiles.len().await).unwrap_or(u64::MAX);
        vec![
            ("tailgate_log_records", self.log.len()),
            ("tailgate_profiles", profiles),
        ]
    }
}
