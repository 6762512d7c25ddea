use log::{info, warn};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::Instant;

use crate::errors::ServiceError;
use crate::ollama::client::OllamaClient;

/// Grace period after spawning `ollama serve` before the first probe
const START_GRACE_SECS: u64 = 5;

/// Interval between connectivity probes while waiting for startup
const POLL_INTERVAL_SECS: u64 = 2;

/// Settle delay between stop and start during a restart
const RESTART_SETTLE_SECS: u64 = 2;

/// Connectivity status of the local inference service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Whether the service process appears to be running
    pub running: bool,
    /// Whether the endpoint answered a probe request
    pub connectable: bool,
}

/// Lifecycle manager for the local `ollama` daemon.
///
/// Not part of the translation hot path; the CLI exposes it as the
/// `service` subcommand.
pub struct ServiceManager<'a> {
    client: &'a OllamaClient,
}

impl<'a> ServiceManager<'a> {
    /// Create a manager that probes connectivity through the given client
    pub fn new(client: &'a OllamaClient) -> Self {
        Self { client }
    }

    /// Stop the service, waiting up to `timeout_secs` for the command to exit.
    ///
    /// A non-zero exit is logged but still counted as stopped; only a hung
    /// command is an error.
    pub async fn stop(&self, timeout_secs: u64) -> Result<bool, ServiceError> {
        info!("Stopping Ollama service...");

        let output = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            Command::new("ollama").arg("stop").output(),
        )
        .await
        .map_err(|_| ServiceError::Timeout(timeout_secs))?
        .map_err(|e| ServiceError::CommandFailed(e.to_string()))?;

        if !output.status.success() {
            warn!(
                "Stopping the service reported: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        info!("Ollama service stopped");
        Ok(true)
    }

    /// Start the service and wait until it answers a connectivity probe.
    ///
    /// Spawns `ollama serve` detached, waits a fixed grace period, then
    /// polls the endpoint until `timeout_secs` elapses.
    pub async fn start(&self, timeout_secs: u64) -> Result<bool, ServiceError> {
        info!("Starting Ollama service...");

        // The daemon must outlive this process; the child handle is dropped
        // without kill-on-drop.
        let child = Command::new("ollama")
            .arg("serve")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ServiceError::CommandFailed(e.to_string()))?;
        drop(child);

        info!("Waiting for Ollama service to come up...");
        tokio::time::sleep(Duration::from_secs(START_GRACE_SECS)).await;

        let deadline = Instant::now() + Duration::from_secs(timeout_secs);
        loop {
            if self.client.test_connection().await {
                info!("Ollama service started");
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Err(ServiceError::Timeout(timeout_secs));
            }
            tokio::time::sleep(Duration::from_secs(POLL_INTERVAL_SECS)).await;
        }
    }

    /// Restart the service: stop, settle briefly, then start
    pub async fn restart(
        &self,
        stop_timeout_secs: u64,
        start_timeout_secs: u64,
    ) -> Result<bool, ServiceError> {
        info!("Restarting Ollama service...");
        self.stop(stop_timeout_secs).await?;
        tokio::time::sleep(Duration::from_secs(RESTART_SETTLE_SECS)).await;
        self.start(start_timeout_secs).await
    }

    /// Probe the service and report its status
    pub async fn status(&self) -> ServiceStatus {
        let connectable = self.client.test_connection().await;
        ServiceStatus {
            running: connectable,
            connectable,
        }
    }
}
