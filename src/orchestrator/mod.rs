// Service orchestration façade

pub mod control;
pub mod host;
pub mod logs;
pub mod models;
pub mod status;

#[cfg(test)]
mod tests;

pub use control::ActionController;
pub use host::{parse_snapshot, HostCollector};
pub use logs::LogRetriever;
pub use models::{
    format_uptime, parse_docker_stats, ActionResult, HostSnapshot, Inventory, LogResult,
    ServiceAction, ServiceDefinition, ServiceKind, ServiceState, ServiceStatus,
};
pub use status::StatusPoller;

use crate::config::Config;
use crate::remote::{Executor, SshExecutor};
use std::sync::Arc;

/// The orchestration façade: one entry point over the status poller,
/// action controller, log retriever and host collector, all sharing a
/// single transport and the static inventory.
///
/// Every operation is self-contained and converts its failures into data;
/// callers inspect `success`/`state`/`error` fields, they never catch
/// errors from these methods.
pub struct Orchestrator {
    inventory: Arc<Inventory>,
    poller: StatusPoller,
    controller: ActionController,
    logs: LogRetriever,
    host: HostCollector,
}

impl Orchestrator {
    /// Construct over the real SSH transport described by `config`
    pub fn new(config: &Config) -> Self {
        let executor: Arc<dyn Executor> = Arc::new(SshExecutor::from_config(config));
        Self::with_executor(config, executor)
    }

    /// Construct over any transport; tests inject a mock here
    pub fn with_executor(config: &Config, executor: Arc<dyn Executor>) -> Self {
        let inventory = Arc::new(Inventory::new(config.services.clone()));
        let timeout = config.command_timeout();

        Self {
            poller: StatusPoller::new(executor.clone(), inventory.clone(), timeout),
            controller: ActionController::new(
                executor.clone(),
                inventory.clone(),
                timeout,
                config.compose_dir.clone(),
            ),
            logs: LogRetriever::new(
                executor.clone(),
                inventory.clone(),
                timeout,
                config.log_lines,
            ),
            host: HostCollector::new(executor, timeout),
            inventory,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Current status for every inventory entry, in inventory order
    pub async fn statuses(&self) -> Vec<ServiceStatus> {
        self.poller.poll_all().await
    }

    /// Apply a lifecycle action to one named service
    pub async fn control(&self, name: &str, action: ServiceAction) -> ActionResult {
        self.controller.control(name, action).await
    }

    /// Run the recovery recipe for one named service
    pub async fn remediate(&self, name: &str) -> ActionResult {
        self.controller.remediate(name).await
    }

    /// Fetch recent log lines for one named service
    pub async fn service_logs(&self, name: &str, lines: Option<usize>) -> LogResult {
        self.logs.fetch(name, lines).await
    }

    /// Fresh host-level metrics snapshot
    pub async fn host_snapshot(&self) -> HostSnapshot {
        self.host.snapshot().await
    }
}
