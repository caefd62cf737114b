// Live status polling across the service inventory

use crate::orchestrator::models::{
    format_uptime, parse_docker_stats, Inventory, ServiceDefinition, ServiceKind, ServiceState,
    ServiceStatus,
};
use crate::remote::Executor;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Polls every inventory entry for its current state and runtime metrics
pub struct StatusPoller {
    executor: Arc<dyn Executor>,
    inventory: Arc<Inventory>,
    timeout: Duration,
}

impl StatusPoller {
    pub fn new(executor: Arc<dyn Executor>, inventory: Arc<Inventory>, timeout: Duration) -> Self {
        Self {
            executor,
            inventory,
            timeout,
        }
    }

    /// Poll the whole inventory concurrently: one result per entry, in
    /// inventory order. A slow or failing service only affects its own
    /// slot, so total latency tracks the slowest single poll.
    pub async fn poll_all(&self) -> Vec<ServiceStatus> {
        let polls = self.inventory.iter().map(|def| self.poll(def));
        futures::future::join_all(polls).await
    }

    /// Poll one service. Never fails; anything unexpected collapses to
    /// `state: error` for this entry.
    pub async fn poll(&self, definition: &ServiceDefinition) -> ServiceStatus {
        match definition.kind {
            ServiceKind::Systemd => self.poll_systemd(definition).await,
            ServiceKind::Docker => self.poll_docker(definition).await,
        }
    }

    async fn poll_systemd(&self, definition: &ServiceDefinition) -> ServiceStatus {
        let command = format!(
            "systemctl is-active {} 2>/dev/null || echo 'inactive'",
            definition.name
        );
        let result = self.executor.run(&command, self.timeout).await;

        let state = match result.stdout.as_str() {
            "active" => ServiceState::Running,
            "inactive" => ServiceState::Stopped,
            _ => ServiceState::Error,
        };

        let mut status = ServiceStatus::bare(definition, state);
        if state.is_running() {
            status.uptime = self.systemd_uptime(&definition.name).await;
        }
        status
    }

    /// Second query, only issued for running units: elapsed time since the
    /// unit last entered the active state.
    async fn systemd_uptime(&self, name: &str) -> Option<String> {
        let command = format!(
            "systemctl show {} --property=ActiveEnterTimestamp --value 2>/dev/null",
            name
        );
        let result = self.executor.run(&command, self.timeout).await;
        if !result.ok() || result.stdout.is_empty() {
            return None;
        }

        let started = parse_systemd_timestamp(&result.stdout)?;
        let elapsed = Utc::now().signed_duration_since(started).to_std().ok()?;
        Some(format_uptime(elapsed))
    }

    async fn poll_docker(&self, definition: &ServiceDefinition) -> ServiceStatus {
        let command = format!(
            "docker inspect --format='{{{{.State.Status}}}}' {} 2>/dev/null || echo 'not_found'",
            definition.name
        );
        let result = self.executor.run(&command, self.timeout).await;

        // A missing container counts as stopped, not as an error: services
        // recreated by remediation disappear briefly between polls.
        let state = match result.stdout.as_str() {
            "running" => ServiceState::Running,
            "exited" | "stopped" | "not_found" => ServiceState::Stopped,
            _ => ServiceState::Error,
        };

        let mut status = ServiceStatus::bare(definition, state);
        if state.is_running() {
            let stats_command = format!(
                "docker stats {} --no-stream --format '{{{{.UpTime}}}}|{{{{.MemUsage}}}}|{{{{.CPUPerc}}}}' 2>/dev/null",
                definition.name
            );
            let stats = self.executor.run(&stats_command, self.timeout).await;
            if stats.ok() && !stats.stdout.is_empty() {
                let (uptime, memory, cpu) = parse_docker_stats(&stats.stdout);
                status.uptime = non_empty(uptime);
                status.memory = non_empty(memory);
                status.cpu = non_empty(cpu);
            }
        }
        status
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse a `systemctl show --property=ActiveEnterTimestamp --value` string,
/// e.g. "Mon 2024-01-01 10:30:00 UTC". The trailing timezone name is
/// ignored; the managed host runs UTC.
pub fn parse_systemd_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let mut parts = raw.split_whitespace();
    let _weekday = parts.next()?;
    let date = parts.next()?;
    let time = parts.next()?;

    let naive =
        NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S").ok()?;
    Some(DateTime::from_naive_utc_and_offset(naive, Utc))
}
