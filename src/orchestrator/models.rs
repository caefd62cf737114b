// Service inventory and status data models

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ServiceKind represents how a service's lifecycle is managed on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Managed by systemd (controlled via systemctl, logs via journalctl)
    Systemd,
    /// Managed by the Docker daemon (controlled via docker lifecycle verbs)
    Docker,
}

impl ServiceKind {
    /// Get display label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Systemd => "systemd",
            ServiceKind::Docker => "docker",
        }
    }
}

/// A single entry of the static service inventory. Compiled-in defaults,
/// optionally overridden from config, immutable once the process starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub display_name: String,
    pub kind: ServiceKind,
    pub port: Option<u16>,
}

impl ServiceDefinition {
    pub fn new(name: &str, display_name: &str, kind: ServiceKind, port: Option<u16>) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            kind,
            port,
        }
    }
}

/// Ordered service inventory with name lookup.
///
/// Service names double as the allow-list for everything interpolated into
/// remote commands: a name that does not resolve here never reaches the
/// shell.
#[derive(Debug, Clone)]
pub struct Inventory {
    services: Vec<ServiceDefinition>,
}

impl Inventory {
    pub fn new(services: Vec<ServiceDefinition>) -> Self {
        Self { services }
    }

    /// Look up a service by name. The list is small (≤ ~15 entries), a
    /// linear scan is fine.
    pub fn find(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Look up a service by name, failing with UnknownService
    pub fn require(&self, name: &str) -> crate::error::Result<&ServiceDefinition> {
        self.find(name)
            .ok_or_else(|| crate::error::PihelmError::UnknownService(name.to_string()).into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.services.iter()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Observed lifecycle state of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
    Error,
    Unknown,
}

impl ServiceState {
    /// Returns the state as a user-friendly string
    pub fn status_text(&self) -> &'static str {
        match self {
            ServiceState::Running => "Running",
            ServiceState::Stopped => "Stopped",
            ServiceState::Error => "Error",
            ServiceState::Unknown => "Unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

/// Point-in-time status for one inventory entry. Recomputed on every poll,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub display_name: String,
    pub kind: ServiceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub state: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
}

impl ServiceStatus {
    /// Status with no runtime details, used for stopped/errored services
    pub fn bare(definition: &ServiceDefinition, state: ServiceState) -> Self {
        Self {
            name: definition.name.clone(),
            display_name: definition.display_name.clone(),
            kind: definition.kind,
            port: definition.port,
            state,
            uptime: None,
            memory: None,
            cpu: None,
        }
    }
}

/// Lifecycle action applied to one service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    /// Verb as used in systemctl/docker command lines
    pub fn verb(&self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
        }
    }

    /// Past tense for result messages
    pub fn past_tense(&self) -> &'static str {
        match self {
            ServiceAction::Start => "started",
            ServiceAction::Stop => "stopped",
            ServiceAction::Restart => "restarted",
        }
    }
}

/// Outcome of one control or remediation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ActionResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
        }
    }
}

/// Log tail for one service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResult {
    pub logs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Host-level metrics, recomputed per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub hostname: String,
    pub uptime: String,
    pub load_avg: String,
    pub memory_used: String,
    pub memory_total: String,
    pub disk_used: String,
    pub disk_total: String,
    pub cpu_temp: String,
}

/// Format elapsed wall-clock time the way the dashboard shows it:
/// "{d}d {h}h" once a full day has passed, "{h}h {m}m" below that.
pub fn format_uptime(elapsed: Duration) -> String {
    let hours = elapsed.as_secs() / 3600;
    let mins = (elapsed.as_secs() % 3600) / 60;

    if hours >= 24 {
        format!("{}d {}h", hours / 24, hours % 24)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Parse the pipe-delimited `uptime|memory|cpu` triple emitted by
/// `docker stats --format`. Memory is truncated to the "used" portion
/// before the `/` separator. Missing fields come back empty.
pub fn parse_docker_stats(output: &str) -> (String, String, String) {
    let mut fields = output.splitn(3, '|');
    let uptime = fields.next().unwrap_or("").trim().to_string();
    let memory = fields
        .next()
        .and_then(|m| m.split('/').next())
        .unwrap_or("")
        .trim()
        .to_string();
    let cpu = fields.next().unwrap_or("").trim().to_string();
    (uptime, memory, cpu)
}
