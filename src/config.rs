// Configuration management

use crate::error::Result;
use crate::orchestrator::{ServiceDefinition, ServiceKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP API binds to
    pub listen: String,
    /// Remote host to manage
    pub host: String,
    /// SSH login user on the remote host
    pub user: String,
    pub ssh_port: u16,
    /// Private key for SSH auth; falls back to the agent when unset.
    /// Never store passwords here - auth is key/agent only.
    pub identity_file: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
    /// Default number of log lines fetched per service
    pub log_lines: usize,
    /// Directory on the remote host holding the docker-compose file
    /// used to recreate containers during remediation
    pub compose_dir: String,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8090".to_string(),
            host: "pi1.local".to_string(),
            user: "pi".to_string(),
            ssh_port: 22,
            identity_file: None,
            connect_timeout_secs: 3,
            command_timeout_secs: 5,
            log_lines: 100,
            compose_dir: "~/monitoring".to_string(),
            services: default_services(),
        }
    }
}

impl Config {
    /// Get default config path: ~/.config/pihelm/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("pihelm").join("config.yaml"))
    }

    /// Load config from path, falling back to defaults if not found.
    /// Environment overrides (PIHELM_HOST, PIHELM_USER, PIHELM_IDENTITY_FILE,
    /// PIHELM_LISTEN) are applied last so deployments never need host
    /// details baked into the file.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().unwrap_or_default());

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            serde_yaml::from_str::<Config>(&contents)?
        } else {
            // Return defaults if no config file exists
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Save config to path
    pub fn save(&self, path: PathBuf) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("PIHELM_HOST") {
            self.host = host;
        }
        if let Ok(user) = std::env::var("PIHELM_USER") {
            self.user = user;
        }
        if let Ok(identity) = std::env::var("PIHELM_IDENTITY_FILE") {
            self.identity_file = Some(PathBuf::from(identity));
        }
        if let Ok(listen) = std::env::var("PIHELM_LISTEN") {
            self.listen = listen;
        }
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn command_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.command_timeout_secs)
    }
}

/// The fixed inventory managed on the Pi. Config files may override this
/// list, but at runtime it is immutable for the process lifetime.
pub fn default_services() -> Vec<ServiceDefinition> {
    use ServiceKind::{Docker, Systemd};

    vec![
        ServiceDefinition::new("postgresql", "PostgreSQL", Systemd, Some(5432)),
        ServiceDefinition::new("redis-server", "Redis", Systemd, Some(6379)),
        ServiceDefinition::new("pgbouncer", "PgBouncer", Systemd, Some(6432)),
        ServiceDefinition::new("fail2ban", "Fail2ban", Systemd, None),
        ServiceDefinition::new("ufw", "UFW Firewall", Systemd, None),
        ServiceDefinition::new("prometheus", "Prometheus", Docker, Some(9090)),
        ServiceDefinition::new("grafana", "Grafana", Docker, Some(3000)),
        ServiceDefinition::new("alertmanager", "Alertmanager", Docker, Some(9093)),
        ServiceDefinition::new("node-exporter", "Node Exporter", Docker, Some(9100)),
        ServiceDefinition::new("loki", "Loki", Docker, Some(3100)),
        ServiceDefinition::new("promtail", "Promtail", Docker, None),
    ]
}
