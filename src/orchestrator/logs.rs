// Log retrieval for one service

use crate::orchestrator::models::{Inventory, LogResult, ServiceKind};
use crate::remote::Executor;
use std::sync::Arc;
use std::time::Duration;

/// Fetches the most recent log lines for one inventory service
pub struct LogRetriever {
    executor: Arc<dyn Executor>,
    inventory: Arc<Inventory>,
    timeout: Duration,
    default_lines: usize,
}

impl LogRetriever {
    pub fn new(
        executor: Arc<dyn Executor>,
        inventory: Arc<Inventory>,
        timeout: Duration,
        default_lines: usize,
    ) -> Self {
        Self {
            executor,
            inventory,
            timeout,
            default_lines,
        }
    }

    /// Fetch the last `lines` log lines (config default when unset).
    /// Systemd units read from the journal, containers from the docker log
    /// tail with stdout and stderr combined.
    pub async fn fetch(&self, name: &str, lines: Option<usize>) -> LogResult {
        let definition = match self.inventory.require(name) {
            Ok(definition) => definition,
            Err(e) => {
                return LogResult {
                    logs: String::new(),
                    error: Some(e.to_string()),
                }
            }
        };

        let lines = lines.unwrap_or(self.default_lines);
        let command = match definition.kind {
            ServiceKind::Systemd => {
                format!(
                    "sudo journalctl -u {} -n {} --no-pager",
                    definition.name, lines
                )
            }
            ServiceKind::Docker => {
                format!("docker logs {} --tail {} 2>&1", definition.name, lines)
            }
        };

        let result = self.executor.run(&command, self.timeout).await;

        if result.ok() {
            LogResult {
                logs: result.combined(),
                error: None,
            }
        } else {
            LogResult {
                logs: String::new(),
                error: Some(if result.stderr.is_empty() {
                    result.stdout
                } else {
                    result.stderr
                }),
            }
        }
    }
}
