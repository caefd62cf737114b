// Service lifecycle control and remediation

use crate::orchestrator::models::{
    ActionResult, Inventory, ServiceAction, ServiceDefinition, ServiceKind,
};
use crate::remote::{ExecOutput, Executor};
use std::sync::Arc;
use std::time::Duration;

/// Applies lifecycle actions and recovery recipes to inventory services
pub struct ActionController {
    executor: Arc<dyn Executor>,
    inventory: Arc<Inventory>,
    timeout: Duration,
    compose_dir: String,
}

impl ActionController {
    pub fn new(
        executor: Arc<dyn Executor>,
        inventory: Arc<Inventory>,
        timeout: Duration,
        compose_dir: String,
    ) -> Self {
        Self {
            executor,
            inventory,
            timeout,
            compose_dir,
        }
    }

    /// Apply start/stop/restart to one named service.
    ///
    /// The name is resolved against the inventory before anything is
    /// interpolated into a command string; an unknown name never reaches
    /// the remote shell.
    pub async fn control(&self, name: &str, action: ServiceAction) -> ActionResult {
        let definition = match self.inventory.require(name) {
            Ok(definition) => definition,
            Err(e) => return ActionResult::failure(e.to_string()),
        };

        let command = match definition.kind {
            ServiceKind::Systemd => {
                format!("sudo systemctl {} {}", action.verb(), definition.name)
            }
            // docker restart keeps the existing container; it must not be
            // expanded into stop+start, which would lose that property
            ServiceKind::Docker => format!("docker {} {}", action.verb(), definition.name),
        };

        tracing::info!("Applying '{}' to {}", action.verb(), definition.name);
        let result = self.executor.run(&command, self.timeout).await;

        if result.ok() {
            ActionResult {
                success: true,
                message: format!(
                    "{} {} successfully",
                    definition.display_name,
                    action.past_tense()
                ),
                output: non_empty(result.combined()),
            }
        } else {
            ActionResult {
                success: false,
                message: format!("Failed to {} {}", action.verb(), definition.display_name),
                output: non_empty(error_text(&result)),
            }
        }
    }

    /// Run the fixed recovery recipe for a service stuck in an error state.
    ///
    /// The steps are chained with `;` so an already-stopped service does
    /// not abort the sequence; only the final compound exit code decides
    /// the aggregate outcome.
    pub async fn remediate(&self, name: &str) -> ActionResult {
        let definition = match self.inventory.require(name) {
            Ok(definition) => definition,
            Err(e) => return ActionResult::failure(e.to_string()),
        };

        let (command, steps) = self.remediation_recipe(definition);

        tracing::info!("Remediating {}", definition.name);
        let result = self.executor.run(&command, self.timeout).await;

        ActionResult {
            success: result.ok(),
            message: if result.ok() {
                format!("Remediation complete: {}", steps.join(" -> "))
            } else {
                "Remediation had issues".to_string()
            },
            output: non_empty(result.combined()),
        }
    }

    fn remediation_recipe(&self, definition: &ServiceDefinition) -> (String, Vec<&'static str>) {
        let name = &definition.name;
        match definition.kind {
            ServiceKind::Systemd => (
                format!(
                    "sudo systemctl stop {name} 2>/dev/null; \
                     sudo systemctl reset-failed {name} 2>/dev/null; \
                     sudo systemctl start {name}; \
                     sudo systemctl status {name} --no-pager"
                ),
                vec!["Stopped service", "Reset failed state", "Started service"],
            ),
            ServiceKind::Docker => (
                format!(
                    "docker stop {name} 2>/dev/null; \
                     docker rm {name} 2>/dev/null; \
                     cd {} && docker-compose up -d {name}; \
                     docker ps --filter name={name}",
                    self.compose_dir
                ),
                vec![
                    "Stopped container",
                    "Removed container",
                    "Recreated from compose",
                ],
            ),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// stderr if non-empty, otherwise stdout (the inverse of the success path)
fn error_text(result: &ExecOutput) -> String {
    if result.stderr.is_empty() {
        result.stdout.clone()
    } else {
        result.stderr.clone()
    }
}
