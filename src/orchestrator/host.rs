// Host-level metrics collection

use crate::orchestrator::models::HostSnapshot;
use crate::remote::Executor;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// One compound command emitting a fixed set of key:value lines, so the
/// whole snapshot costs a single round trip.
const SNAPSHOT_COMMAND: &str = concat!(
    "echo \"hostname:$(hostname)\"; ",
    "echo \"uptime:$(uptime -p)\"; ",
    "echo \"load:$(cat /proc/loadavg | cut -d' ' -f1-3)\"; ",
    "echo \"mem:$(free -h | awk '/^Mem:/ {print $3 \"|\" $2}')\"; ",
    "echo \"disk:$(df -h / | awk 'NR==2 {print $3 \"|\" $2}')\"; ",
    "echo \"temp:$(vcgencmd measure_temp 2>/dev/null | cut -d= -f2 || echo 'N/A')\""
);

/// Collects hostname, uptime, load, memory, disk and CPU temperature for
/// the managed host
pub struct HostCollector {
    executor: Arc<dyn Executor>,
    timeout: Duration,
}

impl HostCollector {
    pub fn new(executor: Arc<dyn Executor>, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    /// Gather a fresh snapshot. Best-effort: whatever keys the host did
    /// not emit fall back to their defaults instead of failing the call.
    pub async fn snapshot(&self) -> HostSnapshot {
        let result = self.executor.run(SNAPSHOT_COMMAND, self.timeout).await;
        parse_snapshot(&result.stdout)
    }
}

/// Parse the key:value lines of the snapshot command. Missing or empty
/// keys fall back to documented defaults (hostname "pi1", load "0 0 0",
/// mem/disk "0", temp "N/A") rather than failing the whole snapshot.
pub fn parse_snapshot(stdout: &str) -> HostSnapshot {
    let mut data: HashMap<&str, &str> = HashMap::new();
    for line in stdout.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if !key.is_empty() && !value.is_empty() {
                data.insert(key, value);
            }
        }
    }

    let (memory_used, memory_total) = split_used_total(data.get("mem").copied().unwrap_or(""));
    let (disk_used, disk_total) = split_used_total(data.get("disk").copied().unwrap_or(""));

    HostSnapshot {
        hostname: data.get("hostname").unwrap_or(&"pi1").to_string(),
        uptime: data
            .get("uptime")
            .map(|u| u.trim_start_matches("up ").to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        load_avg: data.get("load").unwrap_or(&"0 0 0").to_string(),
        memory_used,
        memory_total,
        disk_used,
        disk_total,
        cpu_temp: data.get("temp").unwrap_or(&"N/A").to_string(),
    }
}

/// Split a `used|total` pair, defaulting either side to "0" when absent
fn split_used_total(raw: &str) -> (String, String) {
    let mut parts = raw.splitn(2, '|');
    let used = parts.next().unwrap_or("").trim();
    let total = parts.next().unwrap_or("").trim();

    let or_zero = |v: &str| {
        if v.is_empty() {
            "0".to_string()
        } else {
            v.to_string()
        }
    };
    (or_zero(used), or_zero(total))
}
