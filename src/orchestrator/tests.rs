#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::orchestrator::host::parse_snapshot;
    use crate::orchestrator::models::{
        format_uptime, parse_docker_stats, Inventory, ServiceAction, ServiceDefinition,
        ServiceKind, ServiceState,
    };
    use crate::orchestrator::status::{parse_systemd_timestamp, StatusPoller};
    use crate::orchestrator::Orchestrator;
    use crate::remote::{ExecOutput, Executor};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn out(stdout: &str) -> ExecOutput {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    fn fail(stderr: &str) -> ExecOutput {
        ExecOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            exit_code: 1,
        }
    }

    struct MockRule {
        pattern: String,
        delay: Option<Duration>,
        output: ExecOutput,
    }

    /// Scripted transport: first rule whose pattern is a substring of the
    /// command wins, everything else gets the fallback. Counts calls and
    /// records every command it sees.
    struct MockExecutor {
        rules: Vec<MockRule>,
        fallback: ExecOutput,
        fallback_delay: Option<Duration>,
        calls: AtomicUsize,
        commands: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        fn new() -> Self {
            Self {
                rules: Vec::new(),
                fallback: out(""),
                fallback_delay: None,
                calls: AtomicUsize::new(0),
                commands: Mutex::new(Vec::new()),
            }
        }

        fn with_fallback(fallback: ExecOutput) -> Self {
            Self {
                fallback,
                ..Self::new()
            }
        }

        fn respond(mut self, pattern: &str, output: ExecOutput) -> Self {
            self.rules.push(MockRule {
                pattern: pattern.to_string(),
                delay: None,
                output,
            });
            self
        }

        fn respond_slow(mut self, pattern: &str, delay: Duration, output: ExecOutput) -> Self {
            self.rules.push(MockRule {
                pattern: pattern.to_string(),
                delay: Some(delay),
                output,
            });
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen_commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Executor for MockExecutor {
        async fn run(&self, command: &str, limit: Duration) -> ExecOutput {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.commands.lock().unwrap().push(command.to_string());

            let (delay, output) = match self.rules.iter().find(|r| command.contains(&r.pattern)) {
                Some(rule) => (rule.delay, rule.output.clone()),
                None => (self.fallback_delay, self.fallback.clone()),
            };

            if let Some(delay) = delay {
                // Honor the caller deadline the way the real transport does
                if delay >= limit {
                    tokio::time::sleep(limit).await;
                    return ExecOutput {
                        stdout: String::new(),
                        stderr: "Command timed out".to_string(),
                        exit_code: 1,
                    };
                }
                tokio::time::sleep(delay).await;
            }
            output
        }
    }

    fn test_config() -> Config {
        Config {
            command_timeout_secs: 1,
            ..Config::default()
        }
    }

    fn orchestrator_with(mock: Arc<MockExecutor>) -> Orchestrator {
        Orchestrator::with_executor(&test_config(), mock)
    }

    fn single_service_poller(
        definition: ServiceDefinition,
        mock: Arc<MockExecutor>,
    ) -> StatusPoller {
        let inventory = Arc::new(Inventory::new(vec![definition]));
        StatusPoller::new(mock, inventory, Duration::from_secs(1))
    }

    fn systemd_def(name: &str) -> ServiceDefinition {
        ServiceDefinition::new(name, "Test Unit", ServiceKind::Systemd, None)
    }

    fn docker_def(name: &str) -> ServiceDefinition {
        ServiceDefinition::new(name, "Test Container", ServiceKind::Docker, Some(3000))
    }

    #[tokio::test]
    async fn test_poll_all_covers_inventory_in_order() {
        // Everything reports inactive/not_found; every slot must still be
        // present, in inventory order
        let mock = Arc::new(
            MockExecutor::new()
                .respond("systemctl is-active", out("inactive"))
                .respond("docker inspect", out("not_found")),
        );
        let orchestrator = orchestrator_with(mock.clone());

        let statuses = orchestrator.statuses().await;
        let config = test_config();

        assert_eq!(statuses.len(), config.services.len());
        for (status, definition) in statuses.iter().zip(config.services.iter()) {
            assert_eq!(status.name, definition.name);
            assert_eq!(status.state, ServiceState::Stopped);
        }
    }

    #[tokio::test]
    async fn test_systemd_state_mapping() {
        for (stdout, expected) in [
            ("active", ServiceState::Running),
            ("inactive", ServiceState::Stopped),
            ("failed", ServiceState::Error),
            ("", ServiceState::Error),
            ("garbage", ServiceState::Error),
        ] {
            let mock = Arc::new(
                MockExecutor::new()
                    .respond("is-active", out(stdout))
                    .respond("ActiveEnterTimestamp", out("Mon 2024-01-01 10:00:00 UTC")),
            );
            let poller = single_service_poller(systemd_def("redis-server"), mock);

            let status = poller.poll(&systemd_def("redis-server")).await;
            assert_eq!(status.state, expected, "stdout {:?}", stdout);
        }
    }

    #[tokio::test]
    async fn test_systemd_running_reports_uptime() {
        let mock = Arc::new(
            MockExecutor::new()
                .respond("is-active", out("active"))
                .respond("ActiveEnterTimestamp", out("Mon 2024-01-01 10:00:00 UTC")),
        );
        let poller = single_service_poller(systemd_def("postgresql"), mock.clone());

        let status = poller.poll(&systemd_def("postgresql")).await;

        assert_eq!(status.state, ServiceState::Running);
        // Well over 24h since that timestamp: day/hour format
        let uptime = status.uptime.expect("running unit should report uptime");
        assert!(uptime.contains('d'), "got {:?}", uptime);
        // State query plus the conditional uptime query
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_stopped_unit_skips_uptime_query() {
        let mock = Arc::new(MockExecutor::new().respond("is-active", out("inactive")));
        let poller = single_service_poller(systemd_def("postgresql"), mock.clone());

        let status = poller.poll(&systemd_def("postgresql")).await;

        assert_eq!(status.state, ServiceState::Stopped);
        assert!(status.uptime.is_none());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_docker_not_found_is_stopped() {
        let mock = Arc::new(MockExecutor::new().respond("docker inspect", out("not_found")));
        let poller = single_service_poller(docker_def("grafana"), mock);

        let status = poller.poll(&docker_def("grafana")).await;
        assert_eq!(status.state, ServiceState::Stopped);
    }

    #[tokio::test]
    async fn test_docker_state_mapping() {
        for (stdout, expected) in [
            ("running", ServiceState::Running),
            ("exited", ServiceState::Stopped),
            ("stopped", ServiceState::Stopped),
            ("restarting", ServiceState::Error),
        ] {
            let mock = Arc::new(
                MockExecutor::new()
                    .respond("docker inspect", out(stdout))
                    .respond("docker stats", out("3 hours|512MiB / 2GiB|1.25%")),
            );
            let poller = single_service_poller(docker_def("loki"), mock);

            let status = poller.poll(&docker_def("loki")).await;
            assert_eq!(status.state, expected, "stdout {:?}", stdout);
        }
    }

    #[tokio::test]
    async fn test_docker_running_parses_stats() {
        let mock = Arc::new(
            MockExecutor::new()
                .respond("docker inspect", out("running"))
                .respond("docker stats", out("3 hours|512MiB / 2GiB|1.25%")),
        );
        let poller = single_service_poller(docker_def("prometheus"), mock);

        let status = poller.poll(&docker_def("prometheus")).await;

        assert_eq!(status.state, ServiceState::Running);
        assert_eq!(status.uptime.as_deref(), Some("3 hours"));
        assert_eq!(status.memory.as_deref(), Some("512MiB"));
        assert_eq!(status.cpu.as_deref(), Some("1.25%"));
    }

    #[tokio::test]
    async fn test_failed_stats_query_keeps_running_state() {
        let mock = Arc::new(
            MockExecutor::new()
                .respond("docker inspect", out("running"))
                .respond("docker stats", fail("stats unavailable")),
        );
        let poller = single_service_poller(docker_def("prometheus"), mock);

        let status = poller.poll(&docker_def("prometheus")).await;

        assert_eq!(status.state, ServiceState::Running);
        assert!(status.memory.is_none());
    }

    #[tokio::test]
    async fn test_control_unknown_service_makes_no_remote_call() {
        let mock = Arc::new(MockExecutor::new());
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator
            .control("does-not-exist", ServiceAction::Start)
            .await;

        assert!(!result.success);
        assert_eq!(result.message, "Unknown service: does-not-exist");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_docker_restart_uses_restart_verb() {
        let mock = Arc::new(MockExecutor::with_fallback(out("grafana")));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.control("grafana", ServiceAction::Restart).await;

        assert!(result.success);
        assert_eq!(result.message, "Grafana restarted successfully");

        let commands = mock.seen_commands();
        assert_eq!(commands, vec!["docker restart grafana".to_string()]);
    }

    #[tokio::test]
    async fn test_systemd_control_uses_sudo_systemctl() {
        let mock = Arc::new(MockExecutor::new());
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.control("postgresql", ServiceAction::Stop).await;

        assert!(result.success);
        assert_eq!(result.message, "PostgreSQL stopped successfully");
        assert_eq!(
            mock.seen_commands(),
            vec!["sudo systemctl stop postgresql".to_string()]
        );
    }

    #[tokio::test]
    async fn test_control_failure_surfaces_stderr() {
        let mock = Arc::new(MockExecutor::with_fallback(fail("unit not loaded")));
        let orchestrator = orchestrator_with(mock);

        let result = orchestrator.control("fail2ban", ServiceAction::Start).await;

        assert!(!result.success);
        assert_eq!(result.message, "Failed to start Fail2ban");
        assert_eq!(result.output.as_deref(), Some("unit not loaded"));
    }

    #[tokio::test]
    async fn test_systemd_remediation_is_one_best_effort_chain() {
        let mock = Arc::new(MockExecutor::with_fallback(out("active")));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.remediate("redis-server").await;

        assert!(result.success);
        assert!(result.message.starts_with("Remediation complete:"));

        // One compound command; the start step is chained with ';' so a
        // failing stop cannot abort it
        let commands = mock.seen_commands();
        assert_eq!(commands.len(), 1);
        let command = &commands[0];
        assert!(command.contains("systemctl stop redis-server"));
        assert!(command.contains("systemctl reset-failed redis-server"));
        assert!(command.contains("systemctl start redis-server"));
        assert!(!command.contains("&&"));
        let stop_at = command.find("systemctl stop").unwrap();
        let start_at = command.find("systemctl start").unwrap();
        assert!(stop_at < start_at);
    }

    #[tokio::test]
    async fn test_docker_remediation_recreates_from_compose() {
        let mock = Arc::new(MockExecutor::with_fallback(out("loki")));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.remediate("loki").await;

        assert!(result.success);
        let command = &mock.seen_commands()[0];
        assert!(command.contains("docker stop loki"));
        assert!(command.contains("docker rm loki"));
        assert!(command.contains("docker-compose up -d loki"));
    }

    #[tokio::test]
    async fn test_remediation_failure_uses_final_exit_code() {
        let mock = Arc::new(MockExecutor::with_fallback(fail("start failed")));
        let orchestrator = orchestrator_with(mock);

        let result = orchestrator.remediate("redis-server").await;

        assert!(!result.success);
        assert_eq!(result.message, "Remediation had issues");
        assert_eq!(result.output.as_deref(), Some("start failed"));
    }

    #[tokio::test]
    async fn test_remediate_unknown_service() {
        let mock = Arc::new(MockExecutor::new());
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.remediate("nope").await;

        assert!(!result.success);
        assert_eq!(result.message, "Unknown service: nope");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_logs_unknown_service() {
        let mock = Arc::new(MockExecutor::new());
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.service_logs("nope", None).await;

        assert!(result.logs.is_empty());
        assert_eq!(result.error.as_deref(), Some("Unknown service: nope"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_logs_commands_per_kind() {
        let mock = Arc::new(MockExecutor::with_fallback(out("log line")));
        let orchestrator = orchestrator_with(mock.clone());

        let result = orchestrator.service_logs("postgresql", Some(25)).await;
        assert_eq!(result.logs, "log line");
        assert!(result.error.is_none());

        orchestrator.service_logs("grafana", None).await;

        let commands = mock.seen_commands();
        assert_eq!(
            commands[0],
            "sudo journalctl -u postgresql -n 25 --no-pager"
        );
        // Config default line count when the caller does not specify
        assert_eq!(commands[1], "docker logs grafana --tail 100 2>&1");
    }

    #[tokio::test]
    async fn test_logs_failure_surfaces_error() {
        let mock = Arc::new(MockExecutor::with_fallback(fail("permission denied")));
        let orchestrator = orchestrator_with(mock);

        let result = orchestrator.service_logs("postgresql", None).await;

        assert!(result.logs.is_empty());
        assert_eq!(result.error.as_deref(), Some("permission denied"));
    }

    #[tokio::test]
    async fn test_host_snapshot_single_remote_call() {
        let mock = Arc::new(MockExecutor::with_fallback(out(
            "hostname:pi1\nuptime:up 3 days, 2 hours\nload:0.52 0.48 0.45\nmem:1.2Gi|7.6Gi\ndisk:12G|59G\ntemp:48.3'C",
        )));
        let orchestrator = orchestrator_with(mock.clone());

        let snapshot = orchestrator.host_snapshot().await;

        assert_eq!(mock.call_count(), 1);
        assert_eq!(snapshot.hostname, "pi1");
        assert_eq!(snapshot.uptime, "3 days, 2 hours");
        assert_eq!(snapshot.load_avg, "0.52 0.48 0.45");
        assert_eq!(snapshot.memory_used, "1.2Gi");
        assert_eq!(snapshot.memory_total, "7.6Gi");
        assert_eq!(snapshot.disk_used, "12G");
        assert_eq!(snapshot.disk_total, "59G");
        assert_eq!(snapshot.cpu_temp, "48.3'C");
    }

    #[test]
    fn test_snapshot_parse_missing_keys_fall_back() {
        let snapshot = parse_snapshot("hostname:foo\nuptime:up 3 days");

        assert_eq!(snapshot.hostname, "foo");
        assert_eq!(snapshot.uptime, "3 days");
        assert_eq!(snapshot.load_avg, "0 0 0");
        assert_eq!(snapshot.memory_used, "0");
        assert_eq!(snapshot.memory_total, "0");
        assert_eq!(snapshot.disk_used, "0");
        assert_eq!(snapshot.disk_total, "0");
        assert_eq!(snapshot.cpu_temp, "N/A");
    }

    #[test]
    fn test_snapshot_parse_empty_output() {
        let snapshot = parse_snapshot("");
        assert_eq!(snapshot.hostname, "pi1");
        assert_eq!(snapshot.uptime, "unknown");
    }

    #[test]
    fn test_format_uptime_boundary_at_24h() {
        assert_eq!(format_uptime(Duration::from_secs(23 * 3600 + 300)), "23h 5m");
        assert_eq!(format_uptime(Duration::from_secs(25 * 3600)), "1d 1h");
        assert_eq!(format_uptime(Duration::from_secs(24 * 3600)), "1d 0h");
        assert_eq!(format_uptime(Duration::from_secs(90 * 60)), "1h 30m");
    }

    #[test]
    fn test_parse_docker_stats_truncates_memory() {
        let (uptime, memory, cpu) = parse_docker_stats("2 days|256MiB / 1GiB|0.8%");
        assert_eq!(uptime, "2 days");
        assert_eq!(memory, "256MiB");
        assert_eq!(cpu, "0.8%");

        // Malformed input degrades field by field, never panics
        let (uptime, memory, cpu) = parse_docker_stats("only-uptime");
        assert_eq!(uptime, "only-uptime");
        assert_eq!(memory, "");
        assert_eq!(cpu, "");
    }

    #[test]
    fn test_parse_systemd_timestamp() {
        let parsed = parse_systemd_timestamp("Mon 2024-01-01 10:30:00 UTC").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T10:30:00+00:00");

        assert!(parse_systemd_timestamp("").is_none());
        assert!(parse_systemd_timestamp("n/a").is_none());
    }

    #[tokio::test]
    async fn test_poll_fan_out_is_concurrent() {
        // Every remote query takes 200ms; polling the full 11-service
        // inventory sequentially would cost over two seconds
        let mock = Arc::new(
            MockExecutor::new()
                .respond_slow("systemctl is-active", Duration::from_millis(200), out("inactive"))
                .respond_slow("docker inspect", Duration::from_millis(200), out("not_found")),
        );
        let orchestrator = orchestrator_with(mock);

        let start = Instant::now();
        let statuses = orchestrator.statuses().await;
        let elapsed = start.elapsed();

        assert_eq!(statuses.len(), 11);
        assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_one_hung_service_does_not_delay_the_rest() {
        // One unit hangs past the 1s command timeout; all slots must still
        // come back within roughly one timeout window
        let mock = Arc::new(
            MockExecutor::new()
                .respond_slow(
                    "systemctl is-active postgresql",
                    Duration::from_secs(30),
                    out("active"),
                )
                .respond("systemctl is-active", out("inactive"))
                .respond("docker inspect", out("not_found")),
        );
        let orchestrator = orchestrator_with(mock);

        let start = Instant::now();
        let statuses = orchestrator.statuses().await;
        let elapsed = start.elapsed();

        assert_eq!(statuses.len(), 11);
        assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);

        // The hung service's synthetic timeout output is not "active", so
        // its slot degrades to error instead of going missing
        let postgres = statuses.iter().find(|s| s.name == "postgresql").unwrap();
        assert_eq!(postgres.state, ServiceState::Error);
    }
}
