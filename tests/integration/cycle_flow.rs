//! Full cycles against mocked endpoints

use chrono::{Duration, Utc};
use httpmock::prelude::*;
use std::fs;
use tempfile::TempDir;

use sentinel::config::Config;
use sentinel::fs::{HistoryLog, StateStore};
use sentinel::models::{BondStatus, Severity};
use sentinel::monitor::{CycleOptions, MetricsCollector, Monitor};
use sentinel::notify::{MessageFormatter, TelegramNotifier};
use sentinel::source::{HttpSource, RetryPolicy};

use super::helpers::{config_from, env_for, mock_chain, mock_telegram, ChainFixture};

fn monitor_for(config: &Config) -> Monitor {
    let http = HttpSource::new(&config.chain.rpc_url, &config.chain.lcd_url)
        .unwrap()
        .with_retry(RetryPolicy::immediate(2));
    Monitor::new(
        MetricsCollector::new(
            Box::new(http),
            config.validator.clone(),
            config.chain.denom.clone(),
        ),
        Box::new(TelegramNotifier::new(&config.telegram).unwrap()),
        MessageFormatter::from_config(config),
        StateStore::new(config.state_file.clone()),
        HistoryLog::new(config.history_file.clone()),
        config.heartbeat_interval,
    )
}

#[test]
fn test_healthy_first_run_sends_one_report() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(&chain, &ChainFixture::default());
    let send = mock_telegram(&telegram);

    let config = config_from(&env_for(&chain, &telegram, dir.path()));
    let report = monitor_for(&config).run_cycle(CycleOptions::default());

    assert_eq!(report.classification.severity, Severity::Healthy);
    assert_eq!(report.snapshot.validator_status, BondStatus::Bonded);
    assert_eq!(report.snapshot.moniker, "integration-node");
    assert_eq!(report.snapshot.rewards, 5_500_000_000_000_000_000);
    assert!(report.heartbeat_sent);
    assert!(!report.immediate_sent);
    send.assert_hits(1);

    let message = &report.messages[0];
    assert!(message.contains("Wallet    : 12.08 RAI"));
    assert!(message.contains("Delegated : 1000.00 RAI"));
    assert!(message.contains("Rewards   : 5.50 RAI"));
    assert!(message.contains("Height : 174,065"));

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.state_file).unwrap()).unwrap();
    assert_eq!(state["last_severity"], "HEALTHY");
    assert_eq!(state["last_height"], 174_065);

    let history = fs::read_to_string(&config.history_file).unwrap();
    assert_eq!(history.lines().count(), 2);
}

#[test]
fn test_jailed_validator_alerts_once_across_runs() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(
        &chain,
        &ChainFixture {
            jailed: true,
            ..Default::default()
        },
    );
    let send = mock_telegram(&telegram);
    let config = config_from(&env_for(&chain, &telegram, dir.path()));
    let monitor = monitor_for(&config);

    let first = monitor.run_cycle(CycleOptions::default());
    assert_eq!(first.classification.severity, Severity::Alert);
    assert!(first.immediate_sent);
    assert!(first.heartbeat_sent);
    send.assert_hits(2);

    let second = monitor.run_cycle_at(Utc::now() + Duration::minutes(5), CycleOptions::default());
    assert_eq!(second.classification.severity, Severity::Alert);
    assert!(!second.classification.state_changed);
    assert!(second.messages.is_empty());
    send.assert_hits(2);
}

#[test]
fn test_unreachable_node_is_silent_and_keeps_baseline() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    let send = mock_telegram(&telegram);
    let config = config_from(&env_for(&chain, &telegram, dir.path()));

    StateStore::new(config.state_file.clone())
        .save(&sentinel::models::PersistedState {
            last_severity: Some(Severity::Healthy),
            last_missed_blocks: 12,
            last_heartbeat: Some(Utc::now().timestamp()),
            ..Default::default()
        })
        .unwrap();

    // No chain mocks registered: every endpoint answers 404.
    let report = monitor_for(&config).run_cycle(CycleOptions::default());
    assert!(report.classification.rpc_outage);
    assert_eq!(report.classification.severity, Severity::Healthy);
    assert!(report.messages.is_empty());
    send.assert_hits(0);

    let state = StateStore::new(config.state_file.clone()).load();
    assert_eq!(state.last_missed_blocks, 12);
    assert_eq!(state.last_severity, Some(Severity::Healthy));
}

#[test]
fn test_telegram_failure_does_not_block_persistence() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(&chain, &ChainFixture::default());
    let send = telegram.mock(|when, then| {
        when.method(POST);
        then.status(502);
    });
    let config = config_from(&env_for(&chain, &telegram, dir.path()));

    let report = monitor_for(&config).run_cycle(CycleOptions::default());
    assert!(report.decision.send_heartbeat);
    assert!(!report.heartbeat_sent);
    assert!(report.state_saved);
    assert!(report.history_appended);
    send.assert_hits(1);

    let state = StateStore::new(config.state_file.clone()).load();
    assert_eq!(state.last_heartbeat, None);
}

#[test]
fn test_unbonding_warns_only_in_report() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(
        &chain,
        &ChainFixture {
            status: "BOND_STATUS_UNBONDING",
            ..Default::default()
        },
    );
    let send = mock_telegram(&telegram);
    let config = config_from(&env_for(&chain, &telegram, dir.path()));

    let report = monitor_for(&config).run_cycle(CycleOptions {
        force: true,
        dry_run: false,
    });
    assert_eq!(report.classification.severity, Severity::Warning);
    assert!(!report.decision.send_immediate);
    assert_eq!(report.messages.len(), 1);
    assert!(report.messages[0].contains("Status : UNBONDING"));
    send.assert_hits(1);
}
