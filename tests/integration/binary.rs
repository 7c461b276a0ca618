//! Exit codes and dry-run output of the `sentinel` binary

use httpmock::prelude::*;
use serial_test::serial;
use std::collections::HashMap;
use std::process::{Command, Output};
use tempfile::TempDir;

use super::helpers::{env_for, mock_chain, mock_telegram, ChainFixture};

fn run_sentinel(env: &HashMap<String, String>, args: &[&str], cwd: &std::path::Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sentinel"))
        .args(args)
        .env_clear()
        .envs(env)
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .current_dir(cwd)
        .output()
        .expect("failed to run sentinel")
}

#[test]
#[serial]
fn test_missing_configuration_exits_1() {
    let dir = TempDir::new().unwrap();
    let output = run_sentinel(&HashMap::new(), &[], dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    for key in ["TG_TOKEN", "TG_CHAT_ID", "VALOPER", "WALLET"] {
        assert!(stderr.contains(key), "{key} missing from: {stderr}");
    }
    assert!(!dir.path().join("history").exists());
}

#[test]
#[serial]
fn test_malformed_token_exits_1_without_leaking_it() {
    let dir = TempDir::new().unwrap();
    let env: HashMap<String, String> = [
        ("TG_TOKEN", "short-secret"),
        ("TG_CHAT_ID", "1"),
        ("VALOPER", "raivaloper1x"),
        ("WALLET", "rai1x"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let output = run_sentinel(&env, &[], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TG_TOKEN"));
    assert!(!stderr.contains("short-secret"));
}

#[test]
#[serial]
fn test_env_file_is_loaded() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(&chain, &ChainFixture::default());
    let send = mock_telegram(&telegram);

    let env = env_for(&chain, &telegram, dir.path());
    let mut lines: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
    lines.sort();
    let env_file = dir.path().join("monitor.env");
    std::fs::write(&env_file, lines.join("\n")).unwrap();

    let output = run_sentinel(
        &HashMap::new(),
        &["--env-file", env_file.to_str().unwrap()],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    send.assert_hits(1);
    assert!(dir.path().join("state.json").exists());
}

#[test]
#[serial]
fn test_dry_run_prints_and_writes_nothing() {
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
    let env = env_for(&chain, &telegram, dir.path());

    let output = run_sentinel(&env, &["--dry-run"], dir.path());
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ALERT"));
    assert!(stdout.contains("FULL STATUS REPORT"));
    send.assert_hits(0);
    assert!(!dir.path().join("state.json").exists());
    assert!(!dir.path().join("history.csv").exists());
}

#[test]
#[serial]
fn test_state_file_flag_overrides_environment() {
    let chain = MockServer::start();
    let telegram = MockServer::start();
    let dir = TempDir::new().unwrap();
    mock_chain(&chain, &ChainFixture::default());
    mock_telegram(&telegram);
    let env = env_for(&chain, &telegram, dir.path());
    let custom = dir.path().join("custom").join("cursor.json");

    let output = run_sentinel(
        &env,
        &["--state-file", custom.to_str().unwrap()],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(0));
    assert!(custom.exists());
    assert!(!dir.path().join("state.json").exists());
}
