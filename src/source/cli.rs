//! Fallback data path: the node binary's own query commands.
//!
//! Used when the RPC/LCD endpoints are unreachable or return incomplete data.
//! Output is parsed with the same functions as the HTTP path.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::models::amount::Coin;

use super::responses::{
    parse_balances, parse_delegations, parse_json_object, parse_node_status, parse_rewards,
    parse_signing_info, parse_validator,
};
use super::{ChainQuery, NodeStatus, SigningInfo, ValidatorInfo};

/// Ceiling for a single node binary invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for collecting output from child process pipes after exit
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Maximum captured output per stream (4MB)
const MAX_OUTPUT_SIZE: usize = 4 * 1024 * 1024;

/// Stderr excerpt length kept in diagnostics
const STDERR_EXCERPT: usize = 500;

#[derive(Debug, Clone)]
pub struct CliSource {
    binary: String,
    home: PathBuf,
    chain_id: Option<String>,
    timeout: Duration,
}

/// Raw result of one node binary invocation.
#[derive(Debug, Clone)]
struct CommandOutput {
    success: bool,
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    timed_out: bool,
    duration: Duration,
}

impl CliSource {
    pub fn new(binary: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            home: home.into(),
            chain_id: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_chain_id(mut self, chain_id: Option<String>) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the binary resolves on `PATH` (or as a direct path).
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    /// Run the binary with `args` and return its trimmed output.
    ///
    /// Returns `None` on spawn failure, timeout, non-zero exit, or empty output.
    /// A clean exit with empty stdout falls back to stderr: older node binaries
    /// print `status` there.
    pub fn query_chain(&self, args: &[&str]) -> Option<String> {
        let label = format!("{} {}", self.binary, args.join(" "));
        let output = match self.execute(args) {
            Ok(output) => output,
            Err(e) => {
                warn!("{label}: {e:#}");
                return None;
            }
        };

        if output.timed_out {
            warn!(
                "{label}: killed after {}s timeout; stderr: {}",
                self.timeout.as_secs(),
                excerpt(&output.stderr)
            );
            return None;
        }

        if !output.success {
            warn!(
                "{label}: exited with {}; stderr: {}",
                output
                    .exit_code
                    .map_or_else(|| "signal".to_string(), |c| c.to_string()),
                excerpt(&output.stderr)
            );
            return None;
        }

        debug!("{label}: completed in {:?}", output.duration);
        let stdout = output.stdout.trim();
        let stderr = output.stderr.trim();
        if !stdout.is_empty() {
            Some(stdout.to_string())
        } else if !stderr.is_empty() {
            Some(stderr.to_string())
        } else {
            warn!("{label}: produced no output");
            None
        }
    }

    fn execute(&self, args: &[&str]) -> Result<CommandOutput> {
        let start = Instant::now();
        let mut child = self.spawn(args)?;

        // Drain the pipes while waiting; a full pipe buffer would otherwise
        // block the child and turn every large response into a timeout.
        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let wait_result = child
            .wait_timeout(self.timeout)
            .with_context(|| format!("Failed to wait for {}", self.binary))?;

        let timed_out = wait_result.is_none();
        if timed_out {
            let _ = child.kill();
            let _ = child.wait();
        }

        let stdout = stdout_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_default();
        let stderr = stderr_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_default();

        Ok(CommandOutput {
            success: wait_result.is_some_and(|s| s.success()),
            exit_code: wait_result.and_then(|s| s.code()),
            stdout,
            stderr,
            timed_out,
            duration: start.elapsed(),
        })
    }

    fn spawn(&self, args: &[&str]) -> Result<Child> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if args.first() == Some(&"query") {
            if let Some(chain_id) = &self.chain_id {
                cmd.arg("--chain-id").arg(chain_id);
            }
        }
        if self.home.is_dir() {
            cmd.current_dir(&self.home);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary))
    }

    fn query_json<T>(&self, what: &str, args: &[&str], parse: fn(Value) -> Result<T>) -> Option<T> {
        let text = self.query_chain(args)?;
        match parse_json_object(&text).and_then(parse) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{what} from {}: {e:#}; output: {}", self.binary, excerpt(&text));
                None
            }
        }
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read a stream to string, keeping at most MAX_OUTPUT_SIZE bytes.
/// The rest is drained and discarded so the child never blocks on a full pipe.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                buf.extend_from_slice(&chunk[..n.min(remaining)]);
            }
            Err(_) => break,
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= STDERR_EXCERPT {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(STDERR_EXCERPT).collect();
        format!("{cut}...")
    }
}

impl ChainQuery for CliSource {
    fn name(&self) -> &str {
        "cli"
    }

    fn node_status(&self) -> Option<NodeStatus> {
        self.query_json("node status", &["status"], parse_node_status)
    }

    fn validator(&self, operator_address: &str) -> Option<ValidatorInfo> {
        self.query_json(
            "validator",
            &["query", "staking", "validator", operator_address, "--output", "json"],
            parse_validator,
        )
    }

    fn signing_info(&self, consensus_address: &str) -> Option<SigningInfo> {
        self.query_json(
            "signing info",
            &["query", "slashing", "signing-info", consensus_address, "--output", "json"],
            parse_signing_info,
        )
    }

    fn balances(&self, address: &str) -> Option<Vec<Coin>> {
        self.query_json(
            "balances",
            &["query", "bank", "balances", address, "--output", "json"],
            parse_balances,
        )
    }

    fn delegations(&self, address: &str) -> Option<Vec<Coin>> {
        self.query_json(
            "delegations",
            &["query", "staking", "delegations", address, "--output", "json"],
            parse_delegations,
        )
    }

    fn rewards(&self, address: &str) -> Option<Vec<Coin>> {
        self.query_json(
            "rewards",
            &["query", "distribution", "rewards", address, "--output", "json"],
            parse_rewards,
        )
    }
}
