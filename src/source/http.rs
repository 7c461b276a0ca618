//! RPC and LCD queries over HTTP.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::amount::Coin;

use super::responses::{
    parse_balances, parse_delegations, parse_node_status, parse_rewards, parse_signing_info,
    parse_validator,
};
use super::retry::RetryPolicy;
use super::{ChainQuery, NodeStatus, SigningInfo, ValidatorInfo};

pub(crate) const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
pub(crate) const HTTP_REQUEST_TIMEOUT_SECS: u64 = 8; // Per attempt, connection + transfer

/// Primary data path: the node's Tendermint RPC and Cosmos LCD endpoints.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    rpc_url: String,
    lcd_url: String,
    retry: RetryPolicy,
}

impl HttpSource {
    pub fn new(rpc_url: &str, lcd_url: &str) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            lcd_url: lcd_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
        .inspect(|source| debug!("HTTP queries bounded at {:?} each", source.query_budget()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upper bound on the time one query can take, retries included.
    pub fn query_budget(&self) -> Duration {
        self.retry
            .worst_case(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
    }

    /// GET `url` and decode the body as JSON, retrying transport errors and non-2xx.
    fn get_json(&self, url: &str) -> Result<Value> {
        self.retry.run(url, || {
            let response = self
                .client
                .get(url)
                .header("accept", "application/json")
                .send()
                .with_context(|| format!("GET {url}"))?;
            let status = response.status();
            if !status.is_success() {
                bail!(
                    "GET {url}: HTTP {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                );
            }
            response
                .json::<Value>()
                .with_context(|| format!("GET {url}: response is not JSON"))
        })
    }

    fn query<T>(&self, what: &str, url: String, parse: fn(Value) -> Result<T>) -> Option<T> {
        match self.get_json(&url).and_then(parse) {
            Ok(value) => {
                debug!("{what}: ok via {url}");
                Some(value)
            }
            Err(e) => {
                warn!("{what} unavailable over HTTP: {e:#}");
                None
            }
        }
    }

    fn lcd(&self, path: &str) -> String {
        format!("{}{path}", self.lcd_url)
    }
}

/// Create an HTTP client with bounded connect and request timeouts.
/// A hung endpoint costs at most one timeout per attempt.
pub(crate) fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent(concat!("sentinel/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

impl ChainQuery for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn node_status(&self) -> Option<NodeStatus> {
        self.query(
            "node status",
            format!("{}/status", self.rpc_url),
            parse_node_status,
        )
    }

    fn validator(&self, operator_address: &str) -> Option<ValidatorInfo> {
        self.query(
            "validator",
            self.lcd(&format!(
                "/cosmos/staking/v1beta1/validators/{operator_address}"
            )),
            parse_validator,
        )
    }

    fn signing_info(&self, consensus_address: &str) -> Option<SigningInfo> {
        self.query(
            "signing info",
            self.lcd(&format!(
                "/cosmos/slashing/v1beta1/signing_infos/{consensus_address}"
            )),
            parse_signing_info,
        )
    }

    fn balances(&self, address: &str) -> Option<Vec<Coin>> {
        self.query(
            "balances",
            self.lcd(&format!("/cosmos/bank/v1beta1/balances/{address}")),
            parse_balances,
        )
    }

    fn delegations(&self, address: &str) -> Option<Vec<Coin>> {
        self.query(
            "delegations",
            self.lcd(&format!("/cosmos/staking/v1beta1/delegations/{address}")),
            parse_delegations,
        )
    }

    fn rewards(&self, address: &str) -> Option<Vec<Coin>> {
        self.query(
            "rewards",
            self.lcd(&format!(
                "/cosmos/distribution/v1beta1/delegators/{address}/rewards"
            )),
            parse_rewards,
        )
    }
}
