//! Typed views of node responses.
//!
//! The REST endpoints and the node binary's `--output json` return the same
//! payloads with small differences (wrapping objects, legacy key casing,
//! numbers encoded as strings). All of that is absorbed here so the rest of
//! the crate only ever sees [`NodeStatus`], [`ValidatorInfo`], [`SigningInfo`]
//! and [`Coin`] lists.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::amount::Coin;
use crate::models::bond_status::BondStatus;

use super::{NodeStatus, SigningInfo, ValidatorInfo};

#[derive(Debug, Deserialize)]
struct RawStatus {
    #[serde(alias = "SyncInfo")]
    sync_info: RawSyncInfo,
    #[serde(default, alias = "NodeInfo")]
    node_info: Option<RawNodeInfo>,
}

#[derive(Debug, Deserialize)]
struct RawSyncInfo {
    #[serde(default, deserialize_with = "lenient_u64")]
    latest_block_height: u64,
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    catching_up: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawNodeInfo {
    #[serde(default)]
    network: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawValidator {
    #[serde(default)]
    operator_address: Option<String>,
    #[serde(default, alias = "Status", deserialize_with = "bond_status_value")]
    status: BondStatus,
    #[serde(default, deserialize_with = "lenient_bool")]
    jailed: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    tombstoned: bool,
    #[serde(default)]
    description: Option<RawDescription>,
}

#[derive(Debug, Deserialize)]
struct RawDescription {
    #[serde(default)]
    moniker: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSigningInfo {
    #[serde(default, deserialize_with = "lenient_u64")]
    missed_blocks_counter: u64,
    #[serde(default, deserialize_with = "lenient_bool")]
    tombstoned: bool,
    #[serde(default)]
    jailed_until: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCoin {
    #[serde(default)]
    denom: String,
    #[serde(default, deserialize_with = "amount_string")]
    amount: String,
}

impl From<RawCoin> for Coin {
    fn from(raw: RawCoin) -> Self {
        Coin::new(raw.denom, raw.amount)
    }
}

#[derive(Debug, Deserialize)]
struct RawBalances {
    #[serde(default)]
    balances: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
struct RawDelegations {
    #[serde(default)]
    delegation_responses: Vec<RawDelegationResponse>,
}

#[derive(Debug, Deserialize)]
struct RawDelegationResponse {
    #[serde(default)]
    balance: Option<RawCoin>,
}

#[derive(Debug, Deserialize)]
struct RawRewards {
    #[serde(default)]
    total: Vec<RawCoin>,
}

/// Parse text output into JSON, rejecting empty or non-object payloads.
pub fn parse_json_object(text: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(text.trim()).context("output is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("expected a JSON object, got {}", kind_of(&value));
    }
    Ok(value)
}

/// `/status` from the RPC endpoint (`{"result": {...}}`) or `<binary> status`.
pub fn parse_node_status(value: Value) -> Result<NodeStatus> {
    let inner = unwrap_key(value, "result");
    let raw: RawStatus = serde_json::from_value(inner).context("unexpected status shape")?;
    Ok(NodeStatus {
        height: raw.sync_info.latest_block_height,
        catching_up: raw.sync_info.catching_up,
        network: raw.node_info.and_then(|n| n.network),
    })
}

/// Staking validator record, wrapped in `{"validator": ...}` or bare.
pub fn parse_validator(value: Value) -> Result<ValidatorInfo> {
    let inner = unwrap_key(value, "validator");
    let raw: RawValidator = serde_json::from_value(inner).context("unexpected validator shape")?;
    Ok(ValidatorInfo {
        operator_address: raw.operator_address,
        status: raw.status,
        jailed: raw.jailed,
        tombstoned: raw.tombstoned,
        moniker: raw
            .description
            .and_then(|d| d.moniker)
            .filter(|m| !m.trim().is_empty()),
    })
}

/// Slashing signing info, wrapped in `{"val_signing_info": ...}` or bare.
pub fn parse_signing_info(value: Value) -> Result<SigningInfo> {
    let inner = unwrap_key(value, "val_signing_info");
    let raw: RawSigningInfo =
        serde_json::from_value(inner).context("unexpected signing info shape")?;
    Ok(SigningInfo {
        missed_blocks: raw.missed_blocks_counter,
        tombstoned: raw.tombstoned,
        jailed_until: raw.jailed_until,
    })
}

pub fn parse_balances(value: Value) -> Result<Vec<Coin>> {
    let raw: RawBalances = serde_json::from_value(value).context("unexpected balances shape")?;
    Ok(raw.balances.into_iter().map(Coin::from).collect())
}

/// Flattens each delegation's `balance` into one coin list.
pub fn parse_delegations(value: Value) -> Result<Vec<Coin>> {
    let raw: RawDelegations =
        serde_json::from_value(value).context("unexpected delegations shape")?;
    Ok(raw
        .delegation_responses
        .into_iter()
        .filter_map(|d| d.balance)
        .map(Coin::from)
        .collect())
}

/// Total pending rewards across all validators delegated to.
pub fn parse_rewards(value: Value) -> Result<Vec<Coin>> {
    let raw: RawRewards = serde_json::from_value(value).context("unexpected rewards shape")?;
    Ok(raw.total.into_iter().map(Coin::from).collect())
}

fn unwrap_key(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

fn lenient_opt_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(lenient_opt_bool(d)?.unwrap_or(false))
}

/// Status is a string enum over REST and `--output json`, but some encoders
/// emit the protobuf number instead.
fn bond_status_value<'de, D: Deserializer<'de>>(d: D) -> Result<BondStatus, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => BondStatus::normalize(Some(&s)),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(1) => BondStatus::Unbonded,
            Some(2) => BondStatus::Unbonding,
            Some(3) => BondStatus::Bonded,
            _ => BondStatus::Unknown,
        },
        _ => BondStatus::Unknown,
    })
}

fn amount_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
