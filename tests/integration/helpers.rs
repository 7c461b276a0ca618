//! Shared fixtures: mocked chain endpoints and configuration

use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

use sentinel::config::Config;

pub const VALOPER: &str = "raivaloper1qqq";
pub const VALCONS: &str = "raivalcons1ccc";
pub const WALLET: &str = "rai1www";
pub const TOKEN: &str = "123456789:TESTTOKENTESTTOKEN";

/// Chain state served by [`mock_chain`].
pub struct ChainFixture {
    pub height: u64,
    pub catching_up: bool,
    pub status: &'static str,
    pub jailed: bool,
    pub missed_blocks: u64,
}

impl Default for ChainFixture {
    fn default() -> Self {
        Self {
            height: 174_065,
            catching_up: false,
            status: "BOND_STATUS_BONDED",
            jailed: false,
            missed_blocks: 0,
        }
    }
}

/// Register RPC and LCD mocks for one validator on `server`.
pub fn mock_chain<'a>(server: &'a MockServer, chain: &ChainFixture) -> Vec<Mock<'a>> {
    vec![
        server.mock(|when, then| {
            when.method(GET).path("/status");
            then.status(200).json_body(json!({
                "result": {
                    "node_info": {"network": "raitestnet"},
                    "sync_info": {
                        "latest_block_height": chain.height.to_string(),
                        "catching_up": chain.catching_up
                    }
                }
            }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/cosmos/staking/v1beta1/validators/{VALOPER}"));
            then.status(200).json_body(json!({
                "validator": {
                    "operator_address": VALOPER,
                    "jailed": chain.jailed,
                    "status": chain.status,
                    "description": {"moniker": "integration-node"}
                }
            }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/cosmos/slashing/v1beta1/signing_infos/{VALCONS}"));
            then.status(200).json_body(json!({
                "val_signing_info": {
                    "address": VALCONS,
                    "missed_blocks_counter": chain.missed_blocks.to_string(),
                    "tombstoned": false
                }
            }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/cosmos/bank/v1beta1/balances/{WALLET}"));
            then.status(200).json_body(json!({
                "balances": [{"denom": "arai", "amount": "12080000000000000000"}]
            }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/cosmos/staking/v1beta1/delegations/{WALLET}"));
            then.status(200).json_body(json!({
                "delegation_responses": [
                    {"balance": {"denom": "arai", "amount": "1000000000000000000000"}}
                ]
            }));
        }),
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/cosmos/distribution/v1beta1/delegators/{WALLET}/rewards"));
            then.status(200).json_body(json!({
                "total": [{"denom": "arai", "amount": "5500000000000000000.25"}]
            }));
        }),
    ]
}

/// Accept every Telegram `sendMessage` call.
pub fn mock_telegram(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(POST).path(format!("/bot{TOKEN}/sendMessage"));
        then.status(200)
            .json_body(json!({"ok": true, "result": {"message_id": 1}}));
    })
}

/// Environment for a monitor pointed at `chain` and `telegram`, writing under `dir`.
pub fn env_for(chain: &MockServer, telegram: &MockServer, dir: &Path) -> HashMap<String, String> {
    let pairs = [
        ("TG_TOKEN", TOKEN.to_string()),
        ("TG_CHAT_ID", "-1001".to_string()),
        ("VALOPER", VALOPER.to_string()),
        ("VALCONS", VALCONS.to_string()),
        ("WALLET", WALLET.to_string()),
        ("RPC_URL", chain.base_url()),
        ("LCD_URL", chain.base_url()),
        ("TG_API_BASE", telegram.base_url()),
        ("NODE_BINARY", "sentinel-test-missing-node-binary".to_string()),
        ("STATE_FILE", dir.join("state.json").display().to_string()),
        ("HISTORY_FILE", dir.join("history.csv").display().to_string()),
    ];
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

pub fn config_from(env: &HashMap<String, String>) -> Config {
    Config::from_lookup(|key| env.get(key).cloned()).expect("valid test configuration")
}
