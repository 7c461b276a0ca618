//! Outbound notifications.
//!
//! [`Notifier`] is the seam between the monitor and the messaging channel;
//! [`TelegramNotifier`] is the production implementation. Delivery is
//! attempted once per message: a failed send is reported to the caller,
//! which logs it and carries on with the cycle.

pub mod format;

pub use format::MessageFormatter;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TelegramConfig;

const SEND_TIMEOUT_SECS: u64 = 10;

pub trait Notifier {
    fn send_message(&self, text: &str) -> Result<()>;
}

/// Telegram Bot API `sendMessage` client.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .user_agent(concat!("sentinel/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn send_message(&self, text: &str) -> Result<()> {
        // The token is part of the path; strip URLs from errors so it never reaches logs.
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self
            .client
            .post(&url)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text,
            })
            .send()
            .map_err(|e| e.without_url())
            .context("Telegram sendMessage request failed")?;

        let status = response.status();
        let body: Option<ApiResponse> = response.json().ok();
        if !status.is_success() {
            bail!(
                "Telegram sendMessage: HTTP {} - {}",
                status.as_u16(),
                body.and_then(|b| b.description)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
            );
        }
        match body {
            Some(ApiResponse { ok: true, .. }) => {
                debug!("Telegram message delivered ({} chars)", text.chars().count());
                Ok(())
            }
            Some(ApiResponse { description, .. }) => bail!(
                "Telegram sendMessage rejected: {}",
                description.unwrap_or_else(|| "no description".to_string())
            ),
            None => bail!("Telegram sendMessage: response is not JSON"),
        }
    }
}
