//! Message bodies for each severity and the periodic full report.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::config::{Config, ReportConfig};
use crate::models::amount::{format_balance, group_thousands};
use crate::models::severity::Severity;
use crate::models::snapshot::MetricsSnapshot;

/// Renders snapshots as plain-text chat messages.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    symbol: String,
    decimals: u32,
    offset: FixedOffset,
    tz_label: String,
}

impl MessageFormatter {
    pub fn new(symbol: impl Into<String>, decimals: u32, report: &ReportConfig) -> Self {
        let offset = FixedOffset::east_opt(report.utc_offset_hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self {
            symbol: symbol.into(),
            decimals,
            offset,
            tz_label: report.tz_label.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.chain.token_symbol.clone(),
            config.chain.decimals,
            &config.report,
        )
    }

    /// Message sent when `severity` warrants an immediate notification.
    pub fn status_message(&self, snapshot: &MetricsSnapshot, severity: Severity) -> String {
        match severity {
            Severity::Healthy => self.healthy(snapshot),
            Severity::Warning => self.warning(snapshot),
            Severity::Alert => self.alert(snapshot),
            Severity::Fatal => self.fatal(snapshot),
        }
    }

    pub fn healthy(&self, s: &MetricsSnapshot) -> String {
        let mut out = format!("🟢 {} VALIDATOR STATUS - HEALTHY\n", self.symbol);
        out += &self.moniker_line(s);
        out += "Validator:\n";
        out += &format!(" • 🔓 Status : {}\n", s.validator_status);
        out += " • 🔒 Jailed : No\n";
        out += " • ⚰️ Tombstoned : No\n\n";
        out += "Node:\n";
        out += &format!(" • ✅ Sync   : {}\n", s.sync_label());
        out += &format!(" • 📊 Height : {}\n", group_thousands(s.height));
        out += &format!(" • ⚠️ Missed : {}\n\n", s.missed_blocks);
        out += &self.balance_block(s);
        out += &format!("🕒 {}", self.timestamp(s.timestamp));
        out
    }

    pub fn warning(&self, s: &MetricsSnapshot) -> String {
        let mut out = format!("🟡 {} VALIDATOR WARNING\n", self.symbol);
        out += &self.moniker_line(s);
        out += "Validator:\n";
        out += &format!(" • 🔓 Status : {}\n", s.validator_status);
        out += &format!(" • 🔒 Jailed : {}\n\n", yes_no(s.jailed));
        out += "Node:\n";
        out += &format!(" • {} Sync   : {}\n", sync_emoji(s), s.sync_label());
        out += &format!(" • 📊 Height : {}\n\n", group_thousands(s.height));
        out += &format!("🕒 Detected: {}", self.timestamp(s.timestamp));
        out
    }

    pub fn alert(&self, s: &MetricsSnapshot) -> String {
        let mut out = if s.jailed {
            format!("🔴 {} VALIDATOR ALERT - JAILED\n", self.symbol)
        } else {
            format!("🔴 {} VALIDATOR ALERT\n", self.symbol)
        };
        out += &self.moniker_line(s);
        out += "Validator:\n";
        out += &format!(" • 🔓 Status : {}\n", s.validator_status);
        out += &format!(" • {} Jailed : {}\n\n", jailed_emoji(s.jailed), yes_no(s.jailed));
        out += "Node:\n";
        out += &format!(" • {} Sync   : {}\n", sync_emoji(s), s.sync_label());
        out += &format!(" • 📊 Height : {}\n", group_thousands(s.height));
        out += &format!(" • ⚠️ Missed : {} blocks\n\n", s.missed_blocks);
        out += &format!("🕒 Detected: {}", self.timestamp(s.timestamp));
        out
    }

    pub fn fatal(&self, s: &MetricsSnapshot) -> String {
        let mut out = format!("☠️ {} VALIDATOR FATAL - TOMBSTONED\n", self.symbol);
        out += &self.moniker_line(s);
        out += "Validator:\n";
        out += " • ⚰️ Tombstoned : YES\n";
        out += &format!(" • 🔓 Status     : {}\n\n", s.validator_status);
        out += "🚨 Validator permanently slashed\n";
        out += "Recovery impossible\n\n";
        out += &format!("🕒 Detected: {}", self.timestamp(s.timestamp));
        out
    }

    /// The periodic report: every field, whatever the severity.
    pub fn full_report(&self, s: &MetricsSnapshot) -> String {
        let mut out = format!("📊 {} VALIDATOR - FULL STATUS REPORT\n", self.symbol);
        out += &self.moniker_line(s);
        out += "Validator:\n";
        out += &format!(" • 🔓 Status : {}\n", s.validator_status);
        out += &format!(" • {} Jailed : {}\n", jailed_emoji(s.jailed), yes_no(s.jailed));
        out += &format!(
            " • {} Tombstoned : {}\n\n",
            if s.tombstoned { "⚰️" } else { "✅" },
            yes_no(s.tombstoned)
        );
        out += "Node:\n";
        out += &format!(" • {} Sync   : {}\n", sync_emoji(s), s.sync_label());
        out += &format!(" • 📊 Height : {}\n", group_thousands(s.height));
        out += &format!(" • ⚠️ Missed : {} blocks\n\n", s.missed_blocks);
        out += &self.balance_block(s);
        out += &format!("🕒 {}", self.timestamp(s.timestamp));
        out
    }

    fn moniker_line(&self, s: &MetricsSnapshot) -> String {
        format!("📛 Moniker: {}\n\n", s.moniker)
    }

    fn balance_block(&self, s: &MetricsSnapshot) -> String {
        let amount = |value: u128| format!("{} {}", format_balance(value, self.decimals), self.symbol);
        format!(
            "Balance:\n • 💰 Wallet    : {}\n • 🔐 Delegated : {}\n • 🎁 Rewards   : {}\n\n",
            amount(s.wallet_balance),
            amount(s.delegated_balance),
            amount(s.rewards)
        )
    }

    fn timestamp(&self, ts: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            ts.with_timezone(&self.offset).format("%Y-%m-%d %H:%M"),
            self.tz_label
        )
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "YES"
    } else {
        "No"
    }
}

fn jailed_emoji(jailed: bool) -> &'static str {
    if jailed {
        "🔴"
    } else {
        "🔒"
    }
}

fn sync_emoji(s: &MetricsSnapshot) -> &'static str {
    match s.catching_up {
        Some(false) => "✅",
        Some(true) => "⏳",
        None => "❔",
    }
}
