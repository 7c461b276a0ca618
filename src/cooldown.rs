//! Per-requester cooldown for on-demand status checks.
//!
//! Backs the interactive front end's status command. The scheduled cycle
//! never consults it.
//!
//! Each key (typically a chat id) may trigger a check at most once per
//! cooldown window. Entries are kept for a retention period and swept at
//! most once per prune interval, so the map stays bounded without a
//! background task.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;

pub const DEFAULT_COOLDOWN_SECS: i64 = 10;
pub const DEFAULT_RETENTION_HOURS: i64 = 24;
pub const DEFAULT_PRUNE_INTERVAL_HOURS: i64 = 1;

#[derive(Debug, Clone)]
pub struct CooldownMap<K> {
    cooldown: Duration,
    retention: Duration,
    prune_interval: Duration,
    last_seen: HashMap<K, DateTime<Utc>>,
    last_prune: Option<DateTime<Utc>>,
}

impl<K: Eq + Hash> Default for CooldownMap<K> {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_COOLDOWN_SECS))
    }
}

impl<K: Eq + Hash> CooldownMap<K> {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
            prune_interval: Duration::hours(DEFAULT_PRUNE_INTERVAL_HOURS),
            last_seen: HashMap::new(),
            last_prune: None,
        }
    }

    pub fn with_retention(mut self, retention: Duration, prune_interval: Duration) -> Self {
        self.retention = retention;
        self.prune_interval = prune_interval;
        self
    }

    /// Record a request from `key` at `now`.
    ///
    /// Returns `Err(remaining)` without recording while `key` is still
    /// cooling down.
    pub fn check(&mut self, key: K, now: DateTime<Utc>) -> Result<(), Duration> {
        self.maybe_prune(now);

        if let Some(last) = self.last_seen.get(&key) {
            let elapsed = now - *last;
            // A timestamp in the future (clock moved backwards) does not lock the key out.
            if elapsed >= Duration::zero() && elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }

        self.last_seen.insert(key, now);
        Ok(())
    }

    /// Drop entries older than the retention window.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let retention = self.retention;
        self.last_seen.retain(|_, seen| now - *seen < retention);
        self.last_prune = Some(now);
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    fn maybe_prune(&mut self, now: DateTime<Utc>) {
        let due = match self.last_prune {
            None => true,
            Some(last) => now - last >= self.prune_interval || now < last,
        };
        if due {
            self.prune(now);
        }
    }
}
