//! One monitoring cycle from state load to history append.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{error, info};

use crate::fs::{HistoryLog, StateStore};
use crate::models::snapshot::MetricsSnapshot;
use crate::notify::{MessageFormatter, Notifier};

use super::classify::{classify, Classification};
use super::collector::MetricsCollector;
use super::policy::{apply, decide, Decision};

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Send the severity message for `Alert`/`Fatal` even without a transition.
    pub force: bool,
    /// Render messages without sending, and leave state and history untouched.
    pub dry_run: bool,
}

/// What happened during one cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: MetricsSnapshot,
    pub classification: Classification,
    pub decision: Decision,
    /// Messages selected for delivery, in send order.
    pub messages: Vec<String>,
    pub immediate_sent: bool,
    pub heartbeat_sent: bool,
    pub state_saved: bool,
    pub history_appended: bool,
}

/// Wires the collector, policy, notifier and on-disk artifacts together.
pub struct Monitor {
    collector: MetricsCollector,
    notifier: Box<dyn Notifier>,
    formatter: MessageFormatter,
    store: StateStore,
    history: HistoryLog,
    heartbeat_interval: Duration,
}

impl Monitor {
    pub fn new(
        collector: MetricsCollector,
        notifier: Box<dyn Notifier>,
        formatter: MessageFormatter,
        store: StateStore,
        history: HistoryLog,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            collector,
            notifier,
            formatter,
            store,
            history,
            heartbeat_interval,
        }
    }

    pub fn run_cycle(&self, options: CycleOptions) -> CycleReport {
        self.run_cycle_at(Utc::now(), options)
    }

    /// Run a cycle as of `now`. Never fails: delivery and persistence errors
    /// are logged and recorded in the report.
    pub fn run_cycle_at(&self, now: DateTime<Utc>, options: CycleOptions) -> CycleReport {
        let prior = self.store.load();
        let snapshot = self.collector.collect_at(now);
        let classification = classify(&snapshot, &prior);
        let decision = decide(
            classification.severity,
            classification.state_changed,
            &prior,
            now,
            options.force,
            self.heartbeat_interval,
        );

        info!(
            severity = %classification.severity,
            changed = classification.state_changed,
            rpc_outage = classification.rpc_outage,
            height = snapshot.height,
            missed_blocks = snapshot.missed_blocks,
            "Cycle classified"
        );

        let mut report = CycleReport {
            snapshot,
            classification,
            decision,
            messages: Vec::new(),
            immediate_sent: false,
            heartbeat_sent: false,
            state_saved: false,
            history_appended: false,
        };

        if decision.send_immediate {
            let message = self
                .formatter
                .status_message(&report.snapshot, classification.severity);
            report.immediate_sent = self.deliver("status", &message, options.dry_run);
            report.messages.push(message);
        }

        if decision.send_heartbeat {
            let message = self.formatter.full_report(&report.snapshot);
            report.heartbeat_sent = self.deliver("full report", &message, options.dry_run);
            report.messages.push(message);
        }

        if options.dry_run {
            info!("Dry run: state and history left untouched");
            return report;
        }

        let next = apply(
            &prior,
            &report.snapshot,
            &classification,
            now,
            report.heartbeat_sent,
        );
        match self.store.save(&next) {
            Ok(()) => report.state_saved = true,
            Err(e) => error!("Failed to save state: {e:#}"),
        }

        match self.history.append(&report.snapshot) {
            Ok(()) => report.history_appended = true,
            Err(e) => error!("Failed to append history: {e:#}"),
        }

        report
    }

    fn deliver(&self, what: &str, message: &str, dry_run: bool) -> bool {
        if dry_run {
            return false;
        }
        match self.notifier.send_message(message) {
            Ok(()) => {
                info!("Sent {what} message");
                true
            }
            Err(e) => {
                error!("Failed to send {what} message: {e:#}");
                false
            }
        }
    }
}
