//! # Reminder Scheduler Feature
//!
//! Owns the live timers, reconciles them against persisted records on
//! startup, fires notifications, and applies post-fire cleanup.
//!
//! The record set and the timer side table mutate together behind one
//! mutex: a timer is never observable without its record, nor the other
//! way around. Timer handles stay out of the persisted record type
//! entirely.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, Utc};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::core::reminder::{ReminderRecord, Schedule};
use crate::features::recurrence::next_occurrence;
use crate::features::storage::ReminderStore;

/// Outbound notification delivery seam.
///
/// Delivery is fire-and-forget: a failure is logged by the scheduler and
/// never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: u64, text: &str) -> Result<()>;
}

/// Runtime-only scheduler state: records plus the timer side table.
struct SchedulerState {
    records: Vec<ReminderRecord>,
    timers: HashMap<u64, JoinHandle<()>>,
    next_id: u64,
}

/// Live reminder scheduler.
#[derive(Clone)]
pub struct ReminderScheduler {
    state: Arc<Mutex<SchedulerState>>,
    store: ReminderStore,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    pub fn new(store: ReminderStore, notifier: Arc<dyn Notifier>) -> Self {
        ReminderScheduler {
            state: Arc::new(Mutex::new(SchedulerState {
                records: Vec::new(),
                timers: HashMap::new(),
                next_id: 1,
            })),
            store,
            notifier,
        }
    }

    /// Rebuild live timers from the persisted record set after a restart.
    ///
    /// Recurring records resume from their next future occurrence; the
    /// occurrences that fell during downtime are skipped by design.
    /// Past-due one-shots are dropped silently and the trimmed set is
    /// persisted.
    pub async fn reconcile(&self) {
        let now = Utc::now();
        let loaded = self.store.load();
        let total = loaded.len();

        let mut state = self.state.lock().await;
        state.next_id = loaded.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        for record in loaded {
            if !record.schedule.is_live(now) {
                debug!("Reminder #{} is already past due, skipping", record.id);
                continue;
            }
            let handle = self.arm_timer(&record);
            state.timers.insert(record.id, handle);
            debug!(
                "Restored reminder #{} ({})",
                record.id,
                record.schedule_description()
            );
            state.records.push(record);
        }

        if state.records.len() != total {
            info!(
                "Dropped {} expired reminders during reconciliation",
                total - state.records.len()
            );
            self.store.save(&state.records, now);
        }

        info!("Scheduler reconciled: {} active reminders", state.records.len());
    }

    /// Register a new reminder, arm its timer, and persist the set.
    pub async fn create(
        &self,
        chat_id: u64,
        author: &str,
        text: &str,
        schedule: Schedule,
    ) -> u64 {
        let mut state = self.state.lock().await;
        let id = state.next_id;
        state.next_id += 1;

        let record = ReminderRecord {
            id,
            chat_id,
            text: text.to_string(),
            author: author.to_string(),
            schedule,
        };

        let handle = self.arm_timer(&record);
        state.timers.insert(id, handle);
        state.records.push(record);
        self.store.save(&state.records, Utc::now());

        info!("Created reminder #{id} for chat {chat_id}");
        id
    }

    /// Cancel a reminder owned by `requester`.
    ///
    /// Unknown ids and foreign records both come back `false`, with no
    /// state change — callers cannot tell the cases apart.
    pub async fn cancel(&self, id: u64, requester: u64) -> bool {
        let mut state = self.state.lock().await;
        let Some(index) = state
            .records
            .iter()
            .position(|r| r.id == id && r.chat_id == requester)
        else {
            debug!("Cancel of reminder #{id} by chat {requester}: not found");
            return false;
        };

        if let Some(handle) = state.timers.remove(&id) {
            handle.abort();
        }
        state.records.remove(index);
        self.store.save(&state.records, Utc::now());

        info!("Cancelled reminder #{id} for chat {requester}");
        true
    }

    /// The requester's live reminders, oldest first.
    pub async fn list(&self, chat_id: u64) -> Vec<ReminderRecord> {
        let now = Utc::now();
        let state = self.state.lock().await;
        state
            .records
            .iter()
            .filter(|r| r.chat_id == chat_id && r.schedule.is_live(now))
            .cloned()
            .collect()
    }

    /// Spawn the timer task for a record. Caller inserts the returned
    /// handle into the side table under the same lock that holds the
    /// record.
    ///
    /// The returned handle only ever covers the sleeping phase: once a
    /// timer wakes, delivery runs on a detached task, so an abort from
    /// `cancel` cannot cut off a firing already in flight. A cancel that
    /// lands mid-fire removes the record and stops future firings, but
    /// the current delivery runs to completion.
    fn arm_timer(&self, record: &ReminderRecord) -> JoinHandle<()> {
        let scheduler = self.clone();
        let id = record.id;
        match &record.schedule {
            Schedule::OneShot { at } => {
                let at = *at;
                tokio::spawn(async move {
                    let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                    tokio::time::sleep(wait).await;
                    tokio::spawn(async move { scheduler.fire(id, true).await });
                })
            }
            Schedule::Recurring { expr } => {
                let expr = expr.clone();
                tokio::spawn(async move {
                    loop {
                        let Some(next) = next_occurrence(&expr, Local::now()) else {
                            warn!("Reminder #{id}: expression «{expr}» has no future occurrence, timer parked");
                            return;
                        };
                        let wait = (next.with_timezone(&Utc) - Utc::now())
                            .to_std()
                            .unwrap_or(Duration::ZERO);
                        tokio::time::sleep(wait).await;
                        let firing = scheduler.clone();
                        tokio::spawn(async move { firing.fire(id, false).await });
                    }
                })
            }
        }
    }

    /// Timer callback: deliver the notification; one-shots are then
    /// removed from record set and side table as one unit.
    async fn fire(&self, id: u64, one_shot: bool) {
        let record = {
            let state = self.state.lock().await;
            state.records.iter().find(|r| r.id == id).cloned()
        };
        let Some(record) = record else {
            // Cancelled between scheduling and firing.
            return;
        };

        let message = if one_shot {
            format!("🔔 Нагадування: {}\n👤 Від: {}", record.text, record.author)
        } else {
            format!(
                "🔔 Повторюване нагадування: {}\n👤 Від: {}",
                record.text, record.author
            )
        };

        debug!("Firing reminder #{id}");
        if let Err(e) = self.notifier.send(record.chat_id, &message).await {
            warn!("Failed to deliver reminder #{id}: {e}");
        }

        if one_shot {
            let mut state = self.state.lock().await;
            state.records.retain(|r| r.id != id);
            state.timers.remove(&id);
            self.store.save(&state.records, Utc::now());
            info!("Reminder #{id} fired and removed");
        }
    }
}
