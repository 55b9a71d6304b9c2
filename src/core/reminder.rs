//! # Reminder Records
//!
//! The durable unit of the system. Timer handles never live on these
//! types; the scheduler keeps them in its own runtime side table.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use chrono::{DateTime, Utc};

use crate::features::recurrence::RecurrenceExpr;

/// When a reminder fires: repeatedly per expression, or once at an instant.
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    Recurring { expr: RecurrenceExpr },
    OneShot { at: DateTime<Utc> },
}

impl Schedule {
    /// Whether this schedule can still fire after `now`.
    ///
    /// Recurring schedules are always live; one-shots die the moment
    /// their instant passes.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        match self {
            Schedule::Recurring { .. } => true,
            Schedule::OneShot { at } => *at > now,
        }
    }
}

/// A durable reminder. Only the owner chat may cancel it.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderRecord {
    /// Unique within the store, assigned from a process-wide counter.
    pub id: u64,
    /// Destination channel and implicit cancel permission.
    pub chat_id: u64,
    /// User-supplied payload, never empty.
    pub text: String,
    /// Display label captured at creation time, immutable.
    pub author: String,
    pub schedule: Schedule,
}

impl ReminderRecord {
    /// Human-readable firing description for listings and confirmations.
    pub fn schedule_description(&self) -> String {
        match &self.schedule {
            Schedule::Recurring { expr } => expr.describe(),
            Schedule::OneShot { at } => at
                .with_timezone(&chrono::Local)
                .format("%d.%m.%Y %H:%M")
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_one_shot_liveness() {
        let now = Utc::now();
        let future = Schedule::OneShot { at: now + Duration::hours(1) };
        let past = Schedule::OneShot { at: now - Duration::hours(1) };

        assert!(future.is_live(now));
        assert!(!past.is_live(now));
        // Exactly `now` counts as past: the instant must be strictly ahead.
        assert!(!Schedule::OneShot { at: now }.is_live(now));
    }

    #[test]
    fn test_recurring_is_always_live() {
        let expr = "0 8 * * *".parse().expect("valid");
        assert!(Schedule::Recurring { expr }.is_live(Utc::now()));
    }

    #[test]
    fn test_schedule_description_uses_grammar() {
        let record = ReminderRecord {
            id: 1,
            chat_id: 42,
            text: "прийняти ліки".into(),
            author: "@oksana".into(),
            schedule: Schedule::Recurring {
                expr: "0 8 * * *".parse().expect("valid"),
            },
        };
        assert_eq!(record.schedule_description(), "щодня о 08:00");
    }
}
