//! # Error Taxonomy
//!
//! Domain errors for the reminder engine. None of these are fatal: every
//! inbound-event handler and timer callback catches them at its boundary.
//! Only a missing or malformed startup secret terminates the process.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use thiserror::Error;

/// Errors surfaced by the reminder core.
#[derive(Debug, Error)]
pub enum ReminderError {
    /// No time expression recognized in the request. Handlers answer
    /// this one with usage examples rather than the bare message.
    #[error("не зрозумів час нагадування")]
    UnrecognizedTime,

    /// Other malformed request: empty task text, past instant.
    #[error("{0}")]
    Parse(String),

    /// Recurrence field or time component out of range.
    #[error("{0}")]
    Validation(String),

    /// Cancel of an unknown or foreign id. Deliberately indistinguishable
    /// from "already removed" so ownership never leaks.
    #[error("нагадування не знайдено або вже видалено")]
    NotFound,

    /// I/O or decryption failure in the store. Recovered via backup when
    /// possible; callers proceed with what the store returns.
    #[error("помилка сховища: {0}")]
    Storage(String),

    /// Notification send failure. Logged only, never retried.
    #[error("помилка доставки: {0}")]
    Delivery(String),
}
