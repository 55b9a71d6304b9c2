//! # Recurrence Feature
//!
//! Five-field recurrence expressions: grammar validation, human-readable
//! explanations, and next-occurrence computation for the scheduler.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod grammar;
pub mod schedule;

pub use grammar::{validate, RecurrenceError, RecurrenceExpr, RecurrenceField};
pub use schedule::next_occurrence;
