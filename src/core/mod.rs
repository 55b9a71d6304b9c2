//! # Core Module
//!
//! Core domain types, configuration, and error handling for the reminder bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod error;
pub mod reminder;

// Re-export commonly used items
pub use config::{Config, StorageConfig};
pub use error::ReminderError;
pub use reminder::{ReminderRecord, Schedule};
