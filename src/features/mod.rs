//! # Features Layer
//!
//! All feature modules of the reminder bot.

pub mod dialogue;
pub mod parser;
pub mod recurrence;
pub mod scheduler;
pub mod storage;

// Re-export the main entry points
pub use dialogue::{CreationDialogue, DialogueStep};
pub use parser::{NaturalDateParser, TimeExpressionParser};
pub use recurrence::RecurrenceExpr;
pub use scheduler::{Notifier, ReminderScheduler};
pub use storage::ReminderStore;
