// Core layer - domain types, configuration, errors
pub mod core;

// Features layer - all feature modules
pub mod features;

// Application layer - message routing and the outbound notifier
pub mod commands;

// Re-export core config
pub use core::{Config, StorageConfig};

// Re-export feature items
pub use features::{
    // Dialogue
    CreationDialogue, DialogueStep,
    // Parsing
    NaturalDateParser, TimeExpressionParser,
    // Recurrence
    RecurrenceExpr,
    // Scheduling
    Notifier, ReminderScheduler,
    // Storage
    ReminderStore,
};
