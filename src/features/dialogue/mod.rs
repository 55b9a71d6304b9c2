//! # Creation Dialogue Feature
//!
//! Per-chat two-step state machine for building a recurring reminder
//! without free-text time parsing: first the text, then a recurrence
//! expression. Sessions live only in process memory.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use dashmap::DashMap;

use crate::features::recurrence::RecurrenceExpr;

/// Session state for one chat owner.
#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    AwaitingText,
    AwaitingRecurrence { text: String },
}

/// What the caller should do after feeding input to the dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueStep {
    /// No session for this chat; the input was not consumed.
    NotActive,
    /// Text captured; ask for the recurrence expression next.
    NeedRecurrence,
    /// Invalid expression; the session stays put for a retry.
    InvalidRecurrence(String),
    /// Both pieces collected; the session is gone and the caller
    /// registers the reminder.
    Committed { text: String, expr: RecurrenceExpr },
}

/// Step-by-step reminder creation sessions, keyed by chat owner.
#[derive(Default)]
pub struct CreationDialogue {
    sessions: DashMap<u64, SessionState>,
}

impl CreationDialogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a dialogue for `chat_id`. An existing session is silently
    /// replaced, no confirmation.
    pub fn start(&self, chat_id: u64) {
        self.sessions.insert(chat_id, SessionState::AwaitingText);
    }

    /// Drop the session, from any state. Returns whether one existed.
    pub fn stop(&self, chat_id: u64) -> bool {
        self.sessions.remove(&chat_id).is_some()
    }

    pub fn is_active(&self, chat_id: u64) -> bool {
        self.sessions.contains_key(&chat_id)
    }

    /// Feed one message into the session.
    pub fn advance(&self, chat_id: u64, input: &str) -> DialogueStep {
        let Some(state) = self.sessions.get(&chat_id).map(|s| s.value().clone()) else {
            return DialogueStep::NotActive;
        };

        match state {
            SessionState::AwaitingText => {
                let text = input.trim();
                if text.is_empty() {
                    return DialogueStep::NotActive;
                }
                self.sessions.insert(
                    chat_id,
                    SessionState::AwaitingRecurrence {
                        text: text.to_string(),
                    },
                );
                DialogueStep::NeedRecurrence
            }
            SessionState::AwaitingRecurrence { text } => {
                match input.trim().parse::<RecurrenceExpr>() {
                    Ok(expr) => {
                        // Commit discards the session before the caller
                        // registers the reminder.
                        self.sessions.remove(&chat_id);
                        DialogueStep::Committed { text, expr }
                    }
                    Err(e) => DialogueStep::InvalidRecurrence(e.to_string()),
                }
            }
        }
    }
}
