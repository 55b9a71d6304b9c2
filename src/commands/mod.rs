//! # Commands Layer
//!
//! Inbound message/command routing and the outbound notifier. Thin glue
//! between the chat transport and the reminder core; every error is
//! caught at this boundary and rendered to the user.

pub mod handler;
pub mod notifier;

pub use handler::BotContext;
pub use notifier::ChannelNotifier;
