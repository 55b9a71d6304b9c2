//! Outbound notification delivery over the chat gateway
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::features::scheduler::Notifier;

/// Sends reminder notifications to their owner channel.
pub struct ChannelNotifier {
    http: Arc<Http>,
}

impl ChannelNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        ChannelNotifier { http }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, chat_id: u64, text: &str) -> Result<()> {
        ChannelId(chat_id)
            .say(&self.http, text)
            .await
            .with_context(|| format!("failed to deliver to channel {chat_id}"))?;
        Ok(())
    }
}
