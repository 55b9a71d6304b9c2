use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use nagaduvach::commands::{BotContext, ChannelNotifier};
use nagaduvach::core::Config;
use nagaduvach::features::dialogue::CreationDialogue;
use nagaduvach::features::parser::{NaturalDateParser, TimeExpressionParser};
use nagaduvach::features::scheduler::ReminderScheduler;
use nagaduvach::features::storage::ReminderStore;

/// The bot context lives in serenity's type map so the event handler can
/// reach it; it is created only after the client exists, because the
/// notifier needs the client's HTTP handle.
struct BotContextKey;

impl TypeMapKey for BotContextKey {
    type Value = Arc<BotContext>;
}

struct Handler;

impl Handler {
    async fn bot_context(ctx: &Context) -> Option<Arc<BotContext>> {
        ctx.data.read().await.get::<BotContextKey>().cloned()
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let Some(bot) = Self::bot_context(&ctx).await else {
            return;
        };

        if let Err(e) = bot.handle_message(&ctx, &msg).await {
            error!("Error handling message: {e}");
            if let Err(why) = msg
                .channel_id
                .say(&ctx.http, "❌ Помилка обробки повідомлення. Спробуйте ще раз.")
                .await
            {
                error!("Failed to send error message: {why}");
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🤖 {} підключено, бот працює!", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::MessageComponent(component) = interaction else {
            return;
        };

        let Some(bot) = Self::bot_context(&ctx).await else {
            return;
        };

        if let Err(e) = bot.handle_component(&ctx, &component).await {
            error!(
                "Error handling component interaction '{}': {e}",
                component.data.custom_id
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // A missing or malformed secret is the only fatal error: exit before
    // the event loop ever starts.
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| {
            error!("Failed to create chat client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Wire the core against the client's HTTP handle and reconcile timers
    // from the persisted record set.
    let store = ReminderStore::new(&config.storage);
    let notifier = Arc::new(ChannelNotifier::new(client.cache_and_http.http.clone()));
    let scheduler = ReminderScheduler::new(store, notifier);
    scheduler.reconcile().await;

    let parser = TimeExpressionParser::new(Arc::new(NaturalDateParser::new()?))?;
    let bot = Arc::new(BotContext::new(scheduler, CreationDialogue::new(), parser));
    {
        let mut data = client.data.write().await;
        data.insert::<BotContextKey>(bot);
    }

    // Graceful shutdown on interrupt or supervisor termination
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("Отримано сигнал завершення. Зупинка бота...");
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Bot configured successfully. Connecting to gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}

/// Resolve on ctrl-c or SIGTERM, whichever arrives first.
#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[cfg(all(test, unix))]
mod tests {
    use super::wait_for_shutdown_signal;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_resolves_the_shutdown_wait() {
        let waiting = tokio::spawn(wait_for_shutdown_signal());
        // Let the spawned task install its handlers before signalling.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let pid = std::process::id().to_string();
        let status = std::process::Command::new("kill")
            .args(["-TERM", &pid])
            .status()
            .expect("kill runs");
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .expect("shutdown wait resolves on SIGTERM")
            .expect("task completes");
    }
}
