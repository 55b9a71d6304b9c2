//! Message and component routing
//!
//! Handles: /start, /list, /cancel, /create, /stop, the free-text
//! "зроби нагадування" trigger, the dialogue steps, and the inline
//! cancel buttons.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use log::{debug, info};
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::core::error::ReminderError;
use crate::core::reminder::Schedule;
use crate::features::dialogue::{CreationDialogue, DialogueStep};
use crate::features::parser::TimeExpressionParser;
use crate::features::scheduler::ReminderScheduler;

const HELP_TEXT: &str = "👋 Привіт! Я бот для нагадувань.

📝 Щоб створити нагадування, напишіть:
\"зроби нагадування [текст] [час]\"

⏰ Приклади:
• \"зроби нагадування купити молоко завтра о 10:00\"
• \"зроби нагадування зустріч через 2 години\"
• \"зроби нагадування прийняти ліки щодня о 8:00\"
• \"зроби нагадування на 15 число купити продукти о 12:00\"
• \"зроби нагадування кожного 25 числа о 10 ранку\"
• \"зроби нагадування кожен понеділок зустріч о 9:30\"

🔄 Повторювані нагадування:
• Щодня: \"щодня о 8:00\"
• Щотижня: \"кожен понеділок о 10:00\"
• Щомісяця: \"на 15 число о 12:00\", \"кожного 1 числа о 9:00\"

📋 Команди:
/list - переглянути активні нагадування
/cancel [номер] - скасувати нагадування
/create - створити покроково
/stop - перервати покрокове створення";

const PARSE_HINT: &str = "❌ Не зрозумів час нагадування. Спробуйте:
• \"зроби нагадування купити молоко завтра о 10:00\"
• \"зроби нагадування через годину\"
• \"зроби нагадування щодня о 8:00\"
• \"зроби нагадування на 15 число о 12:00\"
• \"зроби нагадування кожного 25 числа о 10 ранку\"
• \"зроби нагадування кожен понеділок о 9:30\"";

/// Shared state for all inbound handlers.
pub struct BotContext {
    pub scheduler: ReminderScheduler,
    pub dialogue: CreationDialogue,
    pub parser: TimeExpressionParser,
}

impl BotContext {
    pub fn new(
        scheduler: ReminderScheduler,
        dialogue: CreationDialogue,
        parser: TimeExpressionParser,
    ) -> Self {
        BotContext {
            scheduler,
            dialogue,
            parser,
        }
    }

    /// Route one inbound message.
    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let content = msg.content.trim();
        let chat_id = msg.channel_id.0;

        if let Some(command) = content.strip_prefix('/') {
            return self.handle_command(ctx, msg, command).await;
        }

        if self.dialogue.is_active(chat_id) {
            return self.handle_dialogue_step(ctx, msg, content).await;
        }

        if self.parser.matches_trigger(content) {
            return self.handle_creation(ctx, msg, content).await;
        }

        Ok(())
    }

    async fn handle_command(&self, ctx: &Context, msg: &Message, command: &str) -> Result<()> {
        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "start" => {
                msg.channel_id.say(&ctx.http, HELP_TEXT).await?;
            }
            "list" => self.handle_list(ctx, msg).await?,
            "cancel" => self.handle_cancel(ctx, msg, parts.next()).await?,
            "create" => {
                self.dialogue.start(msg.channel_id.0);
                msg.channel_id
                    .say(&ctx.http, "📝 Введіть текст нагадування")
                    .await?;
            }
            "stop" => {
                let reply = if self.dialogue.stop(msg.channel_id.0) {
                    "✅ Покрокове створення скасовано"
                } else {
                    "ℹ️ Немає активного створення"
                };
                msg.channel_id.say(&ctx.http, reply).await?;
            }
            _ => {
                debug!("Ignoring unknown command: /{command}");
            }
        }
        Ok(())
    }

    /// Free-text creation: "зроби нагадування купити молоко завтра о 10:00".
    async fn handle_creation(&self, ctx: &Context, msg: &Message, content: &str) -> Result<()> {
        let chat_id = msg.channel_id.0;
        let author = format!("@{}", msg.author.name);

        let parsed = match self.parser.parse(content, chrono::Utc::now()) {
            Ok(parsed) => parsed,
            Err(ReminderError::UnrecognizedTime) => {
                msg.channel_id.say(&ctx.http, PARSE_HINT).await?;
                return Ok(());
            }
            Err(e) => {
                msg.channel_id.say(&ctx.http, format!("❌ {e}")).await?;
                return Ok(());
            }
        };

        let (recurring, description) = match &parsed.schedule {
            Schedule::Recurring { expr } => (true, expr.describe()),
            Schedule::OneShot { at } => (
                false,
                at.with_timezone(&chrono::Local)
                    .format("%d.%m.%Y %H:%M")
                    .to_string(),
            ),
        };
        let id = self
            .scheduler
            .create(chat_id, &author, &parsed.text, parsed.schedule)
            .await;

        let reply = if recurring {
            format!("⏳ Повторюване нагадування #{id} збережено\n📅 Розклад: {description}")
        } else {
            format!("⏳ Нагадування #{id} збережено на {description}")
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// One step of the /create dialogue.
    async fn handle_dialogue_step(&self, ctx: &Context, msg: &Message, content: &str) -> Result<()> {
        let chat_id = msg.channel_id.0;
        match self.dialogue.advance(chat_id, content) {
            DialogueStep::NeedRecurrence => {
                msg.channel_id
                    .say(
                        &ctx.http,
                        "⏰ Тепер введіть розклад: «хвилина година день місяць день_тижня», наприклад 0 8 * * *",
                    )
                    .await?;
            }
            DialogueStep::InvalidRecurrence(reason) => {
                msg.channel_id
                    .say(&ctx.http, format!("❌ {reason}\nСпробуйте ще раз"))
                    .await?;
            }
            DialogueStep::Committed { text, expr } => {
                let author = format!("@{}", msg.author.name);
                let description = expr.describe();
                let id = self
                    .scheduler
                    .create(chat_id, &author, &text, Schedule::Recurring { expr })
                    .await;
                msg.channel_id
                    .say(
                        &ctx.http,
                        format!("⏳ Повторюване нагадування #{id} збережено\n📅 Розклад: {description}"),
                    )
                    .await?;
            }
            DialogueStep::NotActive => {}
        }
        Ok(())
    }

    async fn handle_list(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let reminders = self.scheduler.list(msg.channel_id.0).await;
        if reminders.is_empty() {
            msg.channel_id
                .say(&ctx.http, "📭 Немає активних нагадувань")
                .await?;
            return Ok(());
        }

        msg.channel_id
            .say(&ctx.http, format!("📋 Активні нагадування ({}):", reminders.len()))
            .await?;

        for reminder in reminders {
            let id = reminder.id;
            msg.channel_id
                .send_message(&ctx.http, |m| {
                    m.content(format!(
                        "#{id} 📌 {}\n🕒 {}\n👤 Від: {}",
                        reminder.text,
                        reminder.schedule_description(),
                        reminder.author
                    ))
                    .components(|c| {
                        c.create_action_row(|row| {
                            row.create_button(|b| {
                                b.custom_id(format!("cancel_{id}"))
                                    .label(format!("❌ Скасувати #{id}"))
                                    .style(ButtonStyle::Danger)
                            })
                        })
                    })
                })
                .await?;
        }
        Ok(())
    }

    async fn handle_cancel(&self, ctx: &Context, msg: &Message, arg: Option<&str>) -> Result<()> {
        let Some(id) = arg.and_then(|a| a.parse::<u64>().ok()) else {
            msg.channel_id
                .say(&ctx.http, "❌ Вкажіть номер нагадування. Приклад: /cancel 123")
                .await?;
            return Ok(());
        };

        let reply = if self.scheduler.cancel(id, msg.channel_id.0).await {
            format!("✅ Нагадування #{id} скасовано")
        } else {
            format!("❌ {}", ReminderError::NotFound)
        };
        msg.channel_id.say(&ctx.http, reply).await?;
        Ok(())
    }

    /// Inline cancel button under a /list entry.
    pub async fn handle_component(
        &self,
        ctx: &Context,
        component: &MessageComponentInteraction,
    ) -> Result<()> {
        let Some(raw_id) = component.data.custom_id.strip_prefix("cancel_") else {
            return Ok(());
        };
        let Ok(id) = raw_id.parse::<u64>() else {
            return Ok(());
        };

        if self.scheduler.cancel(id, component.channel_id.0).await {
            info!("Reminder #{id} cancelled via button");
            component
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::UpdateMessage)
                        .interaction_response_data(|message| {
                            message
                                .content(format!("❌ Нагадування #{id} скасовано"))
                                .components(|c| c)
                        })
                })
                .await?;
        } else {
            component
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content(format!("❌ {}", ReminderError::NotFound))
                                .ephemeral(true)
                        })
                })
                .await?;
        }
        Ok(())
    }
}
