//! Maintenance tool for the encrypted reminder artifact.
//!
//! Runs against the same `ENCRYPTION_KEY` / `REMINDERS_PATH` environment as
//! the bot, so it can inspect and repair the record set while the bot is
//! stopped:
//!
//! ```text
//! reminder-editor list                # print a human summary of all records
//! reminder-editor export [file.json]  # decrypt to plain JSON
//! reminder-editor import [file.json]  # re-encrypt edited JSON back
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use dotenvy::dotenv;

use nagaduvach::core::StorageConfig;
use nagaduvach::features::storage::ReminderStore;

const DEFAULT_EXPORT_PATH: &str = "reminders.json";

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        eprintln!("Usage: reminder-editor <list|export|import> [file.json]");
        std::process::exit(2);
    };

    let store = ReminderStore::new(&StorageConfig::from_env()?);
    let file = args.get(2).map(String::as_str).unwrap_or(DEFAULT_EXPORT_PATH);

    match command.as_str() {
        "list" => {
            let records = store.load();
            if records.is_empty() {
                println!("Нагадувань немає.");
                return Ok(());
            }
            println!("Нагадувань: {}", records.len());
            for record in records {
                println!(
                    "#{} [chat {}] {} — {} ({})",
                    record.id,
                    record.chat_id,
                    record.schedule_description(),
                    record.text,
                    record.author
                );
            }
        }
        "export" => {
            let json = store.export_plain()?;
            std::fs::write(file, json).with_context(|| format!("не вдалося записати {file}"))?;
            println!("Експортовано у {file}. Відредагуйте та імпортуйте назад.");
        }
        "import" => {
            let json = std::fs::read_to_string(file)
                .with_context(|| format!("не вдалося прочитати {file}"))?;
            let count = store.import_plain(&json, Utc::now())?;
            println!("Імпортовано {count} нагадувань.");
        }
        other => bail!("невідома команда: {other}"),
    }

    Ok(())
}
