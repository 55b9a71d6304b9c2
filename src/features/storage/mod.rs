//! # Reminder Storage Feature
//!
//! Encrypted, backup-protected at-rest persistence of reminder records.
//! The artifact and its `.backup` sibling are owned exclusively by this
//! module; no other component touches them.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod crypto;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::config::StorageConfig;
use crate::core::reminder::{ReminderRecord, Schedule};

/// Wire shape of one persisted record. Field names match the JSON the
/// artifact has always carried, so existing artifacts keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawRecord {
    id: u64,
    chat_id: u64,
    text: String,
    author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<String>,
    repeat: bool,
}

impl RawRecord {
    fn from_record(record: &ReminderRecord) -> Self {
        let (cron, when, repeat) = match &record.schedule {
            Schedule::Recurring { expr } => (Some(expr.to_string()), None, true),
            Schedule::OneShot { at } => (None, Some(at.to_rfc3339()), false),
        };
        RawRecord {
            id: record.id,
            chat_id: record.chat_id,
            text: record.text.clone(),
            author: record.author.clone(),
            cron,
            when,
            repeat,
        }
    }

    /// Validate one wire record into a domain record.
    fn into_record(self) -> Result<ReminderRecord> {
        if self.id == 0 || self.chat_id == 0 {
            return Err(anyhow!("record is missing id or chat id"));
        }
        if self.text.is_empty() || self.author.is_empty() {
            return Err(anyhow!("record #{} is missing text or author", self.id));
        }

        let schedule = match (self.cron, self.when) {
            (Some(cron), None) => Schedule::Recurring {
                expr: cron
                    .parse()
                    .map_err(|e| anyhow!("record #{}: bad expression: {e}", self.id))?,
            },
            (None, Some(when)) => Schedule::OneShot {
                at: DateTime::parse_from_rfc3339(&when)
                    .map_err(|e| anyhow!("record #{}: bad instant: {e}", self.id))?
                    .with_timezone(&Utc),
            },
            _ => return Err(anyhow!("record #{} must have exactly one schedule", self.id)),
        };

        Ok(ReminderRecord {
            id: self.id,
            chat_id: self.chat_id,
            text: self.text,
            author: self.author,
            schedule,
        })
    }
}

/// Encrypted reminder persistence.
#[derive(Clone)]
pub struct ReminderStore {
    path: PathBuf,
    key: [u8; 32],
}

impl ReminderStore {
    pub fn new(config: &StorageConfig) -> Self {
        ReminderStore {
            path: config.reminders_path.clone(),
            key: config.encryption_key,
        }
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    /// Persist the live subset of `records`.
    ///
    /// Past one-shots are filtered out; an empty set deletes the artifact
    /// entirely. Failures are logged and the backup is restored over the
    /// primary best-effort — this never propagates an error.
    pub fn save(&self, records: &[ReminderRecord], now: DateTime<Utc>) {
        if let Err(e) = self.try_save(records, now) {
            error!("Failed to save reminders: {e}");
            let backup = self.backup_path();
            if backup.exists() {
                match std::fs::copy(&backup, &self.path) {
                    Ok(_) => info!("Restored reminder artifact from backup"),
                    Err(e) => error!("Failed to restore reminder backup: {e}"),
                }
            }
        }
    }

    fn try_save(&self, records: &[ReminderRecord], now: DateTime<Utc>) -> Result<()> {
        let live: Vec<RawRecord> = records
            .iter()
            .filter(|r| r.schedule.is_live(now))
            .map(RawRecord::from_record)
            .collect();
        debug!("Saving {} of {} reminders", live.len(), records.len());

        if live.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("failed to delete empty artifact")?;
                debug!("No live reminders, deleted {}", self.path.display());
            }
            return Ok(());
        }

        let json = serde_json::to_vec_pretty(&live).context("failed to serialize reminders")?;
        let ciphertext = crypto::encrypt(&self.key, &json);

        // Keep the previous artifact as the fallback before overwriting.
        if self.path.exists() {
            std::fs::copy(&self.path, self.backup_path())
                .context("failed to create backup copy")?;
        }

        std::fs::write(&self.path, &ciphertext)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(
            "Saved {} reminders to {} ({} bytes)",
            live.len(),
            self.path.display(),
            ciphertext.len()
        );
        Ok(())
    }

    /// Load all valid records from the artifact.
    ///
    /// A corrupt primary falls back to the backup; if both fail the store
    /// reports empty rather than failing the process.
    pub fn load(&self) -> Vec<ReminderRecord> {
        if !self.path.exists() {
            debug!("No reminder artifact at {}, starting empty", self.path.display());
            return Vec::new();
        }

        match self.load_from(&self.path) {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to load reminders: {e}");
                let backup = self.backup_path();
                if backup.exists() {
                    warn!("Attempting to load reminder backup");
                    match self.load_from(&backup) {
                        Ok(records) => {
                            info!("Loaded {} reminders from backup", records.len());
                            return records;
                        }
                        Err(e) => error!("Failed to load reminder backup: {e}"),
                    }
                }
                Vec::new()
            }
        }
    }

    fn load_from(&self, path: &PathBuf) -> Result<Vec<ReminderRecord>> {
        let ciphertext =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        if ciphertext.is_empty() {
            return Ok(Vec::new());
        }

        let json = crypto::decrypt(&self.key, &ciphertext)?;
        let raw: Vec<serde_json::Value> =
            serde_json::from_slice(&json).context("artifact is not a JSON array")?;
        let total = raw.len();

        // Invalid records are dropped one by one, never the whole load.
        let records: Vec<ReminderRecord> = raw
            .into_iter()
            .filter_map(|value| {
                serde_json::from_value::<RawRecord>(value)
                    .map_err(|e| anyhow!("{e}"))
                    .and_then(RawRecord::into_record)
                    .map_err(|e| warn!("Dropping invalid reminder record: {e}"))
                    .ok()
            })
            .collect();

        debug!("Loaded {} of {} reminders from {}", records.len(), total, path.display());
        Ok(records)
    }

    /// Decrypt the artifact to editable plain JSON (reminder editor).
    pub fn export_plain(&self) -> Result<String> {
        let raw: Vec<RawRecord> = self.load().iter().map(RawRecord::from_record).collect();
        serde_json::to_string_pretty(&raw).context("failed to render plain JSON")
    }

    /// Encrypt edited plain JSON back into the artifact (reminder editor).
    ///
    /// Returns how many records were written.
    pub fn import_plain(&self, json: &str, now: DateTime<Utc>) -> Result<usize> {
        let raw: Vec<RawRecord> = serde_json::from_str(json).context("invalid JSON")?;
        let records: Vec<ReminderRecord> = raw
            .into_iter()
            .map(RawRecord::into_record)
            .collect::<Result<_>>()?;
        self.save(&records, now);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::tempdir;

    fn store_at(dir: &std::path::Path) -> ReminderStore {
        ReminderStore::new(&StorageConfig {
            reminders_path: dir.join("reminders.enc"),
            encryption_key: *b"0123456789abcdef0123456789abcdef",
        })
    }

    fn recurring(id: u64) -> ReminderRecord {
        ReminderRecord {
            id,
            chat_id: 42,
            text: format!("задача {id}"),
            author: "@taras".into(),
            schedule: Schedule::Recurring {
                expr: "0 8 * * *".parse().expect("valid"),
            },
        }
    }

    fn one_shot(id: u64, at: DateTime<Utc>) -> ReminderRecord {
        ReminderRecord {
            id,
            chat_id: 42,
            text: format!("задача {id}"),
            author: "@taras".into(),
            schedule: Schedule::OneShot { at },
        }
    }

    #[test]
    fn test_round_trip_preserves_recurring_and_future_one_shots() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());
        let now = Utc::now();

        let records = vec![
            recurring(1),
            one_shot(2, now + Duration::hours(1)),
            one_shot(3, now - Duration::hours(1)),
        ];
        store.save(&records, now);

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], records[0]);
        assert_eq!(loaded[1].id, 2);
    }

    #[test]
    fn test_empty_set_deletes_artifact() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());
        let now = Utc::now();

        store.save(&[recurring(1)], now);
        assert!(dir.path().join("reminders.enc").exists());

        store.save(&[], now);
        assert!(!dir.path().join("reminders.enc").exists());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_only_past_one_shots_deletes_artifact_too() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());
        let now = Utc::now();

        store.save(&[recurring(1)], now);
        store.save(&[one_shot(2, now - Duration::minutes(5))], now);
        assert!(!dir.path().join("reminders.enc").exists());
    }

    #[test]
    fn test_artifact_is_not_plaintext() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());

        store.save(&[recurring(1)], Utc::now());
        let bytes = std::fs::read(dir.path().join("reminders.enc")).expect("read");
        assert!(!bytes.windows(6).any(|w| w == b"chatId"));
    }

    #[test]
    fn test_corrupted_primary_falls_back_to_backup() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());
        let now = Utc::now();

        // First save has nothing to back up; the second one copies the
        // first artifact aside.
        store.save(&[recurring(1)], now);
        store.save(&[recurring(1), recurring(2)], now);
        assert!(dir.path().join("reminders.enc.backup").exists());

        std::fs::write(dir.path().join("reminders.enc"), b"garbage").expect("corrupt");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1);
    }

    #[test]
    fn test_corrupted_primary_and_backup_load_empty() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());

        std::fs::write(dir.path().join("reminders.enc"), b"garbage").expect("write");
        std::fs::write(dir.path().join("reminders.enc.backup"), b"also garbage").expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_invalid_records_are_dropped_individually() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());

        // Hand-craft an artifact with one good and two bad records.
        let json = serde_json::json!([
            {"id": 1, "chatId": 42, "text": "ок", "author": "@a", "cron": "0 8 * * *", "repeat": true},
            {"id": 2, "chatId": 42, "text": "", "author": "@a", "cron": "0 8 * * *", "repeat": true},
            {"id": 3, "chatId": 42, "text": "без розкладу", "author": "@a", "repeat": false}
        ]);
        let ciphertext = crypto::encrypt(
            b"0123456789abcdef0123456789abcdef",
            json.to_string().as_bytes(),
        );
        std::fs::write(dir.path().join("reminders.enc"), ciphertext).expect("write");

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 1);
    }

    #[test]
    fn test_record_with_both_schedules_is_dropped() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());

        let json = serde_json::json!([
            {"id": 1, "chatId": 42, "text": "двозначне", "author": "@a",
             "cron": "0 8 * * *", "when": "2099-01-01T00:00:00Z", "repeat": true}
        ]);
        let ciphertext = crypto::encrypt(
            b"0123456789abcdef0123456789abcdef",
            json.to_string().as_bytes(),
        );
        std::fs::write(dir.path().join("reminders.enc"), ciphertext).expect("write");

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempdir().expect("tempdir");
        let store = store_at(dir.path());
        let now = Utc::now();

        store.save(&[recurring(1), one_shot(2, now + Duration::days(1))], now);

        let plain = store.export_plain().expect("export");
        assert!(plain.contains("\"cron\": \"0 8 * * *\""));

        store.save(&[], now);
        let count = store.import_plain(&plain, now).expect("import");
        assert_eq!(count, 2);
        assert_eq!(store.load().len(), 2);
    }
}
