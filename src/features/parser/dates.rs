//! Natural-language absolute date interpretation
//!
//! The one-shot fallback behind the time-expression parser. The real
//! work of the system is the recurrence path; this collaborator only
//! needs to cover the everyday phrasings ("завтра о 10:00",
//! "через 2 години", "25.12 о 9:00").
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Local, TimeZone, Utc};
use regex::Regex;

/// Absolute-date collaborator: free text in, instant out.
///
/// Implementations may return instants in the past; the caller rejects
/// those.
pub trait DateInterpreter: Send + Sync {
    fn parse_date(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// Ukrainian relative/absolute date parser.
pub struct NaturalDateParser {
    relative: Regex,
    day_word: Regex,
    explicit_date: Regex,
    time_of_day: Regex,
}

impl NaturalDateParser {
    pub fn new() -> Result<Self> {
        Ok(NaturalDateParser {
            // "через 2 години", "через 30 хвилин", "через 3 дні"
            relative: Regex::new(r"через\s+(\d+)?\s*(хвилин|годин|дн|день|тижн)")?,
            day_word: Regex::new(r"післязавтра|завтра|сьогодні")?,
            // "25.12" or "25.12.2026"
            explicit_date: Regex::new(r"(\d{1,2})\.(\d{1,2})(?:\.(\d{4}))?")?,
            time_of_day: Regex::new(r"\s[ов]\s?(\d{1,2})(?::(\d{2}))?")?,
        })
    }

    fn extract_time(&self, text: &str) -> Option<(u32, u32)> {
        let captures = self.time_of_day.captures(text)?;
        let hour = captures.get(1)?.as_str().parse().ok()?;
        let minute = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if hour > 23 || minute > 59 {
            return None;
        }
        Some((hour, minute))
    }
}

impl DateInterpreter for NaturalDateParser {
    fn parse_date(&self, text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local_now = now.with_timezone(&Local);

        if let Some(captures) = self.relative.captures(text) {
            let amount: i64 = captures
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let duration = match captures.get(2)?.as_str() {
                "хвилин" => Duration::minutes(amount),
                "годин" => Duration::hours(amount),
                "тижн" => Duration::weeks(amount),
                _ => Duration::days(amount),
            };
            return Some(now + duration);
        }

        if let Some(word) = self.day_word.find(text) {
            let day_offset = match word.as_str() {
                "сьогодні" => 0,
                "завтра" => 1,
                _ => 2,
            };
            let (hour, minute) = self.extract_time(text).unwrap_or((12, 0));
            let date = local_now.date_naive() + Duration::days(day_offset);
            let at = Local
                .from_local_datetime(&date.and_hms_opt(hour, minute, 0)?)
                .earliest()?;
            return Some(at.with_timezone(&Utc));
        }

        if let Some(captures) = self.explicit_date.captures(text) {
            let day: u32 = captures.get(1)?.as_str().parse().ok()?;
            let month: u32 = captures.get(2)?.as_str().parse().ok()?;
            let year: i32 = captures
                .get(3)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or_else(|| local_now.year());
            let (hour, minute) = self.extract_time(text).unwrap_or((12, 0));
            let naive = chrono::NaiveDate::from_ymd_opt(year, month, day)?
                .and_hms_opt(hour, minute, 0)?;
            let at = Local.from_local_datetime(&naive).earliest()?;
            return Some(at.with_timezone(&Utc));
        }

        // Bare "о 18:00" means today at that time; the caller rejects it
        // if that instant is already gone.
        if let Some((hour, minute)) = self.extract_time(text) {
            let naive = local_now.date_naive().and_hms_opt(hour, minute, 0)?;
            let at = Local.from_local_datetime(&naive).earliest()?;
            return Some(at.with_timezone(&Utc));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> NaturalDateParser {
        NaturalDateParser::new().expect("patterns compile")
    }

    #[test]
    fn test_relative_hours() {
        let now = Utc::now();
        let at = parser().parse_date("зустріч через 2 години", now).expect("parses");
        assert_eq!(at, now + Duration::hours(2));
    }

    #[test]
    fn test_relative_minutes() {
        let now = Utc::now();
        let at = parser().parse_date("через 30 хвилин", now).expect("parses");
        assert_eq!(at, now + Duration::minutes(30));
    }

    #[test]
    fn test_relative_without_amount_defaults_to_one() {
        let now = Utc::now();
        let at = parser().parse_date("через годину", now).expect("parses");
        assert_eq!(at, now + Duration::hours(1));
    }

    #[test]
    fn test_tomorrow_with_time() {
        let now = Utc::now();
        let at = parser()
            .parse_date("купити молоко завтра о 10:00", now)
            .expect("parses");
        let local = at.with_timezone(&Local);
        let expected_date = now.with_timezone(&Local).date_naive() + Duration::days(1);
        assert_eq!(local.date_naive(), expected_date);
        assert_eq!(local.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn test_tomorrow_without_time_defaults_to_noon() {
        let at = parser().parse_date("завтра", Utc::now()).expect("parses");
        assert_eq!(at.with_timezone(&Local).format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_explicit_date() {
        let now = Utc::now();
        let at = parser()
            .parse_date("25.12.2099 о 9:30", now)
            .expect("parses");
        let local = at.with_timezone(&Local);
        assert_eq!(local.format("%d.%m.%Y %H:%M").to_string(), "25.12.2099 09:30");
    }

    #[test]
    fn test_bare_time_is_today() {
        let now = Utc::now();
        let at = parser().parse_date("нагадай о 18:00", now).expect("parses");
        let local = at.with_timezone(&Local);
        assert_eq!(local.date_naive(), now.with_timezone(&Local).date_naive());
        assert_eq!(local.format("%H:%M").to_string(), "18:00");
    }

    #[test]
    fn test_gibberish_yields_none() {
        assert!(parser().parse_date("щось колись", Utc::now()).is_none());
    }
}
