//! # Time Expression Parser
//!
//! Classifies free-text reminder requests as recurring or one-shot and
//! extracts a recurrence expression or an absolute instant.
//!
//! The rule lists below are evaluated in a fixed priority order,
//! first match wins. Several patterns overlap (e.g. "15 числа" against
//! the generic time regex), so the order itself is a contract: reordering
//! changes which phrase wins on ambiguous input. Do not reorder.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod dates;

pub use dates::{DateInterpreter, NaturalDateParser};

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;
use std::sync::Arc;

use crate::core::error::ReminderError;
use crate::core::reminder::Schedule;
use crate::features::recurrence::RecurrenceExpr;

/// Hour used when a repeating phrase carries no time of day.
const DEFAULT_HOUR: u32 = 12;

/// Outcome of a successful parse: the cleaned payload plus its schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReminder {
    pub text: String,
    pub schedule: Schedule,
}

/// Free-text reminder parser.
///
/// All rule regexes are compiled once at construction.
pub struct TimeExpressionParser {
    trigger: Regex,
    repeating_cue: Regex,
    time_rules: Vec<Regex>,
    monthly_rules: Vec<Regex>,
    weekday_rules: Vec<(Regex, Option<u32>)>,
    dates: Arc<dyn DateInterpreter>,
}

impl TimeExpressionParser {
    pub fn new(dates: Arc<dyn DateInterpreter>) -> Result<Self> {
        // "о 10 годині", "в 15:30", "о 8 вечора" — ordered, first match wins.
        let time_rules = [
            r"\s[ов]\s?(\d{1,2})(?::(\d{2}))?\s*(?:год|годин)",
            r"\s[ов]\s?(\d{1,2})(?::(\d{2}))?",
            r"\s[ов]\s?(\d{1,2}):(\d{2})",
            r"\s[ов]\s?(\d{1,2})\s*год(?:ин[іуа])?",
            r"\s[ов]\s?(\d{1,2})\s*(?:год(?:ин[іуа])?)?\s*ранку",
            r"\s[ов]\s?(\d{1,2})\s*(?:год(?:ин[іуа])?)?\s*вечора",
            r"\s[ов]\s?(\d{1,2})\s*(?:год(?:ин[іуа])?)?\s*дня",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()?;

        // "на 15 число", "кожного 25 числа" — ordered.
        let monthly_rules = [
            r"на\s+(\d{1,2})\s+число",
            r"(\d{1,2})\s+число\s+кож",
            r"кожен\s+(\d{1,2})",
            r"кожного\s+(\d{1,2})",
            r"щом[іе]сяця\s+(\d{1,2})",
            r"(\d{1,2})\s+числа",
            r"кожного\s+(\d{1,2})\s+числа",
            r"(\d{1,2})\s+числа\s+місяця",
            r"(\d{1,2})\s+число\s+місяця",
            r"(\d{1,2})\s+числа\s+кожного\s+місяця",
        ]
        .iter()
        .map(|p| Regex::new(p))
        .collect::<Result<Vec<_>, _>>()?;

        // One rule per weekday plus the generic daily fallback, which must
        // stay last: "дня|день" would swallow every weekday phrase above it.
        let weekday_rules = [
            (r"понеділ(ок|ка|ку|ком|ці)|щопонеділ", Some(1)),
            (r"вівтор(ок|ка|ку|ком|ці)|щовівтор", Some(2)),
            (r"серед(а|и|у|ою|і)|щосеред", Some(3)),
            (r"четвер(г|га|гу|гом|зі)|щочетвер", Some(4)),
            (r"п'ятниц(я|і|ю|ею|ями)|щоп'ятн", Some(5)),
            (r"субот(а|и|у|ою|і)|щосубот", Some(6)),
            (r"неділ(я|і|ю|ею|ями)|щонеділ", Some(0)),
            (r"щодня|кожен день|дня|день", None),
        ]
        .iter()
        .map(|(p, d)| Regex::new(p).map(|re| (re, *d)))
        .collect::<Result<Vec<_>, _>>()?;

        Ok(TimeExpressionParser {
            trigger: Regex::new(r"(?i)зроби нагадування")?,
            repeating_cue: Regex::new(
                r"кож(ен|ного|ну|ній|ий|а|е|і)|щодня|щопонеділ|щовівтор|щосеред|щочетвер|щоп'ятн|щосубот|щонеділ|число|місяця",
            )?,
            time_rules,
            monthly_rules,
            weekday_rules,
            dates,
        })
    }

    /// Whether `raw` contains the creation trigger phrase.
    pub fn matches_trigger(&self, raw: &str) -> bool {
        self.trigger.is_match(raw)
    }

    /// Parse a reminder request into payload text and a schedule.
    pub fn parse(&self, raw: &str, now: DateTime<Utc>) -> Result<ParsedReminder, ReminderError> {
        let message = raw.to_lowercase();

        let schedule = if self.repeating_cue.is_match(&message) {
            match self.parse_repeating(&message)? {
                Some(expr) => Some(Schedule::Recurring { expr }),
                // Repeating cue without a repeating pattern: fall through
                // to one-shot interpretation.
                None => self.parse_one_shot(&message, now)?,
            }
        } else {
            self.parse_one_shot(&message, now)?
        };

        let Some(schedule) = schedule else {
            return Err(ReminderError::UnrecognizedTime);
        };

        let text = self.trigger.replace_all(raw, "").trim().to_string();
        if text.is_empty() {
            return Err(ReminderError::Parse("опишіть, про що нагадати".to_string()));
        }

        Ok(ParsedReminder { text, schedule })
    }

    /// Repeating branch: time of day, then monthly, then weekly/daily.
    fn parse_repeating(&self, message: &str) -> Result<Option<RecurrenceExpr>, ReminderError> {
        let (hour, minute) = self.extract_time(message)?;

        if let Some(day_of_month) = self.extract_day_of_month(message)? {
            let expr = RecurrenceExpr::at(minute, hour, Some(day_of_month), None);
            debug!("parsed monthly recurrence: {expr}");
            return Ok(Some(expr));
        }

        for (rule, day) in &self.weekday_rules {
            if rule.is_match(message) {
                let expr = RecurrenceExpr::at(minute, hour, None, *day);
                debug!("parsed weekly recurrence: {expr}");
                return Ok(Some(expr));
            }
        }

        Ok(None)
    }

    /// Extract hour and minute with the ordered time rules; defaults to
    /// 12:00 when no rule matches.
    fn extract_time(&self, message: &str) -> Result<(u32, u32), ReminderError> {
        let captures = self
            .time_rules
            .iter()
            .find_map(|rule| rule.captures(message));

        let Some(captures) = captures else {
            return Ok((DEFAULT_HOUR, 0));
        };

        let mut hour: u32 = captures
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(DEFAULT_HOUR);
        let minute: u32 = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);

        // "о 8 вечора" means 20:00.
        if message.contains("вечора") && hour < 12 {
            hour += 12;
        }

        if hour > 23 || minute > 59 {
            return Err(ReminderError::Validation(
                "невірний формат часу, використовуйте години 0-23 та хвилини 0-59".to_string(),
            ));
        }

        Ok((hour, minute))
    }

    /// First monthly rule that matches decides; an out-of-range day is an
    /// error, not a fall-through.
    fn extract_day_of_month(&self, message: &str) -> Result<Option<u32>, ReminderError> {
        for rule in &self.monthly_rules {
            if let Some(captures) = rule.captures(message) {
                let day: u32 = captures
                    .get(1)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0);
                if (1..=31).contains(&day) {
                    return Ok(Some(day));
                }
                return Err(ReminderError::Validation(
                    "день місяця повинен бути від 1 до 31".to_string(),
                ));
            }
        }
        Ok(None)
    }

    /// One-shot branch: delegate to the natural-language date collaborator.
    fn parse_one_shot(
        &self,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Schedule>, ReminderError> {
        let Some(at) = self.dates.parse_date(message, now) else {
            return Ok(None);
        };
        if at <= now {
            return Err(ReminderError::Parse(
                "неможна створити нагадування на минулий час".to_string(),
            ));
        }
        Ok(Some(Schedule::OneShot { at }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Date collaborator stub with a canned answer.
    struct StubDates(Option<DateTime<Utc>>);

    impl DateInterpreter for StubDates {
        fn parse_date(&self, _text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
            self.0
        }
    }

    fn parser_with(stub: Option<DateTime<Utc>>) -> TimeExpressionParser {
        TimeExpressionParser::new(Arc::new(StubDates(stub))).expect("patterns compile")
    }

    fn parser() -> TimeExpressionParser {
        parser_with(None)
    }

    fn recurring_expr(parsed: &ParsedReminder) -> String {
        match &parsed.schedule {
            Schedule::Recurring { expr } => expr.to_string(),
            other => panic!("expected recurring schedule, got {other:?}"),
        }
    }

    #[test]
    fn test_daily_phrase() {
        let parsed = parser()
            .parse("зроби нагадування прийняти ліки щодня о 8:00", Utc::now())
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 8 * * *");
        assert_eq!(parsed.text, "прийняти ліки щодня о 8:00");
    }

    #[test]
    fn test_monthly_phrase() {
        let parsed = parser()
            .parse(
                "зроби нагадування кожного 15 числа о 12:00 сплатити рахунки",
                Utc::now(),
            )
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 12 15 * *");
    }

    #[test]
    fn test_weekly_phrase() {
        let parsed = parser()
            .parse("зроби нагадування кожен понеділок о 9:30 зустріч", Utc::now())
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "30 9 * * 1");
    }

    #[test]
    fn test_evening_marker_shifts_hour() {
        let parsed = parser()
            .parse("зроби нагадування кожного 25 числа о 8 вечора", Utc::now())
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 20 25 * *");
    }

    #[test]
    fn test_morning_phrase_keeps_hour() {
        let parsed = parser()
            .parse("зроби нагадування кожного 25 числа о 10 ранку", Utc::now())
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 10 25 * *");
    }

    #[test]
    fn test_missing_time_defaults_to_noon() {
        let parsed = parser()
            .parse("зроби нагадування щодня пити воду", Utc::now())
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 12 * * *");
    }

    #[test]
    fn test_day_of_month_wins_over_weekday() {
        // Both a monthly and a weekday phrase present: monthly rules run
        // first, so the day of month decides the schedule.
        let parsed = parser()
            .parse(
                "зроби нагадування кожного 15 числа о 9:00 понеділок",
                Utc::now(),
            )
            .expect("parses");
        assert_eq!(recurring_expr(&parsed), "0 9 15 * *");
    }

    #[test]
    fn test_out_of_range_day_of_month_fails() {
        let err = parser()
            .parse("зроби нагадування кожного 32 числа о 12:00", Utc::now())
            .expect_err("day 32 is invalid");
        assert!(matches!(err, ReminderError::Validation(_)));
    }

    #[test]
    fn test_out_of_range_hour_fails() {
        let err = parser()
            .parse("зроби нагадування щодня о 25", Utc::now())
            .expect_err("hour 25 is invalid");
        assert!(matches!(err, ReminderError::Validation(_)));
    }

    #[test]
    fn test_one_shot_delegates_to_collaborator() {
        let now = Utc::now();
        let at = now + Duration::hours(2);
        let parsed = parser_with(Some(at))
            .parse("зроби нагадування купити молоко завтра о 10:00", now)
            .expect("parses");
        assert_eq!(parsed.schedule, Schedule::OneShot { at });
    }

    #[test]
    fn test_past_instant_is_rejected() {
        let now = Utc::now();
        let err = parser_with(Some(now - Duration::hours(1)))
            .parse("зроби нагадування купити молоко вчора", now)
            .expect_err("past instants are rejected");
        assert!(matches!(err, ReminderError::Parse(_)));
    }

    #[test]
    fn test_unparseable_time_is_rejected() {
        let err = parser()
            .parse("зроби нагадування щось колись", Utc::now())
            .expect_err("no time found");
        // The dedicated variant is what handlers route the hint reply on.
        assert!(matches!(err, ReminderError::UnrecognizedTime));
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let now = Utc::now();
        let err = parser_with(Some(now + Duration::hours(1)))
            .parse("зроби нагадування", now)
            .expect_err("payload is empty");
        assert!(matches!(err, ReminderError::Parse(_)));
    }

    #[test]
    fn test_trigger_detection_is_case_insensitive() {
        let p = parser();
        assert!(p.matches_trigger("Зроби Нагадування тест"));
        assert!(!p.matches_trigger("просто повідомлення"));
    }
}
