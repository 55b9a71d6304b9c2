//! Recurrence expression grammar
//!
//! Validates and explains the 5-field schedule descriptor
//! (minute, hour, day-of-month, month, day-of-week).
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Extracted from the message handler during the Rust rewrite

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Weekday names in the case the explanations use ("в понеділок").
pub const DAY_NAMES: [&str; 7] = [
    "неділю",
    "понеділок",
    "вівторок",
    "середу",
    "четвер",
    "п'ятницю",
    "суботу",
];

/// Month names in genitive case ("15 січня").
pub const MONTH_NAMES: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

/// Grammar errors, rendered directly to the user during dialogue retries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("вираз повинен мати рівно 5 полів, отримано {0}")]
    FieldCount(usize),
    #[error("поле «{field}»: значення {value} поза діапазоном {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("поле «{field}»: не зрозумів «{token}»")]
    Malformed { field: &'static str, token: String },
}

/// One field of a recurrence expression.
///
/// Step, range and list forms are accepted by shape only: their numeric
/// sub-bounds are not checked against the field range. Out-of-range
/// sub-bounds simply never match at firing time (see `schedule`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceField {
    Any,
    Value(u32),
    /// `n/m` or `*/m`: every `m` starting from `n` (or the field minimum).
    Step(Option<u32>, u32),
    Range(u32, u32),
    List(Vec<u32>),
}

impl RecurrenceField {
    fn parse(token: &str, field: &'static str, min: u32, max: u32) -> Result<Self, RecurrenceError> {
        let malformed = || RecurrenceError::Malformed {
            field,
            token: token.to_string(),
        };

        if token == "*" {
            return Ok(RecurrenceField::Any);
        }

        if let Some((base, step)) = token.split_once('/') {
            let base = if base == "*" {
                None
            } else {
                Some(base.parse().map_err(|_| malformed())?)
            };
            let step = step.parse().map_err(|_| malformed())?;
            return Ok(RecurrenceField::Step(base, step));
        }

        if let Some((start, end)) = token.split_once('-') {
            let start = start.parse().map_err(|_| malformed())?;
            let end = end.parse().map_err(|_| malformed())?;
            return Ok(RecurrenceField::Range(start, end));
        }

        if token.contains(',') {
            let values = token
                .split(',')
                .map(|part| part.parse().map_err(|_| malformed()))
                .collect::<Result<Vec<u32>, _>>()?;
            return Ok(RecurrenceField::List(values));
        }

        // Single integer is the only form whose range is enforced.
        let value: u32 = token.parse().map_err(|_| malformed())?;
        if value < min || value > max {
            return Err(RecurrenceError::OutOfRange {
                field,
                value,
                min,
                max,
            });
        }
        Ok(RecurrenceField::Value(value))
    }

    /// The single scalar value, when the field is one.
    pub fn scalar(&self) -> Option<u32> {
        match self {
            RecurrenceField::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, RecurrenceField::Any)
    }
}

impl fmt::Display for RecurrenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceField::Any => write!(f, "*"),
            RecurrenceField::Value(v) => write!(f, "{v}"),
            RecurrenceField::Step(Some(base), step) => write!(f, "{base}/{step}"),
            RecurrenceField::Step(None, step) => write!(f, "*/{step}"),
            RecurrenceField::Range(start, end) => write!(f, "{start}-{end}"),
            RecurrenceField::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// A validated 5-field recurrence expression.
///
/// Weekday 0 and 7 both denote Sunday. The value 7 is kept verbatim here;
/// explanation and firing normalize it independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceExpr {
    pub minute: RecurrenceField,
    pub hour: RecurrenceField,
    pub day_of_month: RecurrenceField,
    pub month: RecurrenceField,
    pub day_of_week: RecurrenceField,
}

impl FromStr for RecurrenceExpr {
    type Err = RecurrenceError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = expr.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(RecurrenceError::FieldCount(tokens.len()));
        }

        Ok(RecurrenceExpr {
            minute: RecurrenceField::parse(tokens[0], "хвилина", 0, 59)?,
            hour: RecurrenceField::parse(tokens[1], "година", 0, 23)?,
            day_of_month: RecurrenceField::parse(tokens[2], "день місяця", 1, 31)?,
            month: RecurrenceField::parse(tokens[3], "місяць", 1, 12)?,
            day_of_week: RecurrenceField::parse(tokens[4], "день тижня", 0, 7)?,
        })
    }
}

impl fmt::Display for RecurrenceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.minute, self.hour, self.day_of_month, self.month, self.day_of_week
        )
    }
}

impl RecurrenceExpr {
    /// Convenience constructor for the time-expression parser, which only
    /// ever produces single values and wildcards.
    pub fn at(minute: u32, hour: u32, day_of_month: Option<u32>, day_of_week: Option<u32>) -> Self {
        RecurrenceExpr {
            minute: RecurrenceField::Value(minute),
            hour: RecurrenceField::Value(hour),
            day_of_month: day_of_month.map_or(RecurrenceField::Any, RecurrenceField::Value),
            month: RecurrenceField::Any,
            day_of_week: day_of_week.map_or(RecurrenceField::Any, RecurrenceField::Value),
        }
    }

    /// Render a human-readable schedule description.
    ///
    /// Priority: day-of-month over day-of-week over daily, with the time
    /// always appended as zero-padded HH:MM.
    pub fn describe(&self) -> String {
        let time = format!("{}:{}", pad_field(&self.hour), pad_field(&self.minute));

        if !self.day_of_month.is_any() {
            if !self.month.is_any() {
                let month_name = self
                    .month
                    .scalar()
                    .filter(|m| (1..=12).contains(m))
                    .map(|m| MONTH_NAMES[(m - 1) as usize].to_string())
                    .unwrap_or_else(|| self.month.to_string());
                return format!("{} {} о {}", self.day_of_month, month_name, time);
            }
            return format!("щомісяця {} числа о {}", self.day_of_month, time);
        }

        if !self.day_of_week.is_any() {
            // 7 is Sunday too, but only here; validate keeps it verbatim.
            let day_name = self
                .day_of_week
                .scalar()
                .map(|d| DAY_NAMES[(d % 7) as usize].to_string())
                .unwrap_or_else(|| self.day_of_week.to_string());
            return format!("щотижня в {} о {}", day_name, time);
        }

        format!("щодня о {}", time)
    }
}

fn pad_field(field: &RecurrenceField) -> String {
    match field.scalar() {
        Some(v) => format!("{v:02}"),
        None => field.to_string(),
    }
}

/// Check whether a string is a well-formed recurrence expression.
pub fn validate(expr: &str) -> bool {
    expr.parse::<RecurrenceExpr>().is_ok()
}
