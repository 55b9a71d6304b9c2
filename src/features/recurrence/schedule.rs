//! Next-occurrence computation
//!
//! Turns a recurrence expression into concrete firing instants on the host
//! clock. Day candidates are scanned first so the minute loop only runs on
//! days that can match at all.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

use super::grammar::{RecurrenceExpr, RecurrenceField};

/// How far ahead an occurrence is searched for. Expressions whose
/// sub-bounds can never match (the grammar accepts them by shape) yield
/// `None` instead of an error, and the timer simply never fires.
const SCAN_DAYS: i64 = 366 * 4;

/// The first instant strictly after `after` that satisfies `expr`, or
/// `None` when no instant exists within the scan horizon.
pub fn next_occurrence(expr: &RecurrenceExpr, after: DateTime<Local>) -> Option<DateTime<Local>> {
    let start_date = after.date_naive();

    for offset in 0..SCAN_DAYS {
        let date = start_date + Duration::days(offset);
        if !day_matches(expr, date) {
            continue;
        }

        for hour in 0..24u32 {
            if !field_matches(&expr.hour, hour, 0) {
                continue;
            }
            for minute in 0..60u32 {
                if !field_matches(&expr.minute, minute, 0) {
                    continue;
                }
                let naive = date.and_hms_opt(hour, minute, 0)?;
                // DST gaps make some wall-clock minutes unrepresentable.
                let Some(candidate) = Local.from_local_datetime(&naive).earliest() else {
                    continue;
                };
                if candidate > after {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn day_matches(expr: &RecurrenceExpr, date: NaiveDate) -> bool {
    if !field_matches(&expr.month, date.month(), 1) {
        return false;
    }

    let dom = field_matches(&expr.day_of_month, date.day(), 1);
    let dow = dow_matches(&expr.day_of_week, date.weekday().num_days_from_sunday());

    // Classic cron rule: when both day fields are restricted, either one
    // qualifies the day; otherwise both must hold (wildcards always do).
    if !expr.day_of_month.is_any() && !expr.day_of_week.is_any() {
        dom || dow
    } else {
        dom && dow
    }
}

fn dow_matches(field: &RecurrenceField, weekday: u32) -> bool {
    // 0 and 7 both denote Sunday, in every field form.
    field_matches(field, weekday, 0) || field_matches(field, weekday + 7, 0)
}

fn field_matches(field: &RecurrenceField, value: u32, min: u32) -> bool {
    match field {
        RecurrenceField::Any => true,
        RecurrenceField::Value(v) => *v == value,
        RecurrenceField::Step(base, step) => {
            if *step == 0 {
                return false;
            }
            let base = base.unwrap_or(min);
            value >= base && (value - base) % step == 0
        }
        RecurrenceField::Range(start, end) => value >= *start && value <= *end,
        RecurrenceField::List(values) => values.contains(&value),
    }
}
