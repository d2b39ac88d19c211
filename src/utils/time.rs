use chrono::{NaiveDate, NaiveTime};
use serde_json::json;

use crate::error::{AppError, AppResult};

pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| {
        AppError::validation_with_details(
            format!("invalid date '{value}', expected YYYY-MM-DD"),
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn parse_hhmm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|err| {
        AppError::validation_with_details(
            format!("invalid time '{value}', expected HH:MM"),
            json!({"value": value, "error": err.to_string()}),
        )
    })
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn ensure_window(start: NaiveTime, end: NaiveTime) -> AppResult<()> {
    if end <= start {
        Err(AppError::validation(
            "window end time must be later than start time",
        ))
    } else {
        Ok(())
    }
}

pub fn duration_minutes(start: NaiveTime, end: NaiveTime) -> AppResult<i64> {
    let total = end.signed_duration_since(start).num_minutes();
    if total < 0 {
        Err(AppError::validation("end time must not precede start time"))
    } else {
        Ok(total)
    }
}
