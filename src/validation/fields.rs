use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};

use super::ValidationError;
use super::temporal;

pub type Body = Map<String, Value>;

pub fn as_object(body: &Value) -> Result<&Body, ValidationError> {
    body.as_object()
        .ok_or_else(|| ValidationError::invalid("body", Some(body)))
}

fn present<'a>(body: &'a Body, name: &str) -> Option<&'a Value> {
    match body.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

pub fn string(body: &Body, name: &str) -> Result<String, ValidationError> {
    match body.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        other => Err(ValidationError::invalid(name, other)),
    }
}

pub fn optional_string(body: &Body, name: &str) -> Result<Option<String>, ValidationError> {
    match present(body, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        other => Err(ValidationError::invalid(name, other)),
    }
}

pub fn boolean(body: &Body, name: &str) -> Result<bool, ValidationError> {
    match body.get(name) {
        Some(Value::Bool(b)) => Ok(*b),
        other => Err(ValidationError::invalid(name, other)),
    }
}

fn integer_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn decimal_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Numeric identifiers may arrive as JSON numbers or numeric strings.
pub fn integer(body: &Body, name: &str) -> Result<i64, ValidationError> {
    let value = body.get(name);
    value
        .and_then(integer_of)
        .ok_or_else(|| ValidationError::invalid(name, value))
}

pub fn optional_integer(body: &Body, name: &str) -> Result<Option<i64>, ValidationError> {
    match present(body, name) {
        None => Ok(None),
        Some(value) => integer_of(value)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid(name, Some(value))),
    }
}

pub fn decimal(body: &Body, name: &str) -> Result<f64, ValidationError> {
    let value = body.get(name);
    value
        .and_then(decimal_of)
        .ok_or_else(|| ValidationError::invalid(name, value))
}

pub fn optional_decimal(body: &Body, name: &str) -> Result<Option<f64>, ValidationError> {
    match present(body, name) {
        None => Ok(None),
        Some(value) => decimal_of(value)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid(name, Some(value))),
    }
}

pub fn date_time(body: &Body, name: &str) -> Result<NaiveDateTime, ValidationError> {
    let value = body.get(name);
    value
        .and_then(Value::as_str)
        .and_then(temporal::parse_date_time)
        .ok_or_else(|| ValidationError::invalid(name, value))
}

pub fn time_of_day(body: &Body, name: &str) -> Result<NaiveTime, ValidationError> {
    let value = body.get(name);
    value
        .and_then(Value::as_str)
        .and_then(temporal::parse_time_of_day)
        .ok_or_else(|| ValidationError::invalid(name, value))
}

pub fn calendar_date(body: &Body, name: &str) -> Result<NaiveDate, ValidationError> {
    let value = body.get(name);
    value
        .and_then(Value::as_str)
        .and_then(temporal::parse_calendar_date)
        .ok_or_else(|| ValidationError::invalid(name, value))
}

/// Missing, null and empty all mean "no end date".
pub fn optional_end_date(body: &Body, name: &str) -> Result<Option<NaiveDate>, ValidationError> {
    match present(body, name) {
        None => Ok(None),
        Some(Value::String(s)) if temporal::is_valid_end_date(Some(s)) => {
            Ok(temporal::parse_calendar_date(s))
        }
        other => Err(ValidationError::invalid(name, other)),
    }
}

pub fn weekdays(body: &Body, name: &str) -> Result<BTreeSet<u8>, ValidationError> {
    let value = body.get(name);
    let Some(Value::Array(items)) = value else {
        return Err(ValidationError::invalid(name, value));
    };

    items
        .iter()
        .map(|item| {
            item.as_u64()
                .filter(|day| *day <= 6)
                .map(|day| day as u8)
                .ok_or_else(|| ValidationError::invalid(name, value))
        })
        .collect()
}
