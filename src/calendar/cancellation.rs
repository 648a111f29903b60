use chrono::NaiveDateTime;
use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Event;
use crate::storage::repository::parse_column;
use crate::storage::{Reference, Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError, temporal};

/// Marks an event as cancelled. At most one per event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub event_id: i64,
    pub reason: String,
    pub amount: Option<f64>,
    #[serde(default)]
    pub excluded_dates: Vec<DateSpan>,
}

/// Window of time the cancellation does not apply to.
///
/// Bodies may send either `{"start": .., "end": ..}` or the compact
/// `"2021-09-13T10:30-2021-09-13T11:30"` form. Stored and returned as objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateSpan {
    fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        temporal::is_chronologically_ordered(&start, &end).then_some(Self { start, end })
    }

    fn from_bounds(start: &str, end: &str) -> Option<Self> {
        Self::new(temporal::parse_date_time(start)?, temporal::parse_date_time(end)?)
    }

    /// Splits on the first `-` that leaves a date-like value on both sides.
    fn from_compact(raw: &str) -> Option<Self> {
        raw.match_indices('-')
            .find_map(|(at, _)| Self::from_bounds(&raw[..at], &raw[at + 1..]))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(raw) => Self::from_compact(raw),
            Value::Object(range) => {
                Self::from_bounds(range.get("start")?.as_str()?, range.get("end")?.as_str()?)
            }
            _ => None,
        }
    }
}

fn excluded_dates(body: &Body, name: &str) -> Result<Vec<DateSpan>, ValidationError> {
    let value = body.get(name);
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        other => return Err(ValidationError::invalid(name, other)),
    };

    items
        .iter()
        .map(|item| {
            DateSpan::from_value(item).ok_or_else(|| ValidationError::invalid(name, Some(item)))
        })
        .collect()
}

impl Resource for Cancellation {
    const TABLE: &'static str = "cancellations";
    const ID_COLUMN: &'static str = "cancellation_id";
    const COLUMNS: &'static [&'static str] = &["event_id", "reason", "amount", "excluded_dates"];
    const KIND: &'static str = "cancellation";
    const PLURAL: &'static str = "cancellations";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let excluded: String = row.get("excluded_dates")?;

        Ok(Self {
            event_id: row.get("event_id")?,
            reason: row.get("reason")?,
            amount: row.get("amount")?,
            excluded_dates: parse_column(4, &excluded, |raw| serde_json::from_str(raw).ok())?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        let excluded = serde_json::to_string(&self.excluded_dates)?;

        Ok(vec![
            SqlValue::Integer(self.event_id),
            SqlValue::Text(self.reason.clone()),
            self.amount.map_or(SqlValue::Null, SqlValue::Real),
            SqlValue::Text(excluded),
        ])
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Event>(self.event_id)]
    }
}

impl Payload for Cancellation {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        Ok(Self {
            event_id: fields::integer(body, "event_id")?,
            reason: fields::string(body, "reason")?,
            amount: fields::optional_decimal(body, "amount")?,
            excluded_dates: excluded_dates(body, "excluded_dates")?,
        })
    }
}
