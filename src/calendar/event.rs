use chrono::NaiveDateTime;
use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use super::{Calendar, Company, User};
use crate::storage::repository::parse_column;
use crate::storage::{Reference, Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError, temporal};

const STORED_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub calendar_id: i64,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub title: String,
    pub all_day: bool,
    pub user_id: i64,
    pub company_id: Option<i64>,
    pub description: Option<String>,
}

impl Resource for Event {
    const TABLE: &'static str = "events";
    const ID_COLUMN: &'static str = "event_id";
    const COLUMNS: &'static [&'static str] = &[
        "calendar_id",
        "date_start",
        "date_end",
        "title",
        "all_day",
        "user_id",
        "company_id",
        "description",
    ];
    const KIND: &'static str = "event";
    const PLURAL: &'static str = "events";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let date_start: String = row.get("date_start")?;
        let date_end: String = row.get("date_end")?;

        Ok(Self {
            calendar_id: row.get("calendar_id")?,
            date_start: parse_column(2, &date_start, |raw| {
                NaiveDateTime::parse_from_str(raw, STORED_DATE_TIME_FORMAT).ok()
            })?,
            date_end: parse_column(3, &date_end, |raw| {
                NaiveDateTime::parse_from_str(raw, STORED_DATE_TIME_FORMAT).ok()
            })?,
            title: row.get("title")?,
            all_day: row.get("all_day")?,
            user_id: row.get("user_id")?,
            company_id: row.get("company_id")?,
            description: row.get("description")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        Ok(vec![
            SqlValue::Integer(self.calendar_id),
            SqlValue::Text(self.date_start.format(STORED_DATE_TIME_FORMAT).to_string()),
            SqlValue::Text(self.date_end.format(STORED_DATE_TIME_FORMAT).to_string()),
            SqlValue::Text(self.title.clone()),
            SqlValue::Integer(i64::from(self.all_day)),
            SqlValue::Integer(self.user_id),
            self.company_id.map_or(SqlValue::Null, SqlValue::Integer),
            self.description.clone().map_or(SqlValue::Null, SqlValue::Text),
        ])
    }

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![
            Reference::to::<Calendar>(self.calendar_id),
            Reference::to::<User>(self.user_id),
        ];
        if let Some(company_id) = self.company_id {
            references.push(Reference::to::<Company>(company_id));
        }
        references
    }
}

impl Payload for Event {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        let event = Self {
            calendar_id: fields::integer(body, "calendar_id")?,
            title: fields::string(body, "title")?,
            all_day: fields::boolean(body, "all_day")?,
            user_id: fields::integer(body, "user_id")?,
            date_start: fields::date_time(body, "date_start")?,
            date_end: fields::date_time(body, "date_end")?,
            company_id: fields::optional_integer(body, "company_id")?,
            description: fields::optional_string(body, "description")?,
        };

        temporal::ensure_event_order(&event.date_start, &event.date_end)?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn payload() -> Value {
        json!({
            "calendar_id": 1,
            "date_start": "2021-07-29 14:30:00",
            "date_end": "2021-07-29 15:30:00",
            "title": "Our First Event",
            "all_day": true,
            "user_id": 1,
            "description": "Test Description",
            "company_id": 1,
        })
    }

    fn parse(value: Value) -> Result<Event, ValidationError> {
        Event::from_body(value.as_object().unwrap())
    }

    #[test]
    fn builds_event_from_valid_payload() {
        let event = parse(payload()).unwrap();

        assert_eq!(event.title, "Our First Event");
        assert_eq!(event.date_end - event.date_start, chrono::Duration::hours(1));
        assert_eq!(event.company_id, Some(1));
    }

    #[test]
    fn rejects_end_before_start() {
        let mut body = payload();
        body["date_end"] = json!("2021-07-28T15:30");

        let err = parse(body).unwrap_err();

        assert_eq!(
            err.to_string(),
            "date_end (2021-07-28T15:30:00) occurs before date_start (2021-07-29T14:30:00)"
        );
    }

    #[test]
    fn rejects_equal_start_and_end() {
        let mut body = payload();
        body["date_end"] = body["date_start"].clone();

        assert!(matches!(parse(body), Err(ValidationError::OutOfOrder { .. })));
    }

    #[test]
    fn field_errors_win_over_ordering() {
        let mut body = payload();
        body["user_id"] = json!("XXXX");
        body["date_end"] = json!("2000-01-01");

        let err = parse(body).unwrap_err();

        assert_eq!(err.to_string(), "Invalid value for param: user_id value: XXXX");
    }

    #[test]
    fn references_calendar_user_and_optional_company() {
        let event = parse(payload()).unwrap();

        let tables: Vec<&str> = event.references().iter().map(|r| r.table).collect();

        assert_eq!(tables, vec!["calendars", "users", "companies"]);
    }

    #[test]
    fn stored_instants_keep_fractional_seconds() {
        let mut body = payload();
        body["date_start"] = json!("2021-07-29T14:30:00.100");
        body["date_end"] = json!("2021-07-29T14:30:00.900");
        let event = parse(body).unwrap();

        let params = event.to_params().unwrap();

        assert_eq!(params[1], SqlValue::Text("2021-07-29 14:30:00.100".to_string()));
        assert_eq!(params[2], SqlValue::Text("2021-07-29 14:30:00.900".to_string()));
    }

    #[test]
    fn whole_second_instants_are_stored_without_a_fraction() {
        let event = parse(payload()).unwrap();

        let params = event.to_params().unwrap();

        assert_eq!(params[1], SqlValue::Text("2021-07-29 14:30:00".to_string()));
    }

    #[test]
    fn serialized_event_parses_back_to_itself() {
        let event = parse(payload()).unwrap();

        let round_tripped = parse(serde_json::to_value(&event).unwrap()).unwrap();

        assert_eq!(round_tripped, event);
    }
}
