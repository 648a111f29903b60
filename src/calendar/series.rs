use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use super::{Calendar, Company, User};
use crate::storage::repository::parse_column;
use crate::storage::{Reference, Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::temporal::{self, CALENDAR_DATE_FORMAT, TIME_OF_DAY_FORMAT};
use crate::validation::{Payload, ValidationError};

/// A repeating daily window over a date range. Never expanded into events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub calendar_id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,
    pub start_recur: NaiveDate,
    pub end_recur: Option<NaiveDate>,
    /// 0 = Sunday .. 6 = Saturday.
    pub days_of_week: BTreeSet<u8>,
    pub user_id: i64,
    pub company_id: Option<i64>,
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use crate::validation::temporal::{self, TIME_OF_DAY_FORMAT};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(TIME_OF_DAY_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        temporal::parse_time_of_day(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected HH:MM, got {raw}")))
    }
}

impl Resource for Series {
    const TABLE: &'static str = "series";
    const ID_COLUMN: &'static str = "series_id";
    const COLUMNS: &'static [&'static str] = &[
        "calendar_id",
        "title",
        "description",
        "start_time",
        "end_time",
        "start_recur",
        "end_recur",
        "days_of_week",
        "user_id",
        "company_id",
    ];
    const KIND: &'static str = "series";
    const PLURAL: &'static str = "series";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let start_time: String = row.get("start_time")?;
        let end_time: String = row.get("end_time")?;
        let start_recur: String = row.get("start_recur")?;
        let end_recur: Option<String> = row.get("end_recur")?;
        let days_of_week: String = row.get("days_of_week")?;

        Ok(Self {
            calendar_id: row.get("calendar_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            start_time: parse_column(4, &start_time, temporal::parse_time_of_day)?,
            end_time: parse_column(5, &end_time, temporal::parse_time_of_day)?,
            start_recur: parse_column(6, &start_recur, temporal::parse_calendar_date)?,
            end_recur: end_recur
                .map(|raw| parse_column(7, &raw, temporal::parse_calendar_date))
                .transpose()?,
            days_of_week: parse_column(8, &days_of_week, |raw| serde_json::from_str(raw).ok())?,
            user_id: row.get("user_id")?,
            company_id: row.get("company_id")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        let days: Vec<String> = self.days_of_week.iter().map(u8::to_string).collect();

        Ok(vec![
            SqlValue::Integer(self.calendar_id),
            SqlValue::Text(self.title.clone()),
            self.description.clone().map_or(SqlValue::Null, SqlValue::Text),
            SqlValue::Text(self.start_time.format(TIME_OF_DAY_FORMAT).to_string()),
            SqlValue::Text(self.end_time.format(TIME_OF_DAY_FORMAT).to_string()),
            SqlValue::Text(self.start_recur.format(CALENDAR_DATE_FORMAT).to_string()),
            self.end_recur.map_or(SqlValue::Null, |date| {
                SqlValue::Text(date.format(CALENDAR_DATE_FORMAT).to_string())
            }),
            SqlValue::Text(format!("[{}]", days.join(","))),
            SqlValue::Integer(self.user_id),
            self.company_id.map_or(SqlValue::Null, SqlValue::Integer),
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

impl Payload for Series {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        let series = Self {
            calendar_id: fields::integer(body, "calendar_id")?,
            title: fields::string(body, "title")?,
            description: fields::optional_string(body, "description")?,
            start_time: fields::time_of_day(body, "start_time")?,
            end_time: fields::time_of_day(body, "end_time")?,
            start_recur: fields::calendar_date(body, "start_recur")?,
            end_recur: fields::optional_end_date(body, "end_recur")?,
            days_of_week: fields::weekdays(body, "days_of_week")?,
            user_id: fields::integer(body, "user_id")?,
            company_id: fields::optional_integer(body, "company_id")?,
        };

        temporal::ensure_recurrence_order(
            series.start_recur,
            series.start_time,
            series.end_recur,
            series.end_time,
        )?;
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn payload() -> Value {
        json!({
            "calendar_id": 1,
            "title": "Weekly sync",
            "description": "Team sync",
            "start_time": "09:30",
            "end_time": "11:30",
            "start_recur": "2021-08-31",
            "end_recur": "2021-12-31",
            "days_of_week": [1, 3],
            "user_id": 1,
        })
    }

    fn parse(value: Value) -> Result<Series, ValidationError> {
        Series::from_body(value.as_object().unwrap())
    }

    #[test]
    fn builds_series_from_valid_payload() {
        let series = parse(payload()).unwrap();

        assert_eq!(series.start_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(series.days_of_week, BTreeSet::from([1, 3]));
        assert_eq!(series.end_recur, NaiveDate::from_ymd_opt(2021, 12, 31));
    }

    #[test]
    fn rejects_window_that_ends_before_it_starts() {
        let mut body = payload();
        body["start_time"] = json!("10:30");
        body["end_time"] = json!("14:30");
        body["start_recur"] = json!("2021-08-31");
        body["end_recur"] = json!("2021-08-30");

        let err = parse(body).unwrap_err();

        assert_eq!(
            err.to_string(),
            "end_recur (2021-08-30T14:30) occurs before start_recur (2021-08-31T10:30)"
        );
    }

    #[test]
    fn missing_end_recur_is_open_ended() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("end_recur");

        let series = parse(body).unwrap();

        assert_eq!(series.end_recur, None);
    }

    #[test]
    fn rejects_loose_time_shapes() {
        let mut body = payload();
        body["end_time"] = json!("9:30");

        let err = parse(body).unwrap_err();

        assert_eq!(err.to_string(), "Invalid value for param: end_time value: 9:30");
    }

    #[test]
    fn serializes_times_as_hh_mm() {
        let series = parse(payload()).unwrap();

        let value = serde_json::to_value(&series).unwrap();

        assert_eq!(value["start_time"], json!("09:30"));
        assert_eq!(value["days_of_week"], json!([1, 3]));
        assert_eq!(parse(value).unwrap(), series);
    }

    #[test]
    fn references_calendar_and_user() {
        let series = parse(payload()).unwrap();

        let tables: Vec<&str> = series.references().iter().map(|r| r.table).collect();

        assert_eq!(tables, vec!["calendars", "users"]);
    }

    #[test]
    fn days_of_week_are_stored_as_a_json_array() {
        let series = parse(payload()).unwrap();

        let params = series.to_params().unwrap();

        assert_eq!(params[7], SqlValue::Text("[1,3]".to_string()));
    }
}
