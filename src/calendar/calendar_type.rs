use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use crate::storage::{Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub name: String,
}

impl Resource for Calendar {
    const TABLE: &'static str = "calendars";
    const ID_COLUMN: &'static str = "calendar_id";
    const COLUMNS: &'static [&'static str] = &["name"];
    const KIND: &'static str = "calendar";
    const PLURAL: &'static str = "calendars";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        Ok(vec![SqlValue::Text(self.name.clone())])
    }
}

impl Payload for Calendar {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        Ok(Self {
            name: fields::string(body, "name")?,
        })
    }
}
