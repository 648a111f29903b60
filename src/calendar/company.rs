use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use crate::storage::{Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub pay_rate: f64,
    pub color: String,
}

impl Resource for Company {
    const TABLE: &'static str = "companies";
    const ID_COLUMN: &'static str = "company_id";
    const COLUMNS: &'static [&'static str] = &["name", "pay_rate", "color"];
    const KIND: &'static str = "company";
    const PLURAL: &'static str = "companies";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            pay_rate: row.get("pay_rate")?,
            color: row.get("color")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        Ok(vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::Real(self.pay_rate),
            SqlValue::Text(self.color.clone()),
        ])
    }
}

impl Payload for Company {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        Ok(Self {
            name: fields::string(body, "name")?,
            color: fields::string(body, "color")?,
            pay_rate: fields::decimal(body, "pay_rate")?,
        })
    }
}
