use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use super::Event;
use crate::storage::{Reference, Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOverride {
    pub event_id: i64,
    pub amount: f64,
}

impl Resource for PaymentOverride {
    const TABLE: &'static str = "payment_overrides";
    const ID_COLUMN: &'static str = "payment_override_id";
    const COLUMNS: &'static [&'static str] = &["event_id", "amount"];
    const KIND: &'static str = "payment override";
    const PLURAL: &'static str = "payment overrides";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event_id: row.get("event_id")?,
            amount: row.get("amount")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        Ok(vec![SqlValue::Integer(self.event_id), SqlValue::Real(self.amount)])
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference::to::<Event>(self.event_id)]
    }
}

impl Payload for PaymentOverride {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        Ok(Self {
            event_id: fields::integer(body, "event_id")?,
            amount: fields::decimal(body, "amount")?,
        })
    }
}
