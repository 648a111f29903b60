use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

use crate::storage::{Resource, StorageError};
use crate::validation::fields::{self, Body};
use crate::validation::{Payload, ValidationError};

/// Owner of events and series. Carries no credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

fn email(body: &Body, name: &str) -> Result<String, ValidationError> {
    let value = fields::string(body, name)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(value),
        _ => Err(ValidationError::invalid(name, body.get(name))),
    }
}

impl Resource for User {
    const TABLE: &'static str = "users";
    const ID_COLUMN: &'static str = "user_id";
    const COLUMNS: &'static [&'static str] = &["email", "first_name", "last_name"];
    const KIND: &'static str = "user";
    const PLURAL: &'static str = "users";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            email: row.get("email")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
        })
    }

    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError> {
        Ok(vec![
            SqlValue::Text(self.email.clone()),
            SqlValue::Text(self.first_name.clone()),
            SqlValue::Text(self.last_name.clone()),
        ])
    }
}

impl Payload for User {
    fn from_body(body: &Body) -> Result<Self, ValidationError> {
        Ok(Self {
            email: email(body, "email")?,
            first_name: fields::string(body, "first_name")?,
            last_name: fields::string(body, "last_name")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse(value: Value) -> Result<User, ValidationError> {
        User::from_body(value.as_object().unwrap())
    }

    #[test]
    fn builds_user_from_valid_payload() {
        let user = parse(json!({
            "email": "ada@example.com",
            "first_name": "Ada",
            "last_name": "Lovelace",
        }))
        .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.last_name, "Lovelace");
    }

    #[test]
    fn rejects_addresses_without_both_halves() {
        for email in ["ada", "@example.com", "ada@"] {
            let err = parse(json!({"email": email, "first_name": "Ada", "last_name": "L"})).unwrap_err();

            assert_eq!(err.to_string(), format!("Invalid value for param: email value: {email}"));
        }
    }

    #[test]
    fn names_are_required() {
        let err = parse(json!({"email": "ada@example.com", "first_name": "Ada"})).unwrap_err();

        assert_eq!(err.to_string(), "Invalid value for param: last_name value: null");
    }
}
