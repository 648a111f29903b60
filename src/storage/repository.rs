use std::marker::PhantomData;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::StorageError;

/// Table metadata and row mapping for one entity.
///
/// `TABLE`, `ID_COLUMN` and `COLUMNS` are spliced into SQL text, so they must
/// stay compile-time constants; every value travels as a bound parameter.
pub trait Resource: Serialize + Clone + Sized {
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    const COLUMNS: &'static [&'static str];
    const KIND: &'static str;
    const PLURAL: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Values in the same order as `COLUMNS`.
    fn to_params(&self) -> Result<Vec<SqlValue>, StorageError>;

    /// Other rows this record points at, which must exist before it is written.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// A pointer from one row to a row of another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub column: &'static str,
    pub kind: &'static str,
    pub id: i64,
}

impl Reference {
    pub fn to<P: Resource>(id: i64) -> Self {
        Self {
            table: P::TABLE,
            column: P::ID_COLUMN,
            kind: P::KIND,
            id,
        }
    }
}

/// A stored entity: its fields plus the id the store assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<R> {
    pub id: i64,
    pub fields: R,
}

impl<R: Resource> Record<R> {
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(&self.fields)?;
        if let Value::Object(map) = &mut value {
            map.insert(R::ID_COLUMN.to_string(), Value::from(self.id));
        }
        Ok(value)
    }
}

impl<R: Resource> Serialize for Record<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

pub fn parse_column<T>(
    index: usize,
    raw: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            format!("unparseable column value: {raw}").into(),
        )
    })
}

pub struct Repository<R>(PhantomData<R>);

impl<R: Resource> Repository<R> {
    fn select_clause() -> String {
        format!(
            "SELECT {}, {} FROM {}",
            R::ID_COLUMN,
            R::COLUMNS.join(", "),
            R::TABLE
        )
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Record<R>> {
        Ok(Record {
            id: row.get(R::ID_COLUMN)?,
            fields: R::from_row(row)?,
        })
    }

    pub fn insert(conn: &Connection, fields: &R) -> Result<i64, StorageError> {
        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders.join(", ")
        );
        conn.execute(&sql, params_from_iter(fields.to_params()?))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn list(conn: &Connection) -> Result<Vec<Record<R>>, StorageError> {
        let sql = format!("{} ORDER BY {}", Self::select_clause(), R::ID_COLUMN);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_where(
        conn: &Connection,
        column: &str,
        value: i64,
    ) -> Result<Vec<Record<R>>, StorageError> {
        let sql = format!(
            "{} WHERE {} = ?1 ORDER BY {}",
            Self::select_clause(),
            column,
            R::ID_COLUMN
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([value], Self::map_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn find(conn: &Connection, id: i64) -> Result<Option<Record<R>>, StorageError> {
        let sql = format!("{} WHERE {} = ?1", Self::select_clause(), R::ID_COLUMN);
        Ok(conn.query_row(&sql, [id], Self::map_row).optional()?)
    }

    /// Single lookup keyed by both the row id and its parent column.
    pub fn find_within(
        conn: &Connection,
        id: i64,
        parent_column: &str,
        parent_id: i64,
    ) -> Result<Option<Record<R>>, StorageError> {
        let sql = format!(
            "{} WHERE {} = ?1 AND {} = ?2",
            Self::select_clause(),
            R::ID_COLUMN,
            parent_column
        );
        Ok(conn
            .query_row(&sql, [id, parent_id], Self::map_row)
            .optional()?)
    }

    pub fn find_by(
        conn: &Connection,
        column: &str,
        value: i64,
    ) -> Result<Option<Record<R>>, StorageError> {
        let sql = format!("{} WHERE {} = ?1 LIMIT 1", Self::select_clause(), column);
        Ok(conn.query_row(&sql, [value], Self::map_row).optional()?)
    }

    pub fn update(conn: &Connection, id: i64, fields: &R) -> Result<usize, StorageError> {
        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 2))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?1",
            R::TABLE,
            assignments.join(", "),
            R::ID_COLUMN
        );

        let mut params = vec![SqlValue::Integer(id)];
        params.extend(fields.to_params()?);
        Ok(conn.execute(&sql, params_from_iter(params))?)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<usize, StorageError> {
        let sql = format!("DELETE FROM {} WHERE {} = ?1", R::TABLE, R::ID_COLUMN);
        Ok(conn.execute(&sql, [id])?)
    }
}

pub fn exists(conn: &Connection, reference: &Reference) -> Result<bool, StorageError> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
        reference.table, reference.column
    );
    Ok(conn.query_row(&sql, [reference.id], |row| row.get(0))?)
}
