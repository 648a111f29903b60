use std::marker::PhantomData;

use serde_json::{Value, json};

use super::ServiceError;
use super::resolver::ExistenceResolver;
use crate::outcome::Outcome;
use crate::storage::{Database, Record, Reference, Repository, Resource};
use crate::validation::Payload;
use crate::validation::fields::{self, Body};

/// Parses a request body, pinning the scope column to the parent from the path.
pub(crate) fn parse_payload<R: Payload>(
    body: &Value,
    scope: Option<&Reference>,
) -> Result<R, ServiceError> {
    let mut body = fields::as_object(body)?.clone();
    if let Some(parent) = scope {
        body.insert(parent.column.to_string(), Value::from(parent.id));
    }
    Ok(R::from_body(&body)?)
}

/// Overlays a partial body on a stored record. The record's own id column is
/// never taken from the body.
pub(crate) fn merge_patch<R: Resource>(
    record: &Record<R>,
    patch: &Value,
) -> Result<Value, ServiceError> {
    let patch = fields::as_object(patch)?;
    let mut merged: Body = match serde_json::to_value(&record.fields)? {
        Value::Object(map) => map,
        _ => Body::new(),
    };

    for (key, value) in patch {
        if key != R::ID_COLUMN {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

pub(crate) fn created<R: Resource>() -> Outcome {
    Outcome::success(format!("Successfully created {}", R::KIND), json!([]), 201)
}

pub(crate) fn retrieved<R: Resource>(record: &Record<R>) -> Result<Outcome, ServiceError> {
    Ok(Outcome::success(
        format!("Successfully retrieved {}", R::KIND),
        record.to_json()?,
        200,
    ))
}

pub(crate) fn updated<R: Resource>(record: &Record<R>) -> Result<Outcome, ServiceError> {
    Ok(Outcome::success(
        format!("Successfully updated {} id: {}", R::KIND, record.id),
        record.to_json()?,
        200,
    ))
}

pub(crate) fn patched<R: Resource>(record: &Record<R>) -> Result<Outcome, ServiceError> {
    Ok(Outcome::success(
        format!("Successfully patched {} id: {}", R::KIND, record.id),
        record.to_json()?,
        200,
    ))
}

pub(crate) fn removed<R: Resource>() -> Outcome {
    Outcome::ok(format!("Successfully removed {}", R::KIND))
}

/// Collapses an internal result into the envelope handed to callers.
pub(crate) fn settle(result: Result<Outcome, ServiceError>) -> Outcome {
    result.unwrap_or_else(ServiceError::into_outcome)
}

/// CRUD over one entity, optionally nested under a parent row.
///
/// Every operation opens its own connection and validates the body before
/// writing. Errors never escape; they come back as failure outcomes.
#[derive(Debug, Clone)]
pub struct ResourceFacade<R> {
    db: Database,
    scope: Option<Reference>,
    _resource: PhantomData<R>,
}

impl<R: Resource + Payload> ResourceFacade<R> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            scope: None,
            _resource: PhantomData,
        }
    }

    pub fn scoped(db: Database, parent: Reference) -> Self {
        Self {
            db,
            scope: Some(parent),
            _resource: PhantomData,
        }
    }

    pub fn scope(&self) -> Option<&Reference> {
        self.scope.as_ref()
    }

    pub fn try_create(&self, body: &Value) -> Result<Record<R>, ServiceError> {
        let fields = parse_payload::<R>(body, self.scope())?;
        let conn = self.db.connect()?;
        ExistenceResolver::new(&conn).require_all(&fields.references())?;

        let id = Repository::insert(&conn, &fields)?;
        tracing::debug!("Inserted {} {}", R::KIND, id);
        Ok(Record { id, fields })
    }

    pub fn try_list(&self) -> Result<Vec<Record<R>>, ServiceError> {
        let conn = self.db.connect()?;
        match self.scope() {
            Some(parent) => {
                ExistenceResolver::new(&conn).require(parent)?;
                Ok(Repository::list_where(&conn, parent.column, parent.id)?)
            }
            None => Ok(Repository::list(&conn)?),
        }
    }

    pub fn try_read(&self, id: i64) -> Result<Record<R>, ServiceError> {
        let conn = self.db.connect()?;
        ExistenceResolver::new(&conn).resolve(id, self.scope())
    }

    fn write(&self, id: i64, fields: R) -> Result<Record<R>, ServiceError> {
        let conn = self.db.connect()?;
        ExistenceResolver::new(&conn).require_all(&fields.references())?;
        Repository::update(&conn, id, &fields)?;
        Ok(Record { id, fields })
    }

    pub fn try_put(&self, id: i64, body: &Value) -> Result<Record<R>, ServiceError> {
        self.try_read(id)?;
        let fields = parse_payload::<R>(body, self.scope())?;
        self.write(id, fields)
    }

    pub fn try_patch(&self, id: i64, body: &Value) -> Result<Record<R>, ServiceError> {
        let existing = self.try_read(id)?;
        let merged = merge_patch(&existing, body)?;
        let fields = parse_payload::<R>(&merged, self.scope())?;
        self.write(id, fields)
    }

    pub fn try_delete(&self, id: i64) -> Result<Record<R>, ServiceError> {
        let existing = self.try_read(id)?;
        let conn = self.db.connect()?;
        Repository::<R>::delete(&conn, id)?;
        tracing::debug!("Deleted {} {}", R::KIND, id);
        Ok(existing)
    }

    pub fn create(&self, body: &Value) -> Outcome {
        settle(self.try_create(body).map(|_| created::<R>()))
    }

    pub fn list(&self) -> Outcome {
        settle(self.try_list().and_then(|records| {
            Ok(Outcome::success(
                format!("Successfully retrieved {}", R::PLURAL),
                serde_json::to_value(&records)?,
                200,
            ))
        }))
    }

    pub fn read_by_id(&self, id: i64) -> Outcome {
        settle(self.try_read(id).and_then(|record| retrieved(&record)))
    }

    pub fn put_by_id(&self, id: i64, body: &Value) -> Outcome {
        settle(self.try_put(id, body).and_then(|record| updated(&record)))
    }

    pub fn patch_by_id(&self, id: i64, body: &Value) -> Outcome {
        settle(self.try_patch(id, body).and_then(|record| patched(&record)))
    }

    pub fn delete_by_id(&self, id: i64) -> Outcome {
        settle(self.try_delete(id).map(|_| removed::<R>()))
    }
}
