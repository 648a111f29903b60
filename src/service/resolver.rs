use rusqlite::Connection;

use super::ServiceError;
use crate::storage::{Record, Reference, Repository, Resource, repository};

/// Confirms rows exist, and that children belong to the parent they were
/// addressed under.
pub struct ExistenceResolver<'c> {
    conn: &'c Connection,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn not_found(kind: &str, id: i64) -> ServiceError {
    ServiceError::NotFound(format!("No {kind} found with id: {id}"))
}

pub fn not_found_within(kind: &str, id: i64, parent: &Reference) -> ServiceError {
    ServiceError::NotFound(format!(
        "{} with id: {} does not exist on {} with id: {}",
        capitalize(kind),
        id,
        parent.kind,
        parent.id
    ))
}

impl<'c> ExistenceResolver<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn require(&self, reference: &Reference) -> Result<(), ServiceError> {
        if repository::exists(self.conn, reference)? {
            Ok(())
        } else {
            Err(not_found(reference.kind, reference.id))
        }
    }

    pub fn require_all(&self, references: &[Reference]) -> Result<(), ServiceError> {
        references.iter().try_for_each(|reference| self.require(reference))
    }

    /// A child stored under another parent is reported exactly like a
    /// missing one.
    pub fn resolve<R: Resource>(
        &self,
        id: i64,
        scope: Option<&Reference>,
    ) -> Result<Record<R>, ServiceError> {
        match scope {
            Some(parent) => {
                Repository::<R>::find_within(self.conn, id, parent.column, parent.id)?
                    .ok_or_else(|| not_found_within(R::KIND, id, parent))
            }
            None => Repository::<R>::find(self.conn, id)?.ok_or_else(|| not_found(R::KIND, id)),
        }
    }
}
