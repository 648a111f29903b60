use rusqlite::{Connection, TransactionBehavior};

use super::ServiceError;
use super::resolver::ExistenceResolver;
use crate::calendar::Cancellation;
use crate::storage::{Record, Repository, Resource, StorageError};

/// Where an event stands with respect to cancellation.
#[derive(Debug, Clone, PartialEq)]
pub enum CancellationState {
    Uncancelled,
    Cancelled(Record<Cancellation>),
}

impl CancellationState {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CancellationState::Cancelled(_))
    }
}

fn already_cancelled(event_id: i64) -> ServiceError {
    ServiceError::Conflict(format!("Event: {event_id} is already cancelled"))
}

pub(crate) fn not_cancelled(event_id: i64) -> ServiceError {
    ServiceError::NotFound(format!(
        "No cancellation associated with event_id: {event_id}"
    ))
}

/// A UNIQUE(event_id) rejection means another writer got there first.
fn conflict_on_duplicate(err: StorageError, event_id: i64) -> ServiceError {
    if err.is_unique_violation() {
        already_cancelled(event_id)
    } else {
        ServiceError::Storage(err)
    }
}

fn lookup(conn: &Connection, event_id: i64) -> Result<CancellationState, ServiceError> {
    let found = Repository::<Cancellation>::find_by(conn, "event_id", event_id)?;
    Ok(found.map_or(CancellationState::Uncancelled, CancellationState::Cancelled))
}

/// Keeps at most one cancellation per event.
///
/// Every check-then-write runs inside a `BEGIN IMMEDIATE` transaction, so two
/// connections cannot both observe an event as uncancelled and then insert.
/// The `UNIQUE` constraint on `cancellations.event_id` backs this up.
pub struct CancellationGuard<'c> {
    conn: &'c mut Connection,
}

impl<'c> CancellationGuard<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    pub fn state(&self, event_id: i64) -> Result<CancellationState, ServiceError> {
        lookup(&*self.conn, event_id)
    }

    pub fn cancel(&mut self, fields: &Cancellation) -> Result<Record<Cancellation>, ServiceError> {
        let event_id = fields.event_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        ExistenceResolver::new(&tx).require_all(&fields.references())?;
        if lookup(&tx, event_id)?.is_cancelled() {
            return Err(already_cancelled(event_id));
        }

        let id = Repository::insert(&tx, fields).map_err(|err| conflict_on_duplicate(err, event_id))?;
        tx.commit()?;

        tracing::debug!("Event {} cancelled as cancellation {}", event_id, id);
        Ok(Record {
            id,
            fields: fields.clone(),
        })
    }

    /// Rewrites the cancellation attached to `fields.event_id`.
    pub fn amend(&mut self, fields: &Cancellation) -> Result<Record<Cancellation>, ServiceError> {
        let event_id = fields.event_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let CancellationState::Cancelled(existing) = lookup(&tx, event_id)? else {
            return Err(not_cancelled(event_id));
        };
        Repository::update(&tx, existing.id, fields)?;
        tx.commit()?;

        Ok(Record {
            id: existing.id,
            fields: fields.clone(),
        })
    }

    pub fn revoke(&mut self, event_id: i64) -> Result<Record<Cancellation>, ServiceError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let CancellationState::Cancelled(existing) = lookup(&tx, event_id)? else {
            return Err(not_cancelled(event_id));
        };
        Repository::<Cancellation>::delete(&tx, existing.id)?;
        tx.commit()?;

        tracing::debug!("Event {} is no longer cancelled", event_id);
        Ok(existing)
    }

    /// Overwrites a cancellation by its own id. Moving it onto an event that
    /// already has a different cancellation is a conflict.
    pub fn replace(
        &mut self,
        cancellation_id: i64,
        fields: &Cancellation,
    ) -> Result<Record<Cancellation>, ServiceError> {
        let event_id = fields.event_id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let resolver = ExistenceResolver::new(&tx);
        resolver.resolve::<Cancellation>(cancellation_id, None)?;
        resolver.require_all(&fields.references())?;

        if let CancellationState::Cancelled(other) = lookup(&tx, event_id)? {
            if other.id != cancellation_id {
                return Err(already_cancelled(event_id));
            }
        }

        Repository::update(&tx, cancellation_id, fields)
            .map_err(|err| conflict_on_duplicate(err, event_id))?;
        tx.commit()?;

        Ok(Record {
            id: cancellation_id,
            fields: fields.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{Calendar, Event};
    use crate::storage::Database;
    use crate::storage::database::test_support::{seed_user, temp_database};
    use chrono::NaiveDate;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn seed_event(db: &Database) -> i64 {
        let conn = db.connect().unwrap();
        let calendar_id = Repository::insert(&conn, &Calendar { name: "Work".into() }).unwrap();
        let user_id = seed_user(&conn);
        let start = NaiveDate::from_ymd_opt(2021, 9, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let event = Event {
            calendar_id,
            date_start: start,
            date_end: start + chrono::Duration::hours(2),
            title: "Client visit".into(),
            all_day: false,
            user_id,
            company_id: None,
            description: None,
        };
        Repository::insert(&conn, &event).unwrap()
    }

    fn cancellation(event_id: i64, reason: &str) -> Cancellation {
        Cancellation {
            event_id,
            reason: reason.into(),
            amount: None,
            excluded_dates: Vec::new(),
        }
    }

    #[test]
    fn new_events_start_uncancelled() {
        let (_dir, db) = temp_database();
        let event_id = seed_event(&db);
        let mut conn = db.connect().unwrap();

        let state = CancellationGuard::new(&mut conn).state(event_id).unwrap();

        assert_eq!(state, CancellationState::Uncancelled);
    }

    #[test]
    fn second_cancellation_conflicts() {
        let (_dir, db) = temp_database();
        let event_id = seed_event(&db);
        let mut conn = db.connect().unwrap();
        let mut guard = CancellationGuard::new(&mut conn);

        guard.cancel(&cancellation(event_id, "sick")).unwrap();
        let err = guard.cancel(&cancellation(event_id, "again")).unwrap_err();

        assert_eq!(err.to_string(), format!("Event: {event_id} is already cancelled"));
        assert_eq!(err.status_code(), 400);
        assert!(guard.state(event_id).unwrap().is_cancelled());
    }

    #[test]
    fn cancelling_a_missing_event_is_not_found() {
        let (_dir, db) = temp_database();
        let mut conn = db.connect().unwrap();

        let err = CancellationGuard::new(&mut conn)
            .cancel(&cancellation(404, "gone"))
            .unwrap_err();

        assert_eq!(err.to_string(), "No event found with id: 404");
    }

    #[test]
    fn amend_and_revoke_require_an_existing_cancellation() {
        let (_dir, db) = temp_database();
        let event_id = seed_event(&db);
        let mut conn = db.connect().unwrap();
        let mut guard = CancellationGuard::new(&mut conn);

        let amend = guard.amend(&cancellation(event_id, "late")).unwrap_err();
        let revoke = guard.revoke(event_id).unwrap_err();

        let expected = format!("No cancellation associated with event_id: {event_id}");
        assert_eq!(amend.to_string(), expected);
        assert_eq!(revoke.to_string(), expected);
        assert_eq!(revoke.status_code(), 404);
    }

    #[test]
    fn revoke_returns_event_to_uncancelled() {
        let (_dir, db) = temp_database();
        let event_id = seed_event(&db);
        let mut conn = db.connect().unwrap();
        let mut guard = CancellationGuard::new(&mut conn);
        guard.cancel(&cancellation(event_id, "sick")).unwrap();

        let amended = guard.amend(&cancellation(event_id, "travel")).unwrap();
        let removed = guard.revoke(event_id).unwrap();

        assert_eq!(removed.fields.reason, "travel");
        assert_eq!(removed.id, amended.id);
        assert_eq!(guard.state(event_id).unwrap(), CancellationState::Uncancelled);
        guard.cancel(&cancellation(event_id, "sick again")).unwrap();
    }

    #[test]
    fn replace_cannot_move_onto_a_cancelled_event() {
        let (_dir, db) = temp_database();
        let first = seed_event(&db);
        let second = seed_event(&db);
        let mut conn = db.connect().unwrap();
        let mut guard = CancellationGuard::new(&mut conn);
        let moving = guard.cancel(&cancellation(first, "a")).unwrap();
        guard.cancel(&cancellation(second, "b")).unwrap();

        let err = guard
            .replace(moving.id, &cancellation(second, "a"))
            .unwrap_err();
        let kept = guard.replace(moving.id, &cancellation(first, "a2")).unwrap();

        assert_eq!(err.to_string(), format!("Event: {second} is already cancelled"));
        assert_eq!(kept.fields.reason, "a2");
    }

    #[test]
    fn concurrent_cancellations_admit_exactly_one() {
        let (_dir, db) = temp_database();
        let event_id = seed_event(&db);
        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));

        let handles: Vec<_> = (0..workers)
            .map(|n| {
                let db = db.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut conn = db.connect().unwrap();
                    barrier.wait();
                    CancellationGuard::new(&mut conn).cancel(&cancellation(event_id, &format!("worker {n}")))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|err| matches!(err, ServiceError::Conflict(_))));
    }
}
