use rusqlite::Connection;
use serde_json::Value;

use super::ServiceError;
use super::facade::{
    ResourceFacade, created, merge_patch, parse_payload, patched, removed, retrieved, settle,
    updated,
};
use super::guard::{CancellationGuard, CancellationState, not_cancelled};
use super::resolver::ExistenceResolver;
use crate::calendar::{Calendar, Cancellation, Event};
use crate::outcome::Outcome;
use crate::storage::{Database, Record, Reference};

/// The flat `/cancellations` surface. Reads and deletes are plain CRUD;
/// every write goes through the exclusivity guard.
#[derive(Debug, Clone)]
pub struct CancellationFacade {
    db: Database,
    records: ResourceFacade<Cancellation>,
}

impl CancellationFacade {
    pub fn new(db: Database) -> Self {
        Self {
            records: ResourceFacade::new(db.clone()),
            db,
        }
    }

    pub fn try_create(&self, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let fields = parse_payload::<Cancellation>(body, None)?;
        let mut conn = self.db.connect()?;
        CancellationGuard::new(&mut conn).cancel(&fields)
    }

    fn replace(&self, id: i64, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let fields = parse_payload::<Cancellation>(body, None)?;
        let mut conn = self.db.connect()?;
        CancellationGuard::new(&mut conn).replace(id, &fields)
    }

    pub fn try_put(&self, id: i64, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        self.records.try_read(id)?;
        self.replace(id, body)
    }

    pub fn try_patch(&self, id: i64, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let existing = self.records.try_read(id)?;
        self.replace(id, &merge_patch(&existing, body)?)
    }

    pub fn create(&self, body: &Value) -> Outcome {
        settle(self.try_create(body).map(|_| created::<Cancellation>()))
    }

    pub fn list(&self) -> Outcome {
        self.records.list()
    }

    pub fn read_by_id(&self, id: i64) -> Outcome {
        self.records.read_by_id(id)
    }

    pub fn put_by_id(&self, id: i64, body: &Value) -> Outcome {
        settle(self.try_put(id, body).and_then(|record| updated(&record)))
    }

    pub fn patch_by_id(&self, id: i64, body: &Value) -> Outcome {
        settle(self.try_patch(id, body).and_then(|record| patched(&record)))
    }

    pub fn delete_by_id(&self, id: i64) -> Outcome {
        self.records.delete_by_id(id)
    }
}

/// Cancellation of one event, addressed as
/// `/calendars/{calendar_id}/events/{event_id}/cancellations`.
///
/// The event must belong to the calendar in the path before anything else
/// happens. Updates and deletes are keyed by the event, not the cancellation id.
#[derive(Debug, Clone)]
pub struct EventCancellationFacade {
    db: Database,
    calendar: Reference,
    event_id: i64,
}

impl EventCancellationFacade {
    pub fn new(db: Database, calendar_id: i64, event_id: i64) -> Self {
        Self {
            db,
            calendar: Reference::to::<Calendar>(calendar_id),
            event_id,
        }
    }

    fn event(&self) -> Reference {
        Reference::to::<Event>(self.event_id)
    }

    fn resolve_event(&self, conn: &Connection) -> Result<(), ServiceError> {
        ExistenceResolver::new(conn).resolve::<Event>(self.event_id, Some(&self.calendar))?;
        Ok(())
    }

    pub fn try_read(&self) -> Result<Record<Cancellation>, ServiceError> {
        let mut conn = self.db.connect()?;
        self.resolve_event(&conn)?;
        match CancellationGuard::new(&mut conn).state(self.event_id)? {
            CancellationState::Cancelled(record) => Ok(record),
            CancellationState::Uncancelled => Err(not_cancelled(self.event_id)),
        }
    }

    pub fn try_create(&self, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let fields = parse_payload::<Cancellation>(body, Some(&self.event()))?;
        let mut conn = self.db.connect()?;
        self.resolve_event(&conn)?;
        CancellationGuard::new(&mut conn).cancel(&fields)
    }

    fn amend(&self, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let fields = parse_payload::<Cancellation>(body, Some(&self.event()))?;
        let mut conn = self.db.connect()?;
        CancellationGuard::new(&mut conn).amend(&fields)
    }

    pub fn try_put(&self, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let conn = self.db.connect()?;
        self.resolve_event(&conn)?;
        self.amend(body)
    }

    pub fn try_patch(&self, body: &Value) -> Result<Record<Cancellation>, ServiceError> {
        let existing = self.try_read()?;
        self.amend(&merge_patch(&existing, body)?)
    }

    pub fn try_delete(&self) -> Result<Record<Cancellation>, ServiceError> {
        let mut conn = self.db.connect()?;
        self.resolve_event(&conn)?;
        CancellationGuard::new(&mut conn).revoke(self.event_id)
    }

    pub fn read(&self) -> Outcome {
        settle(self.try_read().and_then(|record| retrieved(&record)))
    }

    pub fn create(&self, body: &Value) -> Outcome {
        settle(self.try_create(body).map(|_| created::<Cancellation>()))
    }

    pub fn put(&self, body: &Value) -> Outcome {
        settle(self.try_put(body).and_then(|record| updated(&record)))
    }

    pub fn patch(&self, body: &Value) -> Outcome {
        settle(self.try_patch(body).and_then(|record| patched(&record)))
    }

    pub fn delete(&self) -> Outcome {
        settle(self.try_delete().map(|_| removed::<Cancellation>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::test_support::{seed_user, temp_database};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Fixture {
        db: Database,
        calendar_id: i64,
        event_id: i64,
    }

    fn fixture(db: &Database) -> Fixture {
        let calendar = ResourceFacade::<Calendar>::new(db.clone())
            .try_create(&json!({"name": "Work"}))
            .unwrap();
        let user_id = seed_user(&db.connect().unwrap());
        let event = ResourceFacade::<Event>::scoped(db.clone(), Reference::to::<Calendar>(calendar.id))
            .try_create(&json!({
                "title": "Shift",
                "all_day": false,
                "user_id": user_id,
                "date_start": "2021-10-04T08:00:00",
                "date_end": "2021-10-04T16:00:00",
            }))
            .unwrap();
        Fixture {
            db: db.clone(),
            calendar_id: calendar.id,
            event_id: event.id,
        }
    }

    impl Fixture {
        fn scoped(&self) -> EventCancellationFacade {
            EventCancellationFacade::new(self.db.clone(), self.calendar_id, self.event_id)
        }
    }

    #[test]
    fn generic_create_rejects_a_second_cancellation() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);
        let facade = CancellationFacade::new(db.clone());
        let body = json!({"event_id": fx.event_id, "reason": "r"});

        let first = facade.create(&body);
        let second = facade.create(&body);

        assert_eq!(first.status_code, 201);
        assert_eq!(second.status_code, 400);
        assert_eq!(second.message, format!("Event: {} is already cancelled", fx.event_id));
        assert_eq!(second.error.unwrap()["kind"], json!("Conflict"));
    }

    #[test]
    fn scoped_and_generic_routes_share_one_relation() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);

        fx.scoped().try_create(&json!({"reason": "sick"})).unwrap();
        let outcome = CancellationFacade::new(db.clone()).create(&json!({
            "event_id": fx.event_id,
            "reason": "duplicate",
        }));

        assert_eq!(outcome.status_code, 400);
        assert_eq!(CancellationFacade::new(db.clone()).records.try_list().unwrap().len(), 1);
    }

    #[test]
    fn scoped_lifecycle() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);
        let facade = fx.scoped();

        assert_eq!(facade.create(&json!({"reason": "sick", "amount": 40})).status_code, 201);
        let read = facade.read();
        assert_eq!(read.message, "Successfully retrieved cancellation");
        assert_eq!(read.data.as_ref().unwrap()["reason"], json!("sick"));

        let patched = facade.try_patch(&json!({"reason": "travel"})).unwrap();
        assert_eq!(patched.fields.amount, Some(40.0));
        assert_eq!(patched.fields.event_id, fx.event_id);

        let put = facade.put(&json!({"reason": "weather"}));
        assert_eq!(put.message, format!("Successfully updated cancellation id: {}", patched.id));
        assert_eq!(put.data.unwrap()["amount"], Value::Null);

        assert_eq!(facade.delete().message, "Successfully removed cancellation");
        assert_eq!(facade.read().status_code, 404);
    }

    #[test]
    fn updating_an_uncancelled_event_is_not_found() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);

        let outcome = fx.scoped().put(&json!({"reason": "late"}));

        assert_eq!(outcome.status_code, 404);
        assert_eq!(
            outcome.message,
            format!("No cancellation associated with event_id: {}", fx.event_id)
        );
        assert_eq!(fx.scoped().delete().status_code, 404);
    }

    #[test]
    fn event_must_belong_to_the_calendar() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);
        let other = fixture(&db);
        let facade = EventCancellationFacade::new(db.clone(), other.calendar_id, fx.event_id);

        let outcome = facade.create(&json!({"reason": "sick"}));

        assert_eq!(outcome.status_code, 404);
        assert_eq!(
            outcome.message,
            format!(
                "Event with id: {} does not exist on calendar with id: {}",
                fx.event_id, other.calendar_id
            )
        );
    }

    #[test]
    fn generic_patch_cannot_steal_another_events_cancellation() {
        let (_dir, db) = temp_database();
        let a = fixture(&db);
        let b = fixture(&db);
        let facade = CancellationFacade::new(db.clone());
        let moving = facade
            .try_create(&json!({"event_id": a.event_id, "reason": "a"}))
            .unwrap();
        facade
            .try_create(&json!({"event_id": b.event_id, "reason": "b"}))
            .unwrap();

        let outcome = facade.patch_by_id(moving.id, &json!({"event_id": b.event_id}));

        assert_eq!(outcome.message, format!("Event: {} is already cancelled", b.event_id));
    }

    #[test]
    fn generic_put_of_missing_cancellation_is_not_found() {
        let (_dir, db) = temp_database();

        let outcome = CancellationFacade::new(db.clone())
            .put_by_id(12, &json!({"event_id": 1, "reason": "r"}));

        assert_eq!(outcome.message, "No cancellation found with id: 12");
    }

    #[test]
    fn deleting_an_event_clears_its_cancellation() {
        let (_dir, db) = temp_database();
        let fx = fixture(&db);
        fx.scoped().try_create(&json!({"reason": "sick"})).unwrap();

        ResourceFacade::<Event>::new(db.clone())
            .try_delete(fx.event_id)
            .unwrap();

        assert_eq!(CancellationFacade::new(db.clone()).records.try_list().unwrap(), vec![]);
    }
}
