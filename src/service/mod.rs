pub mod cancellations;
pub mod error;
pub mod facade;
pub mod guard;
pub mod resolver;

pub use cancellations::{CancellationFacade, EventCancellationFacade};
pub use error::ServiceError;
pub use facade::ResourceFacade;
pub use guard::{CancellationGuard, CancellationState};
pub use resolver::ExistenceResolver;

use crate::calendar::{Calendar, Company, Event, PaymentOverride, Series, User};
use crate::storage::{Database, Reference};

/// Hands out a façade per resource, all sharing one database handle.
#[derive(Debug, Clone)]
pub struct Services {
    db: Database,
}

impl Services {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn calendars(&self) -> ResourceFacade<Calendar> {
        ResourceFacade::new(self.db.clone())
    }

    pub fn events(&self, calendar_id: i64) -> ResourceFacade<Event> {
        ResourceFacade::scoped(self.db.clone(), Reference::to::<Calendar>(calendar_id))
    }

    pub fn series(&self, calendar_id: i64) -> ResourceFacade<Series> {
        ResourceFacade::scoped(self.db.clone(), Reference::to::<Calendar>(calendar_id))
    }

    pub fn users(&self) -> ResourceFacade<User> {
        ResourceFacade::new(self.db.clone())
    }

    pub fn companies(&self) -> ResourceFacade<Company> {
        ResourceFacade::new(self.db.clone())
    }

    pub fn payment_overrides(&self) -> ResourceFacade<PaymentOverride> {
        ResourceFacade::new(self.db.clone())
    }

    pub fn cancellations(&self) -> CancellationFacade {
        CancellationFacade::new(self.db.clone())
    }

    pub fn event_cancellations(&self, calendar_id: i64, event_id: i64) -> EventCancellationFacade {
        EventCancellationFacade::new(self.db.clone(), calendar_id, event_id)
    }
}
