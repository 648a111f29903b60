pub mod calendar;
pub mod cli;
pub mod http;
pub mod outcome;
pub mod service;
pub mod storage;
pub mod validation;

pub use calendar::{Calendar, Cancellation, Company, Event, PaymentOverride, Series, User};
pub use outcome::Outcome;
pub use service::{ServiceError, Services};
pub use storage::Database;
