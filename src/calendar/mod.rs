pub mod calendar_type;
pub mod cancellation;
pub mod company;
pub mod event;
pub mod payment_override;
pub mod series;
pub mod user;

pub use calendar_type::Calendar;
pub use cancellation::{Cancellation, DateSpan};
pub use company::Company;
pub use event::Event;
pub use payment_override::PaymentOverride;
pub use series::Series;
pub use user::User;
