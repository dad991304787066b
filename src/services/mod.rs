pub mod booking;
pub mod clock;
pub mod conflict;
pub mod lifecycle;
pub mod notify;
pub mod store;

pub use booking::{BookingCandidate, BookingError, BookingService, SubmitError, SubmitOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use notify::{EmailNotifier, NotificationEvent, Notifier, Recipient};
pub use store::BookingStore;
