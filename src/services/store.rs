use chrono::NaiveDate;

use crate::models::{Booking, WeeklyHours};

/// Persistence seam for the booking engine. The SQLite implementation lives
/// in `db`; the engine only ever reads snapshots and saves whole bookings.
pub trait BookingStore {
    fn weekly_hours(&self) -> anyhow::Result<Vec<WeeklyHours>>;
    fn active_bookings_on(&self, date: NaiveDate) -> anyhow::Result<Vec<Booking>>;
    fn booking_by_id(&self, id: &str) -> anyhow::Result<Option<Booking>>;
    fn save(&self, booking: &Booking) -> anyhow::Result<()>;
}
