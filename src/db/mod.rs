pub mod migrations;
pub mod queries;

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::models::{Booking, WeeklyHours};
use crate::services::BookingStore;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

/// `BookingStore` over a borrowed SQLite connection. The borrow keeps the
/// connection mutex held for the whole read-validate-write sequence, which
/// is what makes concurrent overlapping submissions safe.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl BookingStore for SqliteStore<'_> {
    fn weekly_hours(&self) -> anyhow::Result<Vec<WeeklyHours>> {
        queries::weekly_hours(self.conn)
    }

    fn active_bookings_on(&self, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
        queries::get_active_bookings_on_date(self.conn, date)
    }

    fn booking_by_id(&self, id: &str) -> anyhow::Result<Option<Booking>> {
        queries::get_booking_by_id(self.conn, id)
    }

    fn save(&self, booking: &Booking) -> anyhow::Result<()> {
        queries::save_booking(self.conn, booking)
    }
}
