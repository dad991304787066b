use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection, Row};

use crate::models::{
    weekday_from_index, weekday_index, Booking, BookingStatus, Client, Service, WeeklyHours,
};

const DATE_FMT: &str = "%Y-%m-%d";
const TIME_FMT: &str = "%H:%M:%S";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

// ── Weekly hours ──

pub fn weekly_hours(conn: &Connection) -> anyhow::Result<Vec<WeeklyHours>> {
    let mut stmt = conn.prepare(
        "SELECT day, start_time, end_time, is_available FROM weekly_hours ORDER BY day ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, u8>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, bool>(3)?,
        ))
    })?;

    let mut entries = vec![];
    for row in rows {
        let (day, start, end, available) = row?;
        entries.push(WeeklyHours {
            weekday: weekday_from_index(day)
                .ok_or_else(|| anyhow::anyhow!("invalid weekday in database: {day}"))?,
            start: NaiveTime::parse_from_str(&start, TIME_FMT)?,
            end: NaiveTime::parse_from_str(&end, TIME_FMT)?,
            available,
        });
    }
    Ok(entries)
}

/// Replaces the whole weekly schedule in one transaction.
pub fn replace_weekly_hours(conn: &Connection, entries: &[WeeklyHours]) -> anyhow::Result<()> {
    conn.execute_batch("BEGIN")?;
    let result = (|| -> anyhow::Result<()> {
        conn.execute("DELETE FROM weekly_hours", [])?;
        for entry in entries {
            conn.execute(
                "INSERT INTO weekly_hours (day, start_time, end_time, is_available)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    weekday_index(entry.weekday),
                    entry.start.format(TIME_FMT).to_string(),
                    entry.end.format(TIME_FMT).to_string(),
                    entry.available,
                ],
            )?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("COMMIT")?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}

// ── Services ──

fn parse_service_row(row: &Row) -> anyhow::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        duration_minutes: row.get(3)?,
        price_cents: row.get(4)?,
        active: row.get(5)?,
        created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(6)?, DATETIME_FMT)?,
    })
}

pub fn save_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, name, description, duration_minutes, price_cents, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           description = excluded.description,
           duration_minutes = excluded.duration_minutes,
           price_cents = excluded.price_cents,
           is_active = excluded.is_active",
        params![
            service.id,
            service.name,
            service.description,
            service.duration_minutes,
            service.price_cents,
            service.active,
            service.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, name, description, duration_minutes, price_cents, is_active, created_at
         FROM services WHERE id = ?1",
        params![id],
        |row| Ok(parse_service_row(row)),
    );

    match result {
        Ok(service) => Ok(Some(service?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services(conn: &Connection, only_active: bool) -> anyhow::Result<Vec<Service>> {
    let sql = if only_active {
        "SELECT id, name, description, duration_minutes, price_cents, is_active, created_at
         FROM services WHERE is_active = 1 ORDER BY name ASC"
    } else {
        "SELECT id, name, description, duration_minutes, price_cents, is_active, created_at
         FROM services ORDER BY name ASC"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_service_row(row)))?;

    let mut services = vec![];
    for row in rows {
        services.push(row??);
    }
    Ok(services)
}

// ── Clients ──

fn parse_client_row(row: &Row) -> anyhow::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        user_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        email: row.get(4)?,
        phone: row.get(5)?,
        medical_notes: row.get(6)?,
        created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(7)?, DATETIME_FMT)?,
    })
}

pub fn insert_client(conn: &Connection, client: &Client) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO clients (id, user_id, first_name, last_name, email, phone, medical_notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            client.id,
            client.user_id,
            client.first_name,
            client.last_name,
            client.email,
            client.phone,
            client.medical_notes,
            client.created_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_client_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Client>> {
    let result = conn.query_row(
        "SELECT id, user_id, first_name, last_name, email, phone, medical_notes, created_at
         FROM clients WHERE id = ?1",
        params![id],
        |row| Ok(parse_client_row(row)),
    );

    match result {
        Ok(client) => Ok(Some(client?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_client_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<Client>> {
    let result = conn.query_row(
        "SELECT id, user_id, first_name, last_name, email, phone, medical_notes, created_at
         FROM clients WHERE email = ?1",
        params![email],
        |row| Ok(parse_client_row(row)),
    );

    match result {
        Ok(client) => Ok(Some(client?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Bookings ──

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let status_str: String = row.get(7)?;
    Ok(Booking {
        id: row.get(0)?,
        client_id: row.get(1)?,
        service_id: row.get(2)?,
        service_name: row.get(3)?,
        duration_minutes: row.get(4)?,
        date: NaiveDate::parse_from_str(&row.get::<_, String>(5)?, DATE_FMT)?,
        time: NaiveTime::parse_from_str(&row.get::<_, String>(6)?, TIME_FMT)?,
        status: BookingStatus::parse(&status_str)
            .ok_or_else(|| anyhow::anyhow!("invalid booking status in database: {status_str}"))?,
        created_by_admin: row.get(8)?,
        notes: row.get(9)?,
        created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(10)?, DATETIME_FMT)?,
        updated_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(11)?, DATETIME_FMT)?,
    })
}

const BOOKING_COLUMNS: &str = "id, client_id, service_id, service_name, duration_minutes, \
     date, time, status, created_by_admin, notes, created_at, updated_at";

pub fn save_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, client_id, service_id, service_name, duration_minutes,
                               date, time, status, created_by_admin, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
           service_id = excluded.service_id,
           service_name = excluded.service_name,
           duration_minutes = excluded.duration_minutes,
           date = excluded.date,
           time = excluded.time,
           status = excluded.status,
           notes = excluded.notes,
           updated_at = excluded.updated_at",
        params![
            booking.id,
            booking.client_id,
            booking.service_id,
            booking.service_name,
            booking.duration_minutes,
            booking.date.format(DATE_FMT).to_string(),
            booking.time.format(TIME_FMT).to_string(),
            booking.status.as_str(),
            booking.created_by_admin,
            booking.notes,
            booking.created_at.format(DATETIME_FMT).to_string(),
            booking.updated_at.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bookings that occupy slots on `date`, i.e. pending or confirmed ones.
pub fn get_active_bookings_on_date(
    conn: &Connection,
    date: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE date = ?1 AND status IN ('pending', 'confirmed') ORDER BY time ASC"
    ))?;

    let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_client(conn: &Connection, client_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE client_id = ?1 ORDER BY date ASC, time ASC"
    ))?;

    let rows = stmt.query_map(params![client_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_all_bookings(
    conn: &Connection,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE status = ?1 ORDER BY date DESC, time DESC LIMIT ?2"
            ),
            vec![
                Box::new(status.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
        None => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 ORDER BY date DESC, time DESC LIMIT ?1"
            ),
            vec![Box::new(limit) as Box<dyn rusqlite::types::ToSql>],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Weekday;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn sample_booking(id: &str, status: BookingStatus) -> Booking {
        Booking {
            id: id.to_string(),
            client_id: "client-1".to_string(),
            service_id: "svc-1".to_string(),
            service_name: "Consultation".to_string(),
            duration_minutes: 60,
            date: NaiveDate::parse_from_str("2025-06-16", "%Y-%m-%d").unwrap(),
            time: NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
            status,
            created_by_admin: false,
            notes: Some("first visit".to_string()),
            created_at: dt("2025-06-01 09:00"),
            updated_at: dt("2025-06-01 09:00"),
        }
    }

    fn seed_client(conn: &Connection) {
        insert_client(
            conn,
            &Client {
                id: "client-1".to_string(),
                user_id: Some("user-9".to_string()),
                first_name: "Alice".to_string(),
                last_name: "Smith".to_string(),
                email: "alice@example.com".to_string(),
                phone: "+15551110000".to_string(),
                medical_notes: None,
                created_at: dt("2025-06-01 09:00"),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_weekly_hours_round_trip() {
        let conn = db::init_db(":memory:").unwrap();
        let entries = vec![
            WeeklyHours {
                weekday: Weekday::Mon,
                start: NaiveTime::parse_from_str("09:00", "%H:%M").unwrap(),
                end: NaiveTime::parse_from_str("17:00", "%H:%M").unwrap(),
                available: true,
            },
            WeeklyHours {
                weekday: Weekday::Sat,
                start: NaiveTime::parse_from_str("10:00", "%H:%M").unwrap(),
                end: NaiveTime::parse_from_str("14:00", "%H:%M").unwrap(),
                available: false,
            },
        ];
        replace_weekly_hours(&conn, &entries).unwrap();
        assert_eq!(weekly_hours(&conn).unwrap(), entries);

        // replacement clears old rows
        replace_weekly_hours(&conn, &entries[..1]).unwrap();
        assert_eq!(weekly_hours(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_booking_save_and_fetch() {
        let conn = db::init_db(":memory:").unwrap();
        seed_client(&conn);

        let booking = sample_booking("b-1", BookingStatus::Pending);
        save_booking(&conn, &booking).unwrap();

        let fetched = get_booking_by_id(&conn, "b-1").unwrap().unwrap();
        assert_eq!(fetched.service_name, "Consultation");
        assert_eq!(fetched.status, BookingStatus::Pending);
        assert_eq!(fetched.notes.as_deref(), Some("first visit"));

        assert!(get_booking_by_id(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_save_booking_upserts() {
        let conn = db::init_db(":memory:").unwrap();
        seed_client(&conn);

        let mut booking = sample_booking("b-1", BookingStatus::Pending);
        save_booking(&conn, &booking).unwrap();

        booking.status = BookingStatus::Confirmed;
        booking.updated_at = dt("2025-06-02 09:00");
        save_booking(&conn, &booking).unwrap();

        let fetched = get_booking_by_id(&conn, "b-1").unwrap().unwrap();
        assert_eq!(fetched.status, BookingStatus::Confirmed);
        assert_eq!(fetched.updated_at, dt("2025-06-02 09:00"));
    }

    #[test]
    fn test_active_bookings_excludes_terminal_statuses() {
        let conn = db::init_db(":memory:").unwrap();
        seed_client(&conn);

        save_booking(&conn, &sample_booking("b-1", BookingStatus::Pending)).unwrap();
        save_booking(&conn, &sample_booking("b-2", BookingStatus::Confirmed)).unwrap();
        save_booking(&conn, &sample_booking("b-3", BookingStatus::Cancelled)).unwrap();
        save_booking(&conn, &sample_booking("b-4", BookingStatus::Completed)).unwrap();

        let date = NaiveDate::parse_from_str("2025-06-16", "%Y-%m-%d").unwrap();
        let active = get_active_bookings_on_date(&conn, date).unwrap();
        let ids: Vec<&str> = active.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b-1", "b-2"]);
    }

    #[test]
    fn test_client_lookup_by_email() {
        let conn = db::init_db(":memory:").unwrap();
        seed_client(&conn);

        let client = get_client_by_email(&conn, "alice@example.com").unwrap().unwrap();
        assert_eq!(client.id, "client-1");
        assert!(get_client_by_email(&conn, "nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_list_services_filters_inactive() {
        let conn = db::init_db(":memory:").unwrap();
        let mut service = Service {
            id: "svc-1".to_string(),
            name: "Consultation".to_string(),
            description: "Initial consultation".to_string(),
            duration_minutes: 60,
            price_cents: 5000,
            active: true,
            created_at: dt("2025-06-01 09:00"),
        };
        save_service(&conn, &service).unwrap();

        service.id = "svc-2".to_string();
        service.name = "Follow-up".to_string();
        service.active = false;
        save_service(&conn, &service).unwrap();

        assert_eq!(list_services(&conn, true).unwrap().len(), 1);
        assert_eq!(list_services(&conn, false).unwrap().len(), 2);
    }
}
