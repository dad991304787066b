use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{queries, SqliteStore};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Client};
use crate::services::{notify, BookingCandidate, BookingService};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    pub service_name: String,
    pub duration_minutes: i32,
    pub date: String,
    pub time: String,
    pub status: String,
    pub created_by_admin: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn booking_response(b: &Booking) -> BookingResponse {
    BookingResponse {
        id: b.id.clone(),
        client_id: b.client_id.clone(),
        service_id: b.service_id.clone(),
        service_name: b.service_name.clone(),
        duration_minutes: b.duration_minutes,
        date: b.date.format("%Y-%m-%d").to_string(),
        time: b.time.format("%H:%M").to_string(),
        status: b.status.as_str().to_string(),
        created_by_admin: b.created_by_admin,
        notes: b.notes.clone(),
        created_at: b.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

pub(crate) fn parse_date_field(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("invalid date: {s}"))),
    }
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| AppError::BadRequest(format!("invalid time: {s}")))
}

pub(crate) fn parse_time_field(value: Option<&str>) -> Result<Option<NaiveTime>, AppError> {
    value.map(parse_time).transpose()
}

pub(crate) fn parse_status_field(
    value: Option<&str>,
) -> Result<Option<BookingStatus>, AppError> {
    match value {
        None => Ok(None),
        Some(s) => BookingStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("invalid status: {s}"))),
    }
}

// GET /api/services
#[derive(Serialize)]
pub struct ServiceResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let services = {
        let db = state.db.lock().unwrap();
        queries::list_services(&db, true)?
    };

    Ok(Json(
        services
            .into_iter()
            .map(|s| ServiceResponse {
                id: s.id,
                name: s.name,
                description: s.description,
                duration_minutes: s.duration_minutes,
                price_cents: s.price_cents,
                active: s.active,
            })
            .collect(),
    ))
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub medical_notes: Option<String>,
    pub service_id: String,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Accepted but ignored for the client flow; creation always starts pending.
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ClientContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub medical_notes: Option<String>,
}

/// Finds the client by email or creates a record on first booking.
pub(crate) fn get_or_create_client(
    conn: &Connection,
    state: &AppState,
    contact: &ClientContact,
) -> Result<Client, AppError> {
    if let Some(client) = queries::get_client_by_email(conn, &contact.email)? {
        return Ok(client);
    }

    let client = Client {
        id: Uuid::new_v4().to_string(),
        user_id: None,
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        email: contact.email.clone(),
        phone: contact.phone.clone(),
        medical_notes: contact.medical_notes.clone(),
        created_at: state.clock.now(),
    };
    queries::insert_client(conn, &client)?;
    tracing::info!(client_id = %client.id, "created client record");
    Ok(client)
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let date = parse_date_field(body.date.as_deref())?;
    let time = parse_time_field(body.time.as_deref())?;
    let requested_status = parse_status_field(body.status.as_deref())?;

    let outcome = {
        let db = state.db.lock().unwrap();

        let service = queries::get_service(&db, &body.service_id)?
            .filter(|s| s.active)
            .ok_or_else(|| AppError::NotFound(format!("service {}", body.service_id)))?;

        let contact = ClientContact {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            medical_notes: body.medical_notes,
        };
        let client = get_or_create_client(&db, &state, &contact)?;

        let candidate = BookingCandidate {
            id: None,
            client,
            service_id: service.id,
            service_name: service.name,
            duration_minutes: service.duration_minutes,
            date,
            time,
            requested_status,
            notes: body.notes,
        };

        let store = SqliteStore::new(&db);
        let engine = BookingService::new(&store, state.clock.as_ref());
        engine.submit(candidate, false)?
    };

    notify::dispatch(state.notifier.as_ref(), &outcome.events).await;

    Ok((StatusCode::CREATED, Json(booking_response(&outcome.booking))))
}

// GET /api/bookings?email=
#[derive(Deserialize)]
pub struct MyBookingsQuery {
    pub email: String,
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MyBookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        match queries::get_client_by_email(&db, &query.email)? {
            Some(client) => queries::get_bookings_for_client(&db, &client.id)?,
            None => vec![],
        }
    };

    Ok(Json(bookings.iter().map(booking_response).collect()))
}
