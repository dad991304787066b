use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{queries, SqliteStore};
use crate::errors::AppError;
use crate::models::{weekday_from_index, weekday_index, ScheduleCalendar, Service, WeeklyHours};
use crate::services::{notify, BookingCandidate, BookingService};
use crate::state::AppState;

use super::bookings::{
    booking_response, get_or_create_client, parse_date_field, parse_status_field, parse_time,
    parse_time_field, BookingResponse, ClientContact, ServiceResponse,
};

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    if let Some(status) = query.status.as_deref() {
        parse_status_field(Some(status))?;
    }
    let limit = query.limit.unwrap_or(50);

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, query.status.as_deref(), limit)?
    };

    Ok(Json(bookings.iter().map(booking_response).collect()))
}

// POST /api/admin/bookings
#[derive(Deserialize)]
pub struct AdminCreateBookingRequest {
    /// Either an existing client id or inline contact details.
    pub client_id: Option<String>,
    pub client: Option<ClientContact>,
    pub service_id: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminCreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let date = parse_date_field(body.date.as_deref())?;
    let time = parse_time_field(body.time.as_deref())?;
    let requested_status = parse_status_field(body.status.as_deref())?;

    let outcome = {
        let db = state.db.lock().unwrap();

        let service = queries::get_service(&db, &body.service_id)?
            .ok_or_else(|| AppError::NotFound(format!("service {}", body.service_id)))?;

        let client = match (&body.client_id, &body.client) {
            (Some(id), _) => queries::get_client_by_id(&db, id)?
                .ok_or_else(|| AppError::NotFound(format!("client {id}")))?,
            (None, Some(contact)) => get_or_create_client(&db, &state, contact)?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "client_id or client contact details are required".to_string(),
                ))
            }
        };

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
        engine.submit(candidate, true)?
    };

    notify::dispatch(state.notifier.as_ref(), &outcome.events).await;

    Ok((StatusCode::CREATED, Json(booking_response(&outcome.booking))))
}

// POST /api/admin/bookings/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let requested_status = parse_status_field(Some(&body.status))?;

    let outcome = {
        let db = state.db.lock().unwrap();

        let booking = queries::get_booking_by_id(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;
        let client = queries::get_client_by_id(&db, &booking.client_id)?
            .ok_or_else(|| anyhow::anyhow!("client {} missing for booking {id}", booking.client_id))?;

        // Everything except the status is carried over from the stored row.
        let candidate = BookingCandidate {
            id: Some(booking.id.clone()),
            client,
            service_id: booking.service_id.clone(),
            service_name: booking.service_name.clone(),
            duration_minutes: booking.duration_minutes,
            date: Some(booking.date),
            time: Some(booking.time),
            requested_status,
            notes: None,
        };

        let store = SqliteStore::new(&db);
        let engine = BookingService::new(&store, state.clock.as_ref());
        engine.submit(candidate, true)?
    };

    notify::dispatch(state.notifier.as_ref(), &outcome.events).await;

    Ok(Json(booking_response(&outcome.booking)))
}

// GET /api/admin/hours
#[derive(Serialize, Deserialize)]
pub struct HoursEntry {
    pub weekday: u8,
    pub start: String,
    pub end: String,
    pub available: bool,
}

pub async fn get_hours(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HoursEntry>>, AppError> {
    let entries = {
        let db = state.db.lock().unwrap();
        queries::weekly_hours(&db)?
    };

    Ok(Json(
        entries
            .into_iter()
            .map(|e| HoursEntry {
                weekday: weekday_index(e.weekday),
                start: e.start.format("%H:%M").to_string(),
                end: e.end.format("%H:%M").to_string(),
                available: e.available,
            })
            .collect(),
    ))
}

// PUT /api/admin/hours
pub async fn replace_hours(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Vec<HoursEntry>>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut entries = Vec::with_capacity(body.len());
    for entry in &body {
        let weekday = weekday_from_index(entry.weekday)
            .ok_or_else(|| AppError::BadRequest(format!("invalid weekday: {}", entry.weekday)))?;
        let start = parse_time(&entry.start)?;
        let end = parse_time(&entry.end)?;
        entries.push(WeeklyHours {
            weekday,
            start,
            end,
            available: entry.available,
        });
    }

    // Rejects duplicate weekdays and inverted windows before anything is written.
    ScheduleCalendar::from_entries(entries.clone())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    {
        let db = state.db.lock().unwrap();
        queries::replace_weekly_hours(&db, &entries)?;
    }

    Ok(Json(serde_json::json!({"ok": true})))
}

// GET /api/admin/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let services = {
        let db = state.db.lock().unwrap();
        queries::list_services(&db, false)?
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

// POST /api/admin/services
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub active: Option<bool>,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError> {
    let service = Service {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        description: body.description.unwrap_or_default(),
        duration_minutes: body.duration_minutes,
        price_cents: body.price_cents,
        active: body.active.unwrap_or(true),
        created_at: state.clock.now(),
    };
    service
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    {
        let db = state.db.lock().unwrap();
        queries::save_service(&db, &service)?;
    }

    Ok((
        StatusCode::CREATED,
        Json(ServiceResponse {
            id: service.id,
            name: service.name,
            description: service.description,
            duration_minutes: service.duration_minutes,
            price_cents: service.price_cents,
            active: service.active,
        }),
    ))
}

// PUT /api/admin/services/:id
#[derive(Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub active: Option<bool>,
}

pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateServiceRequest>,
) -> Result<Json<ServiceResponse>, AppError> {
    let service = {
        let db = state.db.lock().unwrap();

        let mut service = queries::get_service(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("service {id}")))?;

        // Duration is deliberately not editable: existing bookings carry a
        // snapshot, and a changed duration would make new conflicts differ
        // from what clients were shown.
        if let Some(name) = body.name {
            service.name = name;
        }
        if let Some(description) = body.description {
            service.description = description;
        }
        if let Some(price_cents) = body.price_cents {
            service.price_cents = price_cents;
        }
        if let Some(active) = body.active {
            service.active = active;
        }
        service
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        queries::save_service(&db, &service)?;
        service
    };

    Ok(Json(ServiceResponse {
        id: service.id,
        name: service.name,
        description: service.description,
        duration_minutes: service.duration_minutes,
        price_cents: service.price_cents,
        active: service.active,
    }))
}
