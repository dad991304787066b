use chrono::{Duration, NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Client, ScheduleCalendar};

use super::clock::Clock;
use super::conflict::{self, CandidateSlot};
use super::lifecycle;
use super::notify::NotificationEvent;
use super::store::BookingStore;

/// A rejected submission. These are request-data problems, returned to the
/// caller as displayable failures and never retried.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("date and time are required")]
    MissingField,

    #[error("cannot book appointments in the past")]
    PastDate,

    #[error("that time is outside available business hours ({hours})")]
    OutsideHours { hours: String },

    #[error("this time slot overlaps with another booking")]
    Overlap,

    #[error("cannot change a {from} booking to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Rejected(#[from] BookingError),

    /// Persistence-layer failure, the caller's responsibility to retry or report.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// What a caller wants written: a new booking (`id: None`) or a revision of
/// an existing one. Service name and duration are the snapshot the booking
/// will carry; the client is only read for notification addressing.
#[derive(Debug, Clone)]
pub struct BookingCandidate {
    pub id: Option<String>,
    pub client: Client,
    pub service_id: String,
    pub service_name: String,
    pub duration_minutes: i32,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub requested_status: Option<BookingStatus>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub booking: Booking,
    /// Dispatch these through the notifier after the store lock is released.
    pub events: Vec<NotificationEvent>,
}

pub struct BookingService<'a> {
    store: &'a dyn BookingStore,
    clock: &'a dyn Clock,
}

impl<'a> BookingService<'a> {
    pub fn new(store: &'a dyn BookingStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Validates and persists a booking submission. The caller must hold
    /// whatever exclusion the store requires (for SQLite, the connection
    /// mutex) for the whole call so two overlapping submissions cannot
    /// both pass the conflict check.
    pub fn submit(
        &self,
        candidate: BookingCandidate,
        actor_is_admin: bool,
    ) -> Result<SubmitOutcome, SubmitError> {
        let (date, time) = match (candidate.date, candidate.time) {
            (Some(date), Some(time)) => (date, time),
            _ => return Err(BookingError::MissingField.into()),
        };

        let start = date.and_time(time);
        if start < self.clock.now() {
            return Err(BookingError::PastDate.into());
        }

        let end = start + Duration::minutes(candidate.duration_minutes as i64);
        let calendar = ScheduleCalendar::from_entries(self.store.weekly_hours()?)?;
        // The end must land on the booking's own day; a slot running past
        // midnight can never fit a window.
        let outside = !calendar.is_time_available(date, time)
            || end.date() != date
            || !calendar.is_time_available(date, end.time());
        if outside {
            return Err(BookingError::OutsideHours {
                hours: calendar.to_human_readable(),
            }
            .into());
        }

        let existing = match &candidate.id {
            Some(id) => Some(
                self.store
                    .booking_by_id(id)?
                    .ok_or_else(|| anyhow::anyhow!("booking {id} not found"))?,
            ),
            None => None,
        };

        let slot = CandidateSlot {
            date,
            start,
            end,
            exclude_id: candidate.id.clone(),
        };
        let active = self.store.active_bookings_on(date)?;
        if conflict::find_conflict(&slot, &active).is_some() {
            return Err(BookingError::Overlap.into());
        }

        let now = self.clock.now();
        let outcome = match existing {
            None => {
                let status = lifecycle::initial_status(candidate.requested_status, actor_is_admin);
                let booking = Booking {
                    id: Uuid::new_v4().to_string(),
                    client_id: candidate.client.id.clone(),
                    service_id: candidate.service_id,
                    service_name: candidate.service_name,
                    duration_minutes: candidate.duration_minutes,
                    date,
                    time,
                    status,
                    created_by_admin: actor_is_admin,
                    notes: candidate.notes,
                    created_at: now,
                    updated_at: now,
                };
                self.store.save(&booking)?;
                let events = lifecycle::creation_events(&booking, &candidate.client);
                SubmitOutcome { booking, events }
            }
            Some(prev) => {
                let status = candidate.requested_status.unwrap_or(prev.status);
                lifecycle::validate_transition(prev.status, status)?;
                let booking = Booking {
                    id: prev.id,
                    client_id: prev.client_id,
                    service_id: candidate.service_id,
                    service_name: candidate.service_name,
                    duration_minutes: candidate.duration_minutes,
                    date,
                    time,
                    status,
                    created_by_admin: prev.created_by_admin,
                    notes: candidate.notes.or(prev.notes),
                    created_at: prev.created_at,
                    updated_at: now,
                };
                self.store.save(&booking)?;
                let events =
                    lifecycle::status_change_events(&booking, &candidate.client, prev.status);
                SubmitOutcome { booking, events }
            }
        };

        Ok(outcome)
    }
}
