use crate::models::{Booking, BookingStatus, Client};

use super::booking::BookingError;
use super::notify::{NotificationEvent, Recipient};

/// Status a newly created booking starts in. Client-initiated bookings are
/// forced to `pending` whatever the request asked for; only the admin flow
/// may pick the initial status.
pub fn initial_status(requested: Option<BookingStatus>, created_by_admin: bool) -> BookingStatus {
    if created_by_admin {
        requested.unwrap_or(BookingStatus::Pending)
    } else {
        BookingStatus::Pending
    }
}

/// Rejects writes that would move a booking out of a terminal state.
/// Re-saving with an unchanged status is always allowed.
pub fn validate_transition(from: BookingStatus, to: BookingStatus) -> Result<(), BookingError> {
    if from == to {
        return Ok(());
    }
    if from.is_terminal() {
        return Err(BookingError::InvalidTransition { from, to });
    }
    Ok(())
}

/// Events for a freshly created booking: one request notice to the
/// practitioner, one acknowledgment to the client.
pub fn creation_events(booking: &Booking, client: &Client) -> Vec<NotificationEvent> {
    vec![
        NotificationEvent {
            recipient: Recipient::Practitioner,
            subject: "New booking request".to_string(),
            body: format!(
                "{} requested {} on {} at {}.",
                client.full_name(),
                booking.service_name,
                booking.date,
                booking.time.format("%H:%M"),
            ),
        },
        NotificationEvent {
            recipient: Recipient::Client {
                email: client.email.clone(),
            },
            subject: "Booking request received".to_string(),
            body: "Thank you for your booking request. We will confirm your appointment soon."
                .to_string(),
        },
    ]
}

/// Event for an updated booking: one status notice to the client, or nothing
/// when the status did not change.
pub fn status_change_events(
    booking: &Booking,
    client: &Client,
    old_status: BookingStatus,
) -> Vec<NotificationEvent> {
    if old_status == booking.status {
        return vec![];
    }
    vec![NotificationEvent {
        recipient: Recipient::Client {
            email: client.email.clone(),
        },
        subject: format!("Booking status changed: {} -> {}", old_status, booking.status),
        body: format!(
            "Your booking for {} on {} at {} has been {}.",
            booking.service_name,
            booking.date,
            booking.time.format("%H:%M"),
            booking.status,
        ),
    }]
}
