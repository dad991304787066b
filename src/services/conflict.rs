use chrono::{NaiveDate, NaiveDateTime};

use crate::models::Booking;

/// The slot a submission wants to occupy. `exclude_id` carries the booking's
/// own id on update so it never conflicts with itself.
#[derive(Debug, Clone)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub exclude_id: Option<String>,
}

/// Returns the first active same-date booking whose interval overlaps the
/// candidate's. Intervals are half-open `[start, end)`: a booking ending
/// exactly when another starts is touching, not overlapping.
pub fn find_conflict<'a>(
    candidate: &CandidateSlot,
    bookings: &'a [Booking],
) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.date == candidate.date && b.is_active())
        .filter(|b| candidate.exclude_id.as_deref() != Some(b.id.as_str()))
        .find(|b| candidate.start < b.end_dt() && b.start_dt() < candidate.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn booking(id: &str, day: &str, start: &str, minutes: i32, status: BookingStatus) -> Booking {
        let now = chrono::Utc::now().naive_utc();
        Booking {
            id: id.to_string(),
            client_id: "client-1".to_string(),
            service_id: "svc-1".to_string(),
            service_name: "Consultation".to_string(),
            duration_minutes: minutes,
            date: date(day),
            time: time(start),
            status,
            created_by_admin: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn slot(day: &str, start: &str, minutes: i64, exclude_id: Option<&str>) -> CandidateSlot {
        let start_dt = date(day).and_time(time(start));
        CandidateSlot {
            date: date(day),
            start: start_dt,
            end: start_dt + Duration::minutes(minutes),
            exclude_id: exclude_id.map(str::to_string),
        }
    }

    #[test]
    fn test_overlapping_booking_conflicts() {
        let existing = vec![booking("a", "2025-06-16", "10:00", 60, BookingStatus::Pending)];
        let found = find_conflict(&slot("2025-06-16", "10:30", 60, None), &existing);
        assert_eq!(found.map(|b| b.id.as_str()), Some("a"));
    }

    #[test]
    fn test_containing_booking_conflicts() {
        let existing = vec![booking("a", "2025-06-16", "10:00", 120, BookingStatus::Confirmed)];
        assert!(find_conflict(&slot("2025-06-16", "10:30", 30, None), &existing).is_some());
    }

    #[test]
    fn test_touching_end_does_not_conflict() {
        let existing = vec![booking("a", "2025-06-16", "10:00", 60, BookingStatus::Confirmed)];
        assert!(find_conflict(&slot("2025-06-16", "11:00", 60, None), &existing).is_none());
    }

    #[test]
    fn test_touching_start_does_not_conflict() {
        let existing = vec![booking("a", "2025-06-16", "10:00", 60, BookingStatus::Confirmed)];
        assert!(find_conflict(&slot("2025-06-16", "09:00", 60, None), &existing).is_none());
    }

    #[test]
    fn test_other_date_ignored() {
        let existing = vec![booking("a", "2025-06-17", "10:00", 60, BookingStatus::Confirmed)];
        assert!(find_conflict(&slot("2025-06-16", "10:00", 60, None), &existing).is_none());
    }

    #[test]
    fn test_cancelled_and_completed_ignored() {
        let existing = vec![
            booking("a", "2025-06-16", "10:00", 60, BookingStatus::Cancelled),
            booking("b", "2025-06-16", "10:00", 60, BookingStatus::Completed),
        ];
        assert!(find_conflict(&slot("2025-06-16", "10:00", 60, None), &existing).is_none());
    }

    #[test]
    fn test_excluded_id_ignored() {
        let existing = vec![booking("a", "2025-06-16", "10:00", 60, BookingStatus::Pending)];
        assert!(find_conflict(&slot("2025-06-16", "10:00", 60, Some("a")), &existing).is_none());
    }
}
