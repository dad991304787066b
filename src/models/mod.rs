pub mod booking;
pub mod client;
pub mod schedule;
pub mod service;

pub use booking::{Booking, BookingStatus};
pub use client::Client;
pub use schedule::{weekday_from_index, weekday_index, ScheduleCalendar, WeeklyHours};
pub use service::Service;
