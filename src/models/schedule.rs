use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// One weekday's bookable window. Weekdays are stored as 0 = Monday through
/// 6 = Sunday.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyHours {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub available: bool,
}

pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// The practitioner's weekly availability. Unconfigured weekdays are closed:
/// a lookup that finds no entry answers "not available".
#[derive(Debug, Clone, Default)]
pub struct ScheduleCalendar {
    entries: Vec<WeeklyHours>,
}

impl ScheduleCalendar {
    pub fn from_entries(entries: Vec<WeeklyHours>) -> anyhow::Result<Self> {
        let mut seen = [false; 7];
        for entry in &entries {
            let idx = weekday_index(entry.weekday) as usize;
            if seen[idx] {
                anyhow::bail!("duplicate hours entry for {}", entry.weekday);
            }
            seen[idx] = true;
            if entry.start > entry.end {
                anyhow::bail!(
                    "hours for {} end before they start ({} > {})",
                    entry.weekday,
                    entry.start,
                    entry.end
                );
            }
        }
        Ok(Self { entries })
    }

    pub fn entry_for(&self, weekday: Weekday) -> Option<&WeeklyHours> {
        self.entries.iter().find(|e| e.weekday == weekday)
    }

    /// Whether `time` falls inside the configured, available window for the
    /// weekday of `date`. Bounds are inclusive; an appointment may start at
    /// opening or end exactly at closing.
    pub fn is_time_available(&self, date: NaiveDate, time: NaiveTime) -> bool {
        match self.entry_for(date.weekday()) {
            Some(hours) => hours.available && hours.start <= time && time <= hours.end,
            None => false,
        }
    }

    pub fn to_human_readable(&self) -> String {
        let mut open: Vec<&WeeklyHours> =
            self.entries.iter().filter(|e| e.available).collect();
        open.sort_by_key(|e| weekday_index(e.weekday));

        open.iter()
            .map(|e| {
                format!(
                    "{}: {}-{}",
                    e.weekday,
                    e.start.format("%H:%M"),
                    e.end.format("%H:%M")
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn entries(&self) -> &[WeeklyHours] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn monday_hours() -> ScheduleCalendar {
        ScheduleCalendar::from_entries(vec![WeeklyHours {
            weekday: Weekday::Mon,
            start: time("09:00"),
            end: time("17:00"),
            available: true,
        }])
        .unwrap()
    }

    #[test]
    fn test_within_hours() {
        let cal = monday_hours();
        // 2025-06-16 is a Monday
        assert!(cal.is_time_available(date("2025-06-16"), time("10:00")));
        assert!(cal.is_time_available(date("2025-06-16"), time("09:00")));
        assert!(cal.is_time_available(date("2025-06-16"), time("17:00")));
    }

    #[test]
    fn test_outside_hours() {
        let cal = monday_hours();
        assert!(!cal.is_time_available(date("2025-06-16"), time("08:59")));
        assert!(!cal.is_time_available(date("2025-06-16"), time("17:01")));
    }

    #[test]
    fn test_unconfigured_day_is_closed() {
        let cal = monday_hours();
        // 2025-06-17 is a Tuesday with no entry
        assert!(!cal.is_time_available(date("2025-06-17"), time("10:00")));
    }

    #[test]
    fn test_unavailable_day_is_closed() {
        let cal = ScheduleCalendar::from_entries(vec![WeeklyHours {
            weekday: Weekday::Mon,
            start: time("09:00"),
            end: time("17:00"),
            available: false,
        }])
        .unwrap();
        assert!(!cal.is_time_available(date("2025-06-16"), time("10:00")));
    }

    #[test]
    fn test_duplicate_weekday_rejected() {
        let entry = WeeklyHours {
            weekday: Weekday::Mon,
            start: time("09:00"),
            end: time("17:00"),
            available: true,
        };
        assert!(ScheduleCalendar::from_entries(vec![entry.clone(), entry]).is_err());
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = ScheduleCalendar::from_entries(vec![WeeklyHours {
            weekday: Weekday::Mon,
            start: time("17:00"),
            end: time("09:00"),
            available: true,
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_human_readable() {
        let cal = ScheduleCalendar::from_entries(vec![
            WeeklyHours {
                weekday: Weekday::Fri,
                start: time("10:00"),
                end: time("16:00"),
                available: true,
            },
            WeeklyHours {
                weekday: Weekday::Mon,
                start: time("09:00"),
                end: time("17:00"),
                available: true,
            },
            WeeklyHours {
                weekday: Weekday::Sun,
                start: time("00:00"),
                end: time("00:00"),
                available: false,
            },
        ])
        .unwrap();
        assert_eq!(cal.to_human_readable(), "Mon: 09:00-17:00, Fri: 10:00-16:00");
    }

    #[test]
    fn test_weekday_index_round_trip() {
        for idx in 0..7 {
            let weekday = weekday_from_index(idx).unwrap();
            assert_eq!(weekday_index(weekday), idx);
        }
        assert!(weekday_from_index(7).is_none());
    }
}
