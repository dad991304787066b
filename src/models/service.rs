use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A treatment offered by the practitioner. Bookings snapshot its name and
/// duration at creation time, so price/description edits never move an
/// existing appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl Service {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("service name must not be empty");
        }
        if self.duration_minutes <= 0 {
            anyhow::bail!("service duration must be positive");
        }
        if self.price_cents < 0 {
            anyhow::bail!("service price must not be negative");
        }
        Ok(())
    }
}
