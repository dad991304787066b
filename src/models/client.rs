use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A client record. `user_id` links to an external login identity and is
/// nullable: clients entered directly by the practitioner may never log in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub medical_notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
