use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub practitioner_email: String,
    pub from_email: String,
    pub mail_api_url: String,
    pub mail_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "apptbook.db".to_string()),
            practitioner_email: env::var("PRACTITIONER_EMAIL")
                .unwrap_or_else(|_| "practitioner@localhost".to_string()),
            from_email: env::var("FROM_EMAIL")
                .unwrap_or_else(|_| "bookings@localhost".to_string()),
            mail_api_url: env::var("MAIL_API_URL").unwrap_or_default(),
            mail_api_key: env::var("MAIL_API_KEY").unwrap_or_default(),
        }
    }
}
