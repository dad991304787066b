use anyhow::Context;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq)]
pub enum Recipient {
    Practitioner,
    Client { email: String },
}

/// A notification produced by a lifecycle transition. Delivery is best-effort
/// and never affects the booking write that produced it.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub recipient: Recipient,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotificationEvent) -> anyhow::Result<()>;
}

/// Delivers the events in order, swallowing failures. Callers invoke this
/// after the booking has been committed and the store lock released.
pub async fn dispatch(notifier: &dyn Notifier, events: &[NotificationEvent]) {
    for event in events {
        if let Err(e) = notifier.notify(event).await {
            tracing::warn!(error = %e, subject = %event.subject, "failed to deliver notification");
        }
    }
}

/// Sends email through an HTTP mail API (Mailgun-style form endpoint).
pub struct EmailNotifier {
    api_url: String,
    api_key: String,
    from_email: String,
    practitioner_email: String,
    client: reqwest::Client,
}

impl EmailNotifier {
    pub fn new(
        api_url: String,
        api_key: String,
        from_email: String,
        practitioner_email: String,
    ) -> Self {
        Self {
            api_url,
            api_key,
            from_email,
            practitioner_email,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, event: &NotificationEvent) -> anyhow::Result<()> {
        if self.api_url.is_empty() {
            tracing::debug!(subject = %event.subject, "mail API not configured, dropping notification");
            return Ok(());
        }

        let to = match &event.recipient {
            Recipient::Practitioner => self.practitioner_email.as_str(),
            Recipient::Client { email } => email.as_str(),
        };

        self.client
            .post(&self.api_url)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from_email.as_str()),
                ("to", to),
                ("subject", event.subject.as_str()),
                ("text", event.body.as_str()),
            ])
            .send()
            .await
            .context("failed to reach mail API")?
            .error_for_status()
            .context("mail API returned error")?;

        Ok(())
    }
}
