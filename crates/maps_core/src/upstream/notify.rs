//! Blocking HTTP client for the notifications service.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{EmailMessage, Notifier};
use crate::error::{MapsError, UpstreamService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct NotificationsClient {
    client: Client,
    base_url: String,
}

impl NotificationsClient {
    /// Create a client for the given base URL (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build notifications client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Notifier for NotificationsClient {
    fn send_email(&self, message: &EmailMessage) -> Result<(), MapsError> {
        let response = self
            .client
            .post(self.endpoint("/send_email"))
            .json(message)
            .send()
            .map_err(|source| MapsError::Upstream {
                service: UpstreamService::Notifications,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapsError::UpstreamStatus {
                service: UpstreamService::Notifications,
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}
