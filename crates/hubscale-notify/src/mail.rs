//! SendGrid v3 mail client.

use serde::Serialize;
use tracing::debug;

use hubscale_core::NotifyConfig;

use crate::{Notifier, NotifyError};

/// Public mail-send endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// Mail API client holding the resolved key and addresses.
#[derive(Debug, Clone)]
pub struct MailClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: String,
}

impl MailClient {
    pub fn new(config: &NotifyConfig, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
            from: config.from.clone(),
            to: config.to.clone(),
        }
    }
}

impl Notifier for MailClient {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let request = MailRequest {
            personalizations: [Personalization {
                to: [Address { email: &self.to }],
            }],
            from: Address { email: &self.from },
            subject,
            content: [Content {
                content_type: "text/plain",
                value: body,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api { status, body });
        }

        debug!(to = %self.to, %subject, "notification sent");
        Ok(())
    }
}
