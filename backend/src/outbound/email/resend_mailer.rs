//! Reqwest-backed mailer adapter for the Resend HTTP API.
//!
//! This adapter owns transport details only: request serialisation, bearer
//! authentication, timeout, and HTTP error mapping. Message content is the
//! dispatcher's business.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use crate::domain::ports::{Mailer, MailerError, OutboundEmail};

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Mailer adapter that POSTs messages to the Resend API.
pub struct ResendMailer {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ResendMailer {
    /// Build an adapter against the production Resend endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT)
    }

    /// Build an adapter against an explicit endpoint (used by tests).
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_SEND_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

/// Serialise one message into the Resend request body.
fn payload_for(email: &OutboundEmail) -> Value {
    let headers: BTreeMap<&str, &str> = email
        .headers
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    json!({
        "from": email.from,
        "to": email.to,
        "subject": email.subject,
        "html": email.html,
        "text": email.text,
        "headers": headers,
    })
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload_for(email))
            .send()
            .await
            .map_err(|err| MailerError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(MailerError::transport(format!("{status}: {body}")))
        } else {
            Err(MailerError::rejected(format!("{status}: {body}")))
        }
    }
}
