// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client for the Brevo transactional email API.
//!
//! One `POST /v3/smtp/email` per notification. Failures are returned to the
//! caller as-is; nothing is retried here.

use crate::config::EmailConfig;
use crate::notification::{Mailbox, Notification};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Error types for email dispatch.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email provider URL: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("Failed to reach email provider: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Email provider rejected the message ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Provider acknowledgement of an accepted message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

impl<'a> From<&'a Mailbox> for Contact<'a> {
    fn from(mailbox: &'a Mailbox) -> Self {
        Self {
            email: &mailbox.email,
            name: mailbox.name.as_deref(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendSmtpEmail<'a> {
    sender: Contact<'a>,
    to: Vec<Contact<'a>>,
    reply_to: Contact<'a>,
    subject: &'a str,
    html_content: &'a str,
    text_content: &'a str,
}

/// `base` as a directory, so joining keeps a path prefix such as `/brevo`.
fn api_root(base: &Url) -> Url {
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root
}

/// Brevo API client.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: Client,
    endpoint: Url,
    api_key: Secret<String>,
}

impl EmailClient {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let http_client = Client::builder().timeout(config.timeout()).build()?;
        let endpoint = api_root(&config.base_url).join("v3/smtp/email")?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Hand `notification` to the provider for delivery.
    pub async fn send_email(&self, notification: &Notification) -> Result<DispatchReceipt, EmailError> {
        let body = SendSmtpEmail {
            sender: (&notification.sender).into(),
            to: vec![(&notification.recipient).into()],
            reply_to: (&notification.reply_to).into(),
            subject: &notification.subject,
            html_content: &notification.html_content,
            text_content: &notification.text_content,
        };

        debug!(endpoint = %self.endpoint, subject = %notification.subject, "Sending notification");

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("api-key", self.api_key.expose_secret().as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Email provider rejected message");
            return Err(EmailError::Rejected { status, body });
        }

        // Brevo answers 201 with `{"messageId": ...}`; an unexpected body is not a failure
        let receipt = response.json::<DispatchReceipt>().await.unwrap_or_default();
        Ok(receipt)
    }
}
