//! Outbound emergency notifications.
//!
//! [`NotificationDispatcher`] owns a single [`NotificationChannel`] chosen at start-up by
//! [`channel_from_config`]: the Twilio SMS channel when credentials are configured, otherwise
//! the log-only stub. Delivery errors stay inside the dispatcher.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{error, info};

use crate::config::SmsConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// HTTP request timeout for a single SMS delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport capable of delivering a text message to a contact.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, recipient: &str, body: &str) -> Result<(), ChannelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("SMS gateway returned HTTP {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Picks the live SMS channel when credentials are present, the log-only stub otherwise.
pub fn channel_from_config(
    sms: Option<&SmsConfig>,
) -> Result<Arc<dyn NotificationChannel>, ChannelError> {
    match sms {
        Some(config) => Ok(Arc::new(TwilioSmsChannel::new(config)?)),
        None => Ok(Arc::new(LogOnlyChannel)),
    }
}

/// Sends SMS through the Twilio Messages REST API.
pub struct TwilioSmsChannel {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioSmsChannel {
    pub fn new(config: &SmsConfig) -> Result<Self, ChannelError> {
        Self::with_api_base(config, TWILIO_API_BASE)
    }

    /// Points the channel at another Twilio-compatible host.
    pub fn with_api_base(
        config: &SmsConfig,
        api_base: impl Into<String>,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        })
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

impl fmt::Debug for TwilioSmsChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioSmsChannel")
            .field("api_base", &self.api_base)
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationChannel for TwilioSmsChannel {
    fn name(&self) -> &'static str {
        "twilio_sms"
    }

    async fn deliver(&self, recipient: &str, body: &str) -> Result<(), ChannelError> {
        let params = [
            ("To", recipient),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ChannelError::HttpStatus {
                status: status.as_u16(),
                detail,
            });
        }

        info!(to = recipient, "sent emergency SMS");
        Ok(())
    }
}

/// Stub used when no live channel is configured; records the attempt in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyChannel;

#[async_trait]
impl NotificationChannel for LogOnlyChannel {
    fn name(&self) -> &'static str {
        "log_only"
    }

    async fn deliver(&self, recipient: &str, body: &str) -> Result<(), ChannelError> {
        info!(to = recipient, body, "SMS stub: live channel not configured");
        Ok(())
    }
}

/// Outcome of a dispatch. Informational only; dispatch never fails its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    NoContact,
    Sent,
    Failed,
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    pub fn channel_name(&self) -> &'static str {
        self.channel.name()
    }

    /// Makes at most one delivery attempt. No contact means no attempt.
    pub async fn dispatch(
        &self,
        contact: Option<&str>,
        subject_name: &str,
        message: &str,
    ) -> DeliveryStatus {
        let Some(recipient) = contact else {
            info!(subject = subject_name, "no emergency contact on file; skipping notification");
            return DeliveryStatus::NoContact;
        };

        let body = message_body(subject_name, message);
        match self.channel.deliver(recipient, &body).await {
            Ok(()) => DeliveryStatus::Sent,
            Err(err) => {
                error!(
                    channel = self.channel.name(),
                    to = recipient,
                    error = %err,
                    "failed to notify emergency contact"
                );
                DeliveryStatus::Failed
            }
        }
    }
}

impl fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channel", &self.channel.name())
            .finish()
    }
}

pub fn message_body(subject_name: &str, message: &str) -> String {
    format!("Emergency for {subject_name}: {message}")
}
