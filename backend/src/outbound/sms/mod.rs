//! Vonage SMS gateway adapter.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{SmsDelivery, SmsGateway};

const VONAGE_SMS_ENDPOINT: &str = "https://rest.nexmo.com/sms/json";

/// Credentials and sender identity for the Vonage REST API.
#[derive(Debug, Clone)]
pub struct VonageConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Alphanumeric sender id or E.164 number shown to the recipient.
    pub sender_id: String,
}

/// Outbound SMS via the Vonage (formerly Nexmo) REST API.
#[derive(Clone)]
pub struct VonageSmsGateway {
    client: reqwest::Client,
    config: VonageConfig,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    messages: Vec<MessageStatus>,
}

#[derive(Debug, Deserialize)]
struct MessageStatus {
    status: String,
    #[serde(rename = "message-id")]
    message_id: Option<String>,
    #[serde(rename = "error-text")]
    error_text: Option<String>,
}

impl VonageSmsGateway {
    /// Create a gateway with a fresh HTTP client.
    pub fn new(config: VonageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

/// Stand-in used when no vendor credentials are configured; every send
/// fails loudly instead of silently dropping messages.
pub struct DisabledSmsGateway;

#[async_trait]
impl SmsGateway for DisabledSmsGateway {
    async fn send(&self, _to: &str, _body: &str) -> Result<SmsDelivery, Error> {
        Err(Error::service_unavailable("sms gateway is not configured"))
    }
}

#[async_trait]
impl SmsGateway for VonageSmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<SmsDelivery, Error> {
        let params = [
            ("api_key", self.config.api_key.as_str()),
            ("api_secret", self.config.api_secret.as_str()),
            ("from", self.config.sender_id.as_str()),
            ("to", to),
            ("text", body),
        ];

        let response = self
            .client
            .post(VONAGE_SMS_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|err| Error::external_service(format!("sms gateway unreachable: {err}")))?;
        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|err| Error::external_service(format!("sms gateway response: {err}")))?;

        // The API reports per-message status; "0" is the only success code.
        let Some(message) = parsed.messages.into_iter().next() else {
            return Err(Error::external_service(
                "sms gateway returned no message status",
            ));
        };
        if message.status == "0" {
            Ok(SmsDelivery::Accepted {
                message_id: message.message_id.unwrap_or_default(),
            })
        } else {
            let reason = message
                .error_text
                .unwrap_or_else(|| format!("gateway status {}", message.status));
            debug!(status = %message.status, %reason, "sms rejected by gateway");
            Ok(SmsDelivery::Rejected { reason })
        }
    }
}
