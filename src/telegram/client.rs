//! Telegram Bot API client module
//!
//! Message delivery plus the webhook management calls used at setup time.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio_retry::strategy::jitter;
use tokio_retry::{Retry, strategy::ExponentialBackoff};
use tracing::{error, info};
use url::Url;

use crate::core::delivery::MessageChannel;
use crate::errors::TrackerError;
use crate::utils::http::SHARED_HTTP_CLIENT;

/// Telegram rejects `sendMessage` text longer than this many characters.
pub const MESSAGE_TEXT_LIMIT: usize = 4096;

/// Build the JSON payload for `sendMessage`.
#[must_use]
pub fn build_send_message_payload(chat_id: i64, text: &str) -> Value {
    json!({
        "chat_id": chat_id,
        "text": text,
        "parse_mode": "HTML",
        "disable_web_page_preview": true,
    })
}

/// Build the JSON payload for `setWebhook`.
#[must_use]
pub fn build_set_webhook_payload(url: &str, secret_token: Option<&str>) -> Value {
    let mut payload = json!({
        "url": url,
        "allowed_updates": ["message", "edited_message"],
        "drop_pending_updates": true,
    });

    if let Some(secret) = secret_token {
        payload["secret_token"] = Value::String(secret.to_string());
    }

    payload
}

fn describe_failure(body: &Value) -> Option<String> {
    body.get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Telegram Bot API client
pub struct TelegramClient {
    http: Client,
    api_base: Url,
    token: String,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns `TrackerError::ConfigError` if `api_base_url` is not a valid URL.
    pub fn new(token: &str, api_base_url: &str) -> Result<Self, TrackerError> {
        let mut base = api_base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http: SHARED_HTTP_CLIENT.clone(),
            api_base: Url::parse(&base)?,
            token: token.to_string(),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, TrackerError> {
        // Tokens contain a colon, so they cannot go through `Url::join`.
        Ok(Url::parse(&format!(
            "{}bot{}/{}",
            self.api_base.as_str(),
            self.token,
            method
        ))?)
    }

    async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, TrackerError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, TrackerError>> + Send,
        T: Send,
    {
        let strategy = ExponentialBackoff::from_millis(100).map(jitter).take(5);

        Retry::spawn(strategy, operation).await
    }

    /// Calls a Bot API method and returns its `result` field.
    async fn call(&self, method: &str, payload: &Value) -> Result<Value, TrackerError> {
        let url = self.method_url(method)?;
        let resp = self.http.post(url).json(payload).send().await?;
        let status = resp.status();

        if !status.is_success() {
            // Error pages from proxies in front of the Bot API are not JSON.
            let description = resp
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(describe_failure)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(TrackerError::DeliveryError(format!(
                "{} HTTP {}: {}",
                method, status, description
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| TrackerError::ParseError(format!("{} JSON parse error: {}", method, e)))?;

        if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
            let description = describe_failure(&body).unwrap_or_else(|| "unknown".to_string());
            return Err(TrackerError::DeliveryError(format!(
                "{} rejected: {}",
                method, description
            )));
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Sends one message. Not retried: a failure is reported to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or Telegram rejects the message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TrackerError> {
        let payload = build_send_message_payload(chat_id, text);
        self.call("sendMessage", &payload).await.map_err(|e| {
            error!(chat_id, "sendMessage failed: {}", e);
            e
        })?;
        Ok(())
    }

    /// Points the bot's webhook at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if every retry of the `setWebhook` call fails.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<(), TrackerError> {
        let payload = build_set_webhook_payload(url, secret_token);
        self.with_retry(|| async { self.call("setWebhook", &payload).await })
            .await?;
        info!(webhook_url = %url, "Webhook registered");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if every retry of the `getWebhookInfo` call fails.
    pub async fn get_webhook_info(&self) -> Result<Value, TrackerError> {
        let payload = json!({});
        self.with_retry(|| async { self.call("getWebhookInfo", &payload).await })
            .await
    }
}

#[async_trait]
impl MessageChannel for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TrackerError> {
        TelegramClient::send_message(self, chat_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_payload_uses_html() {
        let payload = build_send_message_payload(42, "<b>hi</b>");
        assert_eq!(payload["chat_id"], 42);
        assert_eq!(payload["parse_mode"], "HTML");
        assert_eq!(payload["text"], "<b>hi</b>");
    }

    #[test]
    fn webhook_payload_includes_secret_only_when_set() {
        let with_secret = build_set_webhook_payload("https://example.com/hook", Some("s3cr3t"));
        assert_eq!(with_secret["secret_token"], "s3cr3t");

        let without = build_set_webhook_payload("https://example.com/hook", None);
        assert!(without.get("secret_token").is_none());
    }

    #[test]
    fn method_url_embeds_token() {
        let client = TelegramClient::new("123:abc", "https://api.telegram.org").unwrap();
        assert_eq!(
            client.method_url("sendMessage").unwrap().as_str(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
