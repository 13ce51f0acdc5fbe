//! Tracking provider API client
//!
//! Wraps the provider's `register` and `gettrackinfo` endpoints. Both take a
//! JSON array of `{ "number", "carrier" }` items and authenticate with the
//! `17token` header.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::core::models::CarrierHint;
use crate::errors::TrackerError;
use crate::utils::http::SHARED_HTTP_CLIENT;

const API_KEY_HEADER: &str = "17token";
const REGISTER_ENDPOINT: &str = "register";
const QUERY_ENDPOINT: &str = "gettrackinfo";

/// Provider-level success code.
pub const PROVIDER_CODE_OK: i64 = 0;

/// One accepted record, kept opaque until the normalizer classifies it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawLookupResult(Value);

impl RawLookupResult {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn number(&self) -> Option<&str> {
        self.0.get("number").and_then(Value::as_str)
    }

    /// Carrier code the provider resolved the number to, if any.
    #[must_use]
    pub fn carrier_code(&self) -> Option<u32> {
        self.0
            .get("carrier")
            .and_then(Value::as_u64)
            .and_then(|code| u32::try_from(code).ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub accepted: Vec<RawLookupResult>,
    #[serde(default)]
    pub rejected: Vec<Value>,
}

/// Body of a `gettrackinfo` response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Option<QueryData>,
}

impl QueryResponse {
    /// First accepted record, only when the provider reported success.
    #[must_use]
    pub fn into_accepted(self) -> Option<RawLookupResult> {
        if self.code != PROVIDER_CODE_OK {
            return None;
        }
        self.data?.accepted.into_iter().next()
    }
}

/// The external tracking service as seen by the resolver.
#[async_trait]
pub trait TrackingProvider: Send + Sync {
    /// Ask the provider to start tracking a number.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-zero provider code.
    async fn register(&self, number: &str, carrier: Option<CarrierHint>)
    -> Result<(), TrackerError>;

    /// Fetch tracking information for a number.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unreadable response body.
    async fn query(
        &self,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<QueryResponse, TrackerError>;
}

/// HTTP implementation of [`TrackingProvider`].
pub struct TrackingApiClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl TrackingApiClient {
    /// # Errors
    ///
    /// Returns `TrackerError::ConfigError` if `base_url` is not a valid URL.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, TrackerError> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http: SHARED_HTTP_CLIENT.clone(),
            base_url: Url::parse(&base)?,
            api_key: api_key.to_string(),
        })
    }

    #[must_use]
    fn build_request_body(number: &str, carrier: Option<CarrierHint>) -> Value {
        let mut item = json!({ "number": number });
        if let Some(hint) = carrier {
            item["carrier"] = json!(hint.code());
        }
        json!([item])
    }

    async fn post(
        &self,
        endpoint: &str,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<Value, TrackerError> {
        let url = self.base_url.join(endpoint)?;
        let body = Self::build_request_body(number, carrier);

        debug!(%url, carrier = ?carrier, "Calling tracking provider");

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(TrackerError::HttpError(format!(
                "{} HTTP {}",
                endpoint,
                resp.status()
            )));
        }

        let body = resp.json::<Value>().await.map_err(|e| {
            TrackerError::ParseError(format!("{} JSON parse error: {}", endpoint, e))
        })?;

        #[cfg(feature = "debug-logs")]
        debug!(endpoint, body = %body, "Tracking provider response");

        Ok(body)
    }
}

#[async_trait]
impl TrackingProvider for TrackingApiClient {
    async fn register(
        &self,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<(), TrackerError> {
        let body = self.post(REGISTER_ENDPOINT, number, carrier).await?;
        let code = body.get("code").and_then(Value::as_i64).unwrap_or(-1);
        if code != PROVIDER_CODE_OK {
            return Err(TrackerError::ProviderError(format!(
                "register returned code {}",
                code
            )));
        }
        Ok(())
    }

    async fn query(
        &self,
        number: &str,
        carrier: Option<CarrierHint>,
    ) -> Result<QueryResponse, TrackerError> {
        let body = self.post(QUERY_ENDPOINT, number, carrier).await?;
        Ok(serde_json::from_value(body)?)
    }
}
