use super::{ResponseEnvelope, Transport};
use crate::core::error::TransportError;
use crate::query::RequestSpec;
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`Transport`].
///
/// One instance owns one connection pool; share it between sets talking to
/// the same API.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (custom timeouts, proxies, headers).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestSpec) -> Result<ResponseEnvelope, TransportError> {
        let response = self
            .client
            .get(&request.url)
            .query(&request.params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        Ok(ResponseEnvelope::new(body))
    }
}
