//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! One request per call, no retry and no backoff: a failed `eth_call`
//! surfaces immediately so the caller decides what to do with the batch.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Plain HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::trace!(url = %self.url, method = %req.method, id = %req.id, "sending request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        ms: self.request_timeout.as_millis() as u64,
                    }
                } else {
                    TransportError::Http(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }

    fn url(&self) -> &str {
        &self.url
    }
}

/// Open an HTTP transport to `url` with default settings.
///
/// Only `http` and `https` endpoints are accepted; nothing is sent over the
/// wire until the first request.
pub fn connect(url: &str) -> Result<HttpRpcClient, TransportError> {
    connect_with(url, HttpClientConfig::default())
}

/// Like [`connect`], with an explicit client configuration.
pub fn connect_with(url: &str, config: HttpClientConfig) -> Result<HttpRpcClient, TransportError> {
    if url.is_empty() {
        return Err(TransportError::InvalidUrl {
            url: url.to_string(),
            reason: "rpc url is required".into(),
        });
    }
    let parsed = url::Url::parse(url).map_err(|e| TransportError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{other}'"),
            })
        }
    }
    tracing::debug!(url, "opening HTTP JSON-RPC transport");
    HttpRpcClient::new(url, config)
}
