//! HTTP transport seam and its reqwest implementation.

use crate::error::RequestError;
use crate::request::{ApiResponse, OutgoingRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shop_core::config::ApiConfig;
use shop_core::{Result, ShopError};
use std::time::Duration;

/// Sends one request and classifies the outcome.
///
/// Implementations return `Ok` only for 2xx responses, map every non-2xx
/// response to [`RequestError::Server`] and every failure that produced no
/// response to [`RequestError::Network`]. They never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &OutgoingRequest) -> std::result::Result<ApiResponse, RequestError>;
}

/// Transport backed by a pooled `reqwest::Client`.
///
/// Request timeouts are owned here (from `api.timeout_secs`).
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &OutgoingRequest) -> std::result::Result<ApiResponse, RequestError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!("[Transport] {} {} failed: {}", request.method, url, e);
            RequestError::network(e.to_string())
        })?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => {
                return Err(RequestError::decode(format!("Failed to read body: {}", e)));
            }
            Err(_) => String::new(),
        };
        let body = parse_body(&text);

        if status.is_success() {
            Ok(ApiResponse::new(status.as_u16(), body))
        } else {
            tracing::debug!("[Transport] {} {} -> {}", request.method, url, status);
            Err(RequestError::server(status.as_u16(), body))
        }
    }
}

/// JSON bodies are parsed; anything else is kept as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
