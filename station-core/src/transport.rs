//! HTTP GET seam shared by the weather client and the HTTP time source.
//!
//! Calls are made inline from the tick, so every request is bounded by the client timeout.

use async_trait::async_trait;
use reqwest::{Client, header::DATE};
use std::{fmt::Debug, time::Duration};

use crate::error::TransportError;

const USER_AGENT: &str = concat!("station/", env!("CARGO_PKG_VERSION"));

/// What callers need from an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Raw `Date` header, if the server sent one.
    pub date: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError(e.without_url().to_string()))?;

        let status = res.status().as_u16();
        let date = res
            .headers()
            .get(DATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = res.text().await.map_err(|e| {
            TransportError(format!("failed to read response body: {}", e.without_url()))
        })?;

        Ok(HttpResponse { status, body, date })
    }
}

/// Shortens a response body for log lines.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

/// Strips an API key from a URL before it is logged.
pub(crate) fn redact_key(url: &str) -> String {
    match url.find("appid=") {
        Some(idx) => {
            let start = idx + "appid=".len();
            let end = url[start..].find('&').map_or(url.len(), |i| start + i);
            format!("{}***{}", &url[..start], &url[end..])
        }
        None => url.to_string(),
    }
}
