use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, REFERER};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body,
            timeout: None,
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            url: url.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Request/response access to the room server. Returns the response body.
#[async_trait]
pub trait RoomHttpClient: Send + Sync + 'static {
    async fn request(&self, request: HttpRequest) -> Result<String, TransportError>;
}

pub struct ReqwestRoomClient {
    client: reqwest::Client,
    referer: String,
}

impl ReqwestRoomClient {
    pub fn new(referer: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            referer: referer.into(),
        }
    }
}

#[async_trait]
impl RoomHttpClient for ReqwestRoomClient {
    async fn request(&self, request: HttpRequest) -> Result<String, TransportError> {
        let HttpRequest {
            method,
            url,
            body,
            timeout,
        } = request;

        let mut builder = match method {
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        }
        .header(REFERER, &self.referer);

        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(url.clone())
            } else {
                TransportError::Http {
                    url: url.clone(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Http {
                url: url.clone(),
                source: e,
            })?;

        if !status.is_success() {
            warn!("Non-2xx response from {}: {}", url, status);
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
