use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::{Result, TranscriptError};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 13_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
// Pre-accepts the cookie consent flow so the watch page is served directly
const CONSENT_COOKIE: &str = "CONSENT=YES+cb.20210328-17-p0.en+FX; PREF=hl=en; YSC=abc123;";
const ORIGIN: &str = "https://www.youtube.com";
const REFERER: &str = "https://www.youtube.com/";

/// Fixed header set emulating a desktop browser session.
///
/// Built once at startup and shared by reference with every transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub cookie: String,
    pub origin: String,
    pub referer: String,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            accept_language: ACCEPT_LANGUAGE.to_string(),
            cookie: CONSENT_COOKIE.to_string(),
            origin: ORIGIN.to_string(),
            referer: REFERER.to_string(),
        }
    }
}

impl BrowserProfile {
    /// Header name/value pairs attached to every outbound request
    pub fn headers(&self) -> [(&'static str, &str); 5] {
        [
            ("user-agent", self.user_agent.as_str()),
            ("accept-language", self.accept_language.as_str()),
            ("cookie", self.cookie.as_str()),
            ("origin", self.origin.as_str()),
            ("referer", self.referer.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outbound request issued by the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Headers added on top of the browser profile
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status and body of an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the pipeline and the network
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the whole body as text.
    ///
    /// Non-success statuses are returned as replies, not errors; only
    /// connection, timeout and body-decoding failures are errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpReply>;
}

/// Production transport backed by reqwest
pub struct ReqwestTransport {
    client: Client,
    profile: Arc<BrowserProfile>,
}

impl ReqwestTransport {
    pub fn new(profile: Arc<BrowserProfile>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranscriptError::Unexpected(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, profile })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply> {
        tracing::debug!("{:?} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in self.profile.headers() {
            builder = builder.header(name, value);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TranscriptError::UpstreamTransport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriptError::UpstreamTransport(e.to_string()))?;

        Ok(HttpReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_carries_consent_cookie() {
        let profile = BrowserProfile::default();
        let headers = profile.headers();

        let cookie = headers.iter().find(|(name, _)| *name == "cookie").unwrap();
        assert!(cookie.1.starts_with("CONSENT=YES"));
        assert!(headers.iter().any(|(name, value)| *name == "origin" && *value == ORIGIN));
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::post("https://example.com/rpc", "{}".to_string())
            .header("content-type", "application/json");

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body.as_deref(), Some("{}"));
        assert_eq!(request.headers, vec![("content-type".to_string(), "application/json".to_string())]);
    }

    #[test]
    fn test_reply_success_range() {
        assert!(HttpReply::new(200, "").is_success());
        assert!(HttpReply::new(204, "").is_success());
        assert!(!HttpReply::new(302, "").is_success());
        assert!(!HttpReply::new(429, "").is_success());
    }
}
