//! `HttpClient` backed by reqwest.
//!
//! Relative URLs are joined onto an optional base URL, so descriptors can
//! say `"/users/1"` and let configuration pick the host.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Method, Url};
use serde_json::Value;

use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

pub struct ReqwestClient {
    base_url: Option<Url>,
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(base_url: Option<String>) -> Result<Self, HttpError> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Builds a client that sends `user_agent` on every request.
    pub fn with_user_agent(base_url: Option<String>, user_agent: &str) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Network(e.to_string()))?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(base_url: Option<String>, client: reqwest::Client) -> Result<Self, HttpError> {
        let base_url = base_url
            .map(|raw| {
                // A base without a trailing slash would lose its last path segment on join.
                let raw = if raw.ends_with('/') { raw } else { format!("{raw}/") };
                Url::parse(&raw).map_err(|e| HttpError::InvalidUrl(format!("{raw}: {e}")))
            })
            .transpose()?;

        Ok(Self { base_url, client })
    }

    /// Resolves `url` against the base URL when it is relative.
    pub fn resolve(&self, url: &str) -> Result<Url, HttpError> {
        let resolved = match &self.base_url {
            // Protocol-relative URLs keep their own host.
            Some(base) if url.starts_with("//") => base.join(url),
            Some(base) => match Url::parse(url) {
                Ok(absolute) => Ok(absolute),
                // Path-absolute URLs stay under the base path.
                Err(_) => base.join(url.strip_prefix('/').unwrap_or(url)),
            },
            None => Url::parse(url),
        };
        resolved.map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn execute(&self, request: HttpRequest) -> Result<Box<dyn HttpResponse>, HttpError> {
        let url = self.resolve(&request.url)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| HttpError::InvalidMethod(format!("{}: {e}", request.method)))?;

        info!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        debug!("Response status: {}", response.status());
        Ok(Box::new(ReqwestResponse { inner: response }))
    }
}

struct ReqwestResponse {
    inner: reqwest::Response,
}

#[async_trait]
impl HttpResponse for ReqwestResponse {
    fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    fn is_ok(&self) -> bool {
        self.inner.status().is_success()
    }

    async fn json(self: Box<Self>) -> Result<Value, HttpError> {
        let ReqwestResponse { inner } = *self;
        // Read as bytes first so a malformed body is a parse error, not a network one.
        let bytes = inner
            .bytes()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| HttpError::Parse(e.to_string()))
    }

    async fn text(self: Box<Self>) -> Result<String, HttpError> {
        let ReqwestResponse { inner } = *self;
        inner
            .text()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_passes_through() {
        let client = ReqwestClient::new(Some("http://api.local/v1".to_string())).unwrap();
        let url = client.resolve("https://other.local/items").unwrap();
        assert_eq!(url.as_str(), "https://other.local/items");
    }

    #[test]
    fn test_relative_url_joins_base() {
        let client = ReqwestClient::new(Some("http://api.local/v1".to_string())).unwrap();
        let url = client.resolve("/users/1").unwrap();
        assert_eq!(url.as_str(), "http://api.local/v1/users/1");
    }

    #[test]
    fn test_protocol_relative_url_keeps_its_host() {
        let client = ReqwestClient::new(Some("http://api.local/v1".to_string())).unwrap();
        let url = client.resolve("//cdn.local/x").unwrap();
        assert_eq!(url.as_str(), "http://cdn.local/x");
    }

    #[test]
    fn test_path_without_leading_slash_joins_base() {
        let client = ReqwestClient::new(Some("http://api.local/v1/".to_string())).unwrap();
        let url = client.resolve("users?page=2").unwrap();
        assert_eq!(url.as_str(), "http://api.local/v1/users?page=2");
    }

    #[test]
    fn test_relative_url_without_base_is_rejected() {
        let client = ReqwestClient::new(None).unwrap();
        let err = client.resolve("/users/1").unwrap_err();
        assert!(matches!(err, HttpError::InvalidUrl(_)));
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let result = ReqwestClient::new(Some("not a url".to_string()));
        assert!(matches!(result, Err(HttpError::InvalidUrl(_))));
    }
}
