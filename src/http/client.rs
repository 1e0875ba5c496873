use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// Errors raised by an [`HttpClient`] or while reading a response body.
#[derive(Debug)]
pub enum HttpError {
    /// The request URL could not be resolved (relative URL with no base, bad syntax).
    InvalidUrl(String),
    /// The request method is not a valid HTTP token.
    InvalidMethod(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The response body was not the expected shape.
    Parse(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::InvalidUrl(msg) => write!(f, "invalid url: {msg}"),
            HttpError::InvalidMethod(msg) => write!(f, "invalid method: {msg}"),
            HttpError::Network(msg) => write!(f, "network error: {msg}"),
            HttpError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for HttpError {}

/// A fully built request, ready to hand to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A bare GET: no headers, no body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response whose body has not been read yet.
#[async_trait]
pub trait HttpResponse: Send {
    fn status(&self) -> u16;

    /// Whether the client considers this response a success. Defaults to 2xx.
    fn is_ok(&self) -> bool {
        (200..300).contains(&self.status())
    }

    /// Reads the body and parses it as JSON.
    async fn json(self: Box<Self>) -> Result<Value, HttpError>;

    /// Reads the body as text.
    async fn text(self: Box<Self>) -> Result<String, HttpError>;
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Returns the name of the client.
    fn name(&self) -> &str;

    /// Sends `request` and returns the response once its headers arrive.
    async fn execute(&self, request: HttpRequest) -> Result<Box<dyn HttpResponse>, HttpError>;
}
