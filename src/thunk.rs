//! # Dynamic Thunks
//!
//! A `DynamicThunk` turns a per-call description of an HTTP request into a
//! deferred unit of work. Calling it with arguments asks the describe
//! callback for a [`RequestDescriptor`] and hands back a [`Thunk`]. Running
//! the thunk with a dispatcher performs the request and, on success,
//! dispatches the descriptor's action with the response body.
//!
//! ```text
//! call(args) ──► Built ──run()──► Requesting ──┬──► Dispatched(body)   one dispatch
//!                                              ├──► Rejected(status)   no dispatch
//!                                              └──► Err(ThunkError)    no dispatch
//! ```
//!
//! The only suspension points are sending the request and reading its body.
//! There is no retry, timeout or cancellation here. Drop the future to give up.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::Value;

use crate::core::action::{ActionCreator, Dispatch};
use crate::http::{HttpClient, HttpError, HttpRequest};

pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// Errors and Outcomes
// ============================================================================

#[derive(Debug)]
pub enum ThunkError {
    /// The describe callback produced something that cannot be sent.
    InvalidDescriptor(String),
    /// The request never got a response.
    Network(String),
    /// The response was ok but its body was not JSON.
    Parse(String),
}

impl fmt::Display for ThunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThunkError::InvalidDescriptor(msg) => write!(f, "invalid request descriptor: {msg}"),
            ThunkError::Network(msg) => write!(f, "network error: {msg}"),
            ThunkError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ThunkError {}

impl From<HttpError> for ThunkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::InvalidUrl(msg) => ThunkError::InvalidDescriptor(format!("url {msg}")),
            HttpError::InvalidMethod(msg) => ThunkError::InvalidDescriptor(format!("method {msg}")),
            HttpError::Network(msg) => ThunkError::Network(msg),
            HttpError::Parse(msg) => ThunkError::Parse(msg),
        }
    }
}

/// What a non-ok response looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    pub status: u16,
    pub body: String,
}

/// How a thunk that got a response finished.
#[derive(Debug, Clone, PartialEq)]
pub enum ThunkOutcome {
    /// The response was ok. The action was dispatched; this is the parsed body.
    Dispatched(Value),
    /// The response was not ok. Nothing was dispatched.
    Rejected(FailedResponse),
}

impl ThunkOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, ThunkOutcome::Dispatched(_))
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ThunkOutcome::Dispatched(body) => Some(body),
            ThunkOutcome::Rejected(_) => None,
        }
    }
}

// ============================================================================
// Request Descriptor
// ============================================================================

/// Describes one request and the action to dispatch with its result.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    pub action: ActionCreator,
    /// `None` means GET.
    pub method: Option<String>,
    /// Serialized as the JSON body. Ignored for GET.
    pub payload: Option<Value>,
    /// Dispatched instead of the response body when set and not null.
    pub action_args: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>, action: ActionCreator) -> Self {
        Self {
            url: url.into(),
            action,
            method: None,
            payload: None,
            action_args: None,
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn action_args(mut self, action_args: Value) -> Self {
        self.action_args = Some(action_args);
        self
    }

    /// True when no method is given or it is GET in any case.
    pub fn is_get(&self) -> bool {
        self.method
            .as_deref()
            .is_none_or(|method| method.eq_ignore_ascii_case("GET"))
    }

    /// Checks the descriptor and turns it into a request.
    ///
    /// GET requests carry nothing but the URL. Anything else carries a JSON
    /// content type and the serialized payload, if there is one.
    pub fn to_request(&self) -> Result<HttpRequest, ThunkError> {
        if self.url.trim().is_empty() {
            return Err(ThunkError::InvalidDescriptor("url is empty".to_string()));
        }

        let method = match self.method.as_deref() {
            Some(method) if !self.is_get() => normalize_method(method)?,
            _ => return Ok(HttpRequest::get(self.url.clone())),
        };

        let body = self
            .payload
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ThunkError::InvalidDescriptor(format!("payload: {e}")))?;

        Ok(HttpRequest {
            method,
            url: self.url.clone(),
            headers: vec![("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body,
        })
    }
}

/// Upper-cases the standard methods and passes extension methods through.
fn normalize_method(method: &str) -> Result<String, ThunkError> {
    const STANDARD: [&str; 7] = ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

    let parsed = Method::from_bytes(method.as_bytes())
        .map_err(|_| ThunkError::InvalidDescriptor(format!("method '{method}' is not a valid token")))?;

    Ok(STANDARD
        .iter()
        .find(|standard| standard.eq_ignore_ascii_case(method))
        .map(|standard| standard.to_string())
        .unwrap_or_else(|| parsed.as_str().to_string()))
}

// ============================================================================
// Thunk Factory
// ============================================================================

type Describe<A> = dyn Fn(A) -> RequestDescriptor + Send + Sync;

/// Thunk factory: call it with arguments to get a runnable [`Thunk`].
pub struct DynamicThunk<A> {
    client: Arc<dyn HttpClient>,
    describe: Arc<Describe<A>>,
}

impl<A> DynamicThunk<A> {
    pub fn new<F>(client: Arc<dyn HttpClient>, describe: F) -> Self
    where
        F: Fn(A) -> RequestDescriptor + Send + Sync + 'static,
    {
        Self {
            client,
            describe: Arc::new(describe),
        }
    }

    /// Describes the request for `args` and validates it. Nothing is sent yet.
    pub fn call(&self, args: A) -> Result<Thunk, ThunkError> {
        let descriptor = (self.describe)(args);
        let request = descriptor.to_request()?;
        debug!(
            "Built thunk: {} {} -> {}",
            request.method,
            request.url,
            descriptor.action.kind()
        );
        Ok(Thunk {
            client: Arc::clone(&self.client),
            descriptor,
            request,
        })
    }
}

impl<A> Clone for DynamicThunk<A> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            describe: Arc::clone(&self.describe),
        }
    }
}

/// One built request, waiting for a dispatcher.
pub struct Thunk {
    client: Arc<dyn HttpClient>,
    descriptor: RequestDescriptor,
    request: HttpRequest,
}

impl Thunk {
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Performs the request and dispatches at most one action.
    pub async fn run<D>(self, dispatch: &D) -> Result<ThunkOutcome, ThunkError>
    where
        D: Dispatch + ?Sized,
    {
        let Thunk {
            client,
            descriptor,
            request,
        } = self;

        info!(
            "[{}] {} {}",
            client.name(),
            request.method,
            request.url
        );
        let response = client.execute(request).await?;
        let status = response.status();

        if !response.is_ok() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Could not read body of HTTP {status} response: {e}");
                    String::new()
                }
            };
            warn!(
                "HTTP {status} from {}, not dispatching {}",
                descriptor.url,
                descriptor.action.kind()
            );
            return Ok(ThunkOutcome::Rejected(FailedResponse { status, body }));
        }

        let data = response.json().await?;
        let payload = descriptor
            .action_args
            .filter(|args| !args.is_null())
            .unwrap_or_else(|| data.clone());

        debug!("Dispatching {} (HTTP {status})", descriptor.action.kind());
        dispatch.dispatch(descriptor.action.create(payload));

        Ok(ThunkOutcome::Dispatched(data))
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("client", &self.client.name())
            .field("descriptor", &self.descriptor)
            .field("request", &self.request)
            .finish()
    }
}
