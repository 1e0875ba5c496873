//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::core::action::{Action, Dispatch};
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};

enum Reply {
    Status(u16, String),
    NetworkFailure(String),
}

/// An in-memory client that answers every request the same way and
/// remembers what it was asked.
pub struct ScriptedClient {
    reply: Reply,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedClient {
    /// Answers 200 with `body` as JSON.
    pub fn ok(body: Value) -> Arc<Self> {
        Self::status(200, &body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Status(status, body.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn network_failure(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::NetworkFailure(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, request: HttpRequest) -> Result<Box<dyn HttpResponse>, HttpError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Reply::Status(status, body) => Ok(Box::new(ScriptedResponse {
                status: *status,
                body: body.clone(),
            })),
            Reply::NetworkFailure(message) => Err(HttpError::Network(message.clone())),
        }
    }
}

struct ScriptedResponse {
    status: u16,
    body: String,
}

#[async_trait]
impl HttpResponse for ScriptedResponse {
    fn status(&self) -> u16 {
        self.status
    }

    async fn json(self: Box<Self>) -> Result<Value, HttpError> {
        serde_json::from_str(&self.body).map_err(|e| HttpError::Parse(e.to_string()))
    }

    async fn text(self: Box<Self>) -> Result<String, HttpError> {
        let ScriptedResponse { body, .. } = *self;
        Ok(body)
    }
}

/// A dispatcher that keeps every action it is handed.
#[derive(Default)]
pub struct RecordingDispatch {
    actions: Mutex<Vec<Action>>,
}

impl RecordingDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }
}

impl Dispatch for RecordingDispatch {
    fn dispatch(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}
