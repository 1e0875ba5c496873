//! # Actions
//!
//! An `Action` is a tagged value: a type string plus a JSON payload.
//! Handlers registered on a slice are looked up by that type string,
//! so the set of actions is open. Anything can register `"users/created"`.
//!
//! ```text
//! ActionCreator("users/created")  →  create(payload)  →  Action { type, payload }
//! ```
//!
//! Dispatching is the host's job. This crate only describes *what* gets
//! dispatched through the [`Dispatch`] trait.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A state transition request: `{ "type": ..., "payload": ... }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Builds actions of one fixed type. Returned by
/// [`StateSlice::register_handler`](crate::core::state::StateSlice::register_handler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCreator {
    kind: String,
}

impl ActionCreator {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Wraps `payload` in an action of this creator's type. The payload is
    /// carried verbatim, `Value::Null` included.
    pub fn create(&self, payload: Value) -> Action {
        Action::new(self.kind.clone(), payload)
    }
}

/// Host-provided sink for actions.
pub trait Dispatch: Send + Sync {
    fn dispatch(&self, action: Action);
}

impl<F> Dispatch for F
where
    F: Fn(Action) + Send + Sync,
{
    fn dispatch(&self, action: Action) {
        self(action)
    }
}
