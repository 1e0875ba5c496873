//! # State Slices
//!
//! A `StateSlice` is one named piece of application state plus the table
//! of handlers that evolve it.
//!
//! ```text
//! StateSlice<S>
//! ├── name: String              // e.g. "users"
//! ├── initial_state: S          // used when the host has no state yet
//! └── table: ActionTable<S>     // action type → handler
//! ```
//!
//! The reducer never touches state it has no handler for. Unknown action
//! types hand the state straight back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::core::action::{Action, ActionCreator};
use crate::http::HttpClient;
use crate::thunk::{DynamicThunk, RequestDescriptor};

/// State transition for one action type. Takes the current state by
/// reference and returns the next one.
pub type Handler<S> = Arc<dyn Fn(&S, &Action) -> S + Send + Sync>;

/// Mapping from action type to handler. Last registration for a type wins.
pub struct ActionTable<S> {
    handlers: HashMap<String, Handler<S>>,
}

impl<S> ActionTable<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Stores `handler` under `kind`, returning the handler it replaced.
    pub fn insert(&mut self, kind: String, handler: Handler<S>) -> Option<Handler<S>> {
        self.handlers.insert(kind, handler)
    }

    pub fn get(&self, kind: &str) -> Option<&Handler<S>> {
        self.handlers.get(kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl<S> Default for ActionTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct StateSlice<S> {
    name: String,
    initial_state: S,
    table: ActionTable<S>,
}

impl<S> StateSlice<S>
where
    S: Clone,
{
    pub fn new(name: impl Into<String>, initial_state: S) -> Self {
        Self {
            name: name.into(),
            initial_state,
            table: ActionTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_state(&self) -> &S {
        &self.initial_state
    }

    /// Registers `handler` for `kind` and returns a creator for actions of
    /// that type. Registering the same type twice silently replaces the
    /// earlier handler.
    pub fn register_handler<F>(&mut self, kind: impl Into<String>, handler: F) -> ActionCreator
    where
        F: Fn(&S, &Action) -> S + Send + Sync + 'static,
    {
        let kind = kind.into();
        if self.table.insert(kind.clone(), Arc::new(handler)).is_some() {
            debug!("[{}] handler for '{}' replaced", self.name, kind);
        }
        ActionCreator::new(kind)
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.table.get(kind).is_some()
    }

    /// Registered action types, sorted.
    pub fn action_types(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.table.kinds().map(str::to_string).collect();
        kinds.sort();
        kinds
    }

    /// Computes the next state. `None` stands for "no state yet" and falls
    /// back to a clone of the initial state.
    pub fn reduce(&self, state: Option<S>, action: &Action) -> S {
        let state = state.unwrap_or_else(|| self.initial_state.clone());
        match self.table.get(&action.kind) {
            Some(handler) => handler(&state, action),
            None => state,
        }
    }

    /// The reducer as a plain function, for hosts that want one.
    pub fn reducer(&self) -> impl Fn(Option<S>, &Action) -> S + '_ {
        move |state, action| self.reduce(state, action)
    }

    /// Wraps `describe` into a thunk factory that talks through `client`.
    ///
    /// The slice only namespaces this call. The thunk does not read or
    /// reduce slice state; its actions reach the reducer through dispatch.
    pub fn make_thunk<A, F>(&self, client: Arc<dyn HttpClient>, describe: F) -> DynamicThunk<A>
    where
        F: Fn(A) -> RequestDescriptor + Send + Sync + 'static,
    {
        DynamicThunk::new(client, describe)
    }
}

impl<S> fmt::Debug for StateSlice<S>
where
    S: fmt::Debug + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlice")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .field("action_types", &self.action_types())
            .finish()
    }
}
