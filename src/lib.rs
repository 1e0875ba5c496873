//! Reducers and HTTP thunks for unidirectional data flow.
//!
//! Declare a [`StateSlice`], register handlers to get [`ActionCreator`]s,
//! and wrap request descriptions in a [`DynamicThunk`] that dispatches
//! the response through whatever [`Dispatch`] the host provides.

pub mod core;
pub mod http;
pub mod thunk;

#[cfg(test)]
pub mod test_support;

pub use crate::core::action::{Action, ActionCreator, Dispatch};
pub use crate::core::state::{ActionTable, Handler, StateSlice};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestClient};
pub use thunk::{DynamicThunk, FailedResponse, RequestDescriptor, Thunk, ThunkError, ThunkOutcome};
