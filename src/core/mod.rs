//! # Core
//!
//! Slices, actions and the reducer. Nothing in here performs I/O.
//!
//! ```text
//!        register_handler("users/fetched", h)
//!                     │
//!                     ▼
//!   ┌──────────────────────────────────┐
//!   │ StateSlice<S>                    │
//!   │  • name, initial_state           │
//!   │  • ActionTable: type → handler   │
//!   └───────────────┬──────────────────┘
//!                   │ reduce(state, action)
//!                   ▼
//!              next state
//! ```
//!
//! ## Modules
//!
//! - [`action`]: `Action`, `ActionCreator` and the `Dispatch` seam
//! - [`state`]: `StateSlice` and its `ActionTable`
//! - [`config`]: layered settings for the binary

pub mod action;
pub mod config;
pub mod state;
