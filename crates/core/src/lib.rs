//! Core domain types for the toneflow workflow runtime.
//!
//! This crate holds the shared vocabulary every other crate speaks:
//! conversational events, the session that collects them, and the
//! key/value state written by workflow steps. It contains no IO.

pub mod domain;

pub use domain::event::{Content, Event, Part, Role};
pub use domain::session::Session;
pub use domain::state::SessionState;
