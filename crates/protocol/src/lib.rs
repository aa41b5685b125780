//! Wire types for the pre-signed upload backend.
//!
//! Every backend interaction is a single JSON `POST` whose body is
//! `{"action": "<name>", ...params}`. This crate defines the action names,
//! the typed request/response payloads and the error body returned on
//! non-2xx responses.

pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::Action;
pub use envelope::{ActionRequest, ErrorBody};
pub use types::{PartResult, StorageKey};
