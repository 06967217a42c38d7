//! HTTP client for the external rendering backend.
//!
//! The backend owns every job record: it issues ids, advances steps, and
//! eventually attaches a video reference or an error. This crate is the
//! only place that talks to it.

pub mod client;
pub mod error;
pub mod types;

pub use client::{RenderClient, RenderClientConfig};
pub use error::{RenderError, RenderResult};
pub use types::StartJobPayload;
