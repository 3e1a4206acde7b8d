//! HTTP transport for the clinic chat stream.
//!
//! Parses and validates `POST {api_prefix}/chat`, opens a session and
//! forwards the driver's frames as a `text/event-stream` body. Dropping the
//! connection drops the receiver, which cancels the stream.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod routes;
pub mod state;

pub use router::build_router;
