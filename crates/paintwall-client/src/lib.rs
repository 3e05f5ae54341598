//! PaintWall Client
//!
//! Runtime for a drawer connected to a PaintWall server: forwards pointer
//! input to a [`paintwall_core::Canvas`], submits finished events in the
//! background and keeps the local view in step with the server by polling.

mod client;
pub mod config;
mod http;

pub use client::{ClientError, DrawingClient, Submissions};
pub use config::ClientConfig;
pub use http::HttpTransport;
