//! Typed access to the Masumi registry, payment service and agent endpoints.

pub mod http;
pub mod models;

pub use http::{RemoteResponse, detail_message, excerpt, send};
