//! Core types for the tollgate authenticated HTTP transport.
//!
//! This crate provides the transport-agnostic pieces used by tollgate:
//! - [`Method`] - HTTP method enum
//! - [`Request`] and [`RequestBuilder`] - HTTP request types
//! - [`Response`] - HTTP response type
//! - [`Error`] and [`Result`] - Error handling
//! - [`HttpClient`] - The underlying transport seam

mod client;
mod error;
mod method;
pub mod prelude;
mod request;
mod response;

pub use client::{HttpClient, HttpClientExt};
pub use error::{Error, Result};
pub use method::Method;
pub use request::{Headers, Request, RequestBuilder};
pub use response::Response;
