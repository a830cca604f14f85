//! Authenticated HTTP transport for Rust.
//!
//! Credentials are injected into the `Authorization` header of every outgoing
//! request by a Tower layer sitting in front of the real transport. Callers
//! build requests as usual; responses and errors come back exactly as the
//! transport produced them.
//!
//! # Example
//!
//! ```ignore
//! use tollgate::prelude::*;
//!
//! // Bearer token, with round-trip timing reported through `tracing`
//! let client = token_auth("my-api-token", true)?.client();
//! let response = client.get("https://api.buildkite.com/v2/user").await?;
//!
//! // Basic auth
//! let client = basic_auth("user", "pass")?.client();
//! ```
//!
//! Both constructors fail with [`Error::InvalidCredential`] when a required
//! field is empty, so a client never exists with unusable credentials.

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod transport;

// Re-export client types
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use transport::HyperTransport;

// Re-export the strategy constructors at the crate root
pub use middleware::{basic_auth, token_auth};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use tollgate_core::{
    Error, Headers, HttpClient, HttpClientExt, Method, Request, RequestBuilder, Response, Result,
};
