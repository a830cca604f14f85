//! Tower middleware injecting credentials into outgoing requests.
//!
//! An [`AuthLayer`] binds an [`AuthStrategy`] to a transport. The resulting
//! [`Auth`] service sets the `Authorization` header on each request, forwards
//! it, and returns the transport's response or error untouched.
//!
//! # Strategies
//!
//! - [`BearerToken`] - `Authorization: Bearer <token>`
//! - [`BasicCredentials`] - `Authorization: Basic <base64(user:pass)>`
//!
//! Any other scheme can be plugged in by implementing [`AuthStrategy`].
//!
//! # Debug timing
//!
//! [`AuthLayer::with_debug`] turns on timing of each delegated round trip for
//! either strategy. Timings go to a [`TimingSink`], by default [`TracingSink`].
//!
//! # Example
//!
//! ```ignore
//! use tollgate::middleware::{basic_auth, token_auth};
//!
//! // Client bound to the default hyper transport
//! let client = token_auth("my-api-token", true)?.client();
//!
//! // Compose with other tower layers
//! use tollgate::middleware::ServiceBuilder;
//! let service = ServiceBuilder::new()
//!     .layer(basic_auth("user", "pass")?)
//!     .service(transport);
//! ```

mod auth;
mod basic_auth;
mod bearer_auth;
mod timing;

pub use auth::{AUTHORIZATION, Auth, AuthLayer, AuthStrategy, set_authorization};
pub use basic_auth::{BasicCredentials, basic_auth};
pub use bearer_auth::{BearerToken, token_auth};
pub use timing::{TimingSink, TracingSink};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
