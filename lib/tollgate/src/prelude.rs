//! Prelude module for convenient imports.
//!
//! ```ignore
//! use tollgate::prelude::*;
//! ```

pub use crate::middleware::{
    AuthLayer, AuthStrategy, BasicCredentials, BearerToken, TimingSink, basic_auth, token_auth,
};
pub use crate::{
    ClientConfig, Error, HttpClient, HttpClientExt, HyperClient, HyperTransport, Method, Request,
    RequestBuilder, Response, Result,
};
