//! Prelude module for convenient imports.
//!
//! ```ignore
//! use tollgate_core::prelude::*;
//! ```

pub use crate::{
    Error, Headers, HttpClient, HttpClientExt, Method, Request, RequestBuilder, Response, Result,
};
