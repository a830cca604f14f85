//! Bearer token authentication.
//!
//! Adds an `Authorization: Bearer <token>` header to all outgoing requests
//! (RFC 6750).

use std::fmt;
use std::sync::Arc;

use super::auth::{AuthLayer, AuthStrategy, set_authorization};
use crate::{Error, Headers, Result};

/// A validated, non-empty API token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    /// Full header value, `Bearer <token>`.
    header_value: Arc<str>,
}

impl BearerToken {
    /// Validate `token` and build the strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when `token` is empty.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(Error::invalid_credential("token"));
        }

        Ok(Self {
            header_value: Arc::from(format!("Bearer {token}")),
        })
    }

    /// The `Authorization` header value this strategy writes.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.header_value
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthStrategy for BearerToken {
    fn scheme(&self) -> &'static str {
        "Bearer"
    }

    fn inject(&self, headers: &mut Headers) {
        set_authorization(headers, &*self.header_value);
    }
}

impl AuthLayer<BearerToken> {
    /// Layer authenticating with an API token.
    ///
    /// With `debug` set, the duration of every delegated round trip is
    /// reported, see [`AuthLayer::with_debug`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when `token` is empty.
    pub fn token(token: impl Into<String>, debug: bool) -> Result<Self> {
        Ok(Self::new(BearerToken::new(token)?).with_debug(debug))
    }
}

/// Configure authentication using an API token.
///
/// Shorthand for [`AuthLayer::token`].
///
/// # Errors
///
/// Returns [`Error::InvalidCredential`] when `token` is empty.
pub fn token_auth(token: impl Into<String>, debug: bool) -> Result<AuthLayer<BearerToken>> {
    AuthLayer::token(token, debug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::AUTHORIZATION;

    #[test]
    fn bearer_header_value() {
        let token = BearerToken::new("tok123").expect("valid token");
        assert_eq!(token.header_value(), "Bearer tok123");

        let mut headers = Headers::new();
        token.inject(&mut headers);
        assert_eq!(
            headers.get(AUTHORIZATION).map(String::as_str),
            Some("Bearer tok123")
        );
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = BearerToken::new("").expect_err("empty token");
        assert!(err.is_invalid_credential());
        assert_eq!(err.credential_field(), Some("token"));

        let err = token_auth(String::new(), true).expect_err("empty token");
        assert!(err.is_invalid_credential());
    }

    #[test]
    fn token_layer_carries_debug_flag() {
        let layer = token_auth("tok123", true).expect("valid token");
        assert!(layer.is_debug());
        assert_eq!(layer.strategy().header_value(), "Bearer tok123");

        let layer = AuthLayer::token("tok123", false).expect("valid token");
        assert!(!layer.is_debug());
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = BearerToken::new("super-secret").expect("valid token");
        let layer = AuthLayer::new(token.clone());

        insta::assert_snapshot!(format!("{token:?}"), @r#"BearerToken { token: "<redacted>" }"#);
        assert!(!format!("{layer:?}").contains("super-secret"));
    }

    #[test]
    fn inject_is_repeatable() {
        let token = BearerToken::new("abc").expect("valid token");
        let mut headers = Headers::new();
        token.inject(&mut headers);
        token.inject(&mut headers);

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get(AUTHORIZATION).map(String::as_str),
            Some("Bearer abc")
        );
    }
}
