//! Basic authentication.
//!
//! Adds an `Authorization: Basic <base64(user:pass)>` header to all outgoing
//! requests (RFC 7617).

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use super::auth::{AuthLayer, AuthStrategy, set_authorization};
use crate::{Error, Headers, Result};

/// A validated username/password pair.
///
/// The encoded header value is computed once, at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    username: Arc<str>,
    /// Full header value, `Basic <base64(username:password)>`.
    header_value: Arc<str>,
}

impl BasicCredentials {
    /// Validate the pair and build the strategy.
    ///
    /// The username is checked before the password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] naming `username` or `password`
    /// when that field is empty.
    pub fn new(username: impl AsRef<str>, password: impl AsRef<str>) -> Result<Self> {
        let username = username.as_ref();
        let password = password.as_ref();
        if username.is_empty() {
            return Err(Error::invalid_credential("username"));
        }
        if password.is_empty() {
            return Err(Error::invalid_credential("password"));
        }

        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        Ok(Self {
            username: Arc::from(username),
            header_value: Arc::from(format!("Basic {encoded}")),
        })
    }

    /// The username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The `Authorization` header value this strategy writes.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.header_value
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AuthStrategy for BasicCredentials {
    fn scheme(&self) -> &'static str {
        "Basic"
    }

    fn inject(&self, headers: &mut Headers) {
        set_authorization(headers, &*self.header_value);
    }
}

impl AuthLayer<BasicCredentials> {
    /// Layer authenticating with a username and password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when either field is empty.
    pub fn basic(username: impl AsRef<str>, password: impl AsRef<str>) -> Result<Self> {
        Ok(Self::new(BasicCredentials::new(username, password)?))
    }
}

/// Configure authentication using the supplied credentials.
///
/// Shorthand for [`AuthLayer::basic`]. Debug timing can be switched on with
/// [`AuthLayer::with_debug`].
///
/// # Errors
///
/// Returns [`Error::InvalidCredential`] when either field is empty.
pub fn basic_auth(
    username: impl AsRef<str>,
    password: impl AsRef<str>,
) -> Result<AuthLayer<BasicCredentials>> {
    AuthLayer::basic(username, password)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;
    use crate::middleware::AUTHORIZATION;

    #[test]
    fn basic_auth_encodes_correctly() {
        let credentials = BasicCredentials::new("alice", "secret").expect("valid credentials");
        check!(credentials.header_value() == "Basic YWxpY2U6c2VjcmV0");

        // "user:pass" -> "dXNlcjpwYXNz"
        let credentials = BasicCredentials::new("user", "pass").expect("valid credentials");
        check!(credentials.header_value() == "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn encoded_value_decodes_to_pair() {
        for (username, password) in [
            ("alice", "secret"),
            ("bob@example.com", "p:a:s:s"),
            ("üser", "pässwörd"),
            ("a", "b"),
        ] {
            let credentials = BasicCredentials::new(username, password).expect("valid");
            let mut headers = Headers::new();
            credentials.inject(&mut headers);

            let_assert!(Some(value) = headers.get(AUTHORIZATION));
            let_assert!(Some(encoded) = value.strip_prefix("Basic "));
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .expect("standard base64");
            check!(decoded == format!("{username}:{password}").into_bytes());
        }
    }

    #[test]
    fn empty_username_is_rejected_first() {
        let err = BasicCredentials::new("", "x").expect_err("empty username");
        check!(err.credential_field() == Some("username"));

        let err = BasicCredentials::new("", "").expect_err("both empty");
        check!(err.credential_field() == Some("username"));
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = basic_auth("x", "").expect_err("empty password");
        check!(err.is_invalid_credential());
        check!(err.credential_field() == Some("password"));
    }

    #[test]
    fn basic_layer_defaults_to_no_debug() {
        let layer = AuthLayer::basic("user", "pass").expect("valid credentials");
        check!(!layer.is_debug());
        check!(layer.strategy().username() == "user");

        let layer = layer.with_debug(true);
        check!(layer.is_debug());
    }

    #[test]
    fn debug_output_is_redacted() {
        let credentials = BasicCredentials::new("alice", "secret").expect("valid credentials");
        insta::assert_snapshot!(
            format!("{credentials:?}"),
            @r#"BasicCredentials { username: "alice", password: "<redacted>" }"#
        );
    }
}
