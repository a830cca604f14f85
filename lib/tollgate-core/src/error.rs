//! Error types for tollgate.

use derive_more::{Display, Error, From};

/// Main error type for tollgate operations.
///
/// Two families live here. [`Error::InvalidCredential`] is only ever produced
/// while constructing a credential; every other variant comes from the
/// underlying transport and is handed back to the caller untouched by the
/// authentication layer.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A required credential field was empty.
    #[display("invalid credential: empty {field} supplied")]
    #[from(skip)]
    InvalidCredential {
        /// Name of the offending field (`token`, `username` or `password`).
        #[error(not(source))]
        field: &'static str,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The request could not be turned into a wire request.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid credential error for the given field.
    #[must_use]
    pub const fn invalid_credential(field: &'static str) -> Self {
        Self::InvalidCredential { field }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Returns `true` if this error was raised while validating a credential.
    #[must_use]
    pub const fn is_invalid_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential { .. })
    }

    /// Name of the rejected credential field, if any.
    #[must_use]
    pub const fn credential_field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCredential { field } => Some(*field),
            _ => None,
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::invalid_credential("token");
        assert_eq!(err.to_string(), "invalid credential: empty token supplied");

        let err = Error::Timeout;
        assert_eq!(err.to_string(), "request timeout");

        let err = Error::connection("failed to connect");
        assert_eq!(err.to_string(), "connection error: failed to connect");

        let err = Error::tls("bad certificate");
        assert_eq!(err.to_string(), "TLS error: bad certificate");
    }

    #[test]
    fn error_invalid_credential() {
        let err = Error::invalid_credential("password");
        assert!(err.is_invalid_credential());
        assert_eq!(err.credential_field(), Some("password"));

        assert!(!Error::Timeout.is_invalid_credential());
        assert_eq!(Error::Timeout.credential_field(), None);
    }

    #[test]
    fn error_is_timeout() {
        assert!(Error::Timeout.is_timeout());
        assert!(!Error::connection("refused").is_timeout());
    }

    #[test]
    fn error_is_connection() {
        assert!(Error::connection("failed").is_connection());
        assert!(!Error::Timeout.is_connection());
    }

    #[test]
    fn error_from_url_parse() {
        let err: Error = url::Url::parse("not a url")
            .expect_err("should not parse")
            .into();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
