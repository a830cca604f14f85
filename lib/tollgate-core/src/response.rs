//! What a transport hands back.
//!
//! The authentication layer never looks inside a [`Response`]. A 401 from the
//! server is a response like any other, and deciding what it means is the
//! caller's job.

use std::collections::HashMap;

use bytes::Bytes;

/// Status, headers and body exactly as the transport produced them.
///
/// Header names are whatever the transport stored. The default hyper
/// transport uses lower-case names and joins repeated fields into one value,
/// so a multi-challenge `WWW-Authenticate` survives intact.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Assemble a response. Transports and test doubles build them this way.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status code, including 401 and 403 from a rejected credential.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// All headers, one entry per name.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Header value by name, ignoring ASCII case.
    ///
    /// Useful for reading `WWW-Authenticate` after a 401.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Raw body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Take the body, dropping status and headers.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Status in `200..300`.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status in `400..500`, which covers credentials the server refused.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status in `500..600`.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl Response<Bytes> {
    /// Body decoded as UTF-8.
    ///
    /// # Errors
    ///
    /// Fails when the body is not valid UTF-8; the bytes are lost in that case.
    pub fn text(self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());

        let response = Response::new(200, headers, Bytes::from(r#"{"id":1}"#));

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert!(response.is_success());
        assert!(!response.is_client_error());
        assert!(!response.is_server_error());
    }

    #[test]
    fn response_status_checks() {
        let response = Response::new(401, HashMap::new(), Bytes::new());
        assert!(response.is_client_error());

        let response = Response::new(503, HashMap::new(), Bytes::new());
        assert!(response.is_server_error());
    }

    #[test]
    fn response_text() {
        let response = Response::new(200, HashMap::new(), Bytes::from("pong"));
        assert_eq!(response.text().expect("utf-8"), "pong");
    }
}
