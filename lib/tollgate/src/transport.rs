//! Default underlying transport built on hyper-util.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http::header::SET_COOKIE;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower_service::Service;

use crate::{ClientConfig, Error, HttpClient, Request, Response, Result, connector::https_connector};

/// Network transport using a pooled hyper-util client over rustls.
///
/// This is what requests are delegated to once credentials are injected,
/// unless a different transport is supplied.
///
/// # Errors surfaced
///
/// - [`Error::Timeout`] when the request exceeds [`ClientConfig::timeout`]
/// - [`Error::Connection`] for connect and I/O failures
/// - [`Error::Tls`] for handshake and certificate failures
/// - [`Error::InvalidRequest`] when the request cannot be encoded
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let connector = https_connector(&config);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a hyper request from a tollgate request.
    fn build_hyper_request(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    /// Flatten response headers without dropping any value.
    ///
    /// Repeated fields are joined with `", "`. `Set-Cookie` values may contain
    /// commas themselves, so they are joined with `"\n"` instead. Bytes that
    /// are not UTF-8 are decoded lossily.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        let mut flattened = HashMap::with_capacity(headers.keys_len());
        for name in headers.keys() {
            let separator = if *name == SET_COOKIE { "\n" } else { ", " };
            let values: Vec<_> = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect();
            flattened.insert(name.to_string(), values.join(separator));
        }
        flattened
    }

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = Self::build_hyper_request(request)?;

        let response = tokio::time::timeout(self.config.timeout, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let response_headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::connection(e.to_string()))?
            .to_bytes();

        Ok(Response::new(status, response_headers, body))
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();
        let detail = std::error::Error::source(&err)
            .map(ToString::to_string)
            .unwrap_or_default()
            .to_ascii_lowercase();

        if detail.contains("certificate") || detail.contains("tls") || detail.contains("handshake")
        {
            return Error::tls(format!("{msg}: {detail}"));
        }

        Error::connection(msg)
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperTransport {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.send(request).await
    }
}

impl Service<Request<Bytes>> for HyperTransport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.send(request).await })
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;
    use crate::Method;

    #[test]
    fn hyper_request_keeps_method_url_headers_and_body() {
        let url = url::Url::parse("https://api.buildkite.com/v2/builds").expect("valid URL");
        let request = Request::builder(Method::Post, url)
            .header("Authorization", "Bearer abc")
            .body(Bytes::from_static(b"{}"))
            .build();

        let hyper_request = HyperTransport::build_hyper_request(request).expect("valid request");

        assert_eq!(*hyper_request.method(), http::Method::POST);
        assert_eq!(
            hyper_request.uri().to_string(),
            "https://api.buildkite.com/v2/builds"
        );
        assert_eq!(
            hyper_request.headers().get("authorization").map(|v| v.as_bytes()),
            Some(&b"Bearer abc"[..])
        );
    }

    #[test]
    fn invalid_header_is_an_invalid_request() {
        let url = url::Url::parse("https://api.buildkite.com/").expect("valid URL");
        let request = Request::<Bytes>::builder(Method::Get, url)
            .header("Authorization", "Bearer line\nbreak")
            .build();

        let err = HyperTransport::build_hyper_request(request).expect_err("invalid header");
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn repeated_response_headers_are_joined() {
        let mut headers = http::HeaderMap::new();
        headers.append("www-authenticate", HeaderValue::from_static("Basic realm=\"a\""));
        headers.append("www-authenticate", HeaderValue::from_static("Bearer realm=\"b\""));
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Expires=Wed, 21 Oct 2026"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2"));

        let flattened = HyperTransport::extract_headers(&headers);

        assert_eq!(flattened.len(), 2);
        assert_eq!(
            flattened.get("www-authenticate").map(String::as_str),
            Some("Basic realm=\"a\", Bearer realm=\"b\"")
        );
        assert_eq!(
            flattened.get("set-cookie").map(String::as_str),
            Some("a=1; Expires=Wed, 21 Oct 2026\nb=2")
        );
    }

    #[test]
    fn non_utf8_header_value_is_kept() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            "x-label",
            HeaderValue::from_bytes(b"caf\xe9").expect("obs-text is a valid header value"),
        );

        let flattened = HyperTransport::extract_headers(&headers);

        assert_eq!(
            flattened.get("x-label").map(String::as_str),
            Some("caf\u{fffd}")
        );
    }

    #[test]
    fn transport_is_debug() {
        let transport = HyperTransport::new();
        assert!(format!("{transport:?}").contains("HyperTransport"));
    }
}
