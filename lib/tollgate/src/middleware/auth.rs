//! Credential injection middleware.
//!
//! [`AuthLayer`] wraps any transport in an [`Auth`] service. On every request
//! the service lets its [`AuthStrategy`] write the `Authorization` header,
//! forwards the request to the wrapped transport, and hands back exactly what
//! the transport returned.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::trace;

use super::timing::{self, Timing, TimingSink};
use crate::{Headers, HttpClient, HyperClient, Request, Response, Result};

/// Header name written by every strategy.
pub const AUTHORIZATION: &str = "Authorization";

/// A policy for producing the `Authorization` header of a request.
///
/// Strategies are immutable once built and shared between every clone of
/// the service they are bound to, so `inject` takes `&self`.
pub trait AuthStrategy: Send + Sync + 'static {
    /// Authentication scheme name, as it appears in the header value.
    fn scheme(&self) -> &'static str;

    /// Write the credential into `headers`.
    fn inject(&self, headers: &mut Headers);
}

/// Set the `Authorization` header, dropping any existing one regardless of
/// the case its name was written in.
pub fn set_authorization(headers: &mut Headers, value: impl Into<String>) {
    headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));
    headers.insert(AUTHORIZATION.to_string(), value.into());
}

/// Layer that binds an [`AuthStrategy`] to a transport.
///
/// # Example
///
/// ```ignore
/// use tollgate::middleware::AuthLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(AuthLayer::token("my-api-token", false)?)
///     .service(transport);
/// ```
pub struct AuthLayer<S> {
    strategy: Arc<S>,
    timing: Timing,
}

impl<S> Clone for AuthLayer<S> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
            timing: self.timing.clone(),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for AuthLayer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLayer")
            .field("strategy", &self.strategy)
            .field("debug", &self.timing.is_enabled())
            .finish()
    }
}

impl<S: AuthStrategy> AuthLayer<S> {
    /// Create a layer for an already validated strategy, with debug timing off.
    pub fn new(strategy: S) -> Self {
        Self {
            strategy: Arc::new(strategy),
            timing: Timing::new(false),
        }
    }

    /// Enable or disable timing of delegated round trips.
    #[must_use]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.timing.set_enabled(enabled);
        self
    }

    /// Report timings to `sink` instead of the default [`TracingSink`](super::TracingSink).
    ///
    /// This does not enable timing by itself; see [`AuthLayer::with_debug`].
    #[must_use]
    pub fn with_timing_sink(mut self, sink: impl TimingSink) -> Self {
        self.timing.set_sink(Arc::new(sink));
        self
    }

    /// The bound strategy.
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Whether round trips are timed.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.timing.is_enabled()
    }

    /// Build a client that routes every request through this layer and the
    /// default hyper transport.
    #[must_use]
    pub fn client(&self) -> HyperClient {
        HyperClient::builder().with_auth(self.clone()).build()
    }

    /// Build a client that routes every request through this layer and the
    /// given transport.
    #[must_use]
    pub fn client_with<T>(&self, transport: T) -> HyperClient
    where
        T: Service<Request<Bytes>, Response = Response<Bytes>, Error = crate::Error>
            + Clone
            + Send
            + 'static,
        T::Future: Send + 'static,
    {
        HyperClient::builder()
            .transport(transport)
            .with_auth(self.clone())
            .build()
    }
}

impl<S, T> Layer<T> for AuthLayer<S> {
    type Service = Auth<S, T>;

    fn layer(&self, inner: T) -> Self::Service {
        Auth {
            inner,
            strategy: Arc::clone(&self.strategy),
            timing: self.timing.clone(),
        }
    }
}

/// Service that injects credentials into requests before forwarding them.
pub struct Auth<S, T> {
    inner: T,
    strategy: Arc<S>,
    timing: Timing,
}

impl<S, T: Clone> Clone for Auth<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            strategy: Arc::clone(&self.strategy),
            timing: self.timing.clone(),
        }
    }
}

impl<S: fmt::Debug, T: fmt::Debug> fmt::Debug for Auth<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("inner", &self.inner)
            .field("strategy", &self.strategy)
            .field("debug", &self.timing.is_enabled())
            .finish()
    }
}

impl<S: AuthStrategy, T> Auth<S, T> {
    /// Wrap `inner` with the given strategy, debug timing off.
    pub fn new(inner: T, strategy: S) -> Self {
        AuthLayer::new(strategy).layer(inner)
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }

    fn authorize(&self, request: &mut Request<Bytes>) -> Option<timing::Stopwatch> {
        self.strategy.inject(request.headers_mut());
        trace!(
            scheme = self.strategy.scheme(),
            method = request.method().as_str(),
            url = %timing::log_target(request.url()),
            "authorization injected"
        );
        self.timing.watch(request.url())
    }
}

impl<S: AuthStrategy, T: HttpClient> Auth<S, T> {
    /// Inject credentials, forward to the wrapped transport, return its outcome.
    pub async fn round_trip(&self, mut request: Request<Bytes>) -> Result<Response<Bytes>> {
        let watch = self.authorize(&mut request);
        timing::measure(watch, self.inner.execute(request)).await
    }
}

impl<S: AuthStrategy, T: HttpClient> HttpClient for Auth<S, T> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.round_trip(request)
    }
}

impl<S, T> Service<Request<Bytes>> for Auth<S, T>
where
    S: AuthStrategy,
    T: Service<Request<Bytes>>,
    T::Future: Send + 'static,
{
    type Response = T::Response;
    type Error = T::Error;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<T::Response, T::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), T::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        let watch = self.authorize(&mut request);
        let future = self.inner.call(request);
        Box::pin(timing::measure(watch, future))
    }
}
