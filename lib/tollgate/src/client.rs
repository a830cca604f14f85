//! Client factory: binds an authentication layer to a transport.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;

use crate::middleware::{AuthLayer, AuthStrategy};
use crate::{
    Error, HyperTransport, Request, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// The lock is only held while cloning the service, never across a request.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move {
            std::future::poll_fn(|cx| service.poll_ready(cx)).await?;
            service.call(request).await
        })
    }
}

// ============================================================================
// Public Client
// ============================================================================

/// HTTP client whose requests all flow through the configured layers.
///
/// Cheap to clone; clones share the connection pool and the credentials.
///
/// # Example
///
/// ```ignore
/// use tollgate::{HyperClient, middleware::token_auth};
///
/// let client = token_auth("my-api-token", false)?.client();
///
/// // or, with transport settings
/// let client = HyperClient::builder()
///     .timeout(std::time::Duration::from_secs(10))
///     .with_basic_auth("user", "pass")?
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl tollgate_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.service.call(request).await
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        // The wrapped service is polled for readiness on each call
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperClient`].
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    transport: Option<BoxedService>,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("custom_transport", &self.transport.is_some())
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    // ========================================================================
    // Transport Configuration
    // ========================================================================

    /// Set the request timeout of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout of the default transport.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Replace the default [`HyperTransport`] with `transport`.
    ///
    /// Timeout and pool settings are then the transport's own business.
    #[must_use]
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        T::Future: Send + 'static,
    {
        self.transport = Some(BoxCloneService::new(transport));
        self
    }

    // ========================================================================
    // Middleware
    // ========================================================================

    /// Add a Tower layer to the client.
    ///
    /// Each layer wraps the ones added before it: the last added layer sees
    /// requests first.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send + 'static,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Authenticate every request with `auth`.
    #[must_use]
    pub fn with_auth<S: AuthStrategy>(self, auth: AuthLayer<S>) -> Self {
        self.layer(auth)
    }

    /// Add bearer token authentication, debug timing off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when `token` is empty.
    pub fn with_bearer_auth(self, token: impl Into<String>) -> Result<Self> {
        Ok(self.with_auth(AuthLayer::token(token, false)?))
    }

    /// Add basic authentication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCredential`] when either field is empty.
    pub fn with_basic_auth(
        self,
        username: impl AsRef<str>,
        password: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(self.with_auth(AuthLayer::basic(username, password)?))
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the client with all configured layers.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();

        let mut service = self
            .transport
            .unwrap_or_else(|| BoxCloneService::new(HyperTransport::with_config(config.clone())));

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperClient {
            service: SyncService::new(service),
            config,
        }
    }
}
