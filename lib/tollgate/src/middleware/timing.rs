//! Debug timing of delegated round trips.
//!
//! When debug is enabled on an [`AuthLayer`](super::AuthLayer), the wall-clock
//! time of each call into the underlying transport is reported to a
//! [`TimingSink`]. The default sink emits a `tracing` event.
//!
//! Targets are reported without userinfo, query or fragment, so credentials
//! embedded in a URL never reach a sink or a log line.

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use url::Url;

/// Receiver for round-trip timings.
///
/// A sink cannot influence the response or error returned to the caller. A
/// panic in [`TimingSink::record`] is caught and logged, unless the binary is
/// built with `panic = "abort"`.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use tollgate::middleware::TimingSink;
///
/// struct Stderr;
///
/// impl TimingSink for Stderr {
///     fn record(&self, target: &url::Url, elapsed: Duration) {
///         eprintln!("{target} took {elapsed:?}");
///     }
/// }
/// ```
pub trait TimingSink: Send + Sync + 'static {
    /// Record the elapsed time of one round trip to `target`.
    ///
    /// `target` is the request URL stripped of userinfo, query and fragment.
    fn record(&self, target: &Url, elapsed: Duration);
}

/// Default sink: a `DEBUG` level `tracing` event per round trip.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TimingSink for TracingSink {
    fn record(&self, target: &Url, elapsed: Duration) {
        // Saturating conversion to u64 (truncates after ~584 million years)
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        debug!(url = %target, elapsed_ms, ?elapsed, "request timing");
    }
}

/// Enabled flag plus the sink timings go to.
#[derive(Clone)]
pub(crate) struct Timing {
    enabled: bool,
    sink: Arc<dyn TimingSink>,
}

impl Timing {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sink: Arc::new(TracingSink),
        }
    }

    pub(crate) const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_sink(&mut self, sink: Arc<dyn TimingSink>) {
        self.sink = sink;
    }

    /// A stopwatch for `target`, or `None` when timing is disabled.
    pub(crate) fn watch(&self, target: &Url) -> Option<Stopwatch> {
        self.enabled.then(|| Stopwatch {
            sink: Arc::clone(&self.sink),
            target: log_target(target),
        })
    }
}

/// Copy of `url` fit for logs: userinfo, query and fragment removed.
pub(crate) fn log_target(url: &Url) -> Url {
    let mut target = url.clone();
    // Only fails for cannot-be-a-base URLs, which have no userinfo
    let _ = target.set_password(None);
    let _ = target.set_username("");
    target.set_query(None);
    target.set_fragment(None);
    target
}

impl fmt::Debug for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timing")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Pending measurement for a single round trip.
pub(crate) struct Stopwatch {
    sink: Arc<dyn TimingSink>,
    target: Url,
}

/// Await `future`, reporting its duration when a stopwatch is present.
///
/// The output of `future` is returned as-is.
pub(crate) async fn measure<F>(watch: Option<Stopwatch>, future: F) -> F::Output
where
    F: Future,
{
    let Some(watch) = watch else {
        return future.await;
    };

    let start = Instant::now();
    let output = future.await;
    let elapsed = start.elapsed();

    let Stopwatch { sink, target } = watch;
    if panic::catch_unwind(AssertUnwindSafe(|| sink.record(&target, elapsed))).is_err() {
        warn!(url = %target, "timing sink panicked, timing dropped");
    }
    output
}
