use std::num::NonZeroUsize;
use std::time::Duration;

use http::Uri;

/// The document creation endpoint every submission is posted to by default.
pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// Granularity of the refill window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl From<TimeUnit> for Duration {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Nanoseconds => Duration::from_nanos(1),
            TimeUnit::Microseconds => Duration::from_micros(1),
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(60 * 60),
            TimeUnit::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Construction time settings for a [`DocumentSubmitter`](crate::DocumentSubmitter).
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    interval: Duration,
    request_limit: NonZeroUsize,
    endpoint: Uri,
    acquire_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
}

impl SubmitterConfig {
    /// Creates a config admitting `request_limit` requests per `interval`.
    ///
    /// `interval` accepts either a [`Duration`] or a [`TimeUnit`].
    pub fn new(interval: impl Into<Duration>, request_limit: NonZeroUsize) -> Self {
        Self {
            interval: interval.into(),
            request_limit,
            endpoint: Uri::from_static(DEFAULT_ENDPOINT),
            acquire_timeout: None,
            request_timeout: None,
        }
    }

    /// Post to `endpoint` instead of [`DEFAULT_ENDPOINT`].
    pub fn with_endpoint(mut self, endpoint: Uri) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Give up with `SubmitError::Timeout` if no permit frees up within `timeout`.
    ///
    /// Without this, callers wait for as long as it takes.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }

    /// Give up with `SubmitError::Timeout` if the transport has not answered within `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn request_limit(&self) -> NonZeroUsize {
        self.request_limit
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }
}
