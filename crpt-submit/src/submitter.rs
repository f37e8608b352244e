use std::time::Duration;

use http::HeaderName;
use http::HeaderValue;
use http::Method;
use http::Uri;
use http::header::CONTENT_TYPE;
use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::Counter;
use permit_window::Gate;
use permit_window::Permit;
use serde::Serialize;
use tokio::time::timeout;
use tower::BoxError;
use tower::Service;
use tower::ServiceExt;
use tracing::debug;
use tracing::warn;

use crate::Document;
use crate::HttpTransport;
use crate::SubmitError;
use crate::SubmitterConfig;
use crate::create_http_client;

const SIGNATURE: HeaderName = HeaderName::from_static("signature");
const APPLICATION_JSON: HeaderValue = HeaderValue::from_static("application/json");

#[derive(Clone, Debug)]
struct SubmitterMetrics {
    submissions: Counter<u64>,
    permit_waits: Counter<u64>,
}

/// Posts documents to a fixed endpoint, at most `N` per window.
///
/// The submitter owns its [`Gate`]. Dropping the submitter stops the gate's
/// refill task.
#[derive(Debug)]
pub struct DocumentSubmitter<T = HttpTransport> {
    gate: Gate,
    transport: T,
    endpoint: Uri,
    acquire_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    instruments: SubmitterMetrics,
}

impl DocumentSubmitter<HttpTransport> {
    /// Creates a submitter that sends over HTTPS with `reqwest`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: SubmitterConfig) -> Result<Self, SubmitError> {
        let transport = HttpTransport::new(create_http_client()?);
        Self::with_transport(config, transport)
    }
}

impl<T> DocumentSubmitter<T>
where
    T: Service<http::Request<Vec<u8>>, Response = http::Response<String>, Error = BoxError>
        + Clone,
{
    /// Creates a submitter that sends through `transport`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_transport(config: SubmitterConfig, transport: T) -> Result<Self, SubmitError> {
        let gate = Gate::new(config.request_limit(), config.interval())?;
        let meter = global::meter("document_submitter");
        let instruments = SubmitterMetrics {
            submissions: meter.u64_counter("submissions").build(),
            permit_waits: meter.u64_counter("permit_waits").build(),
        };

        Ok(Self {
            gate,
            transport,
            endpoint: config.endpoint().clone(),
            acquire_timeout: config.acquire_timeout(),
            request_timeout: config.request_timeout(),
            instruments,
        })
    }

    /// Submits `document` signed with `signature` and returns the response body.
    ///
    /// Waits for a permit first. The body is returned for every HTTP status,
    /// including 4xx and 5xx. The signature is sent as is.
    ///
    /// # Errors
    ///
    /// Any error after admission returns the permit to the gate before it is
    /// reported. Dropping the returned future does the same.
    pub async fn submit<D>(&self, document: &D, signature: &str) -> Result<String, SubmitError>
    where
        D: Serialize + ?Sized,
    {
        let outcome = self.admit_and_send(document, signature).await;
        let label = match &outcome {
            Ok(_) => "sent",
            Err(SubmitError::Serialization(_)) => "serialization_error",
            Err(SubmitError::Request(_)) => "request_error",
            Err(SubmitError::Network(_)) => "network_error",
            Err(SubmitError::Interrupted) => "interrupted",
            Err(SubmitError::Timeout(_)) => "timeout",
            Err(SubmitError::Gate(_)) => "gate_error",
            Err(SubmitError::Client(_)) => "client_error",
        };
        self.instruments
            .submissions
            .add(1, &[KeyValue::new("outcome", label)]);
        outcome
    }

    /// Submits a [`Document`]. See [`DocumentSubmitter::submit`].
    pub async fn create_document(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<String, SubmitError> {
        self.submit(document, signature).await
    }

    /// Interrupts every caller waiting for a permit and stops refilling.
    pub fn close(&self) {
        self.gate.close();
    }

    pub fn available_permits(&self) -> usize {
        self.gate.available()
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    async fn admit_and_send<D>(&self, document: &D, signature: &str) -> Result<String, SubmitError>
    where
        D: Serialize + ?Sized,
    {
        let permit = self.acquire().await?;

        // From here on, returning early drops `permit`, which releases it.
        let body = serde_json::to_vec(document).inspect_err(|err| {
            warn!(error = %err, "document serialization failed, releasing permit");
        })?;
        let request = http::Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(SIGNATURE, signature)
            .body(body)
            .inspect_err(|err| warn!(error = %err, "invalid request, releasing permit"))?;

        debug!(
            endpoint = %self.endpoint,
            bytes = request.body().len(),
            "sending document"
        );
        let response = self.send(request).await.inspect_err(|err| {
            warn!(error = %err, "document submission failed, releasing permit");
        })?;

        permit.commit();
        debug!(status = %response.status(), "document submitted");
        Ok(response.into_body())
    }

    async fn acquire(&self) -> Result<Permit<'_>, SubmitError> {
        if let Ok(permit) = self.gate.try_acquire() {
            return Ok(permit);
        }

        self.instruments.permit_waits.add(1, &[]);
        debug!(
            capacity = self.gate.capacity(),
            "request limit reached, waiting for a permit"
        );

        let permit = match self.acquire_timeout {
            Some(limit) => timeout(limit, self.gate.acquire())
                .await
                .map_err(|_| SubmitError::Timeout("a permit"))??,
            None => self.gate.acquire().await?,
        };
        Ok(permit)
    }

    async fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<String>, SubmitError> {
        let call = self.transport.clone().oneshot(request);
        let result = match self.request_timeout {
            Some(limit) => timeout(limit, call)
                .await
                .map_err(|_| SubmitError::Timeout("a response"))?,
            None => call.await,
        };
        result.map_err(SubmitError::Network)
    }
}
