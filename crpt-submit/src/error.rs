use permit_window::GateError;
use tower::BoxError;

/// Errors produced while submitting a document.
///
/// Whenever one of these is returned after admission, the permit taken for
/// the call has already been given back to the gate.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The document could not be encoded as JSON.
    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request could not be built, e.g. the signature is not a legal
    /// header value.
    #[error("Failed to build request: {0}")]
    Request(#[from] http::Error),

    /// The transport failed to deliver the request or read the response.
    ///
    /// HTTP error statuses are not reported here; they come back as ordinary
    /// response bodies.
    #[error("Transport error: {0}")]
    Network(#[source] BoxError),

    /// The gate was closed while the call waited for a permit.
    #[error("Interrupted while waiting for a permit")]
    Interrupted,

    /// A configured acquire or request timeout expired.
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    /// The gate could not be constructed.
    #[error("Gate error: {0}")]
    Gate(GateError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<GateError> for SubmitError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Closed => Self::Interrupted,
            other => Self::Gate(other),
        }
    }
}
