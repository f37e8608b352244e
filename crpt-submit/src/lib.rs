//! # CRPT Submit
//!
//! `crpt-submit` posts documents to a remote HTTP API without ever exceeding a configured
//! number of requests per time window.
//!
//! ## The Submission Path
//! Every call to [`DocumentSubmitter::submit`] runs the same pipeline:
//!
//! 1. **Admission**: Takes a permit from a [`permit_window::Gate`], waiting for the next
//!    window if all permits are in use.
//! 2. **Serialization**: Encodes the document as JSON with `serde_json`.
//! 3. **Transport**: Sends a `POST` with `Content-Type: application/json` and a `Signature`
//!    header through any `tower::Service` transport, returning the response body for every
//!    HTTP status.
//!
//! A successful send keeps its permit consumed until the next refill. Any failure after
//! admission, including the caller dropping the future mid-flight, hands the permit back before
//! the error is observed.
//!
//! ## Transports
//! The default transport is [`HttpTransport`], a thin adapter over `reqwest`. Tests and other
//! embeddings can supply their own service through [`DocumentSubmitter::with_transport`].

mod config;
mod document;
mod error;
mod submitter;
mod transport;


pub use config::DEFAULT_ENDPOINT;
pub use config::SubmitterConfig;
pub use config::TimeUnit;
pub use document::Document;
pub use document::Product;
pub use error::SubmitError;
pub use submitter::DocumentSubmitter;
pub use transport::HttpTransport;
pub use transport::create_http_client;
