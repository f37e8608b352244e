use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::time::Duration;

use reqwest::Client;
use tower::BoxError;
use tower::Service;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Builds the `reqwest` client used by [`HttpTransport`].
///
/// Only HTTPS endpoints are allowed. No overall request timeout is set here;
/// that is applied by the submitter when configured.
pub fn create_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .https_only(true)
        .connect_timeout(CONNECTION_TIMEOUT)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .build()
}

/// A `tower::Service` that sends requests with `reqwest`.
///
/// The response body is always read as text and returned, whatever the
/// status code. Only connection and I/O failures become errors.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Service<http::Request<Vec<u8>>> for HttpTransport {
    type Response = http::Response<String>;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Vec<u8>>) -> Self::Future {
        let client = self.client.clone();

        Box::pin(async move {
            let request = reqwest::Request::try_from(req)?;
            let response = client.execute(request).await?;

            let mut builder = http::Response::builder()
                .status(response.status())
                .version(response.version());
            if let Some(headers) = builder.headers_mut() {
                headers.extend(response.headers().clone());
            }

            let body = response.text().await?;
            Ok::<_, BoxError>(builder.body(body)?)
        })
    }
}
