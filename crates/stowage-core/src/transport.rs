//! Network boundary of the widget.
//!
//! The widget only ever issues two kinds of request: a `GET` against
//! the backend API and a multipart `POST` straight to the storage host.
//! [`Transport`] abstracts both so the flow can run against `reqwest`
//! in the browser, a native client in the CLI, or an in-memory fake in
//! tests.

use serde::de::DeserializeOwned;

use crate::form::UploadTask;
use crate::types::WidgetError;

/// Status, status text and raw body of a completed request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase (may be empty).
    pub status_text: String,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with the given status and an empty body.
    #[must_use]
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: Vec::new(),
        }
    }

    /// Attach a body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Exactly `200 OK`, the only status the storage and signature
    /// endpoints treat as success.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Any `2xx` status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, WidgetError> {
        serde_json::from_slice(&self.body).map_err(|e| WidgetError::Decode(e.to_string()))
    }
}

/// Failure to get any response at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, bad MIME type, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS, CORS or timeout failure.
    #[error("network error: {0}")]
    Network(String),
}

/// Performs the widget's HTTP requests.
///
/// Implementations must not interpret status codes; every response,
/// including `4xx`/`5xx`, is returned as `Ok`.
#[allow(async_fn_in_trait)] // single-threaded (WASM, current-thread runtime); Send is not needed
pub trait Transport {
    /// `GET url`.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// `POST` a multipart form to `task.host`: every field of
    /// `task.fields` in order, then the file under the name `file`.
    async fn post_form(&self, task: &UploadTask) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport> Transport for &T {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url).await
    }

    async fn post_form(&self, task: &UploadTask) -> Result<HttpResponse, TransportError> {
        (**self).post_form(task).await
    }
}

impl<T: Transport> Transport for std::rc::Rc<T> {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        (**self).get(url).await
    }

    async fn post_form(&self, task: &UploadTask) -> Result<HttpResponse, TransportError> {
        (**self).post_form(task).await
    }
}
