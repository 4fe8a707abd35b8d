//! [`Transport`] over `reqwest`.
//!
//! Works on both targets: in the browser `reqwest` delegates to
//! `fetch()`, natively it uses its own connection pool. URLs must be
//! absolute on both.

use reqwest::multipart::{Form, Part};
use stowage_core::{HttpResponse, Transport, TransportError, UploadTask};

/// HTTP transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// A transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport using a preconfigured client (timeouts, proxies, ...).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(network)?;
        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
            body: body.to_vec(),
        })
    }
}

fn network(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

/// Credential fields in order, then `file` last; storage hosts reject
/// fields that follow the file part.
fn build_form(task: &UploadTask) -> Result<Form, TransportError> {
    let form = task
        .fields
        .iter()
        .fold(Form::new(), |form, (name, value)| {
            form.text(name.clone(), value.clone())
        });
    let file = Part::bytes(task.file.bytes.clone())
        .file_name(task.file.name.clone())
        .mime_str(&task.file.mime)
        .map_err(|e| TransportError::InvalidRequest(format!("bad MIME type: {e}")))?;
    Ok(form.part("file", file))
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(network)?;
        Self::read(response).await
    }

    async fn post_form(&self, task: &UploadTask) -> Result<HttpResponse, TransportError> {
        let form = build_form(task)?;
        let response = self
            .client
            .post(&task.host)
            .multipart(form)
            .send()
            .await
            .map_err(network)?;
        Self::read(response).await
    }
}
