//! HTTP transport to a PaintWall server.

use paintwall_core::store::BoxFuture;
use paintwall_core::sync::decode_snapshot;
use paintwall_core::{DrawEvent, StrokeTransport, SubmitRequest, TransportError, TransportResult};
use reqwest::header::CACHE_CONTROL;
use reqwest::{Client, Response};

/// Talks to `GET`/`POST /strokes` on a server.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    strokes_url: String,
}

impl HttpTransport {
    /// Create a transport for a server base URL such as `http://localhost:3030`.
    pub fn new(server_url: &str) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(client: Client, server_url: &str) -> Self {
        Self {
            client,
            strokes_url: format!("{}/strokes", server_url.trim_end_matches('/')),
        }
    }

    pub fn strokes_url(&self) -> &str {
        &self.strokes_url
    }
}

fn request_error(e: reqwest::Error) -> TransportError {
    TransportError::Request(e.to_string())
}

/// Turn a non-2xx response into an error carrying its body.
async fn check_status(response: Response) -> TransportResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

impl StrokeTransport for HttpTransport {
    fn fetch_snapshot(&self) -> BoxFuture<'_, TransportResult<Vec<DrawEvent>>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.strokes_url)
                .header(CACHE_CONTROL, "no-store")
                .send()
                .await
                .map_err(request_error)?;
            let body = check_status(response)
                .await?
                .bytes()
                .await
                .map_err(request_error)?;
            decode_snapshot(&body)
        })
    }

    fn submit(&self, event: DrawEvent) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.strokes_url)
                .json(&SubmitRequest { stroke: event })
                .send()
                .await
                .map_err(request_error)?;
            check_status(response).await?;
            Ok(())
        })
    }
}
