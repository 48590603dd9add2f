
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, WorkerError};

#[derive(Debug, Deserialize, Serialize)]
pub struct HttpResponse<T> {
    pub code: u16,
    pub message: String,
    pub body: T,
}

impl<T> HttpResponse<T> {
    pub fn new(code: u16, message: String, body: T) -> Self {
        Self { code, message, body }
    }
}

/// Shared client for every provider; the timeout is the only cancellation
/// the workers apply to external calls.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("conductor-ai-workers/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into a `Provider` error carrying the body text.
pub async fn check_status(provider: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(WorkerError::Provider {
        provider: provider.to_string(),
        status: status.as_u16(),
        body,
    })
}

/// Fetch a remote file into memory.
pub async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    info!("Starting download from URL: {}", url);

    let response = client.get(url).send().await?;
    let response = check_status("download", response).await?;

    let bytes = response.bytes().await?.to_vec();
    debug!("Downloaded {} bytes", bytes.len());

    Ok(bytes)
}
