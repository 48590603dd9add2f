//! Mistral client: OCR endpoint and chat completion (used with a JSON schema
//! response format for structured OCR).

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use super::openai_compat::chat_completion;
use super::{ChatCompletion, ChatModel, ChatRequest, OcrEngine, OcrRequest, OcrResponse};
use crate::error::Result;
use crate::utils::http::check_status;

const PROVIDER: &str = "mistral";

pub struct MistralClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl MistralClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl OcrEngine for MistralClient {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse> {
        info!("Submitting OCR request with model: {}", request.model);

        let mut builder = self
            .client
            .post(format!("{}/ocr", self.base_url))
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(PROVIDER, builder.send().await?).await?;
        let ocr: OcrResponse = serde_json::from_str(&response.text().await?)?;
        info!("OCR returned {} page(s)", ocr.pages.len());
        Ok(ocr)
    }
}

#[async_trait]
impl ChatModel for MistralClient {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        chat_completion(&self.client, PROVIDER, &self.base_url, self.api_key.as_deref(), request).await
    }
}
