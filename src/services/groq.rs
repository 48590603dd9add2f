//! Groq client: Whisper transcription and chat completion over the
//! OpenAI-compatible API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::info;

use super::openai_compat::chat_completion;
use super::{ChatCompletion, ChatModel, ChatRequest, Transcription, TranscriptionEngine, TranscriptionRequest};
use crate::error::Result;
use crate::utils::http::{check_status, download};

const PROVIDER: &str = "groq";
const UPLOAD_FILE_NAME: &str = "audio.mp3";

pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GroqClient {
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

    fn transcription_form(request: &TranscriptionRequest, audio: Vec<u8>) -> Form {
        let mut form = Form::new()
            .part("file", Part::bytes(audio).file_name(UPLOAD_FILE_NAME))
            .text("model", request.model.clone())
            .text("temperature", request.temperature.to_string())
            .text("response_format", request.response_format.clone());

        if let Some(prompt) = &request.prompt {
            form = form.text("prompt", prompt.clone());
        }
        if let Some(language) = &request.language {
            form = form.text("language", language.clone());
        }
        for granularity in &request.timestamp_granularities {
            form = form.text("timestamp_granularities[]", granularity.clone());
        }
        form
    }
}

#[async_trait]
impl TranscriptionEngine for GroqClient {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcription> {
        info!("Transcribing audio from URL: {}", request.url);
        let audio = download(&self.client, &request.url).await?;

        let mut builder = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .multipart(Self::transcription_form(request, audio));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(PROVIDER, builder.send().await?).await?;
        let body = response.text().await?;

        if request.expects_json() {
            Ok(serde_json::from_str(&body)?)
        } else {
            // text, srt and vtt come back as the raw document
            Ok(Transcription {
                text: Some(body),
                ..Default::default()
            })
        }
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        chat_completion(&self.client, PROVIDER, &self.base_url, self.api_key.as_deref(), request).await
    }
}
