//! External AI service clients.
//!
//! Every provider sits behind one of the capability traits below. Processors
//! only ever see `Arc<dyn Trait>`, so the concrete client (and its HTTP
//! handle) is built once by the composition root and shared read-only.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::warn;

use crate::config::Settings;
use crate::error::Result;

pub mod gliner;
pub mod groq;
pub mod indictrans;
pub mod mistral;
pub mod ollama;
mod openai_compat;

#[cfg(test)]
pub mod mock;

pub use gliner::GlinerClient;
pub use groq::GroqClient;
pub use indictrans::IndicTransClient;
pub use mistral::MistralClient;
pub use ollama::OllamaClient;

// ---------------------------------------------------------------------------
// chat

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text parts joined with newlines; image parts are skipped.
    pub fn flatten_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::ImageUrl { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: String },
}

/// JSON schema the reply must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    pub name: String,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// First choice of a chat completion, as returned by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub model: Option<String>,
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider_name(&self) -> &str;
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;
}

// ---------------------------------------------------------------------------
// transcription

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub url: String,
    pub model: String,
    pub prompt: Option<String>,
    pub response_format: String,
    pub timestamp_granularities: Vec<String>,
    pub language: Option<String>,
    pub temperature: f32,
}

impl TranscriptionRequest {
    /// Formats whose body is JSON rather than plain text/subtitles.
    pub fn expects_json(&self) -> bool {
        matches!(self.response_format.as_str(), "json" | "verbose_json")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Map<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Map<String, Value>>>,
}

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcription>;
}

// ---------------------------------------------------------------------------
// ocr

pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OcrDocument {
    DocumentUrl { document_url: String },
    ImageUrl { image_url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrRequest {
    pub model: String,
    pub document: OcrDocument,
    pub include_image_base64: bool,
}

impl OcrRequest {
    pub fn new(document: OcrDocument) -> Self {
        Self {
            model: DEFAULT_OCR_MODEL.to_string(),
            document,
            include_image_base64: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub pages: Vec<OcrPage>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrImage {
    pub id: String,
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse>;
}

// ---------------------------------------------------------------------------
// pii

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityQuery {
    pub text: String,
    pub labels: Vec<String>,
    pub threshold: f32,
    pub flat_ner: bool,
}

/// Entity as the recognizer reports it (GLiNER field names).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedEntity {
    pub start: u64,
    pub end: u64,
    pub text: String,
    pub label: String,
    #[serde(default)]
    pub score: Option<f64>,
}

#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn predict_entities(&self, query: &EntityQuery) -> Result<Vec<PredictedEntity>>;
}

// ---------------------------------------------------------------------------
// translation

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRequest {
    pub sentences: Vec<String>,
    pub src_lang: String,
    pub tgt_lang: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translations: Vec<String>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse>;
}

// ---------------------------------------------------------------------------
// wiring

/// One handle per capability, shared by every processor that needs it.
#[derive(Clone)]
pub struct ServiceClients {
    pub transcription: Arc<dyn TranscriptionEngine>,
    pub ocr: Arc<dyn OcrEngine>,
    /// Mistral chat, used for schema-bound structured OCR.
    pub vision_chat: Arc<dyn ChatModel>,
    /// Groq chat, used for plain question answering.
    pub query_chat: Arc<dyn ChatModel>,
    /// Local Ollama chat, used for template extraction.
    pub extraction_chat: Arc<dyn ChatModel>,
    pub recognizer: Arc<dyn EntityRecognizer>,
    pub translator: Arc<dyn Translator>,
}

impl ServiceClients {
    pub fn from_settings(settings: &Settings, client: &Client) -> Self {
        let groq = Arc::new(GroqClient::new(
            client.clone(),
            settings.groq.base_url.clone(),
            settings.groq.api_key.clone(),
        ));
        let mistral = Arc::new(MistralClient::new(
            client.clone(),
            settings.mistral.base_url.clone(),
            settings.mistral.api_key.clone(),
        ));
        if !groq.is_configured() {
            warn!("GROQ_API_KEY is not set, transcription and query tasks will fail");
        }
        if !mistral.is_configured() {
            warn!("MISTRAL_API_KEY is not set, OCR tasks will fail");
        }

        Self {
            transcription: groq.clone(),
            ocr: mistral.clone(),
            vision_chat: mistral,
            query_chat: groq,
            extraction_chat: Arc::new(OllamaClient::new(client.clone(), settings.ollama.base_url.clone())),
            recognizer: Arc::new(GlinerClient::new(
                client.clone(),
                settings.pii.base_url.clone(),
                settings.pii.api_key.clone(),
            )),
            translator: Arc::new(IndicTransClient::new(
                client.clone(),
                settings.translation.base_url.clone(),
                settings.translation.api_key.clone(),
            )),
        }
    }
}
