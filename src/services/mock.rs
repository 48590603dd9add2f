//! In-memory fakes of the client traits for processor tests

use async_trait::async_trait;
use std::sync::Mutex;

use super::{
    ChatCompletion, ChatModel, ChatRequest, EntityQuery, EntityRecognizer, OcrEngine, OcrRequest,
    OcrResponse, PredictedEntity, Transcription, TranscriptionEngine, TranscriptionRequest,
    TranslationRequest, TranslationResponse, Translator,
};
use crate::error::{Result, WorkerError};

fn unavailable(message: &str) -> WorkerError {
    WorkerError::Provider {
        provider: "mock".to_string(),
        status: 503,
        body: message.to_string(),
    }
}

/// Replays one canned reply (or failure) and records every request.
pub struct Recorder<Req, Resp> {
    reply: std::result::Result<Resp, String>,
    requests: Mutex<Vec<Req>>,
}

impl<Req: Clone, Resp: Clone> Recorder<Req, Resp> {
    pub fn replying(reply: Resp) -> Self {
        Self {
            reply: Ok(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Req> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn record(&self, request: &Req) -> Result<Resp> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone().map_err(|message| unavailable(&message))
    }
}

pub type MockChat = Recorder<ChatRequest, ChatCompletion>;
pub type MockOcr = Recorder<OcrRequest, OcrResponse>;
pub type MockTranscriber = Recorder<TranscriptionRequest, Transcription>;
pub type MockRecognizer = Recorder<EntityQuery, Vec<PredictedEntity>>;

impl MockChat {
    pub fn replying_text(content: &str) -> Self {
        Self::replying(ChatCompletion {
            model: Some("mock-model".to_string()),
            content: Some(content.to_string()),
            finish_reason: Some("stop".to_string()),
        })
    }
}

#[async_trait]
impl ChatModel for MockChat {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        self.record(request)
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn process(&self, request: &OcrRequest) -> Result<OcrResponse> {
        self.record(request)
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriber {
    async fn transcribe(&self, request: &TranscriptionRequest) -> Result<Transcription> {
        self.record(request)
    }
}

#[async_trait]
impl EntityRecognizer for MockRecognizer {
    async fn predict_entities(&self, query: &EntityQuery) -> Result<Vec<PredictedEntity>> {
        self.record(query)
    }
}

/// Translates by tagging each sentence with the target language.
#[derive(Default)]
pub struct MockTranslator {
    requests: Mutex<Vec<TranslationRequest>>,
}

impl MockTranslator {
    pub fn requests(&self) -> Vec<TranslationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(TranslationResponse {
            translations: request
                .sentences
                .iter()
                .map(|s| format!("[{}] {}", request.tgt_lang, s))
                .collect(),
        })
    }
}
