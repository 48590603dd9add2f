use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::{Result, WorkerError};
use crate::normalize::normalize_transcription;
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{TranscriptionEngine, TranscriptionRequest};

pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-large-v3-turbo";
pub const DEFAULT_RESPONSE_FORMAT: &str = "verbose_json";
pub const DEFAULT_GRANULARITIES: &[&str] = &["word", "segment"];

/// Transcription parameters, with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeParams {
    pub request: TranscriptionRequest,
    pub include_segments: bool,
}

impl TranscribeParams {
    pub fn from_request(request: &TaskRequest) -> Result<Self> {
        let url = request.require_str("url")?;
        let temperature = request.optional_f64("temperature")?.unwrap_or(0.0);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(WorkerError::invalid(
                "temperature",
                format!("{} is outside 0..=2", temperature),
            ));
        }

        Ok(Self {
            request: TranscriptionRequest {
                url,
                model: request
                    .optional_str("model")?
                    .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
                prompt: request.optional_str("prompt")?,
                response_format: request
                    .optional_str("response_format")?
                    .unwrap_or_else(|| DEFAULT_RESPONSE_FORMAT.to_string()),
                timestamp_granularities: request
                    .string_list("timestamp_granularities")?
                    .unwrap_or_else(|| DEFAULT_GRANULARITIES.iter().map(|g| g.to_string()).collect()),
                language: request.optional_str("language")?,
                temperature: temperature as f32,
            },
            include_segments: request.optional_bool("include_segments")?.unwrap_or(false),
        })
    }
}

#[derive(Clone)]
pub struct TranscribeProcessor {
    engine: Arc<dyn TranscriptionEngine>,
}

impl TranscribeProcessor {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TaskProcessor for TranscribeProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::Transcribe
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        TranscribeParams::from_request(request).map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let params = TranscribeParams::from_request(request)?;
        info!(
            "Transcribe worker called with url: {} model: {}",
            params.request.url, params.request.model
        );

        let transcription = self.engine.transcribe(&params.request).await?;
        Ok(normalize_transcription(&transcription, params.include_segments))
    }
}
