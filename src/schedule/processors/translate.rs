use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::Result;
use crate::normalize::normalize_translation;
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{TranslationRequest, Translator};

fn translation_request(request: &TaskRequest) -> Result<TranslationRequest> {
    Ok(TranslationRequest {
        sentences: request.require_string_list("text")?,
        src_lang: request.require_str("src")?,
        tgt_lang: request.require_str("dst")?,
    })
}

/// Indic <-> English translation of one sentence or a batch.
#[derive(Clone)]
pub struct TranslateProcessor {
    translator: Arc<dyn Translator>,
}

impl TranslateProcessor {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

#[async_trait]
impl TaskProcessor for TranslateProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::Translate
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        translation_request(request).map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let translation = translation_request(request)?;
        info!(
            "Translate worker called with {} sentence(s) {} -> {}",
            translation.sentences.len(),
            translation.src_lang,
            translation.tgt_lang
        );

        let response = self.translator.translate(&translation).await?;
        normalize_translation(translation.sentences.len(), &response)
    }
}
