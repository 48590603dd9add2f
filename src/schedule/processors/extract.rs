use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::Result;
use crate::normalize::decode_json_reply;
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{ChatMessage, ChatModel, ChatRequest};

pub const DEFAULT_EXTRACTION_MODEL: &str = "iodose/nuextract-v1.5";

/// Fill a JSON template from free text with a local extraction model.
#[derive(Clone)]
pub struct StructuredExtractionProcessor {
    chat: Arc<dyn ChatModel>,
    default_model: String,
}

impl StructuredExtractionProcessor {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self {
            chat,
            default_model: DEFAULT_EXTRACTION_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl TaskProcessor for StructuredExtractionProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::StructuredExtraction
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        request.require_str("text")?;
        request.require_str("template")?;
        request.optional_str("model")?;
        Ok(())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let text = request.require_str("text")?;
        let template = request.require_str("template")?;
        let model = request
            .optional_str("model")?
            .unwrap_or_else(|| self.default_model.clone());
        info!("Structured extraction worker called with model {}", model);

        let chat_request = ChatRequest::new(
            model,
            vec![ChatMessage::user(format!("{}\n\n{}", template, text))],
        );
        let completion = self.chat.complete(&chat_request).await?;
        decode_json_reply(&completion)
    }
}
