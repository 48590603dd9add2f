use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::Result;
use crate::normalize::normalize_chat_text;
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{ChatMessage, ChatModel, ChatRequest};

pub const DEFAULT_QUERY_MODEL: &str = "llama3-70b-8192";

#[derive(Clone)]
pub struct QueryProcessor {
    chat: Arc<dyn ChatModel>,
    default_model: String,
}

impl QueryProcessor {
    pub fn new(chat: Arc<dyn ChatModel>) -> Self {
        Self {
            chat,
            default_model: DEFAULT_QUERY_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl TaskProcessor for QueryProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::Query
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        request.require_str("query")?;
        request.optional_str("model")?;
        Ok(())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let query = request.require_str("query")?;
        let model = request
            .optional_str("model")?
            .unwrap_or_else(|| self.default_model.clone());
        info!("Query worker called on {} with model {}", self.chat.provider_name(), model);

        let chat_request = ChatRequest::new(
            model,
            vec![ChatMessage::user(format!("Answer the following question: {}", query))],
        );
        let completion = self.chat.complete(&chat_request).await?;
        normalize_chat_text(&completion)
    }
}
