use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::TaskProcessor;
use crate::error::{Result, WorkerError};
use crate::normalize::{normalize_structured_ocr, StructuredOcr};
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{
    ChatMessage, ChatModel, ChatRequest, ContentPart, OcrDocument, OcrEngine, OcrRequest,
    ResponseFormat,
};

pub const STRUCTURED_OCR_MODEL: &str = "pixtral-12b-latest";

fn structuring_prompt(markdown: &str) -> String {
    format!(
        "This is the image's OCR in markdown:\n{}\n.\nConvert this into a structured JSON response \
         with the OCR contents in a sensible dictionnary.",
        markdown
    )
}

/// OCR an image, then have the vision model restate it as typed JSON.
#[derive(Clone)]
pub struct StructuredOcrProcessor {
    ocr: Arc<dyn OcrEngine>,
    chat: Arc<dyn ChatModel>,
    model: String,
}

impl StructuredOcrProcessor {
    pub fn new(ocr: Arc<dyn OcrEngine>, chat: Arc<dyn ChatModel>) -> Self {
        Self {
            ocr,
            chat,
            model: STRUCTURED_OCR_MODEL.to_string(),
        }
    }

    async fn first_page_markdown(&self, url: &str) -> Result<String> {
        let mut request = OcrRequest::new(OcrDocument::ImageUrl {
            image_url: url.to_string(),
        });
        request.include_image_base64 = false;

        let response = self.ocr.process(&request).await?;
        response
            .pages
            .into_iter()
            .next()
            .map(|page| page.markdown)
            .ok_or_else(|| WorkerError::Normalize("OCR returned no pages".to_string()))
    }
}

#[async_trait]
impl TaskProcessor for StructuredOcrProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::StructuredOcr
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        request.require_str("URL").map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let url = request.require_str("URL")?;
        info!("Structured OCR worker called with URL: {}", url);

        let markdown = self.first_page_markdown(&url).await?;

        let chat_request = ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::user(vec![
                ContentPart::ImageUrl { image_url: url },
                ContentPart::Text {
                    text: structuring_prompt(&markdown),
                },
            ])],
        )
        .with_temperature(0.0)
        .with_response_format(ResponseFormat {
            name: "StructuredOCR".to_string(),
            schema: StructuredOcr::json_schema(),
        });

        let completion = self.chat.complete(&chat_request).await?;
        normalize_structured_ocr(&completion)
    }
}
