use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::TaskProcessor;
use crate::error::Result;
use crate::normalize::normalize_ocr;
use crate::schedule::types::{TaskRequest, TaskType};
use crate::services::{OcrDocument, OcrEngine, OcrRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "PDF" => Some(DocumentKind::Pdf),
            "IMAGE" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrParams {
    pub url: String,
    pub document_type: String,
}

impl OcrParams {
    pub fn from_request(request: &TaskRequest) -> Result<Self> {
        Ok(Self {
            url: request.require_str("URL")?,
            document_type: request.require_str("TYPE")?,
        })
    }

    /// `None` for a type the OCR endpoint has no chunk kind for.
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::parse(&self.document_type)
    }

    fn document(&self, kind: DocumentKind) -> OcrDocument {
        match kind {
            DocumentKind::Pdf => OcrDocument::DocumentUrl {
                document_url: self.url.clone(),
            },
            DocumentKind::Image => OcrDocument::ImageUrl {
                image_url: self.url.clone(),
            },
        }
    }
}

/// Document/image to markdown, with images inlined as base64.
#[derive(Clone)]
pub struct DocumentOcrProcessor {
    engine: Arc<dyn OcrEngine>,
}

impl DocumentOcrProcessor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl TaskProcessor for DocumentOcrProcessor {
    fn task_type(&self) -> TaskType {
        TaskType::DocumentOcr
    }

    fn validate_params(&self, request: &TaskRequest) -> Result<()> {
        OcrParams::from_request(request).map(|_| ())
    }

    async fn process(&self, request: &TaskRequest) -> Result<Value> {
        let params = OcrParams::from_request(request)?;
        info!("OCR worker called with URL: {} and TYPE: {}", params.url, params.document_type);

        let Some(kind) = params.kind() else {
            warn!("Unsupported document TYPE {:?}, no markdown produced", params.document_type);
            return Ok(Value::Null);
        };

        let response = self.engine.process(&OcrRequest::new(params.document(kind))).await?;
        Ok(normalize_ocr(&response))
    }
}
