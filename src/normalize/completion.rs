use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WorkerError};
use crate::services::ChatCompletion;

fn reply_content(completion: &ChatCompletion) -> Result<&str> {
    completion
        .content
        .as_deref()
        .ok_or_else(|| WorkerError::Normalize("chat completion has no content".to_string()))
}

pub fn normalize_chat_text(completion: &ChatCompletion) -> Result<Value> {
    Ok(Value::String(reply_content(completion)?.to_string()))
}

/// Strip a surrounding markdown code fence, if the model added one.
fn strip_fence(content: &str) -> &str {
    let trimmed = content.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let body = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            body.strip_suffix("```").unwrap_or(body).trim()
        }
        None => trimmed,
    }
}

/// Decode the reply as JSON. Anything that is not a JSON document fails with
/// a `Decode` error.
pub fn decode_json_reply(completion: &ChatCompletion) -> Result<Value> {
    let content = reply_content(completion)?;
    Ok(serde_json::from_str(strip_fence(content))?)
}

/// Shape requested from the vision model for structured OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredOcr {
    pub file_name: String,
    pub topics: Vec<String>,
    pub languages: String,
    pub ocr_contents: Map<String, Value>,
}

impl StructuredOcr {
    pub fn json_schema() -> Value {
        serde_json::json!({
            "type": "object",
            "title": "StructuredOCR",
            "properties": {
                "file_name": {"type": "string", "title": "File Name"},
                "topics": {"type": "array", "items": {"type": "string"}, "title": "Topics"},
                "languages": {"type": "string", "title": "Languages"},
                "ocr_contents": {"type": "object", "title": "Ocr Contents"}
            },
            "required": ["file_name", "topics", "languages", "ocr_contents"],
            "additionalProperties": false
        })
    }
}

pub fn normalize_structured_ocr(completion: &ChatCompletion) -> Result<Value> {
    let structured: StructuredOcr = serde_json::from_value(decode_json_reply(completion)?)?;
    Ok(serde_json::to_value(structured)?)
}
