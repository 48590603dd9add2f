//! Response normalizers: provider response in, plain JSON out.
//!
//! Each provider gets an explicit allow-list. Absent or null fields are
//! omitted rather than written as null, and `serde_json::Map` keeps keys
//! sorted, so identical responses always normalize to identical values.

use serde_json::{Map, Value};

mod completion;
mod ocr;
mod pii;
mod transcription;

pub use completion::{decode_json_reply, normalize_chat_text, normalize_structured_ocr, StructuredOcr};
pub use ocr::{combined_markdown, normalize_ocr};
pub use pii::{normalize_entities, normalize_pii, NormalizedEntity};
pub use transcription::{normalize_transcription, SEGMENT_FIELDS, TRANSCRIPTION_FIELDS, WORD_FIELDS};

use crate::error::{Result, WorkerError};
use crate::services::TranslationResponse;

/// Copy the allowed, non-null fields of `source`.
pub fn pick_fields(source: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    allowed
        .iter()
        .filter_map(|field| match source.get(*field) {
            None | Some(Value::Null) => None,
            Some(value) => Some((field.to_string(), value.clone())),
        })
        .collect()
}

/// One translation per input sentence, in input order.
pub fn normalize_translation(expected: usize, response: &TranslationResponse) -> Result<Value> {
    if response.translations.len() != expected {
        return Err(WorkerError::Normalize(format!(
            "expected {} translation(s), got {}",
            expected,
            response.translations.len()
        )));
    }
    Ok(Value::Array(
        response.translations.iter().cloned().map(Value::String).collect(),
    ))
}
