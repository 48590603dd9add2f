use serde_json::{Map, Value};

use super::pick_fields;
use crate::services::Transcription;

pub const TRANSCRIPTION_FIELDS: &[&str] = &["text", "task", "language", "duration"];

pub const SEGMENT_FIELDS: &[&str] = &[
    "id",
    "seek",
    "start",
    "end",
    "text",
    "tokens",
    "temperature",
    "avg_logprob",
    "compression_ratio",
    "no_speech_prob",
];

pub const WORD_FIELDS: &[&str] = &["word", "start", "end"];

fn pick_each(items: &[Map<String, Value>], allowed: &[&str]) -> Value {
    Value::Array(
        items
            .iter()
            .map(|item| Value::Object(pick_fields(item, allowed)))
            .collect(),
    )
}

/// Segments and words are only carried when asked for; they dwarf the text.
pub fn normalize_transcription(transcription: &Transcription, include_segments: bool) -> Value {
    let mut out = match serde_json::to_value(transcription) {
        Ok(Value::Object(source)) => pick_fields(&source, TRANSCRIPTION_FIELDS),
        _ => Map::new(),
    };

    if include_segments {
        if let Some(segments) = &transcription.segments {
            out.insert("segments".into(), pick_each(segments, SEGMENT_FIELDS));
        }
        if let Some(words) = &transcription.words {
            out.insert("words".into(), pick_each(words, WORD_FIELDS));
        }
    }

    Value::Object(out)
}
