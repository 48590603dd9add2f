use serde::Serialize;
use serde_json::{json, Value};

use crate::services::PredictedEntity;

/// Detected entity in the shape workflows consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEntity {
    pub word: String,
    pub entity: String,
    pub start: u64,
    pub end: u64,
    pub score: f64,
}

impl From<&PredictedEntity> for NormalizedEntity {
    fn from(entity: &PredictedEntity) -> Self {
        Self {
            word: entity.text.clone(),
            entity: entity.label.clone(),
            start: entity.start,
            end: entity.end,
            score: entity.score.unwrap_or(0.0),
        }
    }
}

/// Detection order is preserved; entities are not sorted by position.
pub fn normalize_entities(entities: &[PredictedEntity]) -> Vec<NormalizedEntity> {
    entities.iter().map(NormalizedEntity::from).collect()
}

pub fn normalize_pii(text: &str, entities: &[PredictedEntity]) -> Value {
    json!({
        "text": text,
        "entities": normalize_entities(entities),
    })
}
