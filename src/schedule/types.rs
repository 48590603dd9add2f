use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Result, WorkerError};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    Greeting,
    DocumentOcr,
    StructuredOcr,
    Transcribe,
    PiiExtraction,
    Query,
    Translate,
    StructuredExtraction,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::Greeting,
        TaskType::DocumentOcr,
        TaskType::StructuredOcr,
        TaskType::Transcribe,
        TaskType::PiiExtraction,
        TaskType::Query,
        TaskType::Translate,
        TaskType::StructuredExtraction,
    ];

    /// Task definition name the deployed workflows schedule this type under.
    pub fn definition_name(&self) -> &'static str {
        match self {
            TaskType::Greeting => "myTask",
            TaskType::DocumentOcr => "OCRTask",
            TaskType::StructuredOcr => "StructuredOCRTask",
            TaskType::Transcribe => "transcribeTask",
            TaskType::PiiExtraction => "piiTask",
            TaskType::Query => "queryTask",
            TaskType::Translate => "InidcToEnglish",
            TaskType::StructuredExtraction => "StructurdTexttoJson",
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        TaskType::ALL
            .iter()
            .copied()
            .find(|t| t.definition_name() == name)
            .ok_or_else(|| format!("Unknown task type: {}", name))
    }
}

impl Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.definition_name())
    }
}

/// Named inputs of one task, as handed over by the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRequest(Map<String, Value>);

impl TaskRequest {
    pub fn new(params: Map<String, Value>) -> Self {
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Absent, null and empty strings all count as missing.
    pub fn require_str(&self, name: &str) -> Result<String> {
        match self.optional_str(name)? {
            Some(value) => Ok(value),
            None => Err(WorkerError::MissingParameter(name.to_string())),
        }
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(WorkerError::invalid(
                name,
                format!("expected a string, got {}", json_type(other)),
            )),
        }
    }

    pub fn optional_f64(&self, name: &str) -> Result<Option<f64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            // workflow expressions often render numbers as strings
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| WorkerError::invalid(name, format!("expected a number, got {:?}", s))),
            Some(other) => Err(WorkerError::invalid(
                name,
                format!("expected a number, got {}", json_type(other)),
            )),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(WorkerError::invalid(name, format!("expected a boolean, got {:?}", s))),
            },
            Some(other) => Err(WorkerError::invalid(
                name,
                format!("expected a boolean, got {}", json_type(other)),
            )),
        }
    }

    /// A single string is wrapped into a one-element list.
    pub fn string_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(WorkerError::invalid(
                        name,
                        format!("expected a list of strings, found {}", json_type(other)),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(WorkerError::invalid(
                name,
                format!("expected a string or list of strings, got {}", json_type(other)),
            )),
        }
    }

    pub fn require_string_list(&self, name: &str) -> Result<Vec<String>> {
        self.string_list(name)?
            .ok_or_else(|| WorkerError::MissingParameter(name.to_string()))
    }
}

impl From<Map<String, Value>> for TaskRequest {
    fn from(params: Map<String, Value>) -> Self {
        Self(params)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// What an adapter hands back for one task. Never an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Completed(Value),
    /// Input rejected before any external call.
    Rejected(String),
    /// Input rejected with a fixed reply that workflows match verbatim.
    Declined(String),
    /// External call or normalization failed.
    Failed(String),
}

impl TaskOutcome {
    pub fn from_error(error: &WorkerError) -> Self {
        match error {
            WorkerError::MissingParameter(_) | WorkerError::InvalidParameter { .. } => {
                TaskOutcome::Rejected(error.to_string())
            }
            _ => TaskOutcome::Failed(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, TaskOutcome::Completed(_))
    }

    pub fn message(&self) -> Option<String> {
        match self {
            TaskOutcome::Completed(_) => None,
            TaskOutcome::Declined(message) => Some(message.clone()),
            TaskOutcome::Rejected(message) | TaskOutcome::Failed(message) => {
                Some(format!("Error: {}", message))
            }
        }
    }

    /// The JSON value delivered to the orchestrator. Every error except a
    /// declined input carries the `Error: ` prefix.
    pub fn into_output(self) -> Value {
        match self {
            TaskOutcome::Completed(value) => value,
            other => Value::String(other.message().unwrap_or_default()),
        }
    }
}

/// Task record returned by the orchestrator's poll endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub task_id: String,
    pub workflow_instance_id: String,
    pub task_type: String,
    pub task_def_name: Option<String>,
    pub reference_task_name: Option<String>,
    pub status: Option<String>,
    pub input_data: Map<String, Value>,
    pub poll_count: u32,
    pub retry_count: u32,
    pub domain: Option<String>,
}

impl Task {
    pub fn definition_name(&self) -> &str {
        self.task_def_name.as_deref().unwrap_or(&self.task_type)
    }

    pub fn request(&self) -> TaskRequest {
        TaskRequest::new(self.input_data.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Completed,
    Failed,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLog {
    pub log: String,
    pub task_id: String,
    pub created_time: i64,
}

/// Result pushed back to the orchestrator for one polled task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub task_id: String,
    pub workflow_instance_id: String,
    pub worker_id: String,
    pub status: TaskStatus,
    pub output_data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_for_incompletion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TaskLog>,
}

/// Objects become the output data directly, anything else goes under `result`.
pub fn output_data(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> TaskRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_definition_names_round_trip() {
        for task_type in TaskType::ALL {
            assert_eq!(task_type.definition_name().parse::<TaskType>().unwrap(), task_type);
        }
        assert!("unknownTask".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_require_str() {
        let req = request(json!({"text": "hi", "empty": "", "none": null, "n": 3}));
        assert_eq!(req.require_str("text").unwrap(), "hi");
        for name in ["empty", "none", "absent"] {
            match req.require_str(name) {
                Err(WorkerError::MissingParameter(p)) => assert_eq!(p, name),
                other => panic!("unexpected: {:?}", other),
            }
        }
        assert!(matches!(req.require_str("n"), Err(WorkerError::InvalidParameter { .. })));
    }

    #[test]
    fn test_numbers_and_booleans() {
        let req = request(json!({"t": 0.2, "s": "0.5", "bad": "warm", "b": true, "bs": "False"}));
        assert_eq!(req.optional_f64("t").unwrap(), Some(0.2));
        assert_eq!(req.optional_f64("s").unwrap(), Some(0.5));
        assert_eq!(req.optional_f64("absent").unwrap(), None);
        assert!(req.optional_f64("bad").is_err());
        assert_eq!(req.optional_bool("b").unwrap(), Some(true));
        assert_eq!(req.optional_bool("bs").unwrap(), Some(false));
    }

    #[test]
    fn test_string_list_wraps_single_string() {
        let req = request(json!({"one": "a", "many": ["a", "b"], "mixed": ["a", 1], "none": []}));
        assert_eq!(req.string_list("one").unwrap(), Some(vec!["a".to_string()]));
        assert_eq!(req.string_list("many").unwrap().unwrap().len(), 2);
        assert!(req.string_list("mixed").is_err());
        assert!(matches!(
            req.require_string_list("none"),
            Err(WorkerError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_outcome_rendering() {
        assert_eq!(TaskOutcome::Completed(json!({"a": 1})).into_output(), json!({"a": 1}));
        assert_eq!(
            TaskOutcome::Declined("No text provided".into()).into_output(),
            json!("No text provided")
        );
        let failed = TaskOutcome::from_error(&WorkerError::Normalize("no choices".into()));
        assert!(failed.is_error());
        assert_eq!(failed.into_output(), json!("Error: Unexpected response shape: no choices"));

        let rejected = TaskOutcome::from_error(&WorkerError::MissingParameter("url".into()));
        assert_eq!(rejected, TaskOutcome::Rejected("Missing required parameter: url".into()));
        assert!(rejected.is_error());
        assert_eq!(rejected.into_output(), json!("Error: Missing required parameter: url"));
    }

    #[test]
    fn test_output_data_wrapping() {
        assert_eq!(Value::Object(output_data(json!({"markdown": "x"}))), json!({"markdown": "x"}));
        assert_eq!(Value::Object(output_data(json!("hello"))), json!({"result": "hello"}));
        assert_eq!(Value::Object(output_data(Value::Null)), json!({"result": null}));
    }

    #[test]
    fn test_polled_task_and_update_wire_shape() {
        let task: Task = serde_json::from_value(json!({
            "taskId": "t-1",
            "workflowInstanceId": "wf-1",
            "taskType": "piiTask",
            "inputData": {"text": "John"},
            "pollCount": 1,
            "responseTimeoutSeconds": 3600
        }))
        .unwrap();
        assert_eq!(task.definition_name(), "piiTask");
        assert_eq!(task.request().require_str("text").unwrap(), "John");

        let update = TaskUpdate {
            task_id: task.task_id.clone(),
            workflow_instance_id: task.workflow_instance_id.clone(),
            worker_id: "worker-a".into(),
            status: TaskStatus::Failed,
            output_data: output_data(json!("Error: boom")),
            reason_for_incompletion: Some("Error: boom".into()),
            logs: vec![],
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({
                "taskId": "t-1",
                "workflowInstanceId": "wf-1",
                "workerId": "worker-a",
                "status": "FAILED",
                "outputData": {"result": "Error: boom"},
                "reasonForIncompletion": "Error: boom"
            })
        );
    }
}
