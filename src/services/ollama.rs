//! Ollama client, `/api/chat` without streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{ChatCompletion, ChatModel, ChatRequest};
use crate::error::Result;
use crate::utils::http::check_status;

const PROVIDER: &str = "ollama";

pub struct OllamaClient {
    client: Client,
    host: String,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaChatBody {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<OllamaReply>,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    #[serde(default)]
    content: Option<String>,
}

impl OllamaClient {
    pub fn new(client: Client, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
        }
    }

    fn body(request: &ChatRequest) -> OllamaChatBody {
        let mut options = serde_json::Map::new();
        if let Some(temperature) = request.temperature {
            options.insert("temperature".into(), json!(temperature));
        }

        OllamaChatBody {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| OllamaMessage {
                    role: m.role.clone(),
                    content: m.content.flatten_text(),
                })
                .collect(),
            stream: false,
            format: request.response_format.as_ref().map(|format| format.schema.clone()),
            options: (!options.is_empty()).then(|| Value::Object(options)),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        info!("Calling ollama chat with model: {}", request.model);

        let response = self
            .client
            .post(format!("{}/api/chat", self.host))
            .json(&Self::body(request))
            .send()
            .await?;
        let response = check_status(PROVIDER, response).await?;
        let reply: OllamaChatResponse = serde_json::from_str(&response.text().await?)?;

        Ok(ChatCompletion {
            model: reply.model,
            content: reply.message.and_then(|m| m.content),
            finish_reason: reply.done_reason,
        })
    }
}
