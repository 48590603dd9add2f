//! Chat completion wire format shared by the OpenAI-compatible providers
//! (Groq, Mistral).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{ChatCompletion, ChatMessage, ChatRequest, ResponseFormat};
use crate::error::Result;
use crate::utils::http::check_status;

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<Value>,
}

fn response_format_json(format: &ResponseFormat) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": { "name": format.name, "schema": format.schema, "strict": true }
    })
}

/// Content may come back as a plain string or as a list of text chunks.
fn content_text(content: Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text),
        Value::Array(chunks) => {
            let text: Vec<String> = chunks
                .iter()
                .filter_map(|chunk| chunk.get("text").and_then(Value::as_str))
                .map(str::to_string)
                .collect();
            (!text.is_empty()).then(|| text.concat())
        }
        _ => None,
    }
}

pub(crate) async fn chat_completion(
    client: &reqwest::Client,
    provider: &str,
    base_url: &str,
    api_key: Option<&str>,
    request: &ChatRequest,
) -> Result<ChatCompletion> {
    let body = CompletionBody {
        model: &request.model,
        messages: &request.messages,
        temperature: request.temperature,
        response_format: request.response_format.as_ref().map(response_format_json),
    };

    info!("Calling {} chat completion with model: {}", provider, request.model);

    let mut builder = client
        .post(format!("{}/chat/completions", base_url))
        .json(&body);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key);
    }

    let response = check_status(provider, builder.send().await?).await?;
    let completion: CompletionResponse = serde_json::from_str(&response.text().await?)?;

    // an empty choice list is left for the normalizer to reject
    let first = completion.choices.into_iter().next();
    Ok(ChatCompletion {
        model: completion.model,
        finish_reason: first.as_ref().and_then(|c| c.finish_reason.clone()),
        content: first.and_then(|c| c.message.content).and_then(content_text),
    })
}
