// summary/chat.rs — Shared OpenAI-compatible chat-completions plumbing.
//
// Together and Groq both speak the `/v1/chat/completions` dialect; only the
// endpoint, model, and prompt differ. No retry and no explicit timeout: a
// single failed attempt is final for that provider in that call, and the
// chain moves on.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// POST a chat request and return the first choice's content, empty string
/// when the provider returned no usable choice.
pub async fn post_chat(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request: &ChatRequest,
) -> Result<String> {
    let resp = client
        .post(url)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await
        .context("chat request failed")?
        .error_for_status()
        .context("chat endpoint returned an error status")?;

    let body: ChatResponse = resp.json().await.context("chat response was not JSON")?;
    Ok(body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
