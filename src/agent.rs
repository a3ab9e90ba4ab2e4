// agent.rs — Opaque task executor.
//
// The code-generation agent itself is an external collaborator: one chat
// call in, a summary plus a list of file writes out. Nothing here carries
// design weight; a failure simply becomes a run record with failed status
// and the error message as its output summary.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::runs::TaskKind;
use crate::summary::chat::{post_chat, ChatMessage, ChatRequest};

const TOGETHER_URL: &str = "https://api.together.xyz/v1/chat/completions";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    pub task_kind: TaskKind,
    /// Feature name or file path the task targets.
    pub target: String,
    /// Free-form caller context (repo file list, snippets) forwarded verbatim.
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// One file write proposed by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFile {
    pub file_path: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub summary: String,
    #[serde(default)]
    pub files: Vec<AgentFile>,
}

pub struct AgentExecutor {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl AgentExecutor {
    pub fn from_config(cfg: &ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: cfg.together_api_key.clone(),
            model: cfg
                .together_model
                .clone()
                .unwrap_or_else(|| "meta-llama/Llama-3-70b-chat-hf".to_string()),
        }
    }

    /// Run one agent task. With no key configured this degrades to a
    /// simulated result so local development works offline; with a key, a
    /// response that does not parse as a structured result degrades the same
    /// way rather than failing the run.
    pub async fn execute(&self, payload: &AgentPayload) -> Result<AgentResult> {
        let Some(key) = self.api_key.as_deref() else {
            debug!(target = %payload.target, "no agent credential, returning simulated result");
            return Ok(Self::simulated(payload));
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an autonomous dev agent that returns code changes as \
                              structured outputs. Respond with JSON: \
                              {\"summary\": \"...\", \"files\": [{\"filePath\": \"...\", \"contents\": \"...\"}]}"
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: serde_json::to_string_pretty(&serde_json::json!({
                        "taskKind": payload.task_kind.as_str(),
                        "target": payload.target,
                        "context": payload.context,
                    }))
                    .context("failed to serialize agent payload")?,
                },
            ],
            max_tokens: 8000,
            temperature: 0.2,
        };

        let content = post_chat(&self.client, TOGETHER_URL, key, &request).await?;
        match serde_json::from_str::<AgentResult>(&content) {
            Ok(result) => Ok(result),
            Err(e) => {
                debug!(err = %e, "agent response was unstructured, returning simulated result");
                Ok(Self::simulated(payload))
            }
        }
    }

    fn simulated(payload: &AgentPayload) -> AgentResult {
        AgentResult {
            summary: format!(
                "Simulated {} response for {}",
                payload.task_kind.as_str(),
                payload.target
            ),
            files: Vec::new(),
        }
    }
}
