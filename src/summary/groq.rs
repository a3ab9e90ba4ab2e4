// summary/groq.rs — Groq chat provider (chain priority 2).

use anyhow::Result;
use async_trait::async_trait;

use crate::runs::{RunRecord, SummaryEntry};
use crate::summary::chat::{post_chat, ChatMessage, ChatRequest};
use crate::summary::extract::{entry_from_parsed, entry_from_raw, extract_json, truncate_chars};
use crate::summary::provider::SummaryProvider;

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Bound on the `output_summary` excerpt embedded in the prompt.
const OUTPUT_BUDGET: usize = 500;

pub struct GroqProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl GroqProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    fn prompt(run: &RunRecord) -> String {
        format!(
            "You are a senior engineer. Analyze this agent task:\n\n\
             Task: {}\n\
             Status: {}\n\
             Input: {}\n\
             Output: {}\n\n\
             Provide a concise JSON response:\n\
             {{\n  \"status\": \"success|warning|failed\",\n  \"summary\": \"2-3 sentence summary\",\n  \"decision\": \"recommendation\"\n}}",
            run.task_kind.as_str(),
            run.status.as_str(),
            run.input,
            truncate_chars(&run.output_summary, OUTPUT_BUDGET),
        )
    }
}

#[async_trait]
impl SummaryProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, run: &RunRecord) -> Result<Option<SummaryEntry>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let request = ChatRequest {
            model: GROQ_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a senior engineer. Respond with valid JSON only.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(run),
                },
            ],
            max_tokens: 300,
            temperature: 0.3,
        };

        let content = post_chat(&self.client, GROQ_URL, key, &request).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(match extract_json(&content) {
            Some(parsed) => entry_from_parsed(run, parsed),
            None => entry_from_raw(run, &content),
        }))
    }
}
