// summary/together.rs — Together.ai chat provider (chain priority 1).

use anyhow::Result;
use async_trait::async_trait;

use crate::runs::{RunRecord, SummaryEntry};
use crate::summary::chat::{post_chat, ChatMessage, ChatRequest};
use crate::summary::extract::{entry_from_parsed, entry_from_raw, extract_json, truncate_chars};
use crate::summary::provider::SummaryProvider;

const TOGETHER_URL: &str = "https://api.together.xyz/v1/chat/completions";

/// Bound on the `output_summary` excerpt embedded in the prompt.
const OUTPUT_BUDGET: usize = 500;

pub struct TogetherProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl TogetherProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn prompt(run: &RunRecord) -> String {
        format!(
            "You are a senior engineer reviewing an automated agent task execution.\n\n\
             Task Type: {}\n\
             Status: {}\n\
             Input: {}\n\
             Output Summary: {}\n\n\
             Please provide a concise analysis:\n\
             1. A brief status assessment (one word: \"success\", \"warning\", or \"failed\")\n\
             2. A 2-3 sentence summary of what was accomplished or what went wrong\n\
             3. A decision/recommendation (what should happen next: proceed, review, or fix)\n\n\
             Respond in JSON format:\n\
             {{\n  \"status\": \"success|warning|failed\",\n  \"summary\": \"your summary here\",\n  \"decision\": \"your recommendation here\"\n}}",
            run.task_kind.as_str(),
            run.status.as_str(),
            run.input,
            truncate_chars(&run.output_summary, OUTPUT_BUDGET),
        )
    }
}

#[async_trait]
impl SummaryProvider for TogetherProvider {
    fn name(&self) -> &'static str {
        "together"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, run: &RunRecord) -> Result<Option<SummaryEntry>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a senior engineer providing concise, actionable summaries \
                              of development tasks. Always respond with valid JSON only."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(run),
                },
            ],
            max_tokens: 500,
            temperature: 0.3,
        };

        let content = post_chat(&self.client, TOGETHER_URL, key, &request).await?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(match extract_json(&content) {
            Some(parsed) => entry_from_parsed(run, parsed),
            None => entry_from_raw(run, &content),
        }))
    }
}
