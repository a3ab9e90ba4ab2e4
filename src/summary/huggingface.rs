// summary/huggingface.rs — Hugging Face Inference API provider (chain priority 3).
//
// The Inference API returns raw generated text (sometimes wrapped in a
// one-element array), not structured JSON, so this provider builds its entry
// straight from the text instead of going through extraction.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;

use crate::runs::{RunRecord, RunStatus, SummaryEntry};
use crate::summary::extract::{derived_status, truncate_chars};
use crate::summary::provider::SummaryProvider;

const HF_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.2";

/// Bound on the `output_summary` excerpt embedded in the prompt.
const OUTPUT_BUDGET: usize = 500;

pub struct HuggingFaceProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct HfGenerated {
    generated_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HfResponse {
    Many(Vec<HfGenerated>),
    One(HfGenerated),
}

impl HfResponse {
    fn into_text(self) -> String {
        match self {
            HfResponse::Many(v) => v
                .into_iter()
                .next()
                .and_then(|g| g.generated_text)
                .unwrap_or_default(),
            HfResponse::One(g) => g.generated_text.unwrap_or_default(),
        }
    }
}

impl HuggingFaceProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    fn prompt(run: &RunRecord) -> String {
        format!(
            "Analyze this agent task execution and provide a concise summary:\n\n\
             Task: {}\n\
             Status: {}\n\
             Input: {}\n\
             Output: {}\n\n\
             Provide a brief analysis with:\n\
             - Status: success/warning/failed\n\
             - Summary: 2-3 sentences\n\
             - Decision: what to do next",
            run.task_kind.as_str(),
            run.status.as_str(),
            run.input,
            truncate_chars(&run.output_summary, OUTPUT_BUDGET),
        )
    }
}

#[async_trait]
impl SummaryProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn try_generate(&self, run: &RunRecord) -> Result<Option<SummaryEntry>> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(None);
        };

        let resp = self
            .client
            .post(HF_URL)
            .bearer_auth(key)
            .json(&serde_json::json!({ "inputs": Self::prompt(run) }))
            .send()
            .await
            .context("inference request failed")?
            .error_for_status()
            .context("inference endpoint returned an error status")?;

        let body: HfResponse = resp.json().await.context("inference response was not JSON")?;
        let content = body.into_text();
        if content.trim().is_empty() {
            return Ok(None);
        }

        let decision = match run.status {
            RunStatus::Completed => "Proceed with review",
            RunStatus::Failed => "Review required",
        };
        Ok(Some(SummaryEntry {
            status: derived_status(run).to_string(),
            summary: truncate_chars(content.trim(), 300),
            decision: Some(decision.to_string()),
            created_at: Utc::now().to_rfc3339(),
        }))
    }
}
