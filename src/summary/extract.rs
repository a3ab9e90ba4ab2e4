// summary/extract.rs — Pulling structure out of free-text provider output.
//
// Chat providers are text generators: the JSON we asked for routinely arrives
// wrapped in prose or a fenced code block. Extraction tries, in order, a
// fenced JSON block, the first brace-delimited substring, then the whole body.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::runs::{RunRecord, RunStatus, SummaryEntry};
use crate::summary::template;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*\})\s*```").unwrap());
static BRACE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\{[\s\S]*\})").unwrap());

/// The structured shape providers are prompted to return. Every field is
/// optional; partial responses are common and get defaulted.
#[derive(Debug, Default, Deserialize)]
pub struct ParsedSummary {
    pub status: Option<String>,
    pub summary: Option<String>,
    pub decision: Option<String>,
}

/// Extract a `ParsedSummary` from raw provider text, or `None` when no
/// candidate substring parses as JSON.
pub fn extract_json(content: &str) -> Option<ParsedSummary> {
    if let Some(caps) = FENCED_JSON.captures(content) {
        if let Ok(parsed) = serde_json::from_str(&caps[1]) {
            return Some(parsed);
        }
    }
    if let Some(caps) = BRACE_BLOCK.captures(content) {
        if let Ok(parsed) = serde_json::from_str(&caps[1]) {
            return Some(parsed);
        }
    }
    serde_json::from_str(content).ok()
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Outcome label derived from the run's own status, used whenever a provider
/// does not supply one.
pub fn derived_status(run: &RunRecord) -> &'static str {
    match run.status {
        RunStatus::Completed => "success",
        RunStatus::Failed => "failed",
    }
}

/// Build an entry from a structured parse, defaulting missing fields:
/// `status` from the run's status, `summary` from the template generator,
/// `decision` stays absent when not supplied.
pub fn entry_from_parsed(run: &RunRecord, parsed: ParsedSummary) -> SummaryEntry {
    SummaryEntry {
        status: parsed
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| derived_status(run).to_string()),
        summary: parsed
            .summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| template::generate(run).summary),
        decision: parsed.decision.filter(|s| !s.is_empty()),
        created_at: Utc::now().to_rfc3339(),
    }
}

/// Build an entry straight from unparseable provider text rather than
/// discarding it. The raw text is bounded to 300 chars; an empty body falls
/// back to the template summary.
pub fn entry_from_raw(run: &RunRecord, raw: &str) -> SummaryEntry {
    let trimmed = raw.trim();
    let summary = if trimmed.is_empty() {
        template::generate(run).summary
    } else {
        truncate_chars(trimmed, 300)
    };
    let decision = match run.status {
        RunStatus::Completed => "Proceed",
        RunStatus::Failed => "Review required",
    };
    SummaryEntry {
        status: derived_status(run).to_string(),
        summary,
        decision: Some(decision.to_string()),
        created_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::TaskKind;

    fn run() -> RunRecord {
        RunRecord::new("r1", TaskKind::Tests, "src/api.rs", "all green", RunStatus::Completed)
    }

    #[test]
    fn extracts_from_fenced_block() {
        let content = "Here you go:\n```json\n{\"status\": \"success\", \"summary\": \"fine\"}\n```\nCheers.";
        let parsed = extract_json(content).unwrap();
        assert_eq!(parsed.status.as_deref(), Some("success"));
        assert_eq!(parsed.summary.as_deref(), Some("fine"));
    }

    #[test]
    fn extracts_first_brace_block_from_prose() {
        let content = "Sure! {\"summary\": \"looks good\", \"decision\": \"proceed\"} hope that helps";
        let parsed = extract_json(content).unwrap();
        assert_eq!(parsed.summary.as_deref(), Some("looks good"));
        assert_eq!(parsed.decision.as_deref(), Some("proceed"));
    }

    #[test]
    fn parses_a_bare_json_body() {
        let parsed = extract_json("{\"status\": \"warning\"}").unwrap();
        assert_eq!(parsed.status.as_deref(), Some("warning"));
    }

    #[test]
    fn plain_prose_yields_none() {
        assert!(extract_json("I could not produce JSON, sorry.").is_none());
    }

    #[test]
    fn missing_fields_are_defaulted_from_the_run() {
        let entry = entry_from_parsed(&run(), ParsedSummary::default());
        assert_eq!(entry.status, "success");
        assert!(entry.summary.contains("Test Generation"));
        assert!(entry.decision.is_none());
    }

    #[test]
    fn raw_fallback_bounds_and_labels() {
        let long: String = "x".repeat(500);
        let entry = entry_from_raw(&run(), &long);
        assert_eq!(entry.summary.chars().count(), 300);
        assert_eq!(entry.decision.as_deref(), Some("Proceed"));
    }

    #[test]
    fn truncate_respects_multibyte_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
