// runs.rs — Run record data model.
//
// A `RunRecord` is one logged execution of an automated code-generation task.
// Records are created once, on task completion, and mutated only by prepending
// `SummaryEntry` values to `summaries`. The wire/persisted layout is camelCase
// JSON so the dashboard and webhook callers can consume it directly.

use chrono::Utc;
use serde::{Deserialize, Serialize};

// ─── TaskKind / RunStatus ─────────────────────────────────────────────────────

/// Closed enumeration of task kinds the agent surface accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Scaffold,
    Tests,
    Refactor,
}

impl TaskKind {
    /// Human-readable label used in prompts and template summaries.
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Scaffold => "Scaffolding",
            TaskKind::Tests => "Test Generation",
            TaskKind::Refactor => "Refactoring",
        }
    }

    /// Wire name, e.g. `"scaffold"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Scaffold => "scaffold",
            TaskKind::Tests => "tests",
            TaskKind::Refactor => "refactor",
        }
    }
}

/// Terminal outcome of a task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

// ─── SummaryEntry ─────────────────────────────────────────────────────────────

/// One AI- or template-generated annotation attached to a run record.
///
/// Entries have no identity of their own: they live and die with the owning
/// `RunRecord` and are ordered most-recent-first inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryEntry {
    /// Provider-assigned outcome label; conventionally
    /// `"success"` | `"warning"` | `"failed"`.
    pub status: String,
    /// Free text, bounded by the producing provider (≤ 300–500 chars).
    pub summary: String,
    /// Optional recommendation for what should happen next.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    /// RFC-3339 timestamp of generation (not of the underlying run).
    pub created_at: String,
}

// ─── RunRecord ────────────────────────────────────────────────────────────────

/// One logged execution of a code-generation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRecord {
    /// Opaque unique identifier, assigned by the producer before first
    /// persistence. Duplicate IDs are accepted by the store (idempotent
    /// retries from the CLI produce them); immutable after creation.
    pub id: String,
    pub task_kind: TaskKind,
    /// RFC-3339 timestamp of the task execution itself.
    pub created_at: String,
    /// Free-text description of the task target (feature name or file path).
    pub input: String,
    /// Free-text result or error message produced by the task executor.
    pub output_summary: String,
    pub status: RunStatus,
    /// Generated annotations, most-recent-first. Always present once the
    /// record has been inserted; the store defaults it on insert, not on
    /// first append.
    #[serde(default)]
    pub summaries: Vec<SummaryEntry>,
}

impl RunRecord {
    /// Build a record for a just-finished task, stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        task_kind: TaskKind,
        input: impl Into<String>,
        output_summary: impl Into<String>,
        status: RunStatus,
    ) -> Self {
        Self {
            id: id.into(),
            task_kind,
            created_at: Utc::now().to_rfc3339(),
            input: input.into(),
            output_summary: output_summary.into(),
            status,
            summaries: Vec::new(),
        }
    }
}
