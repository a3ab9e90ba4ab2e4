//! Persistent run store contract tests: append ordering, the not-found
//! error, and tier degradation down to process memory.

use pilotd::runs::{RunRecord, RunStatus, SummaryEntry, TaskKind};
use pilotd::store::backend::Backend;
use pilotd::store::{RunStore, StoreError};

fn record(id: &str, status: RunStatus) -> RunRecord {
    RunRecord::new(id, TaskKind::Tests, "src/api.rs", "timeout", status)
}

fn entry(tag: &str) -> SummaryEntry {
    SummaryEntry {
        status: "success".to_string(),
        summary: format!("summary {tag}"),
        decision: None,
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[tokio::test]
async fn appended_summary_becomes_element_zero_and_preserves_prior_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::with_backend(Backend::None, dir.path().join("runs.json"));

    store.insert(record("r1", RunStatus::Completed)).await;
    store.append_summary("r1", entry("first")).await.unwrap();
    store.append_summary("r1", entry("second")).await.unwrap();

    let runs = store.load_all().await;
    let summaries = &runs[0].summaries;
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].summary, "summary second");
    assert_eq!(summaries[1].summary, "summary first");
}

#[tokio::test]
async fn append_to_unknown_run_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let runs_file = dir.path().join("runs.json");
    let store = RunStore::with_backend(Backend::None, runs_file.clone());

    let err = store.append_summary("ghost", entry("x")).await.unwrap_err();
    assert!(matches!(err, StoreError::RunNotFound { .. }));
    assert!(err.to_string().contains("ghost"));
    // No persistence write happened: the file was never created.
    assert!(!runs_file.exists());
}

#[tokio::test]
async fn insert_survives_an_unwritable_file_path_via_the_memory_tier() {
    let dir = tempfile::tempdir().unwrap();
    // The runs-file parent is a regular file, so the directory can never be
    // created and every file-tier write fails.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "in the way").unwrap();
    let store = RunStore::with_backend(Backend::None, blocker.join("runs.json"));

    store.insert(record("mem-only", RunStatus::Failed)).await;

    let runs = store.load_all().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, "mem-only");
}

#[tokio::test]
async fn append_persists_through_the_file_tier_for_later_processes() {
    let dir = tempfile::tempdir().unwrap();
    let runs_file = dir.path().join("runs.json");

    {
        let store = RunStore::with_backend(Backend::None, runs_file.clone());
        store.insert(record("r1", RunStatus::Completed)).await;
        store.append_summary("r1", entry("kept")).await.unwrap();
    }

    // A second store over the same file sees the appended entry.
    let store = RunStore::with_backend(Backend::None, runs_file);
    let runs = store.load_all().await;
    assert_eq!(runs[0].summaries.len(), 1);
    assert_eq!(runs[0].summaries[0].summary, "summary kept");
}

#[tokio::test]
async fn collection_stays_most_recent_first_across_inserts() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::with_backend(Backend::None, dir.path().join("runs.json"));

    for id in ["a", "b", "c"] {
        store.insert(record(id, RunStatus::Completed)).await;
    }

    let ids: Vec<_> = store.load_all().await.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, ["c", "b", "a"]);
}

#[tokio::test]
async fn file_tier_writes_a_pretty_printed_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let runs_file = dir.path().join("runs.json");
    let store = RunStore::with_backend(Backend::None, runs_file.clone());
    store.insert(record("r1", RunStatus::Completed)).await;

    let raw = std::fs::read_to_string(&runs_file).unwrap();
    assert!(raw.starts_with('['));
    assert!(raw.contains('\n'));
    assert!(raw.contains("\"taskKind\": \"tests\""));
}
