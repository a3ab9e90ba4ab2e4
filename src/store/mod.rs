// store/mod.rs — Tiered persistent run store.
//
// Canonical source of truth for run records. The whole collection lives under
// one fixed key as a single JSON blob; every mutation re-reads the collection
// and writes it back ("read-modify-write of the whole blob") because the
// durable backends expose only whole-value get/set, with no server-side
// merge. Writes degrade through three tiers: durable backend, local JSON
// file, then the in-process mirror alone.
//
// Known limitation: two concurrent writers can each load collection state N
// and independently write N+1 records; the second whole-blob overwrite
// silently discards the first writer's insertion. This lost-update window is
// accepted and documented; the daemon runs store operations on a single
// process and callers tolerate the race.

pub mod backend;

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::DaemonConfig;
use crate::runs::{RunRecord, SummaryEntry};
use backend::Backend;

/// Fixed collection key: every record for a deployment lives under this one
/// key, not under per-record keys.
pub const RUNS_KEY: &str = "pilotd:runs";

// ─── StoreError ───────────────────────────────────────────────────────────────

/// The only error the store surfaces to callers. Every other failure mode
/// (backend down, unreadable file, malformed blob) degrades to the next tier.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run {run_id} not found")]
    RunNotFound { run_id: String },
}

// ─── RunStore ─────────────────────────────────────────────────────────────────

/// Tiered run-record store.
///
/// Owns the backend handle selected once at construction, the file-tier path,
/// and the in-process mirror. The mirror is fully replaced on every
/// successful load or write, never incrementally patched, and once populated
/// it is the only source the file/memory tier reads from, even if the file
/// on disk has since changed.
pub struct RunStore {
    backend: Backend,
    runs_file: PathBuf,
    mirror: Mutex<Vec<RunRecord>>,
}

impl RunStore {
    /// Select a durable backend per the config and construct the store.
    ///
    /// Selection happens eagerly, here, exactly once; the decision is never
    /// re-evaluated even if the chosen backend later becomes unreachable.
    pub async fn open(config: &DaemonConfig) -> Self {
        let backend = Backend::select(&config.backend).await;
        Self::with_backend(backend, config.runs_file())
    }

    /// Construct a store around an already-selected backend. Used by `open`
    /// and by tests that pin a specific tier.
    pub fn with_backend(backend: Backend, runs_file: PathBuf) -> Self {
        Self {
            backend,
            runs_file,
            mirror: Mutex::new(Vec::new()),
        }
    }

    /// Label of the selected backend tier, for health reporting and logs.
    pub fn backend_label(&self) -> &'static str {
        self.backend.describe()
    }

    /// Load the full collection, most-recent-first. Never errors: a total
    /// failure at every tier yields an empty list.
    pub async fn load_all(&self) -> Vec<RunRecord> {
        if self.backend.is_available() {
            match self.load_from_backend().await {
                Ok(Some(runs)) => {
                    *self.mirror.lock().await = runs.clone();
                    return runs;
                }
                // Key absent: a fresh deployment, not a failure.
                Ok(None) => return Vec::new(),
                Err(e) => {
                    warn!(
                        backend = self.backend.describe(),
                        err = %format!("{e:#}"),
                        "durable load failed, falling back to file/memory tier"
                    );
                }
            }
        }

        // File/memory tier. A populated mirror wins over the file: it is the
        // read cache and, once filled, the sole source for this tier.
        let mut mirror = self.mirror.lock().await;
        if !mirror.is_empty() {
            return mirror.clone();
        }
        match tokio::fs::read_to_string(&self.runs_file).await {
            Ok(raw) => match serde_json::from_str::<Vec<RunRecord>>(&raw) {
                Ok(runs) => {
                    *mirror = runs.clone();
                    runs
                }
                Err(e) => {
                    warn!(path = %self.runs_file.display(), err = %e, "runs file is malformed");
                    mirror.clone()
                }
            },
            // Includes "file does not exist" on first run.
            Err(_) => mirror.clone(),
        }
    }

    /// Insert a new record at the front of the collection.
    ///
    /// Duplicate IDs are accepted; the CLI retries idempotently and the
    /// dashboard keys rows positionally. `summaries` needs no defaulting
    /// here: absent sequences are already normalized to empty on deserialize.
    pub async fn insert(&self, record: RunRecord) {
        let mut runs = self.load_all().await;
        runs.insert(0, record);
        self.persist(runs).await;
    }

    /// Prepend `entry` to the summaries of the record with `run_id`.
    ///
    /// Fails with `RunNotFound`, performing no persistence write, when no
    /// record matches. This is the store's only caller-visible error.
    pub async fn append_summary(
        &self,
        run_id: &str,
        entry: SummaryEntry,
    ) -> Result<(), StoreError> {
        let mut runs = self.load_all().await;
        let Some(run) = runs.iter_mut().find(|r| r.id == run_id) else {
            return Err(StoreError::RunNotFound {
                run_id: run_id.to_string(),
            });
        };
        run.summaries.insert(0, entry);
        self.persist(runs).await;
        Ok(())
    }

    // ─── Tier plumbing ───────────────────────────────────────────────────────

    async fn load_from_backend(&self) -> anyhow::Result<Option<Vec<RunRecord>>> {
        let Some(blob) = self.backend.get(RUNS_KEY).await? else {
            debug!(key = RUNS_KEY, "no run collection in durable backend yet");
            return Ok(None);
        };
        let runs: Vec<RunRecord> = serde_json::from_str(&blob)?;
        debug!(count = runs.len(), backend = self.backend.describe(), "loaded run collection");
        Ok(Some(runs))
    }

    /// Write the whole collection through whichever tier succeeds first.
    /// Always leaves the mirror equal to `runs`, regardless of which tier
    /// actually persisted; a write that reaches no durable medium still
    /// succeeds silently with the records held in memory.
    async fn persist(&self, runs: Vec<RunRecord>) {
        if self.backend.is_available() {
            match serde_json::to_string(&runs) {
                Ok(blob) => match self.backend.set(RUNS_KEY, &blob).await {
                    Ok(()) => {
                        debug!(count = runs.len(), backend = self.backend.describe(), "persisted run collection");
                        *self.mirror.lock().await = runs;
                        return;
                    }
                    Err(e) => {
                        warn!(
                            backend = self.backend.describe(),
                            err = %format!("{e:#}"),
                            "durable write failed, falling back to file tier"
                        );
                    }
                },
                Err(e) => warn!(err = %e, "failed to serialize run collection"),
            }
        }

        if let Err(e) = self.write_file(&runs).await {
            warn!(
                path = %self.runs_file.display(),
                err = %format!("{e:#}"),
                "file write failed, records held in memory only"
            );
        }
        *self.mirror.lock().await = runs;
    }

    async fn write_file(&self, runs: &[RunRecord]) -> anyhow::Result<()> {
        if let Some(parent) = self.runs_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pretty = serde_json::to_string_pretty(runs)?;
        tokio::fs::write(&self.runs_file, pretty).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::{RunStatus, TaskKind};

    fn record(id: &str) -> RunRecord {
        RunRecord::new(id, TaskKind::Scaffold, "billing", "done", RunStatus::Completed)
    }

    fn file_store(dir: &tempfile::TempDir) -> RunStore {
        RunStore::with_backend(Backend::None, dir.path().join("runs.json"))
    }

    #[tokio::test]
    async fn file_tier_round_trips_and_orders_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        store.insert(record("a")).await;
        store.insert(record("b")).await;

        // A fresh store instance must read back from the file, not the mirror.
        let fresh = file_store(&dir);
        let runs = fresh.load_all().await;
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, "b");
        assert_eq!(runs[1].id, "a");
    }

    #[tokio::test]
    async fn populated_mirror_shadows_a_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        store.insert(record("a")).await;

        // Clobber the file behind the store's back. The mirror, once
        // populated, is the sole source for the file/memory tier.
        tokio::fs::write(dir.path().join("runs.json"), "[]").await.unwrap();
        let runs = store.load_all().await;
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, "a");
    }

    #[tokio::test]
    async fn malformed_file_yields_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("runs.json"), "{not json")
            .await
            .unwrap();
        let store = file_store(&dir);
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_ids_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(&dir);
        store.insert(record("dup")).await;
        store.insert(record("dup")).await;
        assert_eq!(store.load_all().await.len(), 2);
    }
}
