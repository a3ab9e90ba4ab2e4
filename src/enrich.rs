// enrich.rs — Record enrichment flow.
//
// Persist a completed/failed run, ask the summary chain for an annotation,
// and append the result to the same record. The insert is the durable part:
// nothing that happens during enrichment may invalidate it.

use tracing::{info, warn};

use crate::runs::RunRecord;
use crate::store::RunStore;
use crate::summary::SummaryChain;

/// Insert `record`, then generate and attach one summary entry.
///
/// Enrichment failure is logged and swallowed; the already-persisted record
/// stays visible either way. The chain itself cannot fail; the only fallible
/// step is the append, which loses to a not-found only if the record was
/// dropped by a concurrent whole-blob overwrite in between.
pub async fn record_and_enrich(store: &RunStore, chain: &SummaryChain, record: RunRecord) {
    let run = record.clone();
    store.insert(record).await;
    info!(run_id = %run.id, task_kind = run.task_kind.as_str(), "run recorded");

    let entry = chain.generate(&run).await;
    match store.append_summary(&run.id, entry).await {
        Ok(()) => info!(run_id = %run.id, "summary attached"),
        Err(e) => warn!(run_id = %run.id, err = %e, "summary append failed (non-fatal)"),
    }
}
