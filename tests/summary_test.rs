//! Summary chain contract tests: guaranteed termination, template
//! determinism, and the enrichment flow end to end (offline).

use anyhow::Result;
use async_trait::async_trait;

use pilotd::config::ProviderConfig;
use pilotd::enrich::record_and_enrich;
use pilotd::runs::{RunRecord, RunStatus, SummaryEntry, TaskKind};
use pilotd::store::backend::Backend;
use pilotd::store::RunStore;
use pilotd::summary::provider::SummaryProvider;
use pilotd::summary::{template, SummaryChain, TemplateProvider};

/// Stands in for a configured remote provider whose endpoint returns HTTP
/// errors on every call.
struct OutageProvider;

#[async_trait]
impl SummaryProvider for OutageProvider {
    fn name(&self) -> &'static str {
        "outage"
    }
    fn configured(&self) -> bool {
        true
    }
    async fn try_generate(&self, _run: &RunRecord) -> Result<Option<SummaryEntry>> {
        anyhow::bail!("503 Service Unavailable")
    }
}

fn failed_tests_run() -> RunRecord {
    RunRecord::new("r1", TaskKind::Tests, "src/api.rs", "timeout", RunStatus::Failed)
}

#[tokio::test]
async fn chain_with_no_configured_providers_returns_the_template_summary() {
    let chain = SummaryChain::from_config(&ProviderConfig::default());
    let entry = chain.generate(&failed_tests_run()).await;

    assert_eq!(entry.status, "failed");
    assert!(entry.summary.to_lowercase().contains("test"));
    assert_eq!(
        entry.decision.as_deref(),
        Some("Task failed. Review required before proceeding.")
    );
}

#[tokio::test]
async fn all_remote_providers_erroring_yields_exactly_the_template_output() {
    let chain = SummaryChain::new(vec![
        Box::new(OutageProvider),
        Box::new(OutageProvider),
        Box::new(OutageProvider),
        Box::new(TemplateProvider),
    ]);
    let run = failed_tests_run();

    let from_chain = chain.generate(&run).await;
    let from_template = template::generate(&run);
    assert_eq!(from_chain.status, from_template.status);
    assert_eq!(from_chain.summary, from_template.summary);
    assert_eq!(from_chain.decision, from_template.decision);
}

#[tokio::test]
async fn template_generator_is_deterministic() {
    let run = failed_tests_run();
    let a = template::generate(&run);
    let b = template::generate(&run);
    assert_eq!((a.status, a.summary, a.decision), (b.status, b.summary, b.decision));
}

#[tokio::test]
async fn completed_run_gets_success_status_and_review_decision() {
    let run = RunRecord::new("r2", TaskKind::Scaffold, "billing", "4 files", RunStatus::Completed);
    let entry = template::generate(&run);
    assert_eq!(entry.status, "success");
    assert_eq!(
        entry.decision.as_deref(),
        Some("Task completed successfully. Ready for review.")
    );
}

#[tokio::test]
async fn enrichment_attaches_one_summary_to_the_persisted_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = RunStore::with_backend(Backend::None, dir.path().join("runs.json"));
    let chain = SummaryChain::from_config(&ProviderConfig::default());

    record_and_enrich(&store, &chain, failed_tests_run()).await;

    let runs = store.load_all().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, "r1");
    assert_eq!(runs[0].summaries.len(), 1);
    assert_eq!(runs[0].summaries[0].status, "failed");
}

#[tokio::test]
async fn enrichment_failure_never_invalidates_the_record() {
    // An unwritable file path forces every persistence attempt onto the
    // memory tier; the record must still come back enriched and visible.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "in the way").unwrap();
    let store = RunStore::with_backend(Backend::None, blocker.join("runs.json"));
    let chain = SummaryChain::new(vec![Box::new(OutageProvider), Box::new(TemplateProvider)]);

    record_and_enrich(&store, &chain, failed_tests_run()).await;

    let runs = store.load_all().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].summaries.len(), 1);
}
