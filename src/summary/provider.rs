use anyhow::Result;
use async_trait::async_trait;

use crate::runs::{RunRecord, SummaryEntry};

/// One candidate in the summary fallback chain.
///
/// `try_generate` yields `Ok(None)` when the provider produced nothing usable
/// (empty body) and `Err` on transport or protocol failure; both cause the
/// chain to move on to the next candidate. A provider whose credential is
/// missing reports `configured() == false` and is skipped without a call;
/// configuration absence is gating, not failure.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Short provider label for log lines.
    fn name(&self) -> &'static str;

    /// Whether the provider's required credential/configuration is present.
    fn configured(&self) -> bool;

    /// Attempt to generate a summary for `run`.
    async fn try_generate(&self, run: &RunRecord) -> Result<Option<SummaryEntry>>;
}
