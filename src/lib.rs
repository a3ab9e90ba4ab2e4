pub mod agent;
pub mod config;
pub mod enrich;
pub mod rest;
pub mod runs;
pub mod store;
pub mod summary;

use std::sync::Arc;

use agent::AgentExecutor;
use config::DaemonConfig;
use store::RunStore;
use summary::SummaryChain;

/// Shared application state passed to every route handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DaemonConfig>,
    /// Tiered run store. Backend selection happened here, once, at startup.
    pub store: Arc<RunStore>,
    /// Summary fallback chain, assembled from configured credentials.
    pub chain: Arc<SummaryChain>,
    /// Opaque task executor.
    pub executor: Arc<AgentExecutor>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Wire up the daemon's components. The store's backend selection is the
    /// only step that may touch the network, and it degrades rather than
    /// fails.
    pub async fn init(config: DaemonConfig) -> Self {
        let store = RunStore::open(&config).await;
        let chain = SummaryChain::from_config(&config.providers);
        let executor = AgentExecutor::from_config(&config.providers);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            chain: Arc::new(chain),
            executor: Arc::new(executor),
            started_at: std::time::Instant::now(),
        }
    }
}
