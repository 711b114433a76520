use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::{AppState, Metrics, RealtimeHub};
use backend_infrastructure::{
    load_operator_seeds,
    seed_operators,
    AppConfig,
    Argon2CredentialService,
    MemoryStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();

        let store = match config.snapshot_path() {
            Some(path) => Arc::new(MemoryStore::open(path).await?),
            None => {
                info!("no data_path configured, state lives in memory only");
                Arc::new(MemoryStore::in_memory())
            }
        };

        let credentials = Arc::new(Argon2CredentialService);
        let seeds = load_operator_seeds(&config.operators_path).await?;
        let seeded = seed_operators(&store, credentials.as_ref(), seeds).await?;
        info!(seeded, roster = %config.operators_path, "operator roster applied");

        let hub = Arc::new(RealtimeHub::new(runtime_config.broadcast_buffer));
        let state = AppState {
            config: runtime_config,
            event_repo: store.clone(),
            guest_repo: store.clone(),
            ledger: store.clone(),
            prize_repo: store.clone(),
            souvenir_repo: store.clone(),
            operator_repo: store,
            credentials,
            broadcaster: hub.clone(),
            hub,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
