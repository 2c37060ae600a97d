use std::sync::Arc;

use crate::clients::streaming::StreamingAvailabilityClient;
use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{AvailabilityService, MoodService, StoreAvailabilityCache};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Both upstream clients reuse it so connections are pooled.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("moodreel/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub streaming: Arc<StreamingAvailabilityClient>,

    pub tmdb: Arc<TmdbClient>,

    pub availability: Arc<AvailabilityService>,

    pub mood: Arc<MoodService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires clients and services around an already opened store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.availability.request_timeout_seconds)?;

        let streaming = Arc::new(StreamingAvailabilityClient::new(
            http_client.clone(),
            &config.availability,
        ));
        let tmdb = Arc::new(TmdbClient::new(http_client, &config.tmdb));

        let cache = Arc::new(StoreAvailabilityCache::new(
            store.clone(),
            config.availability.cache_ttl_days,
        ));
        let availability = Arc::new(AvailabilityService::new(cache, streaming.clone()));

        let mood = Arc::new(MoodService::new(
            store.clone(),
            tmdb.clone(),
            config.mood.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            streaming,
            tmdb,
            availability,
            mood,
        })
    }
}
