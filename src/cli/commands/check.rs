use super::print_json;
use crate::config::Config;
use crate::state::SharedState;
use anyhow::Context;
use serde_json::json;

pub async fn cmd_check(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    let state = SharedState::new(config).await?;
    state
        .store
        .ping()
        .await
        .context("Database is not reachable")?;

    let cached = state.store.count_availability_entries().await?;
    let moods = state.store.list_moods().await?.len();

    print_json(&json!({
        "database": state.config.general.database_path,
        "availabilityConfigured": !state.config.availability.api_key.is_empty(),
        "discoveryEnabled": state.tmdb.is_enabled(),
        "cachedAvailabilityEntries": cached,
        "moods": moods,
    }))
}
