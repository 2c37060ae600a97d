use super::print_json;
use crate::config::Config;
use crate::services::MoodQuery;
use crate::state::SharedState;

pub async fn cmd_mood(config: Config, query: MoodQuery) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let results = state.mood.analyze_mood(&query).await?;
    print_json(&results)
}

pub async fn cmd_list_moods(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let moods = state.mood.list_moods().await?;

    if moods.is_empty() {
        eprintln!("No moods configured.");
    }
    print_json(&moods)
}
