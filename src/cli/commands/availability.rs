use super::print_json;
use crate::config::Config;
use crate::services::AvailabilityRequest;
use crate::state::SharedState;

pub async fn cmd_availability(config: Config, request: AvailabilityRequest) -> anyhow::Result<()> {
    if request.title.trim().is_empty() && request.external_id.is_none() {
        anyhow::bail!("Provide a title or --external-id");
    }

    let state = SharedState::new(config).await?;
    let response = state.availability.get_availability(&request).await;
    print_json(&response)
}
