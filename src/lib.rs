pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
pub use config::Config;
use services::{AvailabilityRequest, MoodQuery};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout carries command output.
fn init_tracing(config: &Config) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let json = config.general.json_logs;
    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    init_tracing(&config);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Availability {
            title,
            year,
            external_id,
            movie_id,
            no_cache,
            raw,
        } => {
            config.validate()?;
            let request = AvailabilityRequest {
                title: title.join(" "),
                year,
                external_id,
                local_subject_id: movie_id,
                no_cache,
                raw,
            };
            debug!(?request, "Running availability lookup");
            cli::cmd_availability(config, request).await
        }
        Commands::Mood { text, limit, page } => {
            config.validate()?;
            let query = MoodQuery {
                mood_text: Some(text.join(" ")),
                limit,
                page,
            };
            cli::cmd_mood(config, query).await
        }
        Commands::Moods => cli::cmd_list_moods(config).await,
        Commands::Check => cli::cmd_check(config).await,
        Commands::Init => cli::cmd_init(),
    }
}
