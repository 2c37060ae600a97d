//! CLI module - Command-line interface for moodreel
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// moodreel - mood-based movie recommendations and streaming availability
#[derive(Parser)]
#[command(name = "moodreel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up where a title can be streamed
    #[command(alias = "a", alias = "where")]
    Availability {
        /// Title to search for
        title: Vec<String>,
        /// Release year
        #[arg(long)]
        year: Option<i32>,
        /// External catalog id (distinguishes cache entries)
        #[arg(long)]
        external_id: Option<String>,
        /// Local catalog id stored with the cache entry
        #[arg(long)]
        movie_id: Option<i64>,
        /// Ignore cached results
        #[arg(long)]
        no_cache: bool,
        /// Print the upstream payload unmodified
        #[arg(long)]
        raw: bool,
    },

    /// Recommend movies for a mood
    #[command(alias = "m")]
    Mood {
        /// Free-text mood, e.g. "rainy day, feeling nostalgic"
        #[arg(required = true)]
        text: Vec<String>,
        /// Number of results (1-100)
        #[arg(long)]
        limit: Option<u64>,
        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u64>,
    },

    /// List known moods
    Moods,

    /// Validate config and check database connectivity
    #[command(alias = "-c", alias = "--check")]
    Check,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
