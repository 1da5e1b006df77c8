pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ebb")]
#[command(about = "Retire old posts and likes from a social account", long_about = None)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sync new activity, then retire everything past the retention window
    Run,
    /// Seed an empty database from an extracted account archive
    Import {
        /// Directory containing tweet.js and like.js
        path: PathBuf,
        /// Finish an import that was stopped by the rate limit
        #[arg(long)]
        resume: bool,
    },
    /// Pull new posts and likes from the API
    Sync,
    /// Delete old posts and unlike old likes
    Retire,
    /// Like and unlike items the archive marks as liked but the API does not
    Repair {
        /// Minimum number of followers for the item's author
        #[arg(short = 'n', long)]
        min_followers: Option<u64>,

        /// Starting item id (processed from oldest to newest)
        #[arg(long, default_value_t = 0)]
        start_id: i64,
    },
    /// Show what the database currently tracks
    Status,
    /// Run the full cycle periodically in the foreground
    Daemon {
        /// Interval between runs (e.g., "6h", "1d", "30m")
        #[arg(short, long, default_value = "1d")]
        interval: String,

        /// Skip the run on start
        #[arg(long)]
        no_initial_run: bool,
    },
}
