//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod analyze;
mod check;
mod config_cmd;
mod session;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "medportal")]
#[command(about = "Medical report upload and analysis client")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the session cache and stored documents
    #[arg(long, global = true, env = "MEDPORTAL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a report image for analysis and show the results
    Analyze {
        /// Report image (JPEG or PNG, up to 10 MB)
        file: PathBuf,
        /// Print the display model as JSON
        #[arg(long)]
        json: bool,
        /// Analysis endpoint URL (overrides config)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Check whether a file would be accepted for upload
    Check {
        /// File to check
        file: PathBuf,
    },

    /// Store a report image in the local document store
    Store {
        /// Report image to store
        file: PathBuf,
    },

    /// Inspect or clear the cached session
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Show the signed-in user and their dashboard
    Show,
    /// Check whether the cached user may open a role's pages
    Access {
        /// Role the pages are restricted to (doctor or patient); omit for any signed-in user
        role: Option<String>,
    },
    /// Sign out locally by removing the cached session
    Clear,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };
    let (settings, config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Analyze {
            file,
            json,
            endpoint,
        } => analyze::cmd_analyze(&settings, &file, json, endpoint.as_deref()).await,
        Commands::Check { file } => check::cmd_check(&file).await,
        Commands::Store { file } => store::cmd_store(&settings, &file).await,
        Commands::Session { command } => match command {
            SessionCommands::Show => session::cmd_session_show(&settings).await,
            SessionCommands::Access { role } => {
                session::cmd_session_access(&settings, role.as_deref()).await
            }
            SessionCommands::Clear => session::cmd_session_clear(&settings).await,
        },
        Commands::Config => config_cmd::cmd_config_show(&settings, &config).await,
    }
}
