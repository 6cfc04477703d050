// SPDX-License-Identifier: AGPL-3.0-or-later
//! Burrow CLI
//!
//! Thin front end over the file access dispatch table.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "burrow")]
#[command(author, version, about = "Burrow - pluggable file access", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the per-user config if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the backend root directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Path to list, relative to the root (defaults to the root)
        path: Option<String>,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Show all files including hidden
        #[arg(short, long)]
        all: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,

        /// Print the listing as JSON
        #[arg(long, conflicts_with = "long")]
        json: bool,
    },

    /// Create directories
    Mkdir {
        /// Directory path(s) to create
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Remove directories and everything below them
    Rmdir {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Remove files
    Rm {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print the MIME type of a file
    Mime {
        path: String,
    },

    /// Run a file and wait for it
    Exec {
        path: String,

        /// Arguments passed to the program
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Show the active backend and configuration
    Info,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match commands::load_config(cli.config.as_deref(), cli.root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let state = burrow_backends::init(&config.backend);

    let result = match cli.command {
        Commands::Ls { path, long, all, human, json } => {
            commands::ls(&state, path.as_deref().unwrap_or(""), long, all, human, json).map(|()| ExitCode::SUCCESS)
        }
        Commands::Mkdir { paths } => commands::mkdir(&state, &paths).map(|()| ExitCode::SUCCESS),
        Commands::Rmdir { paths } => commands::rmdir(&state, &paths).map(|()| ExitCode::SUCCESS),
        Commands::Rm { paths } => commands::rm(&state, &paths).map(|()| ExitCode::SUCCESS),
        Commands::Mime { path } => commands::mime(&state, &path).map(|()| ExitCode::SUCCESS),
        Commands::Exec { path, args } => commands::exec(&state, &path, &args),
        Commands::Info => commands::info(&state, &config).map(|()| ExitCode::SUCCESS),
    };

    burrow_backends::deinit(state);

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
