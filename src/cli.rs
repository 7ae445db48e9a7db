//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Promgate - Prometheus metrics export service
#[derive(Parser)]
#[command(name = "promgate")]
#[command(version)]
#[command(about = "Conditional Prometheus registry and scrape endpoint", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print a sample configuration file with all defaults
    GenerateConfig {
        /// Write to this path instead of stdout
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}
