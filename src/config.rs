//! Configuration and CLI argument handling

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "screentimed")]
#[command(about = "A state-managed HTTP service for tracking screen-time budgets")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20661")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory for the persisted store (defaults to the platform data dir)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Seconds the screen must stay off before the session timer resets
    #[arg(long, default_value = "60")]
    pub session_reset_delay: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Resolve the path of the persisted store file
    pub fn store_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow!("No platform data directory available"))?
                .join("screentimed"),
        };
        Ok(dir.join("store.json"))
    }
}
