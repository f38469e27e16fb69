//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on, overriding `server.bind`
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// QR code command arguments.
#[derive(Debug, Args)]
pub struct QrCommand {
    /// URL to encode, defaults to `server.public_url`
    #[arg(short, long)]
    pub url: Option<String>,

    /// Edge length in pixels (128-512)
    #[arg(short, long)]
    pub size: Option<u32>,

    /// File to write the SVG to
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_command_debug() {
        let cmd = ServeCommand {
            bind: Some("0.0.0.0:80".to_string()),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("bind"));
        assert!(debug_str.contains("0.0.0.0:80"));
    }

    #[test]
    fn test_qr_command_debug() {
        let cmd = QrCommand {
            url: None,
            size: Some(300),
            output: PathBuf::from("qr.svg"),
        };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("qr.svg"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
