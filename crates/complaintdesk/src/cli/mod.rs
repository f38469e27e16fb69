//! Command-line interface for complaintdesk.
//!
//! This module provides the CLI structure for the `complaintdesk` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, ListCommand, QrCommand, ServeCommand};

/// complaintdesk - Maintenance complaints for a residential community
///
/// Serves the resident complaint form and the admin listing, and manages
/// the complaints database.
#[derive(Debug, Parser)]
#[command(name = "complaintdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// Create the complaints table if it does not exist
    Provision,

    /// List stored complaints, newest first
    List(ListCommand),

    /// Write a QR code for the complaint form
    Qr(QrCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "complaintdesk");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["complaintdesk", "provision"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["complaintdesk", "-v", "provision"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["complaintdesk", "-vv", "provision"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["complaintdesk", "-q", "-v", "provision"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_serve() {
        let cli = parse(&["complaintdesk", "serve", "--bind", "0.0.0.0:9000"]);
        match cli.command {
            Command::Serve(cmd) => assert_eq!(cmd.bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_json() {
        let cli = parse(&["complaintdesk", "list", "--json"]);
        assert!(matches!(cli.command, Command::List(ListCommand { json: true })));
    }

    #[test]
    fn test_parse_qr() {
        let cli = parse(&["complaintdesk", "qr", "--size", "300", "--output", "form.svg"]);
        match cli.command {
            Command::Qr(cmd) => {
                assert_eq!(cmd.size, Some(300));
                assert!(cmd.url.is_none());
                assert_eq!(cmd.output, PathBuf::from("form.svg"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_qr_requires_output() {
        assert!(Cli::try_parse_from(["complaintdesk", "qr"]).is_err());
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["complaintdesk", "config", "validate", "--file", "/tmp/c.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["complaintdesk", "-c", "/custom/config.toml", "provision"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }
}
