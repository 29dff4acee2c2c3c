//! Command-line interface for notecard.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, DeleteCommand, ListCommand, OutputFormat, StatusCommand,
};

use crate::logging::Verbosity;

/// notecard - Keep short notes, typed or dictated
///
/// Notes are stored locally and listed newest first. A note can be typed
/// or dictated through a configured speech transcriber.
#[derive(Debug, Parser)]
#[command(name = "notecard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
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
    /// List notes, newest first
    List(ListCommand),

    /// Save a note from the command line
    Add(AddCommand),

    /// Delete a note by id
    Delete(DeleteCommand),

    /// Open the note dialog
    New,

    /// Open the note dialog and start dictating
    Dictate,

    /// Show storage and speech status
    Status(StatusCommand),

    /// View or validate configuration
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
        assert_eq!(Cli::command().get_name(), "notecard");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&["notecard", "new"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["notecard", "-v", "new"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["notecard", "-vv", "new"]).verbosity(), Verbosity::Debug);
        assert_eq!(parse(&["notecard", "-q", "new"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_list() {
        let cli = parse(&["notecard", "list"]);
        match cli.command {
            Command::List(cmd) => {
                assert!(cmd.search.is_none());
                assert_eq!(cmd.format, OutputFormat::Plain);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_with_search() {
        let cli = parse(&["notecard", "list", "--search", "milk", "-f", "json"]);
        match cli.command {
            Command::List(cmd) => {
                assert_eq!(cmd.search.as_deref(), Some("milk"));
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&["notecard", "add", "Buy", "milk"]);
        match cli.command {
            Command::Add(cmd) => assert_eq!(cmd.content(), "Buy milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_requires_text() {
        assert!(Cli::try_parse_from(["notecard", "add"]).is_err());
    }

    #[test]
    fn test_parse_delete() {
        let cli = parse(&["notecard", "delete", "abc"]);
        assert!(matches!(cli.command, Command::Delete(DeleteCommand { ref id }) if id == "abc"));
    }

    #[test]
    fn test_parse_new_and_dictate() {
        assert!(matches!(parse(&["notecard", "new"]).command, Command::New));
        assert!(matches!(parse(&["notecard", "dictate"]).command, Command::Dictate));
    }

    #[test]
    fn test_parse_status_json() {
        let cli = parse(&["notecard", "status", "--json"]);
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: true })));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = parse(&["notecard", "config", "validate", "--file", "/tmp/c.toml"]);
        match cli.command {
            Command::Config(ConfigCommand::Validate { file }) => {
                assert_eq!(file, Some(PathBuf::from("/tmp/c.toml")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["notecard", "-c", "/custom/config.toml", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["notecard", "list", "-v", "-q"]);
        assert_eq!(cli.verbose, 1);
        assert!(cli.quiet);
    }
}
