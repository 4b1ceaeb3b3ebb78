//! Command-line interface definition.

use clap::{Parser, Subcommand};

/// inkdash - Home Assistant dashboards for e-ink Kindle browsers
#[derive(Parser, Debug)]
#[command(name = "inkdash", version)]
#[command(about = "Serve Home Assistant dashboards to e-ink Kindle browsers", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "INKDASH_CONFIG")]
    pub config: Option<String>,

    /// Subcommand; `serve` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// Inspect or edit the configuration file
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value
        value: String,
    },
    /// Write a default config file
    Init {
        /// Target file instead of the default location
        #[arg(short, long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration as environment variables
    Export {
        /// Format as `--env KEY=VALUE` arguments for docker run
        #[arg(long)]
        docker_env: bool,
    },
}
