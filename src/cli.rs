//! Command-line interface for connect_four.

use connect_four::DEFAULT_CONFIG_FILE;
use connect_four::console::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Connect Four - relay server, terminal client and console play
#[derive(Parser, Debug)]
#[command(name = "connect_four")]
#[command(about = "Four-in-a-row on the console or over the network", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay server that pairs clients into games
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds a player may take per move before the game is aborted
        #[arg(long)]
        turn_timeout: Option<u64>,

        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Run the terminal client against a relay server
    Client {
        /// Server host (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Play locally on the console
    Console {
        /// Opponent type; prompts when omitted
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,
    },
}
