//! Command-line interface for the `tictactoe` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tictactoe_engine::{Difficulty, Player};

/// Tic-tac-toe against a minimax opponent
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(about = "Tic-tac-toe engine with persistence and result notifications", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Side picked on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Play X and move first
    X,
    /// Play O and let the computer open
    O,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Player::X,
            Side::O => Player::O,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game in the terminal
    Play {
        /// Difficulty: easy, medium or hard
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Side the human plays
        #[arg(long, value_enum)]
        side: Option<Side>,

        /// Player name for recorded results
        #[arg(long, requires = "email")]
        name: Option<String>,

        /// Player email for recorded results
        #[arg(long, requires = "name")]
        email: Option<String>,
    },

    /// Serve JSON-lines requests on stdin/stdout
    Bridge {
        /// Player name for recorded results
        #[arg(long, requires = "email")]
        name: Option<String>,

        /// Player email for recorded results
        #[arg(long, requires = "name")]
        email: Option<String>,
    },

    /// Run the result notification receiver
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the leaderboard
    Leaderboard {
        /// Maximum number of rows
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}
