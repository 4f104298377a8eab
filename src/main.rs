//! Dice Wars CLI - run a game server and inspect boards, odds and summaries.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

/// Dice Wars - an authoritative territorial dice game server
#[derive(Parser, Debug)]
#[command(name = "dicewars")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Accept players and run one game
    Serve {
        /// Number of players to wait for (2-8)
        #[arg(short = 'n', long, default_value = "2")]
        players: usize,

        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:5005")]
        listen: SocketAddr,

        #[command(flatten)]
        seeds: cli::SeedArgs,

        #[command(flatten)]
        shape: cli::ShapeArgs,

        /// Time a player has for each command, in milliseconds
        #[arg(long, default_value = "10000")]
        turn_timeout_ms: u64,

        /// Time a client has to send its handshake, in milliseconds
        #[arg(long, default_value = "5000")]
        handshake_timeout_ms: u64,

        /// Timeouts in a row before a player forfeits
        #[arg(long, default_value = "3")]
        max_timeouts: u32,

        /// Cap on attacks per turn (default: unlimited)
        #[arg(long)]
        max_attacks: Option<u32>,

        /// Write the summary to this file as well
        #[arg(long)]
        report: Option<PathBuf>,

        /// Log level when RUST_LOG is unset
        #[arg(long, default_value = "info")]
        log_level: String,
    },

    /// Generate a board and print it as JSON
    Board {
        /// Board seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        #[command(flatten)]
        shape: cli::ShapeArgs,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the attack win-probability table
    Odds {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Read a summary file and print it
    Summary {
        /// Summary file written by `serve --report`
        #[arg(required = true)]
        file: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = match args.command {
        Commands::Serve {
            players,
            listen,
            seeds,
            shape,
            turn_timeout_ms,
            handshake_timeout_ms,
            max_timeouts,
            max_attacks,
            report,
            log_level,
        } => cli::serve::execute(cli::serve::ServeOptions {
            players,
            listen,
            seeds,
            shape,
            turn_timeout_ms,
            handshake_timeout_ms,
            max_timeouts,
            max_attacks,
            report,
            log_level,
        }),

        Commands::Board {
            seed,
            shape,
            pretty,
        } => cli::board::execute(seed, &shape, pretty),

        Commands::Odds { format } => cli::odds::execute(format),

        Commands::Summary { file, format } => cli::summary::execute(&file, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
