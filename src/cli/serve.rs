//! Serve command implementation.

use super::{CliError, SeedArgs, ShapeArgs};
use dicewars::logging::init_logging;
use dicewars::{server, GameConfig, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Options of the serve command.
#[derive(Debug)]
pub(crate) struct ServeOptions {
    pub(crate) players: usize,
    pub(crate) listen: SocketAddr,
    pub(crate) seeds: SeedArgs,
    pub(crate) shape: ShapeArgs,
    pub(crate) turn_timeout_ms: u64,
    pub(crate) handshake_timeout_ms: u64,
    pub(crate) max_timeouts: u32,
    pub(crate) max_attacks: Option<u32>,
    pub(crate) report: Option<PathBuf>,
    pub(crate) log_level: String,
}

/// Execute the serve command.
///
/// The summary goes to stdout; logs go to stderr.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the address cannot be
/// bound, or the game could not start.
pub(crate) fn execute(options: ServeOptions) -> Result<(), CliError> {
    init_logging(&options.log_level);

    let game = GameConfig {
        players: options.players,
        shape: options.shape.shape(),
        seeds: options.seeds.resolve(),
        turn_timeout: Duration::from_millis(options.turn_timeout_ms),
        max_consecutive_timeouts: options.max_timeouts,
        max_attacks_per_turn: options.max_attacks,
    };
    game.validate()?;

    let server_config = ServerConfig {
        listen: options.listen,
        handshake_timeout: Duration::from_millis(options.handshake_timeout_ms),
        report: options.report,
        ..ServerConfig::default()
    };

    let summary = server::run(&server_config, game)?;
    print!("{summary}");
    Ok(())
}
