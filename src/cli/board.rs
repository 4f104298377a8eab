//! Board command implementation.

use super::output::JsonBoard;
use super::{CliError, ShapeArgs};
use dicewars::game::generate_board;
use dicewars::Seeds;

/// Execute the board command.
///
/// # Errors
///
/// Returns an error if no board can be generated for the shape.
pub(crate) fn execute(seed: Option<u64>, shape: &ShapeArgs, pretty: bool) -> Result<(), CliError> {
    let seed = seed.unwrap_or_else(|| Seeds::resolve(None, None, None, None).board);
    let shape = shape.shape();
    let board = generate_board(seed, &shape)?;

    let json = JsonBoard::from_board(seed, shape, &board);
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    println!("{text}");
    Ok(())
}
