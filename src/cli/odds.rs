//! Odds command implementation.

use super::output::{format_odds_text, odds_table};
use super::{CliError, OutputFormat};

/// Execute the odds command.
///
/// # Errors
///
/// Returns an error if the JSON output cannot be encoded.
pub(crate) fn execute(format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => print!("{}", format_odds_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&odds_table())?),
    }
    Ok(())
}
