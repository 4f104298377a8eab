//! Summary command implementation.

use super::{CliError, OutputFormat};
use dicewars::GameSummary;
use std::path::Path;

/// Execute the summary command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a summary.
pub(crate) fn execute(file: &Path, format: OutputFormat) -> Result<(), CliError> {
    let summary = GameSummary::load(file)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", file.display())))?;

    match format {
        OutputFormat::Text => print!("{summary}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
