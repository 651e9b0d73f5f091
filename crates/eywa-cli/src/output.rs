//! Response rendering.

use anyhow::anyhow;
use eywa_client::Payload;

use crate::cli::OutputFormat;
use crate::context::{CliError, CliResult};

/// Prints a response body in the selected format. Pretty mode re-indents
/// JSON bodies and falls back to the raw text for anything else.
pub(crate) fn print_payload(payload: &Payload, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Raw => println!("{}", payload.body),
        OutputFormat::Pretty => match &payload.json {
            Some(value) => {
                let text = serde_json::to_string_pretty(value)
                    .map_err(|err| CliError::failure(anyhow!("failed to render JSON: {err}")))?;
                println!("{text}");
            }
            None => println!("{}", payload.body),
        },
    }
    Ok(())
}
