use anyhow::Result;
use std::io::Write;

use crate::convert::ConversionResult;

/// Serialize a result to its single-line JSON form
pub fn to_json(result: &ConversionResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}

/// Write the result as exactly one newline-terminated JSON line on stdout.
///
/// Nothing else may be written to stdout anywhere in the program; the
/// calling process parses this stream as pure JSON.
pub fn emit(result: &ConversionResult) -> Result<()> {
    let line = to_json(result)?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;

    Ok(())
}
