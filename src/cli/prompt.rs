//! Interactive SKU prompt.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the prompt provides the "run `shipcost` and type SKUs" UX
//!
//! Lookup failures are printed and the loop continues; only I/O errors on the
//! terminal itself end the session early.

use std::io::{BufRead, Write};

use crate::bracket::Resolver;
use crate::error::{AppError, EXIT_FAILURE};
use crate::report::format_lookup;

const EXIT_COMMAND: &str = "exit";

/// Run the prompt loop until `exit` or end of input.
///
/// Returns the number of lookups performed.
pub fn run_prompt<R: BufRead, W: Write>(resolver: &Resolver, mut input: R, output: &mut W) -> Result<usize, AppError> {
    let write_err = |e: std::io::Error| AppError::new(EXIT_FAILURE, format!("Failed to write prompt: {e}"));

    writeln!(output, "Shipping Cost Lookup").map_err(write_err)?;
    writeln!(output, "Type an SKU and press Enter. Type '{EXIT_COMMAND}' to quit.\n").map_err(write_err)?;

    let mut lookups = 0usize;
    loop {
        write!(output, "Enter SKU: ").map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(EXIT_FAILURE, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            // EOF (Ctrl-D or a closed pipe): leave on a fresh line.
            writeln!(output).map_err(write_err)?;
            break;
        }

        let sku = line.trim();
        if sku.is_empty() {
            continue;
        }
        if sku.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }

        lookups += 1;
        writeln!(output, "{}\n", format_lookup(&resolver.resolve(sku))).map_err(write_err)?;
    }

    writeln!(output, "Goodbye!").map_err(write_err)?;
    Ok(lookups)
}
