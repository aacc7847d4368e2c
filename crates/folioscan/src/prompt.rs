//! Console prompt for the search target

use std::io::{BufRead, Write};

use color_eyre::eyre::{WrapErr, eyre};

const PROMPT: &str = "Target cumulative return (growth factor, e.g. 1.12 for +12%): ";

/// Ask for the target until a positive finite number is entered.
///
/// Fails when the input ends before a valid answer.
pub fn prompt_target<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> color_eyre::Result<f64> {
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}").wrap_err("Failed to write prompt")?;
        output.flush().wrap_err("Failed to flush prompt")?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .wrap_err("Failed to read target from console")?;
        if read == 0 {
            return Err(eyre!("no target cumulative return entered"));
        }

        match line.trim().replace(',', ".").parse::<f64>() {
            Ok(target) if target.is_finite() && target > 0.0 => return Ok(target),
            _ => writeln!(output, "Not a positive number: {:?}", line.trim())
                .wrap_err("Failed to write prompt")?,
        }
    }
}
