use std::io::{BufRead, Write};

use anyhow::Result;

/// Asks a yes/no question. Anything but `y` or `yes` counts as no, including end of input.
pub fn confirm(question: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
