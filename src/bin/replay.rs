//! Replay a game from stdin and print the scoresheet.
//!
//! One leave per line: `x` for a strike, `all` / `g` for a gutter ball, otherwise the
//! standing pin numbers (`7-10`, `4 6 7 10`). Blank lines and `#` comments are skipped.
//! Exits non-zero on the first line that cannot be parsed or recorded.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use tenpin::core::Scoresheet;
use tenpin::types::Leave;

fn main() -> Result<()> {
    tenpin::init_logging();

    let stdin = io::stdin();
    let mut sheet = Scoresheet::new();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line_no = index + 1;
        let line = line.context("failed to read stdin")?;
        let text = line.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }

        let Some(leave) = Leave::from_str(text) else {
            bail!("line {}: cannot parse leave {:?}", line_no, text);
        };
        if let Err(e) = sheet.record_delivery(leave) {
            warn!(line = line_no, leave = %leave, error = %e, "delivery rejected");
            bail!("line {}: {}", line_no, e);
        }
        debug!(line = line_no, leave = %leave, "recorded");
    }

    sheet.update_running_score();

    let mut out = io::stdout().lock();
    for frame in sheet.frames() {
        if frame.is_empty() {
            continue;
        }
        let split = if frame.is_split() { " (split)" } else { "" };
        writeln!(
            out,
            "{:>2}  {:<7} {:>3}{}",
            frame.number(),
            frame.line(),
            frame.running_score(),
            split
        )?;
    }
    writeln!(out, "total {}", sheet.total_score())?;
    if !sheet.is_complete() {
        writeln!(out, "(game in progress)")?;
    }
    Ok(())
}
