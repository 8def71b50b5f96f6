use std::io::{self, Read};

use anyhow::{Context, Result};

/// Reads `reader` to end-of-stream and decodes it as UTF-8, replacing
/// invalid sequences.
pub fn read_stream<R: Read>(mut reader: R) -> Result<String> {
    let mut buf = Vec::with_capacity(8192);
    reader
        .read_to_end(&mut buf)
        .context("read piped input")?;
    Ok(match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Blocking read of all of fd 0. Stdin is consumed exactly once, here, and
/// never through an async handle.
pub fn read_stdin() -> Result<String> {
    let text = read_stream(io::stdin().lock())?;
    tracing::debug!(target: "lintel::input", bytes = text.len(), "read piped input");
    Ok(text)
}
