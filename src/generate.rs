//! Synthetic input generation.
//!
//! Writes lines of the form `http://api.tech.com/item/<u64> <i64>`, both
//! numbers drawn from the full 64-bit range.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use rand::Rng;
use tracing::info;

pub const URL_PREFIX: &str = "http://api.tech.com/item/";

/// Write `lines` random records to `out`.
pub fn write_records<W: Write, R: Rng + ?Sized>(
    out: &mut W,
    lines: u64,
    rng: &mut R,
) -> io::Result<()> {
    for _ in 0..lines {
        let id: u64 = rng.random();
        let value: i64 = rng.random();
        writeln!(out, "{URL_PREFIX}{id} {value}")?;
    }
    Ok(())
}

/// Create (or truncate) `path` and fill it with `lines` random records.
pub fn generate_file<R: Rng + ?Sized>(path: &Path, lines: u64, rng: &mut R) -> io::Result<()> {
    let started = Instant::now();
    let mut out = BufWriter::new(File::create(path)?);
    write_records(&mut out, lines, rng)?;
    out.flush()?;
    info!(
        lines,
        path = %path.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated test data"
    );
    Ok(())
}
