//! Record sources.
//!
//! Selectors pull records one at a time through [`RecordSource`]. The text
//! format handled by [`LineSource`] is one record per line:
//!
//! ```text
//! <key><whitespace><integer>
//! ```
//!
//! Extra columns are logged and ignored. Anything else (a blank line, a
//! missing value, an integer that does not fit in `i64`) is a parse error and
//! ends the run.

use std::io::BufRead;

use tracing::warn;

use crate::error::{Error, Result};
use crate::record::Record;

/// A lazy, finite stream of records in arrival order.
pub trait RecordSource {
    /// Next record, `Ok(None)` at end of stream.
    fn next_record(&mut self) -> Result<Option<Record>>;
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn next_record(&mut self) -> Result<Option<Record>> {
        (**self).next_record()
    }
}

/// Parses records from line-oriented text.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
    line: u64,
    require_url: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            require_url: false,
        }
    }

    /// Reject keys that do not contain `http` (case-insensitive).
    pub fn require_url(mut self, yes: bool) -> Self {
        self.require_url = yes;
        self
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.line
    }

    fn parse_error(&self, reason: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn parse_line(&self) -> Result<Record> {
        let text = std::str::from_utf8(&self.buf)
            .map_err(|e| self.parse_error(format!("invalid UTF-8: {e}")))?;
        let mut tokens = text.split_whitespace();
        let key = tokens
            .next()
            .ok_or_else(|| self.parse_error("empty line"))?;
        if self.require_url && !key.to_ascii_lowercase().contains("http") {
            return Err(self.parse_error(format!("key {key:?} is not a URL")));
        }
        let raw = tokens
            .next()
            .ok_or_else(|| self.parse_error(format!("missing value after key {key:?}")))?;
        let value: i64 = raw
            .parse()
            .map_err(|e| self.parse_error(format!("bad value {raw:?}: {e}")))?;

        let extra = tokens.count();
        if extra > 0 {
            warn!(line = self.line, extra, "ignoring extra columns");
        }

        Record::new(key, value).map_err(|_| self.parse_error("empty key"))
    }
}

impl<R: BufRead> RecordSource for LineSource<R> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        self.parse_line().map(Some)
    }
}

/// Adapts any iterator of records into a [`RecordSource`].
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
}

impl<I: Iterator<Item = Record>> IterSource<I> {
    pub fn new(records: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: records.into_iter(),
        }
    }
}

impl<I: Iterator<Item = Record>> RecordSource for IterSource<I> {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.inner.next())
    }
}
