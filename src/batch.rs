//! Exact Top-N over a stream, in bounded batches.
//!
//! Records are read `batch_size` at a time. At each batch boundary the new
//! batch is appended to the running accumulator, the whole accumulator is
//! re-sorted, and everything past the first `n` is dropped. Memory stays at
//! `n + batch_size` records regardless of stream length.
//!
//! The whole accumulator is re-sorted every cycle rather than merged. That
//! costs a little sorting work but keeps one simple invariant: after every
//! batch, the accumulator is exactly the Top-`min(n, seen)` of everything
//! consumed so far, in order. Partial results are valid at any boundary.

use tracing::debug;

use crate::config::RunConfig;
use crate::error::Result;
use crate::record::{Record, SortOrder};
use crate::source::RecordSource;

/// Bounded accumulator of the best `n` records seen so far.
#[derive(Debug, Clone)]
pub struct BatchTopNSelector {
    n: usize,
    batch_size: usize,
    order: SortOrder,
    acc: Vec<Record>,
    seen: u64,
    batches: u64,
}

impl BatchTopNSelector {
    /// Create a selector keeping the best `n` records under `order`.
    ///
    /// `batch_size` only affects [`consume`](Self::consume); callers driving
    /// [`accumulate`](Self::accumulate) directly choose their own batches.
    pub fn new(n: usize, batch_size: usize, order: SortOrder) -> Self {
        Self {
            n,
            batch_size,
            order,
            acc: Vec::with_capacity(n.min(1 << 16) + batch_size.min(1 << 16)),
            seen: 0,
            batches: 0,
        }
    }

    /// Create a selector from a validated config.
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.result_count,
            config.batch_size,
            config.sort_order,
        ))
    }

    /// Fold one batch into the accumulator.
    ///
    /// An empty batch is a no-op and does not count as a batch.
    pub fn accumulate<I: IntoIterator<Item = Record>>(&mut self, batch: I) {
        let before = self.acc.len();
        self.acc.extend(batch);
        let added = self.acc.len() - before;
        if added == 0 {
            return;
        }

        self.seen += added as u64;
        self.batches += 1;
        self.order.sort(&mut self.acc);
        self.acc.truncate(self.n);

        debug!(
            batch = self.batches,
            added,
            seen = self.seen,
            kept = self.acc.len(),
            "batch folded"
        );
    }

    /// Drain `source` in batches of `batch_size`.
    ///
    /// On a source error the accumulator keeps whatever it held at the last
    /// completed batch, so it can still be inspected for diagnostics.
    pub fn consume<S: RecordSource>(&mut self, mut source: S) -> Result<()> {
        let batch_size = self.batch_size.max(1);
        let mut batch = Vec::with_capacity(batch_size.min(1 << 16));
        loop {
            let mut exhausted = false;
            while batch.len() < batch_size {
                match source.next_record()? {
                    Some(r) => batch.push(r),
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
            self.accumulate(batch.drain(..));
            if exhausted {
                return Ok(());
            }
        }
    }

    /// The current Top-N prefix, best first.
    pub fn current(&self) -> &[Record] {
        &self.acc
    }

    /// Records consumed so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Batches folded so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Final result: at most `n` records, best first. Empty if nothing was read.
    pub fn finalize(self) -> Vec<Record> {
        self.acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::IterSource;

    fn rec(key: &str, value: i64) -> Record {
        Record::new(key, value).expect("valid record")
    }

    fn scenario() -> Vec<Record> {
        vec![rec("a", 5), rec("b", 9), rec("c", 1), rec("d", 7)]
    }

    #[test]
    fn picks_top_two_descending() {
        for batch_size in 1..=5 {
            let mut s = BatchTopNSelector::new(2, batch_size, SortOrder::Descending);
            s.consume(IterSource::new(scenario())).expect("no errors");
            assert_eq!(s.finalize(), vec![rec("b", 9), rec("d", 7)], "batch={batch_size}");
        }
    }

    #[test]
    fn picks_bottom_two_ascending() {
        let mut s = BatchTopNSelector::new(2, 3, SortOrder::Ascending);
        s.consume(IterSource::new(scenario())).expect("no errors");
        assert_eq!(s.finalize(), vec![rec("c", 1), rec("a", 5)]);
    }

    #[test]
    fn accumulator_is_bounded_after_each_batch() {
        let mut s = BatchTopNSelector::new(3, 4, SortOrder::Descending);
        for chunk in (0..40).collect::<Vec<i64>>().chunks(4) {
            s.accumulate(chunk.iter().map(|&v| rec("k", v)));
            assert!(s.current().len() <= 3);
            assert!(SortOrder::Descending.is_sorted(s.current()));
        }
        let values: Vec<i64> = s.current().iter().map(Record::value).collect();
        assert_eq!(values, vec![39, 38, 37]);
        assert_eq!(s.batches(), 10);
        assert_eq!(s.seen(), 40);
    }

    #[test]
    fn fewer_records_than_n_is_not_an_error() {
        let mut s = BatchTopNSelector::new(10, 2, SortOrder::Descending);
        s.consume(IterSource::new(scenario())).expect("no errors");
        assert_eq!(s.finalize().len(), 4);
    }

    #[test]
    fn empty_stream_yields_empty_result() {
        let mut s = BatchTopNSelector::new(3, 2, SortOrder::Descending);
        s.consume(IterSource::new(Vec::<Record>::new())).expect("no errors");
        assert_eq!(s.batches(), 0);
        assert!(s.finalize().is_empty());
    }

    #[test]
    fn resorting_sorted_accumulator_is_idempotent() {
        let mut s = BatchTopNSelector::new(4, 2, SortOrder::Descending);
        s.consume(IterSource::new(scenario())).expect("no errors");
        let before: Vec<i64> = s.current().iter().map(Record::value).collect();
        s.accumulate(std::iter::empty());
        let mut again = s.current().to_vec();
        SortOrder::Descending.sort(&mut again);
        let after: Vec<i64> = again.iter().map(Record::value).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn source_error_keeps_last_boundary() {
        use std::io::Cursor;
        let input = "a 1\nb 2\nc 3\nbroken\n";
        let src = crate::source::LineSource::new(Cursor::new(input));
        let mut s = BatchTopNSelector::new(5, 2, SortOrder::Descending);
        let err = s.consume(src).expect_err("line 4 is malformed");
        assert!(matches!(err, crate::Error::Parse { line: 4, .. }));
        // Only the first full batch made it in.
        let values: Vec<i64> = s.current().iter().map(Record::value).collect();
        assert_eq!(values, vec![2, 1]);
    }
}
