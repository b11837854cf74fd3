//! Arrival-order histogram of a reservoir sample.
//!
//! Splits `[0, total_items_read)` into `bucket_count` contiguous ranges of
//! width `total_items_read / bucket_count`; the last bucket absorbs the
//! remainder so the ranges always cover every arrival index. Each sampled slot
//! is counted in the bucket its arrival index falls into.
//!
//! An unbiased sampler puts roughly `k * width / total` slots in each bucket.
//! Heavy skew toward early or late buckets points at a sampling defect.

use serde::Serialize;
use tracing::error;

use crate::error::{Error, Result};
use crate::record::SampleSlot;

/// One histogram segment: arrival indices in `[previous upper_bound, upper_bound)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Exclusive upper bound.
    pub upper_bound: u64,
    pub count: u64,
}

/// Buckets plus any slots that could not be placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    buckets: Vec<Bucket>,
    total_items_read: u64,
    sampled: u64,
    /// Arrival indices that fell outside every bucket.
    unassigned: Vec<u64>,
}

/// Bucket upper bounds for a stream of `total` records.
fn upper_bounds(total: u64, bucket_count: usize) -> Vec<u64> {
    let n = bucket_count as u64;
    let width = total / n;
    (1..=n)
        .map(|b| if b == n { total } else { b * width })
        .collect()
}

/// Bucket `slots` by arrival index.
///
/// Slots that land outside `[0, total_items_read)` are not dropped silently:
/// they are logged at `error` and kept in [`Histogram::unassigned`].
pub fn summarize(
    slots: &[SampleSlot],
    total_items_read: u64,
    bucket_count: usize,
) -> Result<Histogram> {
    if bucket_count == 0 {
        return Err(Error::Configuration("bucket count must be > 0".into()));
    }

    let mut buckets: Vec<Bucket> = upper_bounds(total_items_read, bucket_count)
        .into_iter()
        .map(|upper_bound| Bucket {
            upper_bound,
            count: 0,
        })
        .collect();

    let mut unassigned = Vec::new();
    for slot in slots {
        let idx = slot.arrival_index;
        let b = buckets.partition_point(|bucket| bucket.upper_bound <= idx);
        match buckets.get_mut(b) {
            Some(bucket) => bucket.count += 1,
            None => {
                error!(
                    arrival_index = idx,
                    total_items_read, "sample slot outside every histogram bucket"
                );
                unassigned.push(idx);
            }
        }
    }

    Ok(Histogram {
        buckets,
        total_items_read,
        sampled: slots.len() as u64,
        unassigned,
    })
}

impl Histogram {
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn total_items_read(&self) -> u64 {
        self.total_items_read
    }

    pub fn unassigned(&self) -> &[u64] {
        &self.unassigned
    }

    /// True if every sampled slot landed in a bucket.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }

    /// Inclusive lower bound of bucket `i`, `None` past the last bucket.
    pub fn lower_bound(&self, i: usize) -> Option<u64> {
        match i {
            _ if i >= self.buckets.len() => None,
            0 => Some(0),
            _ => Some(self.buckets[i - 1].upper_bound),
        }
    }

    /// Expected count for bucket `i` under a uniform sample.
    pub fn expected(&self, i: usize) -> Option<f64> {
        let upper = self.buckets.get(i)?.upper_bound;
        if self.total_items_read == 0 {
            return Some(0.0);
        }
        let width = upper - self.lower_bound(i)?;
        Some(self.sampled as f64 * width as f64 / self.total_items_read as f64)
    }

    /// Pearson chi-squared statistic against the uniform expectation.
    ///
    /// Empty buckets (zero width) are skipped. Degrees of freedom are the
    /// number of non-empty buckets minus one.
    pub fn chi_squared(&self) -> f64 {
        self.buckets
            .iter()
            .enumerate()
            .filter_map(|(i, bucket)| {
                let e = self.expected(i).filter(|&e| e > 0.0)?;
                let d = bucket.count as f64 - e;
                Some(d * d / e)
            })
            .sum()
    }
}
