//! Records and their ordering.
//!
//! A [`Record`] is one `(key, value)` pair read from the input stream. The only
//! field that participates in selection is `value`; keys are carried along for
//! reporting. Equal values have no defined relative order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// One `(key, value)` pair from the input stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    key: String,
    value: i64,
}

impl Record {
    /// Build a record.
    ///
    /// Returns [`Error::Parse`] (line 0) if `key` is empty; parsers that know
    /// the line number should check the key themselves.
    pub fn new(key: impl Into<String>, value: i64) -> Result<Self, Error> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::Parse {
                line: 0,
                reason: "key must be non-empty".to_string(),
            });
        }
        Ok(Self { key, value })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

/// A record held in the reservoir, tagged with where it arrived in the stream.
///
/// `arrival_index` is zero-based and only used for diagnostics (ordering the
/// report, bucketing the histogram), never for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSlot {
    pub record: Record,
    pub arrival_index: u64,
}

/// Which end of the value range a Top-N selection keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    #[default]
    Descending,
}

impl SortOrder {
    /// Compare two records so that the "better" one sorts first.
    #[inline]
    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Self::Ascending => a.value.cmp(&b.value),
            Self::Descending => b.value.cmp(&a.value),
        }
    }

    /// Sort `records` in place, best first. Ties are left in unspecified order.
    pub fn sort(self, records: &mut [Record]) {
        records.sort_unstable_by(|a, b| self.compare(a, b));
    }

    /// True if `records` is ordered best first under this order.
    pub fn is_sorted(self, records: &[Record]) -> bool {
        records
            .windows(2)
            .all(|w| self.compare(&w[0], &w[1]) != Ordering::Greater)
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(Self::Ascending),
            "desc" | "descending" | "0" => Ok(Self::Descending),
            other => Err(Error::Configuration(format!(
                "unknown sort order {other:?} (expected asc or desc)"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        })
    }
}
