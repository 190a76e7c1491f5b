//! data_source — boundary to the platform that holds labelled predictions.
//!
//! Purpose
//! -------
//! Abstract the remote data platform behind a three-operation trait so the
//! kappa and calibration code never issues network calls or handles
//! platform identifiers itself. The core consumes only the count triples
//! assembled here.
//!
//! Key behaviors
//! -------------
//! - [`DataSource`] exposes the category range of the objective field, the
//!   per-partition category distribution, and creation of a partition for a
//!   half-open score interval.
//! - [`assemble_contingency`] turns a list of [`ScoreInterval`]s into a raw
//!   contingency table, degrading failed distribution fetches to empty
//!   partitions.
//! - [`optimize_from_source`] runs the optimizer with the category range
//!   pinned to the source's.
//! - [`StaticDataSource`] is an in-memory implementation for tests and
//!   offline use.
//!
//! Invariants & assumptions
//! ------------------------
//! - Collaborator errors are `anyhow::Error`; those that cannot be degraded
//!   surface as `KappaError::DataSource`.
//! - Nothing here retries; retries belong to the implementation of the
//!   trait or its caller.

pub mod assemble;
pub mod memory;

use std::fmt;

use crate::kappa::{
    errors::{KappaError, KappaResult},
    range::CategoryRange,
};

pub use self::assemble::{assemble_contingency, optimize_from_source, score_intervals};
pub use self::memory::StaticDataSource;

/// Opaque identifier of a partition created by a [`DataSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(pub String);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open score interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreInterval {
    lo: f64,
    hi: f64,
}

impl ScoreInterval {
    /// # Errors
    /// - [`KappaError::InvalidMatrix`] unless both bounds are finite and
    ///   `lo < hi`.
    pub fn new(lo: f64, hi: f64) -> KappaResult<Self> {
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(KappaError::invalid(format!(
                "score interval [{lo}, {hi}) is empty or not finite"
            )));
        }
        Ok(ScoreInterval { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, score: f64) -> bool {
        self.lo <= score && score < self.hi
    }
}

/// DataSource — collaborator supplying labelled score distributions.
///
/// Implementations wrap whatever platform stores the evaluation data.
/// Methods take `&self`; implementations needing mutable state use
/// interior mutability.
pub trait DataSource {
    /// Closed range of valid categories of the objective field.
    fn category_range(&self) -> anyhow::Result<CategoryRange>;

    /// `(category, count)` pairs observed in `partition`.
    fn category_distribution(&self, partition: &PartitionId) -> anyhow::Result<Vec<(i64, f64)>>;

    /// Create the partition of rows whose score falls in `interval`.
    ///
    /// Returns `Ok(None)` when the interval selects no rows.
    fn create_partition(&self, interval: ScoreInterval) -> anyhow::Result<Option<PartitionId>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_interval_is_half_open() {
        let interval = ScoreInterval::new(1.0, 2.0).unwrap();

        assert!(interval.contains(1.0));
        assert!(interval.contains(1.999));
        assert!(!interval.contains(2.0));
    }

    #[test]
    fn score_interval_rejects_empty_and_non_finite_bounds() {
        assert!(ScoreInterval::new(2.0, 2.0).is_err());
        assert!(ScoreInterval::new(f64::NEG_INFINITY, 0.0).is_err());
    }
}
