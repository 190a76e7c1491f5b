//! calibration — per-column offset search that improves kappa agreement.
//!
//! Purpose
//! -------
//! Propose a score correction for each predicted column of a raw
//! contingency table: the integer category that column's mass should be
//! moved to so the quadratically weighted kappa-complement decreases.
//!
//! Key behaviors
//! -------------
//! - [`compute_offsets`] searches all destinations for one column using an
//!   incremental update against a fixed baseline.
//! - [`offset_contingency_matrix`] applies an offset table.
//! - [`optimize_contingency_matrix`] runs the full bound → score → search →
//!   apply → re-bound → re-score pipeline, configured by
//!   [`OptimizeOptions`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Columns are optimized independently, never jointly.
//! - Each record is non-regressive against the baseline; the adjusted table
//!   is reported as computed, without a guarantee that the joint move also
//!   improves.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use qwk_calibration::calibration::prelude::*;
//! use qwk_calibration::kappa::{ContingencyTriple, raw_matrix_from_triples};
//!
//! let raw = raw_matrix_from_triples(vec![
//!     ContingencyTriple::new(0, 0.0, 5.0),
//!     ContingencyTriple::new(1, 1.0, 4.0),
//!     ContingencyTriple::new(2, 2.0, 5.0),
//! ])?;
//! let outcome: OptimizationOutcome =
//!     optimize_contingency_matrix(&raw, &OptimizeOptions::default())?;
//! assert!(outcome.offsets.iter().all(|r: &OffsetRecord| r.offset == 0.0));
//! # Ok::<(), qwk_calibration::kappa::KappaError>(())
//! ```

pub mod offsets;
pub mod optimizer;
pub mod options;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::offsets::{
    KappaBaseline, KappaParts, OffsetRecord, WeightColumns, compute_offsets, kappa_parts,
    offset_contingency_matrix,
};
pub use self::optimizer::{OptimizationOutcome, optimize_contingency_matrix};
pub use self::options::OptimizeOptions;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::offsets::OffsetRecord;
    pub use super::optimizer::{OptimizationOutcome, optimize_contingency_matrix};
    pub use super::options::OptimizeOptions;
}
