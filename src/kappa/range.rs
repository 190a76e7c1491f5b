//! kappa::range — validated closed interval of ordinal categories.
//!
//! Purpose
//! -------
//! Represent the closed integer interval `[lo, hi]` of valid ordinal
//! categories and the feasibility clamp that maps any real score onto it.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lo <= hi` for every constructed range; a violation is reported as
//!   `KappaError::InvalidMatrix`.
//! - A range with `lo == hi` is legal (single category) even though no
//!   weight matrix exists for it.
use crate::kappa::errors::{KappaError, KappaResult};
use crate::sparse::SparseTensor;

/// CategoryRange — closed interval `[lo, hi]` of ordinal categories.
///
/// Fields
/// ------
/// - `lo`: `i64` — smallest valid category.
/// - `hi`: `i64` — largest valid category (`hi >= lo`).
///
/// Notes
/// -----
/// - `Copy` and two words wide; pass by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryRange {
    lo: i64,
    hi: i64,
}

impl CategoryRange {
    /// Construct a validated range.
    ///
    /// Errors
    /// ------
    /// - `KappaError::InvalidMatrix` when `lo > hi`.
    pub fn new(lo: i64, hi: i64) -> KappaResult<Self> {
        if lo > hi {
            return Err(KappaError::invalid(format!("category range has lo {lo} > hi {hi}")));
        }
        Ok(CategoryRange { lo, hi })
    }

    /// Range spanned by the keys of a canonical vector (first and last key).
    ///
    /// Returns `None` for an empty vector.
    pub fn spanning(keys: &SparseTensor<i64>) -> Option<Self> {
        let first = keys.entries().first()?.index.first().copied()?;
        let last = keys.entries().last()?.index.first().copied()?;
        Some(CategoryRange { lo: first, hi: last })
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    /// `hi - lo`; zero for a single-category range.
    pub fn width(&self) -> i64 {
        self.hi - self.lo
    }

    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }

    pub fn contains(&self, category: i64) -> bool {
        (self.lo..=self.hi).contains(&category)
    }

    /// Categories in ascending order.
    pub fn iter(&self) -> std::ops::RangeInclusive<i64> {
        self.lo..=self.hi
    }

    /// Map a real score to a category: below `lo` → `lo`, above `hi` → `hi`,
    /// otherwise `floor(score)`.
    ///
    /// Scores must be finite; callers validate raw tables before bounding.
    pub fn clamp_floor(&self, score: f64) -> i64 {
        if score < self.lo as f64 {
            self.lo
        } else if score > self.hi as f64 {
            self.hi
        } else {
            (score.floor() as i64).clamp(self.lo, self.hi)
        }
    }
}
