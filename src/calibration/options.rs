//! calibration::options — configuration for the contingency optimizer.
//!
//! Purpose
//! -------
//! Hold the knobs of [`optimize_contingency_matrix`]: whether the offset
//! search runs at all, an optional externally known category range, and
//! whether per-column searches run on the rayon pool.
//!
//! Conventions
//! -----------
//! - Construction goes through [`OptimizeOptions::new`], which validates the
//!   category range; `Default` gives the common configuration.
//!
//! [`optimize_contingency_matrix`]: crate::calibration::optimize_contingency_matrix
use crate::kappa::{
    errors::{KappaError, KappaResult},
    range::CategoryRange,
};

/// OptimizeOptions — settings for one optimizer run.
///
/// Fields
/// ------
/// - `enable_optimization`: `bool`
///   When `false`, only the bounded matrix and its kappa-complement are
///   produced; offsets and adjusted results are absent.
/// - `category_range`: `Option<CategoryRange>`
///   Category range of the objective field. When `None`, the range is
///   derived from the rows present in the raw matrix.
/// - `parallel`: `bool`
///   Run the independent per-column offset searches on the rayon global
///   pool. Results are identical to the sequential path.
///
/// Default:
/// - `enable_optimization = true`
/// - `category_range = None`
/// - `parallel = false`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizeOptions {
    pub enable_optimization: bool,
    pub category_range: Option<CategoryRange>,
    pub parallel: bool,
}

impl OptimizeOptions {
    /// Create validated optimizer options.
    ///
    /// `category_range` is given as raw `(lo, hi)` bounds so that callers
    /// reading settings from untyped sources get the range check here.
    ///
    /// # Errors
    /// - [`KappaError::InvalidMatrix`] if `lo > hi`.
    pub fn new(
        enable_optimization: bool, category_range: Option<(i64, i64)>, parallel: bool,
    ) -> KappaResult<Self> {
        let category_range = category_range
            .map(|(lo, hi)| CategoryRange::new(lo, hi))
            .transpose()
            .map_err(|err| match err {
                KappaError::InvalidMatrix { detail } => {
                    KappaError::invalid(format!("optimizer options: {detail}"))
                }
                other => other,
            })?;
        Ok(Self { enable_optimization, category_range, parallel })
    }
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self { enable_optimization: true, category_range: None, parallel: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_enables_sequential_optimization() {
        let opts = OptimizeOptions::default();

        assert!(opts.enable_optimization);
        assert!(!opts.parallel);
        assert_eq!(opts.category_range, None);
    }

    #[test]
    fn new_validates_category_range() {
        let ok = OptimizeOptions::new(true, Some((0, 4)), true).unwrap();
        let bad = OptimizeOptions::new(true, Some((4, 0)), false);

        assert_eq!(ok.category_range, Some(CategoryRange::new(0, 4).unwrap()));
        match bad {
            Err(KappaError::InvalidMatrix { detail }) => {
                assert!(detail.starts_with("optimizer options"), "Got: {detail}")
            }
            other => panic!("expected InvalidMatrix error, got {other:?}"),
        }
    }
}
