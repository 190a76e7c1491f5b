//! sparse::errors — error types for sparse tensor construction and algebra.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the sparse tensor core
//! ([`SparseTensor`](crate::sparse::SparseTensor)) and the reductions built on
//! top of it. Failures here are structural (mismatched arity, malformed
//! masks, non-integral coordinates); numerical and domain failures live in
//! `kappa::errors`.
//!
//! Conventions
//! -----------
//! - Every variant carries the offending sizes or value so that messages are
//!   self-contained.
//! - `kappa::errors::KappaError` wraps these via `From<SparseError>` so the
//!   kappa engine can use `?` across the boundary.

pub type SparseResult<T> = Result<T, SparseError>;

/// SparseError — structural failures of the sparse tensor core.
///
/// Variants
/// --------
/// - `ArityMismatch { expected, found }`
///   An entry or operand has a different number of index positions than
///   the tensor it is combined with.
/// - `MaskLengthMismatch { arity, mask }`
///   An ignore-mask passed to `reduce` or `drop_axes` does not have one flag
///   per index position.
/// - `NonIntegralCoordinate { value }`
///   A real coordinate could not be converted to an integer index because
///   it is fractional or non-finite.
#[derive(Debug, Clone, PartialEq)]
pub enum SparseError {
    ArityMismatch { expected: usize, found: usize },
    MaskLengthMismatch { arity: usize, mask: usize },
    NonIntegralCoordinate { value: f64 },
}

impl std::error::Error for SparseError {}

impl std::fmt::Display for SparseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SparseError::ArityMismatch { expected, found } => {
                write!(f, "Arity mismatch: expected {expected} index positions, found {found}")
            }
            SparseError::MaskLengthMismatch { arity, mask } => {
                write!(f, "Mask length {mask} does not match tensor arity {arity}")
            }
            SparseError::NonIntegralCoordinate { value } => {
                write!(f, "Coordinate {value} is not an integral category index")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Each variant embeds its payload in the `Display` message.
    fn sparse_error_display_embeds_payloads() {
        let arity = SparseError::ArityMismatch { expected: 2, found: 3 }.to_string();
        let mask = SparseError::MaskLengthMismatch { arity: 2, mask: 5 }.to_string();
        let coord = SparseError::NonIntegralCoordinate { value: 1.5 }.to_string();

        assert!(arity.contains('2') && arity.contains('3'), "Got: {arity}");
        assert!(mask.contains('5'), "Got: {mask}");
        assert!(coord.contains("1.5"), "Got: {coord}");
    }
}
