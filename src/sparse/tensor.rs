//! sparse::tensor — canonical sparse tensors, group-and-sum, sorted merge.
//!
//! Purpose
//! -------
//! Represent vectors and matrices as ordered listings of `(index-tuple,
//! value)` entries and provide the two primitives every higher-level
//! computation in this crate is built from:
//!
//! - [`SparseTensor::reduce`] — group entries by the index positions that
//!   are *not* ignored and sum the values within each group, and
//! - [`combine`] — a two-pointer sorted merge of two canonical tensors with
//!   an injected binary operator (the merge step of mergesort).
//!
//! Key behaviors
//! -------------
//! - One total order over index tuples ([`cmp_index`]) is used everywhere a
//!   canonical order is required. Coordinates are compared through the
//!   [`Coordinate`] trait (`i64::cmp` for category indices, `f64::total_cmp`
//!   for raw predicted scores).
//! - Ignore-masks are applied through an explicit projection
//!   ([`cmp_projected`]) that skips masked positions, so masked coordinates
//!   can never break ties between groups.
//! - Implicit zeros are never materialized: [`combine`] only emits keys that
//!   are present in at least one operand.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `SparseTensor` built through [`SparseTensor::from_entries`] (or
//!   returned by any operation in this module) is canonical: entries sorted
//!   ascending by [`cmp_index`], at most one entry per index tuple.
//! - Every entry of a tensor has exactly `arity` index positions.
//! - Tensors are immutable values; every operation allocates a new tensor.
//!
//! Conventions
//! -----------
//! - Matrices use position 0 for the row (actual category) and position 1
//!   for the column (predicted category).
//! - `reduce` keeps the full arity and fills ignored positions with the
//!   coordinates of the group's smallest member; use
//!   [`SparseTensor::drop_axes`] to obtain the lower-arity view.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the empty, all-ignored and none-ignored masks,
//!   idempotence of `reduce`, merge behavior on disjoint and overlapping
//!   keys, and integral/real coordinate conversion.
use std::cmp::Ordering;
use std::fmt::Debug;

use crate::sparse::errors::{SparseError, SparseResult};

/// Coordinate — scalar type usable as a sparse index position.
///
/// Implemented for `i64` (ordinal category indices) and `f64` (raw model
/// scores that may fall between or outside categories). The only
/// requirement beyond `Copy` is a total order, which `f64` provides via
/// `total_cmp`.
pub trait Coordinate: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Total order used for canonical sorting.
    fn cmp_coord(&self, other: &Self) -> Ordering;

    /// Widen the coordinate to a real score.
    fn to_real(self) -> f64;
}

impl Coordinate for i64 {
    #[inline]
    fn cmp_coord(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    #[inline]
    fn to_real(self) -> f64 {
        self as f64
    }
}

impl Coordinate for f64 {
    #[inline]
    fn cmp_coord(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    #[inline]
    fn to_real(self) -> f64 {
        self
    }
}

/// Lexicographic comparison of two index tuples.
///
/// Shorter tuples order before longer ones when one is a prefix of the
/// other; within a single tensor all tuples share the same length.
pub fn cmp_index<C: Coordinate>(a: &[C], b: &[C]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.cmp_coord(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Lexicographic comparison restricted to the positions not marked in
/// `ignore`.
///
/// Equivalent to normalizing every ignored position to one constant and
/// comparing the full tuples. `ignore` must have the same length as the
/// tuples; callers validate this once per operation.
pub fn cmp_projected<C: Coordinate>(a: &[C], b: &[C], ignore: &[bool]) -> Ordering {
    for ((x, y), &skip) in a.iter().zip(b).zip(ignore) {
        if skip {
            continue;
        }
        match x.cmp_coord(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// SparseEntry — one `(index-tuple, value)` pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseEntry<C> {
    pub index: Vec<C>,
    pub value: f64,
}

impl<C: Coordinate> SparseEntry<C> {
    pub fn new(index: Vec<C>, value: f64) -> Self {
        SparseEntry { index, value }
    }
}

/// SparseTensor — canonical sorted listing of sparse entries.
///
/// Purpose
/// -------
/// Hold a vector (arity 1), matrix (arity 2) or scalar-with-key (any arity
/// after a full reduction) as a sorted, de-duplicated sequence of entries.
///
/// Fields
/// ------
/// - `arity`: `usize`
///   Number of index positions carried by every entry.
/// - `entries`: `Vec<SparseEntry<C>>`
///   Entries in canonical order.
///
/// Invariants
/// ----------
/// - `entries` is sorted ascending by [`cmp_index`] with no repeated index
///   tuple, except transiently inside this module before a reduction.
/// - Every `entries[k].index.len() == arity`.
///
/// Notes
/// -----
/// - Zero-valued entries are legal and are preserved; they mark a key as
///   present (e.g. a vacated column after offsetting) without adding mass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SparseTensor<C> {
    arity: usize,
    entries: Vec<SparseEntry<C>>,
}

impl<C: Coordinate> SparseTensor<C> {
    /// Empty tensor with the given arity.
    pub fn empty(arity: usize) -> Self {
        SparseTensor { arity, entries: Vec::new() }
    }

    /// Build a canonical tensor from entries in arbitrary order.
    ///
    /// Parameters
    /// ----------
    /// - `arity`: `usize`
    ///   Number of index positions every entry must carry.
    /// - `entries`: `impl IntoIterator<Item = SparseEntry<C>>`
    ///   Entries in any order, possibly with repeated index tuples.
    ///
    /// Returns
    /// -------
    /// `SparseResult<SparseTensor<C>>`
    ///   The canonical tensor: sorted, with repeated tuples merged by
    ///   summation.
    ///
    /// Errors
    /// ------
    /// - `SparseError::ArityMismatch`
    ///   Returned when any entry has a different number of index positions.
    pub fn from_entries<I>(arity: usize, entries: I) -> SparseResult<Self>
    where
        I: IntoIterator<Item = SparseEntry<C>>,
    {
        let entries: Vec<SparseEntry<C>> = entries.into_iter().collect();
        if let Some(bad) = entries.iter().find(|e| e.index.len() != arity) {
            return Err(SparseError::ArityMismatch { expected: arity, found: bad.index.len() });
        }
        let raw = SparseTensor { arity, entries };
        raw.reduce(&vec![false; arity])
    }

    /// Canonical matrix from `(row, column, value)` triples.
    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (C, C, f64)>,
    {
        let entries: Vec<SparseEntry<C>> = triples
            .into_iter()
            .map(|(row, col, value)| SparseEntry::new(vec![row, col], value))
            .collect();
        SparseTensor { arity: 2, entries }.group_sorted(&[false, false])
    }

    /// Canonical vector from `(index, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, f64)>,
    {
        let entries: Vec<SparseEntry<C>> =
            pairs.into_iter().map(|(i, value)| SparseEntry::new(vec![i], value)).collect();
        SparseTensor { arity: 1, entries }.group_sorted(&[false])
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn entries(&self) -> &[SparseEntry<C>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SparseEntry<C>> {
        self.entries.iter()
    }

    /// Value stored at `index`, if the key is present.
    pub fn get(&self, index: &[C]) -> Option<f64> {
        self.entries
            .binary_search_by(|e| cmp_index(&e.index, index))
            .ok()
            .map(|pos| self.entries[pos].value)
    }

    /// Group entries by the non-ignored positions and sum each group.
    ///
    /// Parameters
    /// ----------
    /// - `ignore`: `&[bool]`
    ///   One flag per index position; `true` marks a position that does not
    ///   participate in the grouping key.
    ///
    /// Returns
    /// -------
    /// `SparseResult<SparseTensor<C>>`
    ///   One entry per group, ordered by the projected key. Each output
    ///   entry keeps the full arity; ignored positions carry the coordinates
    ///   of the group's smallest member in canonical order.
    ///
    /// Errors
    /// ------
    /// - `SparseError::MaskLengthMismatch`
    ///   Returned when `ignore.len() != self.arity()`.
    ///
    /// Notes
    /// -----
    /// - Empty input yields empty output; an all-`true` mask yields a single
    ///   group covering every entry; an all-`false` mask is the canonical
    ///   pass-through that merges repeated tuples.
    /// - Idempotent: reducing an already-reduced tensor under the same mask
    ///   returns an equal tensor.
    pub fn reduce(&self, ignore: &[bool]) -> SparseResult<Self> {
        self.check_mask(ignore)?;
        Ok(self.clone().group_sorted(ignore))
    }

    /// Remove the positions marked in `ignore` from every index tuple.
    ///
    /// The projected entries are re-canonicalized, so calling this on a
    /// tensor that was not first reduced under the same mask still yields a
    /// valid (summed) lower-arity tensor.
    pub fn drop_axes(&self, ignore: &[bool]) -> SparseResult<Self> {
        self.check_mask(ignore)?;
        let arity = ignore.iter().filter(|&&skip| !skip).count();
        let entries = self.entries.iter().map(|e| {
            let index: Vec<C> = e
                .index
                .iter()
                .zip(ignore)
                .filter(|&(_, &skip)| !skip)
                .map(|(&c, _)| c)
                .collect();
            SparseEntry::new(index, e.value)
        });
        Self::from_entries(arity, entries)
    }

    /// Apply `f` to every value, keeping index tuples untouched.
    pub fn map_values<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let entries = self
            .entries
            .iter()
            .map(|e| SparseEntry::new(e.index.clone(), f(e.value)))
            .collect();
        SparseTensor { arity: self.arity, entries }
    }

    /// Rewrite every index tuple with `f` (possibly changing the coordinate
    /// type) and re-canonicalize, summing any collisions introduced.
    pub fn map_index<D, F>(&self, f: F) -> SparseResult<SparseTensor<D>>
    where
        D: Coordinate,
        F: Fn(&[C]) -> SparseResult<Vec<D>>,
    {
        let entries = self
            .entries
            .iter()
            .map(|e| Ok(SparseEntry::new(f(&e.index)?, e.value)))
            .collect::<SparseResult<Vec<SparseEntry<D>>>>()?;
        SparseTensor::from_entries(self.arity, entries)
    }

    /// Widen every coordinate to a real score.
    pub fn to_real(&self) -> SparseTensor<f64> {
        let entries = self
            .entries
            .iter()
            .map(|e| SparseEntry::new(e.index.iter().map(|&c| c.to_real()).collect(), e.value))
            .collect();
        // Widening preserves order (`i64 -> f64` is monotone over category ranges).
        SparseTensor { arity: self.arity, entries }
    }

    fn check_mask(&self, ignore: &[bool]) -> SparseResult<()> {
        if ignore.len() != self.arity {
            return Err(SparseError::MaskLengthMismatch { arity: self.arity, mask: ignore.len() });
        }
        Ok(())
    }

    /// Sort by the projected key and sum runs of equal projected keys in one
    /// linear pass. Ties within a group are ordered by the full key so the
    /// group representative is deterministic.
    fn group_sorted(mut self, ignore: &[bool]) -> Self {
        self.entries.sort_by(|a, b| {
            cmp_projected(&a.index, &b.index, ignore).then_with(|| cmp_index(&a.index, &b.index))
        });

        let mut grouped: Vec<SparseEntry<C>> = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            match grouped.last_mut() {
                Some(group)
                    if cmp_projected(&group.index, &entry.index, ignore) == Ordering::Equal =>
                {
                    group.value += entry.value;
                }
                _ => grouped.push(entry),
            }
        }
        SparseTensor { arity: self.arity, entries: grouped }
    }
}

impl SparseTensor<f64> {
    /// Convert real coordinates to integer category indices.
    ///
    /// Errors
    /// ------
    /// - `SparseError::NonIntegralCoordinate`
    ///   Returned for the first coordinate that is fractional or non-finite.
    pub fn to_integral(&self) -> SparseResult<SparseTensor<i64>> {
        self.map_index(|index| index.iter().map(|&c| integral(c)).collect())
    }
}

/// Convert one real coordinate to an integer index.
pub(crate) fn integral(value: f64) -> SparseResult<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(SparseError::NonIntegralCoordinate { value });
    }
    Ok(value as i64)
}

/// Elementwise merge of two canonical tensors.
///
/// Parameters
/// ----------
/// - `op`: `Fn(f64, f64) -> f64`
///   Binary operator applied to `(value_a, value_b)`; a key missing from
///   one side contributes `0.0` for that side.
/// - `a`, `b`: `&SparseTensor<C>`
///   Canonical operands of equal arity.
///
/// Returns
/// -------
/// `SparseResult<SparseTensor<C>>`
///   Canonical tensor containing exactly the keys present in `a` or `b`.
///
/// Errors
/// ------
/// - `SparseError::ArityMismatch` when the operands differ in arity.
///
/// Notes
/// -----
/// - Runs in O(|a| + |b|) with one two-pointer walk; keys absent from both
///   operands are never synthesized.
pub fn combine<C, F>(
    op: F, a: &SparseTensor<C>, b: &SparseTensor<C>,
) -> SparseResult<SparseTensor<C>>
where
    C: Coordinate,
    F: Fn(f64, f64) -> f64,
{
    if a.arity != b.arity {
        return Err(SparseError::ArityMismatch { expected: a.arity, found: b.arity });
    }

    let (lhs, rhs) = (&a.entries, &b.entries);
    let mut merged: Vec<SparseEntry<C>> = Vec::with_capacity(lhs.len().max(rhs.len()));
    let (mut i, mut j) = (0_usize, 0_usize);

    while i < lhs.len() && j < rhs.len() {
        let (ea, eb) = (&lhs[i], &rhs[j]);
        match cmp_index(&ea.index, &eb.index) {
            Ordering::Less => {
                merged.push(SparseEntry::new(ea.index.clone(), op(ea.value, 0.0)));
                i += 1;
            }
            Ordering::Greater => {
                merged.push(SparseEntry::new(eb.index.clone(), op(0.0, eb.value)));
                j += 1;
            }
            Ordering::Equal => {
                merged.push(SparseEntry::new(ea.index.clone(), op(ea.value, eb.value)));
                i += 1;
                j += 1;
            }
        }
    }
    for ea in &lhs[i..] {
        merged.push(SparseEntry::new(ea.index.clone(), op(ea.value, 0.0)));
    }
    for eb in &rhs[j..] {
        merged.push(SparseEntry::new(eb.index.clone(), op(0.0, eb.value)));
    }

    Ok(SparseTensor { arity: a.arity, entries: merged })
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Canonicalization in `from_entries` / `from_triples`.
    // - `reduce` under empty, all-ignored and none-ignored masks, and its
    //   idempotence.
    // - `combine` on overlapping and disjoint keys.
    // - Coordinate conversion between `f64` and `i64`.
    // -------------------------------------------------------------------------

    fn sample() -> SparseTensor<i64> {
        SparseTensor::from_triples(vec![(1, 0, 2.0), (0, 1, 1.0), (0, 0, 3.0), (1, 1, 4.0)])
    }

    #[test]
    // Purpose
    // -------
    // `from_triples` sorts entries and merges repeated index tuples.
    //
    // Given
    // -----
    // - Triples in arbitrary order with (0, 0) listed twice.
    //
    // Expect
    // ------
    // - Canonical order and a single (0, 0) entry carrying the sum.
    fn from_triples_sorts_and_merges_duplicates() {
        // Arrange
        let triples = vec![(1, 0, 1.0), (0, 0, 2.0), (0, 1, 1.0), (0, 0, 0.5)];

        // Act
        let m: SparseTensor<i64> = SparseTensor::from_triples(triples);

        // Assert
        let keys: Vec<Vec<i64>> = m.iter().map(|e| e.index.clone()).collect();
        assert_eq!(keys, vec![vec![0, 0], vec![0, 1], vec![1, 0]]);
        assert_eq!(m.get(&[0, 0]), Some(2.5));
    }

    #[test]
    fn from_entries_rejects_mixed_arity() {
        let entries = vec![SparseEntry::new(vec![0_i64, 1], 1.0), SparseEntry::new(vec![2], 1.0)];

        let result = SparseTensor::from_entries(2, entries);

        assert_eq!(result, Err(SparseError::ArityMismatch { expected: 2, found: 1 }));
    }

    #[test]
    fn reduce_empty_input_is_empty() {
        let empty: SparseTensor<i64> = SparseTensor::empty(2);

        let reduced = empty.reduce(&[true, true]).unwrap();

        assert!(reduced.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // An all-ignored mask collapses everything into one grand-total group.
    fn reduce_all_ignored_yields_single_total() {
        let m = sample();

        let reduced = m.reduce(&[true, true]).unwrap();

        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced.entries()[0].value, 10.0);
        // Representative is the smallest member in canonical order.
        assert_eq!(reduced.entries()[0].index, vec![0, 0]);
    }

    #[test]
    // Purpose
    // -------
    // Ignoring the column groups by row and sums across columns.
    fn reduce_ignoring_column_sums_rows() {
        let m = sample();

        let reduced = m.reduce(&[false, true]).unwrap();

        let values: Vec<(i64, f64)> = reduced.iter().map(|e| (e.index[0], e.value)).collect();
        assert_eq!(values, vec![(0, 4.0), (1, 6.0)]);
    }

    #[test]
    // Purpose
    // -------
    // Ignoring the leading position still groups correctly; the projected
    // key (the column) never gets split by differing row coordinates.
    fn reduce_ignoring_row_groups_by_column() {
        let m = sample();

        let reduced = m.reduce(&[true, false]).unwrap();

        let values: Vec<(i64, f64)> = reduced.iter().map(|e| (e.index[1], e.value)).collect();
        assert_eq!(values, vec![(0, 5.0), (1, 5.0)]);
    }

    #[test]
    fn reduce_is_idempotent_for_every_mask() {
        let m = SparseTensor::from_triples(vec![
            (2, 0, 1.0),
            (0, 2, 1.5),
            (1, 1, 0.0),
            (2, 2, 3.0),
            (0, 0, 2.0),
        ]);

        for mask in [[false, false], [false, true], [true, false], [true, true]] {
            let once = m.reduce(&mask).unwrap();
            let twice = once.reduce(&mask).unwrap();
            assert_eq!(once, twice, "reduce not idempotent for mask {mask:?}");
        }
    }

    #[test]
    fn reduce_rejects_wrong_mask_length() {
        let m = sample();

        let result = m.reduce(&[true]);

        assert_eq!(result, Err(SparseError::MaskLengthMismatch { arity: 2, mask: 1 }));
    }

    #[test]
    fn drop_axes_projects_to_vector() {
        let m = sample();

        let rows = m.reduce(&[false, true]).unwrap().drop_axes(&[false, true]).unwrap();

        assert_eq!(rows.arity(), 1);
        assert_eq!(rows, SparseTensor::from_pairs(vec![(0, 4.0), (1, 6.0)]));
    }

    #[test]
    // Purpose
    // -------
    // `combine` visits every key present in either operand exactly once and
    // keeps the output canonical.
    //
    // Given
    // -----
    // - a = {0: 1, 2: 3}, b = {1: 10, 2: 5}.
    //
    // Expect
    // ------
    // - Addition yields {0: 1, 1: 10, 2: 8}; key 3 (absent from both) is
    //   not synthesized.
    fn combine_merges_overlapping_and_disjoint_keys() {
        // Arrange
        let a: SparseTensor<i64> = SparseTensor::from_pairs(vec![(0, 1.0), (2, 3.0)]);
        let b: SparseTensor<i64> = SparseTensor::from_pairs(vec![(1, 10.0), (2, 5.0)]);

        // Act
        let sum = combine(|x, y| x + y, &a, &b).unwrap();

        // Assert
        assert_eq!(sum, SparseTensor::from_pairs(vec![(0, 1.0), (1, 10.0), (2, 8.0)]));
    }

    #[test]
    fn combine_multiply_materializes_zero_for_one_sided_keys() {
        let a: SparseTensor<i64> = SparseTensor::from_pairs(vec![(0, 2.0), (1, 3.0)]);
        let b: SparseTensor<i64> = SparseTensor::from_pairs(vec![(1, 4.0), (5, 7.0)]);

        let product = combine(|x, y| x * y, &a, &b).unwrap();

        assert_eq!(product.len(), 3);
        assert_eq!(product.get(&[0]), Some(0.0));
        assert_eq!(product.get(&[1]), Some(12.0));
        assert_eq!(product.get(&[5]), Some(0.0));
    }

    #[test]
    fn combine_rejects_arity_mismatch() {
        let a: SparseTensor<i64> = SparseTensor::from_pairs(vec![(0, 1.0)]);
        let b = sample();

        let result = combine(|x, y| x * y, &a, &b);

        assert!(matches!(result, Err(SparseError::ArityMismatch { expected: 1, found: 2 })));
    }

    #[test]
    fn real_coordinates_sort_by_total_order() {
        let m: SparseTensor<f64> =
            SparseTensor::from_triples(vec![(0.0, 2.5, 1.0), (0.0, -1.0, 1.0), (0.0, 0.3, 1.0)]);

        let cols: Vec<f64> = m.iter().map(|e| e.index[1]).collect();

        assert_eq!(cols, vec![-1.0, 0.3, 2.5]);
    }

    #[test]
    fn to_integral_rejects_fractional_coordinates() {
        let ok: SparseTensor<f64> = SparseTensor::from_triples(vec![(1.0, 2.0, 1.0)]);
        let bad: SparseTensor<f64> = SparseTensor::from_triples(vec![(1.0, 2.5, 1.0)]);

        assert_eq!(ok.to_integral().unwrap(), SparseTensor::from_triples(vec![(1, 2, 1.0)]));
        assert_eq!(bad.to_integral(), Err(SparseError::NonIntegralCoordinate { value: 2.5 }));
    }

    #[test]
    fn to_real_round_trips_integral_matrix() {
        let m = sample();

        let back = m.to_real().to_integral().unwrap();

        assert_eq!(back, m);
    }
}
