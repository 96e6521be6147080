// Copyright 2026 DictShare Project Authors. Licensed under Apache-2.0.

//! Dictionary similarity and merge admissibility.

use itertools::Itertools;

use crate::storage::IdWidth;

/// Union of two sorted, distinct sequences via a linear merge.
pub fn sorted_union<T: Clone + Ord>(lhs: &[T], rhs: &[T]) -> Vec<T> {
    lhs.iter().merge(rhs.iter()).dedup().cloned().collect()
}

/// Jaccard index from the union and intersection sizes of two sets.
/// An empty union yields 0.
pub fn jaccard_index(union_size: usize, intersection_size: usize) -> f64 {
    debug_assert!(
        intersection_size <= union_size,
        "intersection cannot be larger than the union"
    );
    if union_size == 0 {
        0.0
    } else {
        intersection_size as f64 / union_size as f64
    }
}

/// Decides whether a candidate shared dictionary of `union_size` entries may
/// replace the dictionaries of the given member segments.
///
/// A merge is admissible when the Jaccard index reaches the threshold and
/// the union stays in the same attribute-vector width class as every
/// member's current dictionary, so no attribute vector is ever widened.
pub fn merge_admissible(
    threshold: f64,
    jaccard: f64,
    union_size: usize,
    member_dictionary_sizes: impl IntoIterator<Item = usize>,
) -> bool {
    if jaccard < threshold {
        return false;
    }
    let union_width = IdWidth::for_dictionary_size(union_size);
    member_dictionary_sizes
        .into_iter()
        .all(|size| IdWidth::for_dictionary_size(size) == union_width)
}
