//! Hamming distance: pairwise mismatch count over equal-length sequences.

use crate::types::{Element, MetricError};

use super::{
    normalized_distance_via_distance, normalized_similarity_via_distance,
    similarity_via_distance,
};

fn check_lengths<T>(s1: &[T], s2: &[T]) -> Result<(), MetricError> {
    if s1.len() != s2.len() {
        return Err(MetricError::LengthMismatch { len1: s1.len(), len2: s2.len() });
    }
    Ok(())
}

fn distance_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: usize) -> usize {
    let dist = s1.iter().zip(s2.iter()).filter(|(a, b)| a != b).count();
    if dist <= score_cutoff {
        dist
    } else {
        score_cutoff.saturating_add(1)
    }
}

/// Number of positions at which `s1` and `s2` differ.
pub fn distance<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<usize>,
) -> Result<usize, MetricError> {
    check_lengths(s1, s2)?;
    Ok(distance_kernel(s1, s2, score_cutoff.unwrap_or(usize::MAX)))
}

/// Number of positions at which `s1` and `s2` agree.
pub fn similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<usize>,
) -> Result<usize, MetricError> {
    check_lengths(s1, s2)?;
    Ok(similarity_via_distance(s1.len(), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    }))
}

/// Distance scaled into `[0, 1]`.
///
/// The divisor is `|s1|`; the preceding length check makes this equal to
/// `max(|s1|, |s2|)`, and the `|s1|` form is kept deliberately.
pub fn normalized_distance<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    check_lengths(s1, s2)?;
    Ok(normalized_distance_via_distance(s1.len(), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    }))
}

/// `1 − normalized_distance`.
pub fn normalized_similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    check_lengths(s1, s2)?;
    Ok(normalized_similarity_via_distance(s1.len(), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    }))
}
