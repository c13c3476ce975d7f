//! Indel distance: edits restricted to insertions and deletions. Equal to
//! `|s1| + |s2| − 2·lcs(s1, s2)`, so the engine is a thin layer over the LCS
//! automaton.

use crate::editops::Editops;
use crate::pattern::BlockPatternMatchVector;
use crate::types::Element;

use super::lcs_seq;
use super::{
    normalized_distance_via_distance, normalized_similarity_via_distance,
    similarity_via_distance,
};

fn maximum(len1: usize, len2: usize) -> usize {
    len1 + len2
}

/// Translate a distance cutoff into the weakest LCS cutoff that can still
/// decide it, run the LCS kernel, and map back.
pub(crate) fn distance_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: usize) -> usize {
    let maximum = maximum(s1.len(), s2.len());
    let lcs_cutoff = (maximum / 2).saturating_sub(score_cutoff);
    let lcs_sim = lcs_seq::similarity_kernel(s1, s2, lcs_cutoff as isize);
    let dist = maximum - 2 * lcs_sim;
    if dist <= score_cutoff {
        dist
    } else {
        score_cutoff.saturating_add(1)
    }
}

pub(crate) fn distance_with_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    score_cutoff: usize,
) -> usize {
    let maximum = maximum(s1.len(), s2.len());
    let lcs_cutoff = (maximum / 2).saturating_sub(score_cutoff);
    let lcs_sim = lcs_seq::similarity_with_pmv(pm, s1, s2, lcs_cutoff as isize);
    let dist = maximum - 2 * lcs_sim;
    if dist <= score_cutoff {
        dist
    } else {
        score_cutoff.saturating_add(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum number of insertions and deletions turning `s1` into `s2`.
pub fn distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    distance_kernel(s1, s2, score_cutoff.unwrap_or(usize::MAX))
}

/// `|s1| + |s2| − indel_distance`, the doubled LCS length.
pub fn similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    similarity_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    })
}

/// Distance scaled into `[0, 1]` by `|s1| + |s2|`.
pub fn normalized_distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_distance_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    })
}

/// `1 − normalized_distance`; the basis of [`crate::fuzz::ratio`].
pub fn normalized_similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_similarity_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff)
    })
}

/// Insert/delete script turning `s1` into `s2`; identical to the LCS script.
pub fn editops<T: Element>(s1: &[T], s2: &[T]) -> Editops {
    lcs_seq::editops_kernel(s1, s2)
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached form
// ─────────────────────────────────────────────────────────────────────────────

/// Indel metric with the pattern bitmap built once.
pub struct CachedIndel<T: Element> {
    s1: Vec<T>,
    pm: BlockPatternMatchVector,
}

impl<T: Element> CachedIndel<T> {
    pub fn new(s1: &[T]) -> Self {
        CachedIndel { s1: s1.to_vec(), pm: BlockPatternMatchVector::new(s1) }
    }

    pub fn pattern(&self) -> &[T] {
        &self.s1
    }

    fn maximum(&self, s2: &[T]) -> usize {
        self.s1.len() + s2.len()
    }

    pub fn distance(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        distance_with_pmv(&self.pm, &self.s1, s2, score_cutoff.unwrap_or(usize::MAX))
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        similarity_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_with_pmv(&self.pm, &self.s1, s2, cutoff)
        })
    }

    pub fn normalized_distance(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_distance_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_with_pmv(&self.pm, &self.s1, s2, cutoff)
        })
    }

    pub fn normalized_similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_similarity_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_with_pmv(&self.pm, &self.s1, s2, cutoff)
        })
    }
}
