//! Longest common subsequence, computed with the bit-parallel automaton of
//! Hyyrö (2004).
//!
//! The state word `S` starts as all ones; per text element the update
//! `u = S & M`, `S = (S + u) | (S − u)` advances one DP row, and the LCS
//! length is the popcount of `!S`. Patterns longer than 64 elements chain
//! the addition carry across words. Very small miss budgets skip the
//! automaton entirely and replay mbleven micro edit scripts.

use crate::bitutil::{add_carry64, ceil_div, popcount64};
use crate::editops::{EditOp, EditType, Editops};
use crate::matrix::ShiftedBitMatrix;
use crate::pattern::{BlockPatternMatchVector, PatternBitmap, PatternMatchVector};
use crate::textprep::remove_common_affix;
use crate::types::{Element, StringAffix};

use super::{
    distance_via_similarity, normalized_distance_via_similarity,
    normalized_similarity_via_similarity,
};

// ─────────────────────────────────────────────────────────────────────────────
// mbleven micro edit scripts
// ─────────────────────────────────────────────────────────────────────────────

// Each byte encodes an edit sequence, two bits per operation read LSB-first:
// 01 advances the first sequence (delete), 10 advances the second (insert).
// Row `(d + d²)/2 + Δ − 1` lists every script shape for miss budget `d` and
// length difference `Δ`; trailing zero entries replay as "stop at the first
// mismatch", which can never win but keeps the rows rectangular.
#[rustfmt::skip]
const LCS_MBLEVEN_MATRIX: [[u8; 7]; 14] = [
    // miss budget 1
    [0x00, 0, 0, 0, 0, 0, 0],                   // Δ 0 (cannot occur)
    [0x01, 0, 0, 0, 0, 0, 0],                   // Δ 1
    // miss budget 2
    [0x09, 0x06, 0, 0, 0, 0, 0],                // Δ 0
    [0x01, 0, 0, 0, 0, 0, 0],                   // Δ 1
    [0x05, 0, 0, 0, 0, 0, 0],                   // Δ 2
    // miss budget 3
    [0x09, 0x06, 0, 0, 0, 0, 0],                // Δ 0
    [0x25, 0x19, 0x16, 0, 0, 0, 0],             // Δ 1
    [0x05, 0, 0, 0, 0, 0, 0],                   // Δ 2
    [0x15, 0, 0, 0, 0, 0, 0],                   // Δ 3
    // miss budget 4
    [0x96, 0x66, 0x5A, 0x99, 0x69, 0xA5, 0],    // Δ 0
    [0x25, 0x19, 0x16, 0, 0, 0, 0],             // Δ 1
    [0x65, 0x56, 0x95, 0x59, 0, 0, 0],          // Δ 2
    [0x15, 0, 0, 0, 0, 0, 0],                   // Δ 3
    [0x55, 0, 0, 0, 0, 0, 0],                   // Δ 4
];

/// LCS length for inputs whose miss budget (`len1 − score_cutoff`) is at
/// most 4, by replaying the candidate edit scripts.
fn lcs_mbleven<T: Element>(s1: &[T], s2: &[T], score_cutoff: isize) -> usize {
    if s1.len() < s2.len() {
        return lcs_mbleven(s2, s1, score_cutoff);
    }

    let len1 = s1.len();
    let len2 = s2.len();
    let len_diff = len1 - len2;
    let max_misses = len1 as isize - score_cutoff;
    debug_assert!((1..=4).contains(&max_misses));
    debug_assert!(len_diff as isize <= max_misses);

    let ops_index = (max_misses + max_misses * max_misses) / 2 + len_diff as isize - 1;
    let possible_ops = &LCS_MBLEVEN_MATRIX[ops_index as usize];

    let mut max_len = 0usize;
    for &encoded in possible_ops {
        let mut ops = encoded;
        let mut s1_pos = 0;
        let mut s2_pos = 0;
        let mut cur_len = 0usize;

        while s1_pos < len1 && s2_pos < len2 {
            if s1[s1_pos] != s2[s2_pos] {
                if ops == 0 {
                    break;
                }
                if ops & 1 != 0 {
                    s1_pos += 1;
                } else if ops & 2 != 0 {
                    s2_pos += 1;
                }
                ops >>= 2;
            } else {
                cur_len += 1;
                s1_pos += 1;
                s2_pos += 1;
            }
        }

        max_len = max_len.max(cur_len);
    }

    if max_len as isize >= score_cutoff {
        max_len
    } else {
        0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bit-parallel automaton
// ─────────────────────────────────────────────────────────────────────────────

/// One automaton run; handles any pattern width by carrying the addition
/// across words.
fn lcs_run<T: Element, P: PatternBitmap<T>>(pm: &P, s2: &[T], score_cutoff: isize) -> usize {
    let words = pm.word_count();
    let mut state = vec![u64::MAX; words];

    for &ch in s2 {
        let mut carry = 0;
        for (word, slot) in state.iter_mut().enumerate() {
            let matches = pm.get(word, ch);
            let s = *slot;
            let u = s & matches;
            let (x, carry_out) = add_carry64(s, u, carry);
            carry = carry_out;
            *slot = x | (s - u);
        }
    }

    let sim: usize = state.iter().map(|&s| popcount64(!s) as usize).sum();
    if (sim as isize) >= score_cutoff {
        sim
    } else {
        0
    }
}

/// Automaton run that also records every row of `S` for alignment recovery.
fn lcs_run_record<T: Element, P: PatternBitmap<T>>(pm: &P, s2: &[T]) -> LcsMatrix {
    let words = pm.word_count();
    let mut state = vec![u64::MAX; words];
    let mut matrix = ShiftedBitMatrix::new(s2.len(), words, u64::MAX);

    for (row, &ch) in s2.iter().enumerate() {
        let mut carry = 0;
        let row_words = matrix.row_mut(row);
        for (word, slot) in state.iter_mut().enumerate() {
            let matches = pm.get(word, ch);
            let s = *slot;
            let u = s & matches;
            let (x, carry_out) = add_carry64(s, u, carry);
            carry = carry_out;
            *slot = x | (s - u);
            row_words[word] = *slot;
        }
    }

    let sim = state.iter().map(|&s| popcount64(!s) as usize).sum();
    LcsMatrix { sim, s: matrix }
}

/// Automaton dispatch on pattern width.
fn lcs_auto<T: Element>(s1: &[T], s2: &[T], score_cutoff: isize) -> usize {
    if s1.is_empty() {
        0
    } else if s1.len() <= 64 {
        lcs_run(&PatternMatchVector::new(s1), s2, score_cutoff)
    } else {
        lcs_run(&BlockPatternMatchVector::new(s1), s2, score_cutoff)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Similarity kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Similarity with short-input fast paths; `s1` and `s2` in either order.
pub(crate) fn similarity_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: isize) -> usize {
    // keep the pattern on the longer side
    if s1.len() < s2.len() {
        return similarity_kernel(s2, s1, score_cutoff);
    }

    let len1 = s1.len();
    let len2 = s2.len();
    let max_misses = (len1 + len2) as isize - 2 * score_cutoff;

    // no edits allowed: a direct comparison settles it
    if max_misses == 0 || (max_misses == 1 && len1 == len2) {
        return if s1 == s2 { len1 } else { 0 };
    }

    // the length difference alone exceeds the budget
    if max_misses < (len1 - len2) as isize {
        return 0;
    }

    // a common affix contributes matches for free
    let (mut s1, mut s2) = (s1, s2);
    let affix = remove_common_affix(&mut s1, &mut s2);
    let mut sim = affix.prefix_len + affix.suffix_len;
    if !s1.is_empty() && !s2.is_empty() {
        let rest_cutoff = score_cutoff - sim as isize;
        if max_misses < 5 {
            sim += lcs_mbleven(s1, s2, rest_cutoff);
        } else {
            sim += lcs_auto(s1, s2, rest_cutoff);
        }
    }

    sim
}

/// Similarity against a precomputed pattern bitmap. The bitmap fixes the
/// pattern side, so the affix fast path only applies when the budget is
/// small enough to bypass the bitmap entirely.
pub(crate) fn similarity_with_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    score_cutoff: isize,
) -> usize {
    let len1 = s1.len();
    let len2 = s2.len();
    let max_misses = (len1 + len2) as isize - 2 * score_cutoff;

    if max_misses == 0 || (max_misses == 1 && len1 == len2) {
        return if s1 == s2 { len1 } else { 0 };
    }

    if max_misses < (len1 as isize - len2 as isize).abs() {
        return 0;
    }

    // the encoded pattern cannot be affix-stripped
    if max_misses >= 5 {
        if s1.is_empty() {
            return 0;
        }
        return lcs_run(pm, s2, score_cutoff);
    }

    let (mut s1, mut s2) = (s1, s2);
    let affix = remove_common_affix(&mut s1, &mut s2);
    let mut sim = affix.prefix_len + affix.suffix_len;
    if !s1.is_empty() && !s2.is_empty() {
        sim += lcs_mbleven(s1, s2, score_cutoff - sim as isize);
    }

    sim
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment recovery
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct LcsMatrix {
    pub sim: usize,
    pub s: ShiftedBitMatrix,
}

fn lcs_matrix<T: Element>(s1: &[T], s2: &[T]) -> LcsMatrix {
    if s1.is_empty() {
        LcsMatrix { sim: 0, s: ShiftedBitMatrix::default() }
    } else if ceil_div(s1.len(), 64) == 1 {
        lcs_run_record(&PatternMatchVector::new(s1), s2)
    } else {
        lcs_run_record(&BlockPatternMatchVector::new(s1), s2)
    }
}

/// Walk the recorded automaton rows from the bottom-right corner: a set
/// `S`-bit means the pattern element was skipped (delete), a cleared bit on
/// the row above means the text element was skipped (insert), anything else
/// is a match.
fn recover_alignment<T: Element>(
    s1: &[T],
    s2: &[T],
    matrix: &LcsMatrix,
    affix: StringAffix,
) -> Editops {
    let len1 = s1.len();
    let len2 = s2.len();
    let mut dist = len1 + len2 - 2 * matrix.sim;

    let mut editops = Editops::new(
        len1 + affix.prefix_len + affix.suffix_len,
        len2 + affix.prefix_len + affix.suffix_len,
    );
    if dist == 0 {
        return editops;
    }
    editops.ops = vec![EditOp::new(EditType::Delete, 0, 0); dist];

    let mut col = len1;
    let mut row = len2;

    while row > 0 && col > 0 {
        // deletion from the pattern
        if matrix.s.test_bit(row - 1, col - 1, false) {
            debug_assert!(dist > 0);
            dist -= 1;
            col -= 1;
            editops.ops[dist] =
                EditOp::new(EditType::Delete, col + affix.prefix_len, row + affix.prefix_len);
        } else {
            row -= 1;

            // insertion from the text
            if row > 0 && !matrix.s.test_bit(row - 1, col - 1, false) {
                debug_assert!(dist > 0);
                dist -= 1;
                editops.ops[dist] =
                    EditOp::new(EditType::Insert, col + affix.prefix_len, row + affix.prefix_len);
            } else {
                col -= 1;
                debug_assert_eq!(s1[col], s2[row]);
            }
        }
    }

    while col > 0 {
        dist -= 1;
        col -= 1;
        editops.ops[dist] =
            EditOp::new(EditType::Delete, col + affix.prefix_len, row + affix.prefix_len);
    }

    while row > 0 {
        dist -= 1;
        row -= 1;
        editops.ops[dist] =
            EditOp::new(EditType::Insert, col + affix.prefix_len, row + affix.prefix_len);
    }

    editops
}

pub(crate) fn editops_kernel<T: Element>(s1: &[T], s2: &[T]) -> Editops {
    // the common affix consists of matches, which are never recorded
    let (mut s1r, mut s2r) = (s1, s2);
    let affix = remove_common_affix(&mut s1r, &mut s2r);

    recover_alignment(s1r, s2r, &lcs_matrix(s1r, s2r), affix)
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

fn maximum(len1: usize, len2: usize) -> usize {
    len1.max(len2)
}

/// LCS distance: `max(|s1|, |s2|) − lcs(s1, s2)`.
pub fn distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    distance_via_similarity(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        similarity_kernel(s1, s2, cutoff as isize)
    })
}

/// Length of the longest common subsequence; `0` when it cannot reach
/// `score_cutoff`.
pub fn similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    similarity_kernel(s1, s2, score_cutoff.unwrap_or(0) as isize)
}

/// Distance scaled into `[0, 1]` by `max(|s1|, |s2|)`.
pub fn normalized_distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_distance_via_similarity(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        similarity_kernel(s1, s2, cutoff as isize)
    })
}

/// `1 − normalized_distance`.
pub fn normalized_similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_similarity_via_similarity(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        similarity_kernel(s1, s2, cutoff as isize)
    })
}

/// Minimum insert/delete script turning `s1` into `s2`.
pub fn editops<T: Element>(s1: &[T], s2: &[T]) -> Editops {
    editops_kernel(s1, s2)
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached form
// ─────────────────────────────────────────────────────────────────────────────

/// LCS metric with the pattern-side preprocessing done once. Immutable after
/// construction; repeated queries against the same pattern skip the bitmap
/// build.
pub struct CachedLcsSeq<T: Element> {
    s1: Vec<T>,
    pm: BlockPatternMatchVector,
}

impl<T: Element> CachedLcsSeq<T> {
    pub fn new(s1: &[T]) -> Self {
        CachedLcsSeq { s1: s1.to_vec(), pm: BlockPatternMatchVector::new(s1) }
    }

    fn maximum(&self, s2: &[T]) -> usize {
        self.s1.len().max(s2.len())
    }

    pub fn distance(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        distance_via_similarity(self.maximum(s2), score_cutoff, |cutoff| {
            similarity_with_pmv(&self.pm, &self.s1, s2, cutoff as isize)
        })
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        similarity_with_pmv(&self.pm, &self.s1, s2, score_cutoff.unwrap_or(0) as isize)
    }

    pub fn normalized_distance(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_distance_via_similarity(self.maximum(s2), score_cutoff, |cutoff| {
            similarity_with_pmv(&self.pm, &self.s1, s2, cutoff as isize)
        })
    }

    pub fn normalized_similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_similarity_via_similarity(self.maximum(s2), score_cutoff, |cutoff| {
            similarity_with_pmv(&self.pm, &self.s1, s2, cutoff as isize)
        })
    }
}
