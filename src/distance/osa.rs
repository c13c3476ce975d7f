//! Optimal String Alignment distance: Levenshtein plus adjacent
//! transpositions, each position taking part in at most one operation.
//!
//! The kernel extends the Hyyrö step with a transposition term built from
//! the previous element's pattern mask; the block form additionally carries
//! the previous row's `D0` and mask words across word boundaries.

use crate::pattern::{BlockPatternMatchVector, PatternBitmap, PatternMatchVector};
use crate::textprep::remove_common_affix;
use crate::types::Element;

use super::{
    normalized_distance_via_distance, normalized_similarity_via_distance,
    similarity_via_distance,
};

// ─────────────────────────────────────────────────────────────────────────────
// Kernels
// ─────────────────────────────────────────────────────────────────────────────

/// Single-word variant for patterns of at most 64 elements.
fn osa_hyrroe2003<T: Element, P: PatternBitmap<T>>(
    pm: &P,
    s1_len: usize,
    s2: &[T],
    max: usize,
) -> usize {
    debug_assert!(s1_len > 0 && s1_len <= 64);
    let mut vp = u64::MAX;
    let mut vn = 0u64;
    let mut d0 = 0u64;
    let mut pm_j_old = 0u64;
    let mut dist = s1_len;
    let mask = 1u64 << (s1_len - 1);

    for &ch in s2 {
        let pm_j = pm.get(0, ch);
        // an adjacent swap shows up as a mismatch followed by the swapped
        // pair matching crosswise
        let tr = (((!d0) & pm_j) << 1) & pm_j_old;
        d0 = ((((pm_j & vp).wrapping_add(vp)) ^ vp) | pm_j | vn) | tr;

        let mut hp = vn | !(d0 | vp);
        let mut hn = d0 & vp;

        dist += usize::from(hp & mask != 0);
        dist -= usize::from(hn & mask != 0);

        hp = (hp << 1) | 1;
        hn <<= 1;

        vp = hn | !(d0 | hp);
        vn = hp & d0;
        pm_j_old = pm_j;
    }

    if dist <= max {
        dist
    } else {
        max + 1
    }
}

#[derive(Clone, Copy)]
struct OsaRow {
    vp: u64,
    vn: u64,
    d0: u64,
    pm: u64,
}

impl Default for OsaRow {
    fn default() -> Self {
        OsaRow { vp: u64::MAX, vn: 0, d0: 0, pm: 0 }
    }
}

/// Blockwise variant; keeps the previous row's `D0` and pattern mask per
/// word so the transposition term can reach across word boundaries.
fn osa_hyrroe2003_block<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    max: usize,
) -> usize {
    let words = PatternBitmap::<T>::word_count(pm);
    let last_mask = 1u64 << ((s1.len() - 1) % 64);

    let mut dist = s1.len();
    let mut old_vecs = vec![OsaRow::default(); words + 1];
    let mut new_vecs = vec![OsaRow::default(); words + 1];

    for &ch in s2 {
        let mut hp_carry = 1u64;
        let mut hn_carry = 0u64;

        for word in 0..words {
            let vn = old_vecs[word + 1].vn;
            let vp = old_vecs[word + 1].vp;
            let mut d0 = old_vecs[word + 1].d0;
            let d0_last = old_vecs[word].d0;

            let pm_j_old = old_vecs[word + 1].pm;
            let pm_last = new_vecs[word].pm;

            let pm_j = pm.get(word, ch);
            let mut x = pm_j;
            let tr = ((((!d0) & x) << 1) | (((!d0_last) & pm_last) >> 63)) & pm_j_old;

            x |= hn_carry;
            d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn | tr;

            let mut hp = vn | !(d0 | vp);
            let mut hn = d0 & vp;

            if word == words - 1 {
                dist += usize::from(hp & last_mask != 0);
                dist -= usize::from(hn & last_mask != 0);
            }

            let hp_carry_in = hp_carry;
            hp_carry = hp >> 63;
            hp = (hp << 1) | hp_carry_in;
            let hn_carry_in = hn_carry;
            hn_carry = hn >> 63;
            hn = (hn << 1) | hn_carry_in;

            new_vecs[word + 1].vp = hn | !(d0 | hp);
            new_vecs[word + 1].vn = hp & d0;
            new_vecs[word + 1].d0 = d0;
            new_vecs[word + 1].pm = pm_j;
        }

        std::mem::swap(&mut new_vecs, &mut old_vecs);
    }

    if dist <= max {
        dist
    } else {
        max + 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) fn distance_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: usize) -> usize {
    // keep the pattern on the shorter side
    if s2.len() < s1.len() {
        return distance_kernel(s2, s1, score_cutoff);
    }

    let (mut s1, mut s2) = (s1, s2);
    remove_common_affix(&mut s1, &mut s2);
    if s1.is_empty() {
        return if s2.len() <= score_cutoff { s2.len() } else { score_cutoff + 1 };
    }

    if s1.len() < 64 {
        osa_hyrroe2003(&PatternMatchVector::new(s1), s1.len(), s2, score_cutoff)
    } else {
        osa_hyrroe2003_block(&BlockPatternMatchVector::new(s1), s1, s2, score_cutoff)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

fn maximum(len1: usize, len2: usize) -> usize {
    len1.max(len2)
}

/// OSA distance between `s1` and `s2`.
pub fn distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    let cutoff = score_cutoff.unwrap_or(usize::MAX).min(maximum(s1.len(), s2.len()));
    let dist = distance_kernel(s1, s2, cutoff);
    match score_cutoff {
        Some(c) if dist > c => c.saturating_add(1),
        _ => dist,
    }
}

/// `max(|s1|, |s2|) − distance`.
pub fn similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    similarity_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum(s1.len(), s2.len())))
    })
}

/// Distance scaled into `[0, 1]` by `max(|s1|, |s2|)`.
pub fn normalized_distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_distance_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum(s1.len(), s2.len())))
    })
}

/// `1 − normalized_distance`.
pub fn normalized_similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    normalized_similarity_via_distance(maximum(s1.len(), s2.len()), score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum(s1.len(), s2.len())))
    })
}
