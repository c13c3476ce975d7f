//! Unrestricted Damerau–Levenshtein distance (transpositions may move over
//! arbitrary gaps), computed with the linear-space algorithm of Zhao and
//! Sahni.
//!
//! Costs are uniform by definition of this API: there is no weighted entry
//! point, so non-unit weights are rejected structurally rather than being
//! silently ignored.

use crate::pattern::HybridGrowingHashmap;
use crate::textprep::remove_common_affix;
use crate::types::Element;

use super::{
    normalized_distance_via_distance, normalized_similarity_via_distance,
    similarity_via_distance,
};

// ─────────────────────────────────────────────────────────────────────────────
// Zhao–Sahni recurrence
// ─────────────────────────────────────────────────────────────────────────────

/// Latest row at which an element occurred; the default marks "never seen".
#[derive(Clone, Copy, PartialEq)]
struct RowId<I> {
    val: I,
}

impl<I: From<i8>> Default for RowId<I> {
    fn default() -> Self {
        RowId { val: I::from(-1) }
    }
}

trait RowInt: Copy + Default + PartialEq + From<i8> {
    fn to_i64(self) -> i64;
    fn from_i64(v: i64) -> Self;
}

macro_rules! impl_row_int {
    ($($ty:ty),*) => {$(
        impl RowInt for $ty {
            #[inline]
            fn to_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn from_i64(v: i64) -> Self {
                v as $ty
            }
        }
    )*};
}

impl_row_int!(i16, i32, i64);

/// Three rolling rows (`r`, `r1`, `fr`) plus per-element bookkeeping give
/// the unrestricted transposition term in linear space. `I` is the smallest
/// signed integer type that can hold `max(len1, len2) + 1`.
fn zhao_sahni<I: RowInt, T: Element>(s1: &[T], s2: &[T], max: usize) -> usize {
    let len1 = s1.len();
    let len2 = s2.len();
    let max_val = I::from_i64((len1.max(len2) + 1) as i64);

    let mut last_row_id: HybridGrowingHashmap<RowId<I>> = HybridGrowingHashmap::new();
    let size = len2 + 2;
    let mut fr = vec![max_val; size];
    let mut r1 = vec![max_val; size];
    let mut r: Vec<I> = std::iter::once(max_val)
        .chain((0..=len2 as i64).map(I::from_i64))
        .collect();

    for i in 1..=len1 {
        std::mem::swap(&mut r, &mut r1);
        let mut last_col_id: i64 = -1;
        let mut last_i2l1 = r[1]; // R[0]
        r[1] = I::from_i64(i as i64);
        let mut t = max_val;

        for j in 1..=len2 {
            // rows are offset by one so index -1 is addressable
            let diag =
                r1[j].to_i64() + i64::from(s1[i - 1] != s2[j - 1]);
            let left = r[j].to_i64() + 1;
            let up = r1[j + 1].to_i64() + 1;
            let mut temp = diag.min(left).min(up);

            if s1[i - 1] == s2[j - 1] {
                last_col_id = j as i64; // last occurrence of s1[i-1]
                fr[j + 1] = r1[j - 1]; // row above, two columns back
                t = last_i2l1; // two rows above, one column back
            } else {
                let k = last_row_id.get(s2[j - 1]).val.to_i64();
                let l = last_col_id;

                if j as i64 - l == 1 {
                    let transpose = fr[j + 1].to_i64() + (i as i64 - k);
                    temp = temp.min(transpose);
                } else if i as i64 - k == 1 {
                    let transpose = t.to_i64() + (j as i64 - l);
                    temp = temp.min(transpose);
                }
            }

            last_i2l1 = r[j + 1];
            r[j + 1] = I::from_i64(temp);
        }
        last_row_id.value_mut(s1[i - 1]).val = I::from_i64(i as i64);
    }

    let dist = r[len2 + 1].to_i64() as usize;
    if dist <= max {
        dist
    } else {
        max + 1
    }
}

pub(crate) fn distance_kernel<T: Element>(s1: &[T], s2: &[T], max: usize) -> usize {
    let min_edits = s1.len().abs_diff(s2.len());
    if min_edits > max {
        return max.saturating_add(1);
    }

    // a common affix never affects the distance
    let (mut s1, mut s2) = (s1, s2);
    remove_common_affix(&mut s1, &mut s2);

    // pick the narrowest row type that fits the value range
    let max_val = s1.len().max(s2.len()) + 1;
    if max_val < i16::MAX as usize {
        zhao_sahni::<i16, T>(s1, s2, max)
    } else if max_val < i32::MAX as usize {
        zhao_sahni::<i32, T>(s1, s2, max)
    } else {
        zhao_sahni::<i64, T>(s1, s2, max)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

fn maximum(len1: usize, len2: usize) -> usize {
    len1.max(len2)
}

/// Damerau–Levenshtein distance between `s1` and `s2`.
pub fn distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    let maximum = maximum(s1.len(), s2.len());
    let cutoff = score_cutoff.unwrap_or(usize::MAX).min(maximum);
    let dist = distance_kernel(s1, s2, cutoff);
    match score_cutoff {
        Some(c) if dist > c => c.saturating_add(1),
        _ => dist,
    }
}

/// `max(|s1|, |s2|) − distance`.
pub fn similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<usize>) -> usize {
    let maximum = maximum(s1.len(), s2.len());
    similarity_via_distance(maximum, score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum))
    })
}

/// Distance scaled into `[0, 1]` by `max(|s1|, |s2|)`.
pub fn normalized_distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let maximum = maximum(s1.len(), s2.len());
    normalized_distance_via_distance(maximum, score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum))
    })
}

/// `1 − normalized_distance`.
pub fn normalized_similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let maximum = maximum(s1.len(), s2.len());
    normalized_similarity_via_distance(maximum, score_cutoff, |cutoff| {
        distance_kernel(s1, s2, cutoff.min(maximum))
    })
}
