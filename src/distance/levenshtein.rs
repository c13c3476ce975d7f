//! Levenshtein distance with unit and weighted costs.
//!
//! The uniform-cost engine picks between a direct comparison, mbleven micro
//! edit scripts, the single-word automaton of Hyyrö (2003), a banded variant
//! whose 64-bit window slides along the diagonal, and the blockwise
//! algorithm of Myers (1999) with Ukkonen band pruning. Weighted costs
//! either reduce to the uniform or indel engines (scaled by the common
//! factor) or fall back to a single-row Wagner–Fischer DP.
//!
//! Edit scripts are recovered from the recorded `VP`/`VN` matrices; when a
//! full matrix would be too large, a Hirschberg split on single DP rows cuts
//! the problem in two and recursion proceeds over an explicit work stack.

use log::trace;

use crate::bitutil::{ceil_div, popcount64, shr64};
use crate::editops::{EditOp, EditType, Editops};
use crate::matrix::ShiftedBitMatrix;
use crate::pattern::{
    BlockPatternMatchVector, HybridGrowingHashmap, PatternBitmap, PatternMatchVector,
};
use crate::textprep::remove_common_affix;
use crate::types::{Element, LevenshteinWeights};

use super::indel;
use super::{
    normalized_distance_via_distance, normalized_similarity_via_distance,
    similarity_via_distance,
};

// ─────────────────────────────────────────────────────────────────────────────
// mbleven micro edit scripts
// ─────────────────────────────────────────────────────────────────────────────

// Two bits per operation, LSB-first: 01 delete, 10 insert, 11 substitute.
// Row `(d + d²)/2 + Δ` covers edit budget `d` and length difference `Δ`.
#[rustfmt::skip]
const LEV_MBLEVEN_MATRIX: [[u8; 8]; 9] = [
    // edit budget 1
    [0x03, 0, 0, 0, 0, 0, 0, 0],                         // Δ 0
    [0x01, 0, 0, 0, 0, 0, 0, 0],                         // Δ 1
    // edit budget 2
    [0x0F, 0x09, 0x06, 0, 0, 0, 0, 0],                   // Δ 0
    [0x0D, 0x07, 0, 0, 0, 0, 0, 0],                      // Δ 1
    [0x05, 0, 0, 0, 0, 0, 0, 0],                         // Δ 2
    // edit budget 3
    [0x3F, 0x27, 0x2D, 0x39, 0x36, 0x1E, 0x1B, 0],       // Δ 0
    [0x3D, 0x37, 0x1F, 0x25, 0x19, 0x16, 0, 0],          // Δ 1
    [0x35, 0x1D, 0x17, 0, 0, 0, 0, 0],                   // Δ 2
    [0x15, 0, 0, 0, 0, 0, 0, 0],                         // Δ 3
];

/// Unit-cost distance for edit budgets below 4 by replaying candidate
/// scripts. Expects non-empty inputs whose first and last elements differ
/// (the caller strips the common affix first).
fn lev_mbleven<T: Element>(s1: &[T], s2: &[T], max: usize) -> usize {
    if s1.len() < s2.len() {
        return lev_mbleven(s2, s1, max);
    }

    let len1 = s1.len();
    let len2 = s2.len();
    debug_assert!(len1 > 0 && len2 > 0);
    debug_assert!(s1[0] != s2[0]);
    debug_assert!(s1[len1 - 1] != s2[len2 - 1]);

    let len_diff = len1 - len2;

    if max == 1 {
        return max + usize::from(len_diff == 1 || len1 != 1);
    }

    let ops_index = (max + max * max) / 2 + len_diff - 1;
    let possible_ops = &LEV_MBLEVEN_MATRIX[ops_index];
    let mut dist = max + 1;

    for &encoded in possible_ops {
        let mut ops = encoded;
        let mut s1_pos = 0;
        let mut s2_pos = 0;
        let mut cur_dist = 0;

        while s1_pos < len1 && s2_pos < len2 {
            if s1[s1_pos] != s2[s2_pos] {
                cur_dist += 1;
                if ops == 0 {
                    break;
                }
                if ops & 1 != 0 {
                    s1_pos += 1;
                }
                if ops & 2 != 0 {
                    s2_pos += 1;
                }
                ops >>= 2;
            } else {
                s1_pos += 1;
                s2_pos += 1;
            }
        }

        cur_dist += (len1 - s1_pos) + (len2 - s2_pos);
        dist = dist.min(cur_dist);
    }

    if dist <= max {
        dist
    } else {
        max + 1
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recorded matrices
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct LevMatrix {
    pub dist: usize,
    pub vp: ShiftedBitMatrix,
    pub vn: ShiftedBitMatrix,
}

#[derive(Clone, Copy)]
struct LevRow {
    vp: u64,
    vn: u64,
}

impl Default for LevRow {
    fn default() -> Self {
        LevRow { vp: u64::MAX, vn: 0 }
    }
}

/// Final DP row of a blockwise run, stopped at `stop_row`: the live band,
/// its vertical delta words and the score entering the band.
struct LevBitRow {
    first_block: usize,
    last_block: usize,
    prev_score: i64,
    vecs: Vec<LevRow>,
    dist: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Single-word automaton (pattern length ≤ 64)
// ─────────────────────────────────────────────────────────────────────────────

/// One Hyyrö (2003) step per text element; `VP`/`VN` hold the vertical
/// positive and negative deltas of the current DP column.
fn hyrroe2003<T: Element, P: PatternBitmap<T>>(
    pm: &P,
    s1_len: usize,
    s2: &[T],
    max: usize,
) -> usize {
    debug_assert!(s1_len > 0 && s1_len <= 64);
    let mut vp = u64::MAX;
    let mut vn = 0u64;
    let mut dist = s1_len;
    let mask = 1u64 << (s1_len - 1);

    for &ch in s2 {
        let x = pm.get(0, ch);
        let d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn;

        let mut hp = vn | !(d0 | vp);
        let mut hn = d0 & vp;

        dist += usize::from(hp & mask != 0);
        dist -= usize::from(hn & mask != 0);

        hp = (hp << 1) | 1;
        hn <<= 1;

        vp = hn | !(d0 | hp);
        vn = hp & d0;
    }

    if dist > max {
        max + 1
    } else {
        dist
    }
}

/// Single-word run recording `VP`/`VN` per row for alignment recovery.
fn hyrroe2003_matrix<T: Element>(pm: &PatternMatchVector, s1_len: usize, s2: &[T]) -> LevMatrix {
    debug_assert!(s1_len > 0 && s1_len <= 64);
    let mut vp = u64::MAX;
    let mut vn = 0u64;
    let mut dist = s1_len;
    let mask = 1u64 << (s1_len - 1);

    let mut vp_matrix = ShiftedBitMatrix::new(s2.len(), 1, u64::MAX);
    let mut vn_matrix = ShiftedBitMatrix::new(s2.len(), 1, 0);

    for (row, &ch) in s2.iter().enumerate() {
        let x = pm.get(ch);
        let d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn;

        let mut hp = vn | !(d0 | vp);
        let mut hn = d0 & vp;

        dist += usize::from(hp & mask != 0);
        dist -= usize::from(hn & mask != 0);

        hp = (hp << 1) | 1;
        hn <<= 1;

        vp = hn | !(d0 | hp);
        vn = hp & d0;

        vp_matrix.row_mut(row)[0] = vp;
        vn_matrix.row_mut(row)[0] = vn;
    }

    LevMatrix { dist, vp: vp_matrix, vn: vn_matrix }
}

// ─────────────────────────────────────────────────────────────────────────────
// Small-band variant (band of at most 64 diagonals)
// ─────────────────────────────────────────────────────────────────────────────

/// Fetch the 64-bit pattern window starting at signed position `start_pos`
/// from a blocked bitmap.
#[inline]
fn window_from_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    words: usize,
    ch: T,
    start_pos: isize,
) -> u64 {
    if start_pos < 0 {
        pm.get(0, ch) << -start_pos
    } else {
        let word = start_pos as usize / 64;
        let word_pos = start_pos as usize % 64;
        let mut pm_j = pm.get(word, ch) >> word_pos;
        if word + 1 < words && word_pos != 0 {
            pm_j |= pm.get(word + 1, ch) << (64 - word_pos);
        }
        pm_j
    }
}

/// Banded automaton over a precomputed bitmap: the window keeps the
/// diagonal at bit 63, scoring moves from the diagonal to the horizontal
/// mask once the band outruns the pattern.
fn small_band_with_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    max: usize,
) -> usize {
    debug_assert!(2 * max + 1 <= 64);
    let mut vp = u64::MAX << (64 - max - 1);
    let mut vn = 0u64;

    let words = PatternBitmap::<T>::word_count(pm);
    let mut dist = max as i64;
    let diagonal_mask = 1u64 << 63;
    let mut horizontal_mask = 1u64 << 62;
    let mut start_pos = max as isize + 1 - 64;

    // the score may shrink along the horizontal but not along the diagonal
    let break_score = (max + s2.len()) as i64 - (s1.len() - max) as i64;

    let diagonal_rows = s1.len() - max;
    for i in 0..s2.len() {
        let x = window_from_pmv(pm, words, s2[i], start_pos);
        let d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn;

        let hp = vn | !(d0 | vp);
        let hn = d0 & vp;

        if i < diagonal_rows {
            dist += i64::from(d0 & diagonal_mask == 0);
        } else {
            dist += i64::from(hp & horizontal_mask != 0);
            dist -= i64::from(hn & horizontal_mask != 0);
            horizontal_mask >>= 1;
        }

        if dist > break_score {
            return max + 1;
        }

        vp = hn | !((d0 >> 1) | hp);
        vn = (d0 >> 1) & hp;
        start_pos += 1;
    }

    if dist <= max as i64 {
        dist as usize
    } else {
        max + 1
    }
}

/// Banded automaton that maintains the pattern window online instead of
/// through a precomputed bitmap; optionally records the band rows.
fn small_band_online<T: Element, const RECORD: bool>(s1: &[T], s2: &[T], max: usize) -> LevMatrix {
    debug_assert!(max <= s1.len());
    debug_assert!(2 * max + 1 <= 64);

    let mut vp = u64::MAX << (64 - max - 1);
    let mut vn = 0u64;
    let mut dist = max as i64;

    let (mut vp_matrix, mut vn_matrix) = if RECORD {
        let mut vp_m = ShiftedBitMatrix::new(s2.len(), 1, u64::MAX);
        let mut vn_m = ShiftedBitMatrix::new(s2.len(), 1, 0);
        let start_offset = max as isize + 2 - 64;
        for row in 0..s2.len() {
            vp_m.set_offset(row, start_offset + row as isize);
            vn_m.set_offset(row, start_offset + row as isize);
        }
        (vp_m, vn_m)
    } else {
        (ShiftedBitMatrix::default(), ShiftedBitMatrix::default())
    };

    let diagonal_mask = 1u64 << 63;
    let mut horizontal_mask = 1u64 << 62;
    let break_score = (max + s2.len()) as i64 - (s1.len() - max) as i64;

    // sliding window over the pattern: per element the window position of
    // its latest occurrence and the occurrence mask at that position
    let mut pm: HybridGrowingHashmap<(i64, u64)> = HybridGrowingHashmap::new();
    for j in -(max as i64)..0 {
        let slot = pm.value_mut(s1[(j + max as i64) as usize]);
        slot.1 = shr64(slot.1, (j - slot.0) as isize) | (1u64 << 63);
        slot.0 = j;
    }

    let diagonal_rows = s1.len() - max;
    for i in 0..s2.len() {
        if i + max < s1.len() {
            let slot = pm.value_mut(s1[i + max]);
            slot.1 = shr64(slot.1, (i as i64 - slot.0) as isize) | (1u64 << 63);
            slot.0 = i as i64;
        }
        let (last_pos, mask) = pm.get(s2[i]);
        let x = shr64(mask, (i as i64 - last_pos) as isize);

        let d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn;

        let hp = vn | !(d0 | vp);
        let hn = d0 & vp;

        if i < diagonal_rows {
            dist += i64::from(d0 & diagonal_mask == 0);
        } else {
            dist += i64::from(hp & horizontal_mask != 0);
            dist -= i64::from(hn & horizontal_mask != 0);
            horizontal_mask >>= 1;
        }

        if dist > break_score {
            return LevMatrix { dist: max + 1, vp: vp_matrix, vn: vn_matrix };
        }

        vp = hn | !((d0 >> 1) | hp);
        vn = (d0 >> 1) & hp;

        if RECORD {
            vp_matrix.row_mut(i)[0] = vp;
            vn_matrix.row_mut(i)[0] = vn;
        }
    }

    let dist = if dist <= max as i64 { dist as usize } else { max + 1 };
    LevMatrix { dist, vp: vp_matrix, vn: vn_matrix }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blockwise automaton (Myers 1999) with Ukkonen band maintenance
// ─────────────────────────────────────────────────────────────────────────────

struct BlockRun {
    dist: usize,
    matrix: Option<(ShiftedBitMatrix, ShiftedBitMatrix)>,
    row: Option<LevBitRow>,
}

/// Blockwise run. `RECORD_MATRIX` stores the banded `VP`/`VN` rows,
/// `RECORD_ROW` stops after `stop_row` and hands back the live band words.
fn myers_block<T: Element, const RECORD_MATRIX: bool, const RECORD_ROW: bool>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    max_in: usize,
    stop_row: isize,
) -> BlockRun {
    let len1 = s1.len() as i64;
    let len2 = s2.len() as i64;
    let words = PatternBitmap::<T>::word_count(pm);
    debug_assert!(words > 0);

    let mut vecs = vec![LevRow::default(); words];
    let mut scores: Vec<i64> = (1..=words as i64).map(|i| i * 64).collect();
    scores[words - 1] = len1;
    let last_mask = 1u64 << ((s1.len() - 1) % 64);

    let mut max = (max_in as i64).min(len1.max(len2));

    let mut matrices = if RECORD_MATRIX {
        let full_band = len1.min(2 * max + 1);
        let full_band_words = words.min((full_band / 64) as usize + 2);
        Some((
            ShiftedBitMatrix::new(s2.len(), full_band_words, u64::MAX),
            ShiftedBitMatrix::new(s2.len(), full_band_words, 0),
        ))
    } else {
        None
    };

    // Ukkonen band over the word array
    let mut first_block = 0usize;
    let band_words = ceil_div_i64(max.min((max + len1 - len2) / 2) + 1, 64).max(1) as usize;
    let mut last_block = band_words.min(words) - 1;

    let row_num = |word: usize| -> i64 {
        if word + 1 == words {
            len1 - 1
        } else {
            (word as i64 + 1) * 64 - 1
        }
    };

    for row in 0..s2.len() {
        let mut hp_carry = 1u64;
        let mut hn_carry = 0u64;
        let row_first_block = first_block;

        if let Some((vp_m, vn_m)) = matrices.as_mut() {
            vp_m.set_offset(row, (row_first_block * 64) as isize);
            vn_m.set_offset(row, (row_first_block * 64) as isize);
        }

        macro_rules! advance_block {
            ($word:expr) => {{
                let word = $word;
                let vn = vecs[word].vn;
                let vp = vecs[word].vp;

                let x = pm.get(word, s2[row]) | hn_carry;
                let d0 = (((x & vp).wrapping_add(vp)) ^ vp) | x | vn;

                let mut hp = vn | !(d0 | vp);
                let mut hn = d0 & vp;

                let hp_carry_in = hp_carry;
                let hn_carry_in = hn_carry;
                if word < words - 1 {
                    hp_carry = hp >> 63;
                    hn_carry = hn >> 63;
                } else {
                    hp_carry = u64::from(hp & last_mask != 0);
                    hn_carry = u64::from(hn & last_mask != 0);
                }

                hp = (hp << 1) | hp_carry_in;
                hn = (hn << 1) | hn_carry_in;

                vecs[word].vp = hn | !(d0 | hp);
                vecs[word].vn = hp & d0;

                if let Some((vp_m, vn_m)) = matrices.as_mut() {
                    vp_m.row_mut(row)[word - row_first_block] = vecs[word].vp;
                    vn_m.row_mut(row)[word - row_first_block] = vecs[word].vn;
                }

                hp_carry as i64 - hn_carry as i64
            }};
        }

        for word in first_block..=last_block {
            scores[word] += advance_block!(word);
        }

        max = max.min(
            scores[last_block]
                + (len2 - row as i64 - 1).max(len1 - ((1 + last_block as i64) * 64 - 1) - 1),
        );

        // band adjustment: grow the lower end while the next block can
        // still be within reach
        if last_block + 1 < words
            && row_num(last_block)
                <= max - scores[last_block] + 2 * 64 - 2 - len2 + row as i64 + len1
        {
            last_block += 1;
            vecs[last_block] = LevRow::default();

            let chars_in_block: i64 =
                if last_block + 1 == words { ((len1 - 1) % 64) + 1 } else { 64 };
            scores[last_block] =
                scores[last_block - 1] + chars_in_block - (hp_carry as i64 - hn_carry as i64);
            scores[last_block] += advance_block!(last_block);
        }

        // band adjustment: drop blocks whose guaranteed minimum score left
        // the budget, from both ends
        let in_band_last = |scores: &[i64], word: usize| {
            scores[word] < max + 64
                && row_num(word) <= max - scores[word] + 2 * 64 - 2 - len2 + row as i64 + len1 + 1
        };
        let in_band_first = |scores: &[i64], word: usize| {
            scores[word] < max + 64
                && row_num(word) >= scores[word] - max - len2 + len1 + row as i64
        };

        let mut band_dead = false;
        while !in_band_last(&scores, last_block) {
            if last_block == first_block {
                band_dead = true;
                break;
            }
            last_block -= 1;
        }
        if !band_dead {
            while first_block <= last_block && !in_band_first(&scores, first_block) {
                first_block += 1;
            }
            band_dead = first_block > last_block;
        }

        if band_dead {
            trace!("band collapsed at row {row}, distance exceeds {max}");
            return BlockRun { dist: max as usize + 1, matrix: matrices, row: None };
        }

        if RECORD_ROW && row as isize == stop_row {
            let prev_score = if first_block == 0 {
                stop_row as i64 + 1
            } else {
                // walk back from the block score to the score at the last
                // position of the previous block
                let relevant_bits = ((first_block + 1) * 64).min(s1.len()) % 64;
                let mask = if relevant_bits != 0 { u64::MAX >> (64 - relevant_bits) } else { u64::MAX };
                scores[first_block] + popcount64(vecs[first_block].vn & mask) as i64
                    - popcount64(vecs[first_block].vp & mask) as i64
            };

            return BlockRun {
                dist: 0,
                matrix: matrices,
                row: Some(LevBitRow { first_block, last_block, prev_score, vecs, dist: 0 }),
            };
        }
    }

    let dist = scores[words - 1];
    let dist = if dist > max { max as usize + 1 } else { dist as usize };
    BlockRun { dist, matrix: matrices, row: None }
}

fn ceil_div_i64(a: i64, b: i64) -> i64 {
    a / b + i64::from(a % b != 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Uniform-cost dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Unit-cost distance; `s1` and `s2` in either order.
pub(crate) fn uniform_distance<T: Element>(s1: &[T], s2: &[T], max_in: usize) -> usize {
    // keep the pattern on the longer side
    if s1.len() < s2.len() {
        return uniform_distance(s2, s1, max_in);
    }

    let max = max_in.min(s1.len().max(s2.len()));

    // no differences allowed: a direct comparison suffices
    if max == 0 {
        return usize::from(s1 != s2);
    }

    // at least the length difference in insertions/deletions is required
    if max < s1.len() - s2.len() {
        return max + 1;
    }

    // a common affix never affects the distance
    let (mut s1, mut s2) = (s1, s2);
    remove_common_affix(&mut s1, &mut s2);
    if s1.is_empty() || s2.is_empty() {
        return s1.len() + s2.len();
    }

    if max < 4 {
        return lev_mbleven(s1, s2, max);
    }

    let full_band = s1.len().min(2 * max + 1);

    if s2.len() < 65 {
        hyrroe2003(&PatternMatchVector::new(s2), s2.len(), s1, max)
    } else if full_band <= 64 {
        small_band_online::<T, false>(s1, s2, max).dist
    } else {
        myers_block::<T, false, false>(&BlockPatternMatchVector::new(s1), s1, s2, max, -1).dist
    }
}

/// Unit-cost distance against a precomputed bitmap of `s1`. The encoded
/// pattern rules out affix stripping on the bit-parallel paths.
pub(crate) fn uniform_distance_with_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    max_in: usize,
) -> usize {
    let max = max_in.min(s1.len().max(s2.len()));

    if max == 0 {
        return usize::from(s1 != s2);
    }

    if max < s1.len().abs_diff(s2.len()) {
        return max + 1;
    }

    if s1.is_empty() {
        return if s2.len() <= max { s2.len() } else { max + 1 };
    }

    if max >= 4 {
        let full_band = s1.len().min(2 * max + 1);

        return if s1.len() < 65 {
            hyrroe2003(pm, s1.len(), s2, max)
        } else if full_band <= 64 {
            small_band_with_pmv(pm, s1, s2, max)
        } else {
            myers_block::<T, false, false>(pm, s1, s2, max, -1).dist
        };
    }

    let (mut s1, mut s2) = (s1, s2);
    remove_common_affix(&mut s1, &mut s2);
    if s1.is_empty() || s2.is_empty() {
        return s1.len() + s2.len();
    }

    lev_mbleven(s1, s2, max)
}

// ─────────────────────────────────────────────────────────────────────────────
// Weighted costs
// ─────────────────────────────────────────────────────────────────────────────

/// Largest possible weighted distance between sequences of these lengths.
pub(crate) fn levenshtein_maximum(
    len1: usize,
    len2: usize,
    weights: LevenshteinWeights,
) -> usize {
    let max_dist = len1 * weights.delete + len2 * weights.insert;

    let replace_all = if len1 >= len2 {
        len2 * weights.replace + (len1 - len2) * weights.delete
    } else {
        len1 * weights.replace + (len2 - len1) * weights.insert
    };

    max_dist.min(replace_all)
}

/// Smallest possible weighted distance given only the lengths.
fn levenshtein_min_distance(len1: usize, len2: usize, weights: LevenshteinWeights) -> usize {
    if len1 >= len2 {
        (len1 - len2) * weights.delete
    } else {
        (len2 - len1) * weights.insert
    }
}

/// Single-row Wagner–Fischer DP with arbitrary costs.
fn wagner_fischer<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: LevenshteinWeights,
    max: usize,
) -> usize {
    let mut cache: Vec<usize> = (0..=s1.len()).map(|i| i * weights.delete).collect();

    for &ch2 in s2 {
        let mut temp = cache[0];
        cache[0] += weights.insert;

        for (i, &ch1) in s1.iter().enumerate() {
            if ch1 != ch2 {
                temp = (cache[i] + weights.delete)
                    .min(cache[i + 1] + weights.insert)
                    .min(temp + weights.replace);
            }
            std::mem::swap(&mut cache[i + 1], &mut temp);
        }
    }

    let dist = *cache.last().expect("cache is never empty");
    if dist <= max {
        dist
    } else {
        max.saturating_add(1)
    }
}

fn generalized_distance<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: LevenshteinWeights,
    max: usize,
) -> usize {
    if levenshtein_min_distance(s1.len(), s2.len(), weights) > max {
        return max.saturating_add(1);
    }

    let (mut s1, mut s2) = (s1, s2);
    remove_common_affix(&mut s1, &mut s2);

    wagner_fischer(s1, s2, weights, max)
}

/// Weighted distance dispatch: uniform and indel-equivalent weight shapes
/// reduce to the bit-parallel engines scaled by the common factor.
pub(crate) fn distance_kernel<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: LevenshteinWeights,
    max: usize,
) -> usize {
    if weights.insert == weights.delete {
        // free insertions and deletions make every rewrite free
        if weights.insert == 0 {
            return 0;
        }

        if weights.insert == weights.replace {
            let new_max = ceil_div(max, weights.insert);
            let dist = uniform_distance(s1, s2, new_max) * weights.insert;
            return if dist <= max { dist } else { max.saturating_add(1) };
        }

        // substitutions priced at or above an insert+delete pair never occur
        if weights.replace >= weights.insert + weights.delete {
            let new_max = ceil_div(max, weights.insert);
            let dist = indel::distance_kernel(s1, s2, new_max) * weights.insert;
            return if dist <= max { dist } else { max.saturating_add(1) };
        }
    }

    generalized_distance(s1, s2, weights, max)
}

fn distance_kernel_with_pmv<T: Element>(
    pm: &BlockPatternMatchVector,
    s1: &[T],
    s2: &[T],
    weights: LevenshteinWeights,
    max: usize,
) -> usize {
    if weights.insert == weights.delete {
        if weights.insert == 0 {
            return 0;
        }

        if weights.insert == weights.replace {
            let new_max = ceil_div(max, weights.insert);
            let dist = uniform_distance_with_pmv(pm, s1, s2, new_max) * weights.insert;
            return if dist <= max { dist } else { max.saturating_add(1) };
        }

        if weights.replace >= weights.insert + weights.delete {
            let new_max = ceil_div(max, weights.insert);
            let dist = indel::distance_with_pmv(pm, s1, s2, new_max) * weights.insert;
            return if dist <= max { dist } else { max.saturating_add(1) };
        }
    }

    generalized_distance(s1, s2, weights, max)
}

// ─────────────────────────────────────────────────────────────────────────────
// Alignment recovery
// ─────────────────────────────────────────────────────────────────────────────

/// Walk the recorded `VP`/`VN` matrix from the bottom-right corner. A set
/// `VP` bit is a deletion, a set `VN` bit on the row above an insertion;
/// diagonal steps are matches or replacements.
fn recover_alignment<T: Element>(
    editops: &mut Editops,
    s1: &[T],
    s2: &[T],
    matrix: &LevMatrix,
    src_pos: usize,
    dest_pos: usize,
    editop_pos: usize,
) {
    let mut dist = matrix.dist;
    let mut col = s1.len();
    let mut row = s2.len();

    while row > 0 && col > 0 {
        // deletion
        if matrix.vp.test_bit(row - 1, col - 1, false) {
            debug_assert!(dist > 0);
            dist -= 1;
            col -= 1;
            editops.ops[editop_pos + dist] =
                EditOp::new(EditType::Delete, col + src_pos, row + dest_pos);
        } else {
            row -= 1;

            // insertion
            if row > 0 && matrix.vn.test_bit(row - 1, col - 1, false) {
                debug_assert!(dist > 0);
                dist -= 1;
                editops.ops[editop_pos + dist] =
                    EditOp::new(EditType::Insert, col + src_pos, row + dest_pos);
            } else {
                col -= 1;

                // matches are not recorded
                if s1[col] != s2[row] {
                    debug_assert!(dist > 0);
                    dist -= 1;
                    editops.ops[editop_pos + dist] =
                        EditOp::new(EditType::Replace, col + src_pos, row + dest_pos);
                }
            }
        }
    }

    while col > 0 {
        dist -= 1;
        col -= 1;
        editops.ops[editop_pos + dist] =
            EditOp::new(EditType::Delete, col + src_pos, row + dest_pos);
    }

    while row > 0 {
        dist -= 1;
        row -= 1;
        editops.ops[editop_pos + dist] =
            EditOp::new(EditType::Insert, col + src_pos, row + dest_pos);
    }
}

/// Record a matrix for `(s1, s2)` and recover the alignment into `editops`
/// starting at `editop_pos`. Doubles `max` until the matrix run fits it.
fn levenshtein_align<T: Element>(
    editops: &mut Editops,
    s1: &[T],
    s2: &[T],
    max_in: usize,
    src_pos: usize,
    dest_pos: usize,
    editop_pos: usize,
) {
    let mut max = max_in.min(s1.len().max(s2.len())).max(s1.len().abs_diff(s2.len()));

    let matrix = loop {
        let matrix = if s1.is_empty() || s2.is_empty() {
            LevMatrix {
                dist: s1.len() + s2.len(),
                vp: ShiftedBitMatrix::default(),
                vn: ShiftedBitMatrix::default(),
            }
        } else if s1.len() <= 64 {
            hyrroe2003_matrix(&PatternMatchVector::new(s1), s1.len(), s2)
        } else if s1.len().min(2 * max + 1) <= 64 {
            small_band_online::<T, true>(s1, s2, max)
        } else {
            let run = myers_block::<T, true, false>(
                &BlockPatternMatchVector::new(s1),
                s1,
                s2,
                max,
                -1,
            );
            let (vp, vn) = run.matrix.expect("matrix recording was requested");
            LevMatrix { dist: run.dist, vp, vn }
        };

        let fitted = matrix.dist <= max;
        max = if max == 0 { 1 } else { max * 2 };
        if fitted {
            break matrix;
        }
    };

    if matrix.dist != 0 {
        if editops.is_empty() {
            editops.ops = vec![EditOp::new(EditType::Delete, 0, 0); matrix.dist];
        }
        recover_alignment(editops, s1, s2, &matrix, src_pos, dest_pos, editop_pos);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hirschberg splitter
// ─────────────────────────────────────────────────────────────────────────────

struct HirschbergPos {
    left_score: i64,
    right_score: i64,
    s1_mid: usize,
    s2_mid: usize,
}

/// Single blockwise DP row of `(s1, s2)` stopped at `stop_row`.
fn levenshtein_row<T: Element>(s1: &[T], s2: &[T], max: usize, stop_row: isize) -> LevBitRow {
    let run =
        myers_block::<T, false, true>(&BlockPatternMatchVector::new(s1), s1, s2, max, stop_row);
    match run.row {
        Some(row) => row,
        // the band collapsed before the stop row
        None => LevBitRow {
            first_block: 0,
            last_block: 0,
            prev_score: 0,
            vecs: Vec::new(),
            dist: run.dist,
        },
    }
}

/// Expand the scores of a stopped row into per-column values over its band.
fn expand_row_scores(row: &LevBitRow, s1_len: usize) -> (usize, Vec<i64>) {
    let first_pos = row.first_block * 64;
    let last_pos = s1_len.min(row.last_block * 64 + 64);

    let mut scores = vec![0i64; last_pos - first_pos + 1];
    scores[0] = row.prev_score;
    for i in first_pos..last_pos {
        let col_mask = 1u64 << (i % 64);
        let vecs = &row.vecs[i / 64];
        scores[i - first_pos + 1] = scores[i - first_pos]
            - i64::from(vecs.vn & col_mask != 0)
            + i64::from(vecs.vp & col_mask != 0);
    }
    (first_pos, scores)
}

/// Find the optimal split column: run one forward row over the left half of
/// `s2` and one backward row over the right half, then minimise the summed
/// scores. A cutoff proven too small by either row is doubled.
fn find_hirschberg_pos<T: Element>(s1: &[T], s2: &[T], max_in: usize) -> HirschbergPos {
    let mut max = max_in.max(1);

    'retry: loop {
        let left_size = s2.len() / 2;
        let right_size = s2.len() - left_size;
        let s1_len = s1.len();

        let rev1: Vec<T> = s1.iter().rev().copied().collect();
        let rev2: Vec<T> = s2.iter().rev().copied().collect();

        let right_row = levenshtein_row(&rev1, &rev2, max, right_size as isize - 1);
        if right_row.dist > max {
            max *= 2;
            continue 'retry;
        }
        let (right_first_pos, right_scores) = expand_row_scores(&right_row, s1_len);

        let left_row = levenshtein_row(s1, s2, max, left_size as isize - 1);
        if left_row.dist > max {
            max *= 2;
            continue 'retry;
        }
        let (left_first_pos, left_scores_rel) = expand_row_scores(&left_row, s1_len);
        let left_last_pos = left_first_pos + left_scores_rel.len() - 1;

        let mut best_score = i64::MAX;
        let mut pos = HirschbergPos { left_score: 0, right_score: 0, s1_mid: 0, s2_mid: left_size };

        for i in left_first_pos..left_last_pos {
            let left_score = left_scores_rel[i - left_first_pos + 1];

            if s1_len < i + 1 + right_first_pos {
                continue;
            }
            let right_index = s1_len - i - 1 - right_first_pos;
            if right_index >= right_scores.len() {
                continue;
            }

            if right_scores[right_index] + left_score < best_score {
                best_score = right_scores[right_index] + left_score;
                pos.left_score = left_score;
                pos.right_score = right_scores[right_index];
                pos.s1_mid = i + 1;
            }
        }

        debug_assert!(pos.left_score >= 0 && pos.right_score >= 0);

        // the forward and backward scores contradict the cutoff
        if best_score == i64::MAX || pos.left_score + pos.right_score > max as i64 {
            max *= 2;
            continue 'retry;
        }

        trace!(
            "hirschberg split at s1[{}] / s2[{}], scores {}+{}",
            pos.s1_mid,
            pos.s2_mid,
            pos.left_score,
            pos.right_score
        );
        return pos;
    }
}

/// Matrix memory above which the alignment switches to Hirschberg splits.
const ALIGN_MATRIX_LIMIT_BYTES: usize = 1024 * 1024;

/// Alignment driver: direct matrix recovery for small problems, Hirschberg
/// subdivision for large ones, iterated over an explicit work stack.
fn align_hirschberg<T: Element>(editops: &mut Editops, s1: &[T], s2: &[T], score_hint: usize) {
    struct Frame<'a, T> {
        s1: &'a [T],
        s2: &'a [T],
        src_pos: usize,
        dest_pos: usize,
        editop_pos: usize,
        max: usize,
    }

    let mut stack =
        vec![Frame { s1, s2, src_pos: 0, dest_pos: 0, editop_pos: 0, max: score_hint }];

    while let Some(frame) = stack.pop() {
        let Frame { s1, s2, mut src_pos, mut dest_pos, editop_pos, max } = frame;

        // the affix consists of matches, which are never part of the script
        let (mut s1, mut s2) = (s1, s2);
        let affix = remove_common_affix(&mut s1, &mut s2);
        src_pos += affix.prefix_len;
        dest_pos += affix.prefix_len;

        let max = max.min(s1.len().max(s2.len()));
        let full_band = s1.len().min(2 * max + 1);

        let matrix_size = 2 * full_band * s2.len() / 8;
        if matrix_size < ALIGN_MATRIX_LIMIT_BYTES || s1.len() < 65 || s2.len() < 10 {
            levenshtein_align(editops, s1, s2, max, src_pos, dest_pos, editop_pos);
        } else {
            let pos = find_hirschberg_pos(s1, s2, max);

            if editops.is_empty() {
                editops.ops = vec![
                    EditOp::new(EditType::Delete, 0, 0);
                    (pos.left_score + pos.right_score) as usize
                ];
            }

            stack.push(Frame {
                s1: &s1[pos.s1_mid..],
                s2: &s2[pos.s2_mid..],
                src_pos: src_pos + pos.s1_mid,
                dest_pos: dest_pos + pos.s2_mid,
                editop_pos: editop_pos + pos.left_score as usize,
                max: pos.right_score as usize,
            });
            stack.push(Frame {
                s1: &s1[..pos.s1_mid],
                s2: &s2[..pos.s2_mid],
                src_pos,
                dest_pos,
                editop_pos,
                max: pos.left_score as usize,
            });
        }
    }
}

pub(crate) fn editops_kernel<T: Element>(s1: &[T], s2: &[T], score_hint: usize) -> Editops {
    let mut editops = Editops::new(s1.len(), s2.len());
    align_hirschberg(&mut editops, s1, s2, score_hint.max(31));
    editops
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Weighted Levenshtein distance; `None` weights mean unit costs.
pub fn distance<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: Option<LevenshteinWeights>,
    score_cutoff: Option<usize>,
) -> usize {
    distance_kernel(
        s1,
        s2,
        weights.unwrap_or(LevenshteinWeights::UNIT),
        score_cutoff.unwrap_or(usize::MAX),
    )
}

/// `levenshtein_maximum − distance` under the same weights.
pub fn similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: Option<LevenshteinWeights>,
    score_cutoff: Option<usize>,
) -> usize {
    let weights = weights.unwrap_or(LevenshteinWeights::UNIT);
    similarity_via_distance(
        levenshtein_maximum(s1.len(), s2.len(), weights),
        score_cutoff,
        |cutoff| distance_kernel(s1, s2, weights, cutoff),
    )
}

/// Distance scaled into `[0, 1]` by the maximum weighted distance.
pub fn normalized_distance<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: Option<LevenshteinWeights>,
    score_cutoff: Option<f64>,
) -> f64 {
    let weights = weights.unwrap_or(LevenshteinWeights::UNIT);
    normalized_distance_via_distance(
        levenshtein_maximum(s1.len(), s2.len(), weights),
        score_cutoff,
        |cutoff| distance_kernel(s1, s2, weights, cutoff),
    )
}

/// `1 − normalized_distance`.
pub fn normalized_similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    weights: Option<LevenshteinWeights>,
    score_cutoff: Option<f64>,
) -> f64 {
    let weights = weights.unwrap_or(LevenshteinWeights::UNIT);
    normalized_similarity_via_distance(
        levenshtein_maximum(s1.len(), s2.len(), weights),
        score_cutoff,
        |cutoff| distance_kernel(s1, s2, weights, cutoff),
    )
}

/// Minimum unit-cost edit script turning `s1` into `s2`. A `score_hint`
/// close to the real distance narrows the starting band of the Hirschberg
/// search.
pub fn editops<T: Element>(s1: &[T], s2: &[T], score_hint: Option<usize>) -> Editops {
    editops_kernel(s1, s2, score_hint.unwrap_or(usize::MAX))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached form
// ─────────────────────────────────────────────────────────────────────────────

/// Levenshtein metric with the pattern bitmap and weights fixed up front.
pub struct CachedLevenshtein<T: Element> {
    s1: Vec<T>,
    pm: BlockPatternMatchVector,
    weights: LevenshteinWeights,
}

impl<T: Element> CachedLevenshtein<T> {
    pub fn new(s1: &[T], weights: Option<LevenshteinWeights>) -> Self {
        CachedLevenshtein {
            s1: s1.to_vec(),
            pm: BlockPatternMatchVector::new(s1),
            weights: weights.unwrap_or(LevenshteinWeights::UNIT),
        }
    }

    fn maximum(&self, s2: &[T]) -> usize {
        levenshtein_maximum(self.s1.len(), s2.len(), self.weights)
    }

    pub fn distance(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        distance_kernel_with_pmv(
            &self.pm,
            &self.s1,
            s2,
            self.weights,
            score_cutoff.unwrap_or(usize::MAX),
        )
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<usize>) -> usize {
        similarity_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_kernel_with_pmv(&self.pm, &self.s1, s2, self.weights, cutoff)
        })
    }

    pub fn normalized_distance(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_distance_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_kernel_with_pmv(&self.pm, &self.s1, s2, self.weights, cutoff)
        })
    }

    pub fn normalized_similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        normalized_similarity_via_distance(self.maximum(s2), score_cutoff, |cutoff| {
            distance_kernel_with_pmv(&self.pm, &self.s1, s2, self.weights, cutoff)
        })
    }
}
