//! Composite fuzzy-matching ratios layered on the indel engine. Every
//! function returns a percentage in `[0, 100]` and treats `score_cutoff` as
//! a floor: results below it collapse to 0.
//!
//! The multi-stage ratios (`token_ratio`, `wratio`) ratchet the cutoff
//! between stages, so later stages can abandon work as soon as the running
//! best becomes unbeatable.

use log::trace;

use crate::distance::indel;
use crate::distance::indel::CachedIndel;
use crate::textprep::{set_decomposition, sorted_split, ElementSet, SplittedSentence};
use crate::types::{Element, ScoreAlignment};

// ─────────────────────────────────────────────────────────────────────────────
// Percentage helpers
// ─────────────────────────────────────────────────────────────────────────────

fn norm_distance100(dist: usize, lensum: usize, score_cutoff: f64) -> f64 {
    let score = if lensum > 0 {
        100.0 - 100.0 * dist as f64 / lensum as f64
    } else {
        100.0
    };
    if score >= score_cutoff {
        score
    } else {
        0.0
    }
}

fn score_cutoff_to_distance100(score_cutoff: f64, lensum: usize) -> usize {
    (lensum as f64 * (1.0 - score_cutoff / 100.0)).ceil() as usize
}

// ─────────────────────────────────────────────────────────────────────────────
// ratio
// ─────────────────────────────────────────────────────────────────────────────

fn ratio_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: f64) -> f64 {
    indel::normalized_similarity(s1, s2, Some(score_cutoff / 100.0)) * 100.0
}

/// Indel similarity as a percentage: `100 · (1 − normalized indel
/// distance)`. Two empty sequences score 100.
pub fn ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    ratio_kernel(s1, s2, score_cutoff.unwrap_or(0.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// partial_ratio
// ─────────────────────────────────────────────────────────────────────────────

/// Window search for the needle (`s1`, the shorter side) inside the
/// haystack. Full-length windows are explored by binary subdivision seeded
/// with the two edge windows: a span is split only while the best score its
/// interior could still reach beats the current best. Prefix and suffix
/// windows shorter than the needle are tried when their boundary element
/// occurs in the needle at all.
fn partial_ratio_short_needle<T: Element>(
    s1: &[T],
    s2: &[T],
    cached_ratio: &CachedRatio<T>,
    s1_char_set: &ElementSet,
    mut score_cutoff: f64,
) -> ScoreAlignment {
    let len1 = s1.len();
    let len2 = s2.len();
    debug_assert!(len2 >= len1);

    let mut res =
        ScoreAlignment { score: 0.0, src_start: 0, src_end: len1, dest_start: 0, dest_end: len1 };

    if len2 > len1 {
        let maximum = (len1 * 2) as i64;
        let norm_cutoff_dist = crate::distance::norm_sim_to_norm_dist(score_cutoff / 100.0);
        let mut cutoff_dist = (maximum as f64 * norm_cutoff_dist).ceil() as i64;
        let mut best_dist = i64::MAX;
        let mut scores = vec![-1i64; len2 - len1];
        let mut windows: Vec<(usize, usize)> = vec![(0, len2 - len1 - 1)];
        let mut new_windows: Vec<(usize, usize)> = Vec::new();

        while !windows.is_empty() {
            for &(first, second) in &windows {
                let cell_diff = second - first;
                if cell_diff == 1 {
                    continue;
                }

                for &pos in &[first, second] {
                    if scores[pos] == -1 {
                        let window = &s2[pos..pos + len1];
                        scores[pos] = cached_ratio.cached_indel.distance(window, None) as i64;
                        if scores[pos] < cutoff_dist {
                            cutoff_dist = scores[pos];
                            best_dist = scores[pos];
                            res.dest_start = pos;
                            res.dest_end = pos + len1;
                        }
                    }
                }
                if best_dist == 0 {
                    new_windows.clear();
                    break;
                }

                // the interior can only undercut the endpoint scores by the
                // shifts not already explained by the known edit difference
                let known_edits = (scores[first] - scores[second]).abs();
                let min_score =
                    scores[first].min(scores[second]) - (cell_diff as i64 + known_edits / 2);
                if min_score < cutoff_dist {
                    let center = cell_diff / 2;
                    new_windows.push((first, first + center));
                    new_windows.push((first + center, second));
                }
            }

            std::mem::swap(&mut windows, &mut new_windows);
            new_windows.clear();
        }

        if best_dist != i64::MAX {
            let score = 100.0 * (1.0 - best_dist as f64 / maximum as f64);
            if score >= score_cutoff {
                score_cutoff = score;
                res.score = score;
            }
        }
    }

    // prefix windows shorter than the needle
    for i in 1..len1 {
        let window = &s2[..i];
        if !s1_char_set.contains(window[window.len() - 1]) {
            continue;
        }

        let ls_ratio = cached_ratio.similarity(window, Some(score_cutoff));
        if ls_ratio > res.score {
            score_cutoff = ls_ratio;
            res.score = ls_ratio;
            res.dest_start = 0;
            res.dest_end = i;
            if ls_ratio == 100.0 {
                return res;
            }
        }
    }

    // suffix windows, including the last full-length one
    for i in len2 - len1..len2 {
        let window = &s2[i..(i + len1).min(len2)];
        if !s1_char_set.contains(window[0]) {
            continue;
        }

        let ls_ratio = cached_ratio.similarity(window, Some(score_cutoff));
        if ls_ratio > res.score {
            score_cutoff = ls_ratio;
            res.score = ls_ratio;
            res.dest_start = i;
            res.dest_end = len2;
            if ls_ratio == 100.0 {
                return res;
            }
        }
    }

    res
}

fn partial_ratio_alignment_kernel<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: f64,
) -> ScoreAlignment {
    let len1 = s1.len();
    let len2 = s2.len();

    if len1 > len2 {
        let mut res = partial_ratio_alignment_kernel(s2, s1, score_cutoff);
        std::mem::swap(&mut res.src_start, &mut res.dest_start);
        std::mem::swap(&mut res.src_end, &mut res.dest_end);
        return res;
    }

    if score_cutoff > 100.0 {
        return ScoreAlignment { score: 0.0, src_start: 0, src_end: len1, dest_start: 0, dest_end: len1 };
    }

    if len1 == 0 || len2 == 0 {
        return ScoreAlignment {
            score: if len1 == len2 { 100.0 } else { 0.0 },
            src_start: 0,
            src_end: len1,
            dest_start: 0,
            dest_end: len1,
        };
    }

    let cached_ratio = CachedRatio::new(s1);
    let char_set = ElementSet::from_slice(s1);
    partial_ratio_short_needle(s1, s2, &cached_ratio, &char_set, score_cutoff)
}

/// Best [`ratio`] of the shorter sequence against any window of the longer
/// one, together with the winning window.
pub fn partial_ratio_alignment<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<f64>,
) -> ScoreAlignment {
    partial_ratio_alignment_kernel(s1, s2, score_cutoff.unwrap_or(0.0))
}

/// Score of [`partial_ratio_alignment`].
pub fn partial_ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    partial_ratio_alignment(s1, s2, score_cutoff).score
}

fn partial_ratio_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: f64) -> f64 {
    partial_ratio_alignment_kernel(s1, s2, score_cutoff).score
}

// ─────────────────────────────────────────────────────────────────────────────
// token_sort_ratio
// ─────────────────────────────────────────────────────────────────────────────

fn token_sort_ratio_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: f64) -> f64 {
    if score_cutoff > 100.0 {
        return 0.0;
    }
    ratio_kernel(&sorted_split(s1).join(), &sorted_split(s2).join(), score_cutoff)
}

/// [`ratio`] over the whitespace tokens of both inputs, sorted and re-joined.
pub fn token_sort_ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    token_sort_ratio_kernel(s1, s2, score_cutoff.unwrap_or(0.0))
}

/// [`partial_ratio`] over the sorted-and-joined token forms.
pub fn partial_token_sort_ratio<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<f64>,
) -> f64 {
    let score_cutoff = score_cutoff.unwrap_or(0.0);
    if score_cutoff > 100.0 {
        return 0.0;
    }
    partial_ratio_kernel(&sorted_split(s1).join(), &sorted_split(s2).join(), score_cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// token_set_ratio
// ─────────────────────────────────────────────────────────────────────────────

fn token_set_ratio_kernel<T: Element>(
    tokens_a: SplittedSentence<'_, T>,
    tokens_b: SplittedSentence<'_, T>,
    score_cutoff: f64,
) -> f64 {
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let deco = set_decomposition(tokens_a, tokens_b);

    // one token list contains the other
    if !deco.intersection.is_empty()
        && (deco.difference_ab.is_empty() || deco.difference_ba.is_empty())
    {
        return 100.0;
    }

    let ab_joined = deco.difference_ab.join();
    let ba_joined = deco.difference_ba.join();
    let ab_len = ab_joined.len();
    let ba_len = ba_joined.len();
    let sect_len = deco.intersection.char_count();

    // lengths of the hypothetical strings sect+ab and sect+ba
    let sect_ab_len = sect_len + usize::from(sect_len > 0) + ab_len;
    let sect_ba_len = sect_len + usize::from(sect_len > 0) + ba_len;

    let mut result = 0.0;
    let cutoff_distance = score_cutoff_to_distance100(score_cutoff, sect_ab_len + sect_ba_len);
    let dist = indel::distance(&ab_joined, &ba_joined, Some(cutoff_distance));
    if dist <= cutoff_distance {
        result = norm_distance100(dist, sect_ab_len + sect_ba_len, score_cutoff);
    }

    // the sect-based ratios are all zero without a shared token
    if sect_len == 0 {
        return result;
    }

    // distances of sect against sect+ab / sect+ba follow from the length
    // difference alone, because sect is a prefix of both
    let sect_ab_dist = usize::from(sect_len > 0) + ab_len;
    let sect_ab_ratio = norm_distance100(sect_ab_dist, sect_len + sect_ab_len, score_cutoff);

    let sect_ba_dist = usize::from(sect_len > 0) + ba_len;
    let sect_ba_ratio = norm_distance100(sect_ba_dist, sect_len + sect_ba_len, score_cutoff);

    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

/// Token-set heuristic: factor out the shared tokens and score the leftover
/// halves against each other and against the shared core.
pub fn token_set_ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let score_cutoff = score_cutoff.unwrap_or(0.0);
    if score_cutoff > 100.0 {
        return 0.0;
    }
    token_set_ratio_kernel(sorted_split(s1), sorted_split(s2), score_cutoff)
}

fn partial_token_set_ratio_kernel<T: Element>(
    tokens_a: SplittedSentence<'_, T>,
    tokens_b: SplittedSentence<'_, T>,
    score_cutoff: f64,
) -> f64 {
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let deco = set_decomposition(tokens_a, tokens_b);

    // any shared token is a perfect partial match
    if !deco.intersection.is_empty() {
        return 100.0;
    }

    partial_ratio_kernel(&deco.difference_ab.join(), &deco.difference_ba.join(), score_cutoff)
}

/// [`partial_ratio`] over the token-set difference forms.
pub fn partial_token_set_ratio<T: Element>(
    s1: &[T],
    s2: &[T],
    score_cutoff: Option<f64>,
) -> f64 {
    let score_cutoff = score_cutoff.unwrap_or(0.0);
    if score_cutoff > 100.0 {
        return 0.0;
    }
    partial_token_set_ratio_kernel(sorted_split(s1), sorted_split(s2), score_cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// token_ratio
// ─────────────────────────────────────────────────────────────────────────────

fn token_ratio_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: f64) -> f64 {
    if score_cutoff > 100.0 {
        return 0.0;
    }

    let tokens_a = sorted_split(s1);
    let tokens_b = sorted_split(s2);

    let joined_a = tokens_a.join();
    let joined_b = tokens_b.join();

    let deco = set_decomposition(tokens_a, tokens_b);

    if !deco.intersection.is_empty()
        && (deco.difference_ab.is_empty() || deco.difference_ba.is_empty())
    {
        return 100.0;
    }

    let ab_joined = deco.difference_ab.join();
    let ba_joined = deco.difference_ba.join();
    let ab_len = ab_joined.len();
    let ba_len = ba_joined.len();
    let sect_len = deco.intersection.char_count();

    let mut result = ratio_kernel(&joined_a, &joined_b, score_cutoff);

    let sect_ab_len = sect_len + usize::from(sect_len > 0) + ab_len;
    let sect_ba_len = sect_len + usize::from(sect_len > 0) + ba_len;

    let cutoff_distance = score_cutoff_to_distance100(score_cutoff, sect_ab_len + sect_ba_len);
    let dist = indel::distance(&ab_joined, &ba_joined, Some(cutoff_distance));
    if dist <= cutoff_distance {
        result = result.max(norm_distance100(dist, sect_ab_len + sect_ba_len, score_cutoff));
    }

    if sect_len == 0 {
        return result;
    }

    let sect_ab_dist = usize::from(sect_len > 0) + ab_len;
    let sect_ab_ratio = norm_distance100(sect_ab_dist, sect_len + sect_ab_len, score_cutoff);

    let sect_ba_dist = usize::from(sect_len > 0) + ba_len;
    let sect_ba_ratio = norm_distance100(sect_ba_dist, sect_len + sect_ba_len, score_cutoff);

    result.max(sect_ab_ratio).max(sect_ba_ratio)
}

/// `max(token_sort_ratio, token_set_ratio)` without tokenising twice.
pub fn token_ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    token_ratio_kernel(s1, s2, score_cutoff.unwrap_or(0.0))
}

fn partial_token_ratio_kernel<T: Element>(s1: &[T], s2: &[T], score_cutoff: f64) -> f64 {
    if score_cutoff > 100.0 {
        return 0.0;
    }

    let tokens_a = sorted_split(s1);
    let tokens_b = sorted_split(s2);

    let joined_a = tokens_a.join();
    let joined_b = tokens_b.join();
    let word_count_a = tokens_a.word_count();
    let word_count_b = tokens_b.word_count();

    let deco = set_decomposition(tokens_a, tokens_b);

    if !deco.intersection.is_empty() {
        return 100.0;
    }

    let result = partial_ratio_kernel(&joined_a, &joined_b, score_cutoff);

    // nothing was deduplicated, so the second search would repeat the first
    if word_count_a == deco.difference_ab.word_count()
        && word_count_b == deco.difference_ba.word_count()
    {
        return result;
    }

    let score_cutoff = score_cutoff.max(result);
    result.max(partial_ratio_kernel(
        &deco.difference_ab.join(),
        &deco.difference_ba.join(),
        score_cutoff,
    ))
}

/// `max(partial_token_sort_ratio, partial_token_set_ratio)` without
/// tokenising twice.
pub fn partial_token_ratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    partial_token_ratio_kernel(s1, s2, score_cutoff.unwrap_or(0.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// WRatio / QRatio
// ─────────────────────────────────────────────────────────────────────────────

const UNBASE_SCALE: f64 = 0.95;

/// Weighted combination of the other ratios, keyed on the length ratio of
/// the inputs. Empty input on either side scores 0.
pub fn wratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let mut score_cutoff = score_cutoff.unwrap_or(0.0);
    if score_cutoff > 100.0 {
        return 0.0;
    }

    let len1 = s1.len();
    let len2 = s2.len();
    if len1 == 0 || len2 == 0 {
        return 0.0;
    }

    let len_ratio =
        if len1 > len2 { len1 as f64 / len2 as f64 } else { len2 as f64 / len1 as f64 };

    let mut end_ratio = ratio_kernel(s1, s2, score_cutoff);

    if len_ratio < 1.5 {
        score_cutoff = score_cutoff.max(end_ratio) / UNBASE_SCALE;
        return end_ratio.max(token_ratio_kernel(s1, s2, score_cutoff) * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    trace!("length ratio {len_ratio:.2}, partial scale {partial_scale}");

    score_cutoff = score_cutoff.max(end_ratio) / partial_scale;
    end_ratio = end_ratio.max(partial_ratio_kernel(s1, s2, score_cutoff) * partial_scale);

    score_cutoff = score_cutoff.max(end_ratio) / UNBASE_SCALE;
    end_ratio.max(partial_token_ratio_kernel(s1, s2, score_cutoff) * UNBASE_SCALE * partial_scale)
}

/// Plain [`ratio`], except that empty input on either side scores 0.
pub fn qratio<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    ratio(s1, s2, score_cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached forms
// ─────────────────────────────────────────────────────────────────────────────

/// [`ratio`] with the pattern-side indel preprocessing done once.
pub struct CachedRatio<T: Element> {
    pub(crate) cached_indel: CachedIndel<T>,
}

impl<T: Element> CachedRatio<T> {
    pub fn new(s1: &[T]) -> Self {
        CachedRatio { cached_indel: CachedIndel::new(s1) }
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        self.cached_indel.normalized_similarity(s2, Some(score_cutoff.unwrap_or(0.0) / 100.0))
            * 100.0
    }
}

/// [`partial_ratio`] with the needle-side preprocessing done once.
pub struct CachedPartialRatio<T: Element> {
    s1: Vec<T>,
    cached_ratio: CachedRatio<T>,
    char_set: ElementSet,
}

impl<T: Element> CachedPartialRatio<T> {
    pub fn new(s1: &[T]) -> Self {
        CachedPartialRatio {
            s1: s1.to_vec(),
            cached_ratio: CachedRatio::new(s1),
            char_set: ElementSet::from_slice(s1),
        }
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        let score_cutoff = score_cutoff.unwrap_or(0.0);
        let len1 = self.s1.len();
        let len2 = s2.len();

        if len1 > len2 {
            return partial_ratio_kernel(&self.s1, s2, score_cutoff);
        }
        if score_cutoff > 100.0 {
            return 0.0;
        }
        if len1 == 0 || len2 == 0 {
            return if len1 == len2 { 100.0 } else { 0.0 };
        }

        partial_ratio_short_needle(&self.s1, s2, &self.cached_ratio, &self.char_set, score_cutoff)
            .score
    }
}

/// [`token_sort_ratio`] with the pattern tokenised, sorted and cached once.
pub struct CachedTokenSortRatio<T: Element> {
    cached_ratio: CachedRatio<T>,
}

impl<T: Element> CachedTokenSortRatio<T> {
    pub fn new(s1: &[T]) -> Self {
        CachedTokenSortRatio { cached_ratio: CachedRatio::new(&sorted_split(s1).join()) }
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        let score_cutoff = score_cutoff.unwrap_or(0.0);
        if score_cutoff > 100.0 {
            return 0.0;
        }
        self.cached_ratio.similarity(&sorted_split(s2).join(), Some(score_cutoff))
    }
}

/// [`token_set_ratio`] with the pattern tokenised and sorted once.
pub struct CachedTokenSetRatio<T: Element> {
    s1: Vec<T>,
    token_ranges: Vec<(usize, usize)>,
}

impl<T: Element> CachedTokenSetRatio<T> {
    pub fn new(s1: &[T]) -> Self {
        let owned = s1.to_vec();

        let mut token_ranges: Vec<(usize, usize)> = Vec::new();
        let mut start = 0;
        for (i, &e) in owned.iter().enumerate() {
            if e.is_space() {
                if start < i {
                    token_ranges.push((start, i));
                }
                start = i + 1;
            }
        }
        if start < owned.len() {
            token_ranges.push((start, owned.len()));
        }
        token_ranges.sort_unstable_by(|&(a0, a1), &(b0, b1)| owned[a0..a1].cmp(&owned[b0..b1]));

        CachedTokenSetRatio { s1: owned, token_ranges }
    }

    fn tokens(&self) -> SplittedSentence<'_, T> {
        SplittedSentence::from_words(
            self.token_ranges.iter().map(|&(a, b)| &self.s1[a..b]).collect(),
        )
    }

    pub fn similarity(&self, s2: &[T], score_cutoff: Option<f64>) -> f64 {
        let score_cutoff = score_cutoff.unwrap_or(0.0);
        if score_cutoff > 100.0 {
            return 0.0;
        }
        token_set_ratio_kernel(self.tokens(), sorted_split(s2), score_cutoff)
    }
}
