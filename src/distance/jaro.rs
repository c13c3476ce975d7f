//! Jaro and Jaro–Winkler similarities.
//!
//! The classical two-phase formulation: flag matching elements inside the
//! search window `max(|a|, |b|)/2 − 1`, count crosswise-ordered pairs as
//! half-transpositions, then average the three ratios. Winkler boosts the
//! score by the length of the common prefix (at most 4) when the base
//! similarity exceeds 0.7.

use crate::types::{Element, MetricError};

// ─────────────────────────────────────────────────────────────────────────────
// Jaro
// ─────────────────────────────────────────────────────────────────────────────

fn jaro_kernel<T: Element>(p: &[T], t: &[T]) -> f64 {
    let p_len = p.len();
    let t_len = t.len();

    if p_len == 0 && t_len == 0 {
        return 1.0;
    }
    if p_len == 0 || t_len == 0 {
        return 0.0;
    }

    let bound = (p_len.max(t_len) / 2).saturating_sub(1);

    let mut p_flag = vec![false; p_len];
    let mut t_flag = vec![false; t_len];

    // phase 1: flag matches inside the window
    let mut common_chars = 0usize;
    for (i, &tc) in t.iter().enumerate() {
        let lowlim = i.saturating_sub(bound);
        let hilim = (i + bound).min(p_len - 1);
        for j in lowlim..=hilim {
            if !p_flag[j] && p[j] == tc {
                t_flag[i] = true;
                p_flag[j] = true;
                common_chars += 1;
                break;
            }
        }
    }

    if common_chars == 0 {
        return 0.0;
    }

    // phase 2: count crosswise-ordered matches
    let mut transpositions = 0usize;
    let mut k = 0usize;
    for (i, &flagged) in t_flag.iter().enumerate() {
        if flagged {
            let mut j = k;
            while j < p_len {
                if p_flag[j] {
                    k = j + 1;
                    break;
                }
                j += 1;
            }
            if t[i] != p[j] {
                transpositions += 1;
            }
        }
    }
    let transpositions = transpositions / 2;

    let common = common_chars as f64;
    let mut sim = 0.0;
    sim += common / p_len as f64;
    sim += common / t_len as f64;
    sim += (common - transpositions as f64) / common;
    sim / 3.0
}

/// Jaro similarity in `[0, 1]`.
pub fn similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let cutoff = score_cutoff.unwrap_or(0.0);
    if cutoff > 1.0 {
        return 0.0;
    }
    let sim = jaro_kernel(s1, s2);
    if sim >= cutoff {
        sim
    } else {
        0.0
    }
}

/// `1 − similarity`.
pub fn distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    let cutoff = score_cutoff.unwrap_or(1.0);
    let dist = 1.0 - jaro_kernel(s1, s2);
    if dist <= cutoff {
        dist
    } else {
        1.0
    }
}

/// Identical to [`similarity`]; the metric is already normalised.
pub fn normalized_similarity<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    similarity(s1, s2, score_cutoff)
}

/// Identical to [`distance`]; the metric is already normalised.
pub fn normalized_distance<T: Element>(s1: &[T], s2: &[T], score_cutoff: Option<f64>) -> f64 {
    distance(s1, s2, score_cutoff)
}

// ─────────────────────────────────────────────────────────────────────────────
// Jaro–Winkler
// ─────────────────────────────────────────────────────────────────────────────

const DEFAULT_PREFIX_WEIGHT: f64 = 0.1;
const WINKLER_BOOST_THRESHOLD: f64 = 0.7;
const MAX_PREFIX: usize = 4;

fn jaro_winkler_kernel<T: Element>(s1: &[T], s2: &[T], prefix_weight: f64) -> f64 {
    let prefix = s1
        .iter()
        .zip(s2.iter())
        .take(MAX_PREFIX)
        .take_while(|(a, b)| a == b)
        .count();

    let sim = jaro_kernel(s1, s2);
    if sim > WINKLER_BOOST_THRESHOLD {
        sim + prefix as f64 * prefix_weight * (1.0 - sim)
    } else {
        sim
    }
}

fn check_prefix_weight(prefix_weight: f64) -> Result<(), MetricError> {
    // above 1/4 a four-element prefix could push the score past 1
    if !(0.0..=0.25).contains(&prefix_weight) {
        return Err(MetricError::InvalidWeights("prefix weight must lie in [0, 0.25]"));
    }
    Ok(())
}

/// Jaro–Winkler similarity in `[0, 1]` with an optional prefix weight
/// (default 0.1, at most 0.25).
pub fn winkler_similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    prefix_weight: Option<f64>,
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    let prefix_weight = prefix_weight.unwrap_or(DEFAULT_PREFIX_WEIGHT);
    check_prefix_weight(prefix_weight)?;

    let cutoff = score_cutoff.unwrap_or(0.0);
    if cutoff > 1.0 {
        return Ok(0.0);
    }
    let sim = jaro_winkler_kernel(s1, s2, prefix_weight);
    Ok(if sim >= cutoff { sim } else { 0.0 })
}

/// `1 − winkler_similarity`.
pub fn winkler_distance<T: Element>(
    s1: &[T],
    s2: &[T],
    prefix_weight: Option<f64>,
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    let prefix_weight = prefix_weight.unwrap_or(DEFAULT_PREFIX_WEIGHT);
    check_prefix_weight(prefix_weight)?;

    let cutoff = score_cutoff.unwrap_or(1.0);
    let dist = 1.0 - jaro_winkler_kernel(s1, s2, prefix_weight);
    Ok(if dist <= cutoff { dist } else { 1.0 })
}

/// Identical to [`winkler_similarity`]; the metric is already normalised.
pub fn winkler_normalized_similarity<T: Element>(
    s1: &[T],
    s2: &[T],
    prefix_weight: Option<f64>,
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    winkler_similarity(s1, s2, prefix_weight, score_cutoff)
}

/// Identical to [`winkler_distance`]; the metric is already normalised.
pub fn winkler_normalized_distance<T: Element>(
    s1: &[T],
    s2: &[T],
    prefix_weight: Option<f64>,
    score_cutoff: Option<f64>,
) -> Result<f64, MetricError> {
    winkler_distance(s1, s2, prefix_weight, score_cutoff)
}
