// Unit tests for the Damerau–Levenshtein engine:
//   - unrestricted transpositions (moves over gaps cost less than OSA)
//   - agreement with the classic full-matrix reference
//   - score_cutoff sentinels and normalised forms

use seqfuzz::{
    damerau_levenshtein_distance, damerau_levenshtein_normalized_distance,
    damerau_levenshtein_normalized_similarity, damerau_levenshtein_similarity, osa_distance,
};
use std::collections::HashMap;

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// Classic full-matrix reference for the unrestricted distance.
fn damerau_ref(a: &[char], b: &[char]) -> usize {
    let maxdist = a.len() + b.len();
    let rows = a.len() + 2;
    let cols = b.len() + 2;
    let mut d = vec![vec![0usize; cols]; rows];
    let mut last_seen: HashMap<char, usize> = HashMap::new();

    d[0][0] = maxdist;
    for i in 0..=a.len() {
        d[i + 1][0] = maxdist;
        d[i + 1][1] = i;
    }
    for j in 0..=b.len() {
        d[0][j + 1] = maxdist;
        d[1][j + 1] = j;
    }

    for i in 1..=a.len() {
        let mut last_match_col = 0;
        for j in 1..=b.len() {
            let row_of_match = last_seen.get(&b[j - 1]).copied().unwrap_or(0);
            let col_of_match = last_match_col;
            let cost = usize::from(a[i - 1] != b[j - 1]);
            if cost == 0 {
                last_match_col = j;
            }

            d[i + 1][j + 1] = (d[i][j] + cost)
                .min(d[i + 1][j] + 1)
                .min(d[i][j + 1] + 1)
                .min(
                    d[row_of_match][col_of_match]
                        + (i - row_of_match - 1)
                        + 1
                        + (j - col_of_match - 1),
                );
        }
        last_seen.insert(a[i - 1], i);
    }

    d[a.len() + 1][b.len() + 1]
}

/// Deterministic pseudo-random string over a small alphabet.
fn synth(len: usize, seed: u64) -> Vec<char> {
    let alphabet = ['a', 'b', 'c'];
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            alphabet[(state >> 33) as usize % alphabet.len()]
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Transposition behaviour
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn distance_basic() {
    assert_eq!(damerau_levenshtein_distance(&chars(""), &chars(""), None), 0);
    assert_eq!(damerau_levenshtein_distance(&chars("abc"), &chars("abc"), None), 0);
    assert_eq!(damerau_levenshtein_distance(&chars(""), &chars("abc"), None), 3);
    assert_eq!(damerau_levenshtein_distance(&chars("ab"), &chars("ba"), None), 1);
}

#[test]
fn transposition_over_a_gap() {
    // the unrestricted distance moves 'c' across the gap for 2, while the
    // one-shot OSA alignment needs 3
    let (a, b) = (chars("ca"), chars("abc"));
    assert_eq!(damerau_levenshtein_distance(&a, &b, None), 2);
    assert_eq!(osa_distance(&a, &b, None), 3);
}

#[test]
fn never_exceeds_osa() {
    let words = ["", "a", "ab", "ba", "abc", "cab", "bca", "acb", "abcd", "badc", "dcba"];
    for w1 in &words {
        for w2 in &words {
            let (a, b) = (chars(w1), chars(w2));
            assert!(
                damerau_levenshtein_distance(&a, &b, None) <= osa_distance(&a, &b, None),
                "dl({w1:?}, {w2:?}) > osa"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reference agreement
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn matches_reference_on_short_strings() {
    let words = ["", "a", "ab", "ba", "abc", "cab", "bca", "acb", "aabb", "abab", "bbaa", "abcab"];
    for w1 in &words {
        for w2 in &words {
            let (a, b) = (chars(w1), chars(w2));
            assert_eq!(
                damerau_levenshtein_distance(&a, &b, None),
                damerau_ref(&a, &b),
                "dl({w1:?}, {w2:?})"
            );
        }
    }
}

#[test]
fn matches_reference_on_longer_strings() {
    for seed in 1..5u64 {
        let a = synth(60, seed);
        let b = synth(55, seed + 23);
        assert_eq!(damerau_levenshtein_distance(&a, &b, None), damerau_ref(&a, &b), "seed {seed}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cutoffs and normalised forms
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cutoff_sentinels() {
    let (a, b) = (chars("ca"), chars("abc"));
    // real distance is 2
    assert_eq!(damerau_levenshtein_distance(&a, &b, Some(2)), 2);
    assert_eq!(damerau_levenshtein_distance(&a, &b, Some(1)), 2); // = cutoff + 1
    assert_eq!(damerau_levenshtein_distance(&a, &b, Some(0)), 1);
}

#[test]
fn similarity_and_normalised_forms() {
    let (a, b) = (chars("ca"), chars("abc"));
    assert_eq!(damerau_levenshtein_similarity(&a, &b, None), 1);
    let nd = damerau_levenshtein_normalized_distance(&a, &b, None);
    let ns = damerau_levenshtein_normalized_similarity(&a, &b, None);
    assert!((nd - 2.0 / 3.0).abs() < 1e-12);
    assert!((nd + ns - 1.0).abs() < 1e-12);
}
