// Unit tests for the Levenshtein engine:
//   - unit-cost distances across all dispatch paths (equality, mbleven,
//     single-word, small-band, blockwise) against a reference DP
//   - weighted costs: scaled-uniform, indel-equivalent and general shapes
//   - score_cutoff sentinels
//   - edit scripts: replay, length, prefix handling, Hirschberg agreement
//   - cached form agrees with the free functions

use seqfuzz::{
    editops_apply, levenshtein_distance, levenshtein_editops, levenshtein_normalized_distance,
    levenshtein_normalized_similarity, levenshtein_similarity, CachedLevenshtein,
    LevenshteinWeights,
};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

/// Reference single-row DP with arbitrary weights.
fn lev_ref(a: &[char], b: &[char], w: LevenshteinWeights) -> usize {
    let mut row: Vec<usize> = (0..=a.len()).map(|i| i * w.delete).collect();
    for &cb in b {
        let mut prev = row[0];
        row[0] += w.insert;
        for (i, &ca) in a.iter().enumerate() {
            let cur = row[i + 1];
            row[i + 1] = if ca == cb {
                prev
            } else {
                (row[i] + w.delete).min(cur + w.insert).min(prev + w.replace)
            };
            prev = cur;
        }
    }
    row[a.len()]
}

fn unit_ref(a: &[char], b: &[char]) -> usize {
    lev_ref(a, b, LevenshteinWeights::UNIT)
}

/// Deterministic pseudo-random string over a small alphabet.
fn synth(len: usize, seed: u64) -> Vec<char> {
    let alphabet = ['a', 'b', 'c', 'd', 'e', 'f'];
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            alphabet[(state >> 33) as usize % alphabet.len()]
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit-cost distance
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn distance_basic() {
    assert_eq!(levenshtein_distance(&chars("lewenstein"), &chars("levenshtein"), None, None), 2);
    assert_eq!(levenshtein_distance(&chars("kitten"), &chars("sitting"), None, None), 3);
    assert_eq!(levenshtein_distance(&chars("abc"), &chars("abc"), None, None), 0);
    assert_eq!(levenshtein_distance(&chars(""), &chars(""), None, None), 0);
    assert_eq!(levenshtein_distance(&chars(""), &chars("abc"), None, None), 3);
    assert_eq!(levenshtein_distance(&chars("abc"), &chars(""), None, None), 3);
}

#[test]
fn distance_is_symmetric() {
    let a = chars("distance");
    let b = chars("difference");
    assert_eq!(
        levenshtein_distance(&a, &b, None, None),
        levenshtein_distance(&b, &a, None, None)
    );
}

#[test]
fn matches_reference_on_short_strings() {
    let words =
        ["", "a", "b", "ab", "ba", "abc", "cba", "aabb", "abab", "abcd", "dcba", "aaaa", "abca"];
    for w1 in &words {
        for w2 in &words {
            let (a, b) = (chars(w1), chars(w2));
            assert_eq!(
                levenshtein_distance(&a, &b, None, None),
                unit_ref(&a, &b),
                "lev({w1:?}, {w2:?})"
            );
        }
    }
}

#[test]
fn matches_reference_on_medium_strings() {
    // below 65 elements: the single-word automaton
    for seed in 1..6u64 {
        let a = synth(50, seed);
        let b = synth(47, seed + 100);
        assert_eq!(levenshtein_distance(&a, &b, None, None), unit_ref(&a, &b), "seed {seed}");
    }
}

#[test]
fn matches_reference_on_long_strings() {
    // beyond 64 elements without a cutoff: the blockwise automaton
    for seed in 1..4u64 {
        let a = synth(200, seed);
        let b = synth(190, seed + 7);
        assert_eq!(levenshtein_distance(&a, &b, None, None), unit_ref(&a, &b), "seed {seed}");
    }
}

#[test]
fn long_strings_with_few_edits() {
    let a = synth(300, 42);
    let mut b = a.clone();
    b[17] = 'z';
    b.remove(150);
    b.insert(220, 'q');
    let real = unit_ref(&a, &b);
    assert_eq!(levenshtein_distance(&a, &b, None, None), real);
    // a small cutoff routes through the banded variant
    assert_eq!(levenshtein_distance(&a, &b, None, Some(10)), real);
    assert_eq!(levenshtein_distance(&a, &b, None, Some(real)), real);
}

#[test]
fn small_band_cutoff_on_long_strings() {
    for seed in 1..4u64 {
        let a = synth(150, seed);
        let b = synth(150, seed + 50);
        let real = unit_ref(&a, &b);
        for cutoff in [4, 8, 15, 25, 31] {
            let expected = if real <= cutoff { real } else { cutoff + 1 };
            assert_eq!(
                levenshtein_distance(&a, &b, None, Some(cutoff)),
                expected,
                "seed {seed}, cutoff {cutoff}"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Cutoffs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cutoff_sentinels() {
    let (a, b) = (chars("lewenstein"), chars("levenshtein"));
    // real distance is 2
    assert_eq!(levenshtein_distance(&a, &b, None, Some(2)), 2);
    assert_eq!(levenshtein_distance(&a, &b, None, Some(5)), 2);
    assert_eq!(levenshtein_distance(&a, &b, None, Some(1)), 2); // = cutoff + 1
    assert_eq!(levenshtein_distance(&a, &b, None, Some(0)), 1);
}

#[test]
fn cutoff_scan_agrees_with_reference() {
    let pairs = [
        ("kitten", "sitting"),
        ("CA", "ABC"),
        ("lewenstein", "levenshtein"),
        ("aaaa", "bbbb"),
        ("abcdefg", "gfedcba"),
    ];
    for (w1, w2) in pairs {
        let (a, b) = (chars(w1), chars(w2));
        let real = unit_ref(&a, &b);
        for cutoff in 0..=10 {
            let expected = if real <= cutoff { real } else { cutoff + 1 };
            assert_eq!(
                levenshtein_distance(&a, &b, None, Some(cutoff)),
                expected,
                "lev({w1:?}, {w2:?}, cutoff {cutoff})"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weighted costs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn weighted_replace_cost_two() {
    let w = LevenshteinWeights::new(1, 1, 2);
    assert_eq!(levenshtein_distance(&chars("lewenstein"), &chars("levenshtein"), Some(w), None), 3);
}

#[test]
fn uniform_scaling() {
    let (a, b) = (chars("kitten"), chars("sitting"));
    let base = levenshtein_distance(&a, &b, None, None);
    for k in 1..=4 {
        let w = LevenshteinWeights::new(k, k, k);
        assert_eq!(levenshtein_distance(&a, &b, Some(w), None), k * base, "factor {k}");
    }
}

#[test]
fn indel_equivalent_weights() {
    let (a, b) = (chars("kitten"), chars("sitting"));
    let indel = seqfuzz::indel_distance(&a, &b, None);
    for k in 1..=3 {
        // replace at least as expensive as insert + delete
        let w = LevenshteinWeights::new(k, k, 2 * k);
        assert_eq!(levenshtein_distance(&a, &b, Some(w), None), k * indel, "factor {k}");
        let w = LevenshteinWeights::new(k, k, 3 * k);
        assert_eq!(levenshtein_distance(&a, &b, Some(w), None), k * indel);
    }
}

#[test]
fn free_indel_weights_cost_nothing() {
    let w = LevenshteinWeights::new(0, 0, 1);
    assert_eq!(levenshtein_distance(&chars("abc"), &chars("xyz"), Some(w), None), 0);
}

#[test]
fn general_weights_match_reference() {
    let shapes = [
        LevenshteinWeights::new(2, 3, 4),
        LevenshteinWeights::new(1, 2, 2),
        LevenshteinWeights::new(3, 1, 1),
    ];
    let pairs = [("kitten", "sitting"), ("abc", "ca"), ("", "ab"), ("abcd", "abcd")];
    for w in shapes {
        for (w1, w2) in pairs {
            let (a, b) = (chars(w1), chars(w2));
            assert_eq!(
                levenshtein_distance(&a, &b, Some(w), None),
                lev_ref(&a, &b, w),
                "lev({w1:?}, {w2:?}, {w:?})"
            );
        }
    }
}

#[test]
fn weighted_normalized_distance() {
    // weighted maximum is 21, distance 3
    let nd = levenshtein_normalized_distance(
        &chars("lewenstein"),
        &chars("levenshtein"),
        Some(LevenshteinWeights::new(1, 1, 2)),
        None,
    );
    assert!((nd - 3.0 / 21.0).abs() < 1e-12);
}

// ─────────────────────────────────────────────────────────────────────────────
// Similarity and normalised forms
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn similarity_is_maximum_minus_distance() {
    let (a, b) = (chars("lewenstein"), chars("levenshtein"));
    // unit maximum is max(10, 11) = 11
    assert_eq!(levenshtein_similarity(&a, &b, None, None), 9);
    assert_eq!(levenshtein_similarity(&a, &b, None, Some(10)), 0);
}

#[test]
fn normalized_forms_are_complementary() {
    let (a, b) = (chars("kitten"), chars("sitting"));
    let nd = levenshtein_normalized_distance(&a, &b, None, None);
    let ns = levenshtein_normalized_similarity(&a, &b, None, None);
    assert!((nd - 3.0 / 7.0).abs() < 1e-12);
    assert!((nd + ns - 1.0).abs() < 1e-12);
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit scripts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn editops_replay_to_destination() {
    let pairs = [
        ("", ""),
        ("", "abc"),
        ("abc", ""),
        ("abc", "abc"),
        ("kitten", "sitting"),
        ("lewenstein", "levenshtein"),
        ("qabxcd", "abycdf"),
        ("Saturday", "Sunday"),
    ];
    for (w1, w2) in pairs {
        let (a, b) = (chars(w1), chars(w2));
        let ops = levenshtein_editops(&a, &b, None);
        assert_eq!(ops.len(), unit_ref(&a, &b), "length({w1:?} -> {w2:?})");
        assert_eq!(editops_apply(&ops, &a, &b), b, "apply({w1:?} -> {w2:?})");
        assert_eq!(ops.src_len(), a.len());
        assert_eq!(ops.dest_len(), b.len());
    }
}

#[test]
fn editops_sorted_by_position() {
    let (a, b) = (chars("qabxcd"), chars("abycdf"));
    let ops = levenshtein_editops(&a, &b, None);
    assert!(ops
        .as_slice()
        .windows(2)
        .all(|w| (w[0].src_pos, w[0].dest_pos) <= (w[1].src_pos, w[1].dest_pos)));
}

#[test]
fn editops_on_medium_inputs() {
    for seed in 1..4u64 {
        let a = synth(120, seed);
        let b = synth(115, seed + 13);
        let ops = levenshtein_editops(&a, &b, None);
        assert_eq!(ops.len(), unit_ref(&a, &b), "seed {seed}");
        assert_eq!(editops_apply(&ops, &a, &b), b, "seed {seed}");
    }
}

#[test]
fn hirschberg_agrees_with_direct_recovery() {
    // large enough that the recorded matrix would pass the memory limit
    let a = synth(2500, 7);
    let mut b = a.clone();
    for i in (0..b.len()).step_by(97) {
        b[i] = 'z';
    }
    b.truncate(2450);

    let ops = levenshtein_editops(&a, &b, None);
    assert_eq!(ops.len(), levenshtein_distance(&a, &b, None, None));
    assert_eq!(editops_apply(&ops, &a, &b), b);
}

#[test]
fn score_hint_does_not_change_the_script_outcome() {
    let a = synth(2000, 3);
    let mut b = a.clone();
    b[500] = 'z';
    b.remove(1200);

    let unhinted = levenshtein_editops(&a, &b, None);
    let hinted = levenshtein_editops(&a, &b, Some(2));
    let generous = levenshtein_editops(&a, &b, Some(5000));
    assert_eq!(unhinted.len(), hinted.len());
    assert_eq!(hinted.len(), generous.len());
    assert_eq!(editops_apply(&hinted, &a, &b), b);
    assert_eq!(editops_apply(&generous, &a, &b), b);
}

// ─────────────────────────────────────────────────────────────────────────────
// Cached form
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn cached_agrees_with_free_functions() {
    let queries = ["levenshtein", "lewenstein", "", "bors", "lev"];
    for pattern in ["lewenstein", "", "x"] {
        let p = chars(pattern);
        let cached = CachedLevenshtein::new(&p, None);
        for q in queries {
            let qc = chars(q);
            assert_eq!(
                cached.distance(&qc, None),
                levenshtein_distance(&p, &qc, None, None),
                "cached dist({pattern:?}, {q:?})"
            );
            for cutoff in 0..=5 {
                assert_eq!(
                    cached.distance(&qc, Some(cutoff)),
                    levenshtein_distance(&p, &qc, None, Some(cutoff)),
                    "cached dist({pattern:?}, {q:?}, cutoff {cutoff})"
                );
            }
        }
    }
}

#[test]
fn cached_weighted() {
    let w = LevenshteinWeights::new(1, 1, 2);
    let p = chars("lewenstein");
    let cached = CachedLevenshtein::new(&p, Some(w));
    let q = chars("levenshtein");
    assert_eq!(cached.distance(&q, None), 3);
    assert!((cached.normalized_distance(&q, None) - 3.0 / 21.0).abs() < 1e-12);
}

#[test]
fn cached_long_pattern() {
    let p = synth(180, 11);
    let cached = CachedLevenshtein::new(&p, None);
    for seed in [1u64, 2, 3] {
        let q = synth(175, seed);
        assert_eq!(cached.distance(&q, None), unit_ref(&p, &q), "seed {seed}");
        assert_eq!(cached.distance(&q, Some(20)), {
            let real = unit_ref(&p, &q);
            if real <= 20 {
                real
            } else {
                21
            }
        });
    }
}
