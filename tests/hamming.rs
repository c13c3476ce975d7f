// Unit tests for the Hamming metric: mismatch counting, the equal-length
// guard, cutoff sentinels and the |s1|-based normalisation.

use seqfuzz::{
    hamming_distance, hamming_normalized_distance, hamming_normalized_similarity,
    hamming_similarity, MetricError,
};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn distance_counts_mismatches() {
    assert_eq!(hamming_distance(&chars("karolin"), &chars("kathrin"), None).unwrap(), 3);
    assert_eq!(hamming_distance(&chars("abc"), &chars("abc"), None).unwrap(), 0);
    assert_eq!(hamming_distance(&chars(""), &chars(""), None).unwrap(), 0);
}

#[test]
fn length_mismatch_is_an_error() {
    let err = hamming_distance(&chars("ab"), &chars("abc"), None).unwrap_err();
    assert_eq!(err, MetricError::LengthMismatch { len1: 2, len2: 3 });
    assert!(hamming_similarity(&chars("ab"), &chars("a"), None).is_err());
    assert!(hamming_normalized_distance(&chars("ab"), &chars("a"), None).is_err());
}

#[test]
fn similarity_is_match_count() {
    assert_eq!(hamming_similarity(&chars("karolin"), &chars("kathrin"), None).unwrap(), 4);
}

#[test]
fn cutoff_sentinels() {
    let (a, b) = (chars("karolin"), chars("kathrin"));
    assert_eq!(hamming_distance(&a, &b, Some(3)).unwrap(), 3);
    assert_eq!(hamming_distance(&a, &b, Some(2)).unwrap(), 3); // = cutoff + 1
    assert_eq!(hamming_similarity(&a, &b, Some(5)).unwrap(), 0);
}

#[test]
fn normalisation_divides_by_len() {
    let (a, b) = (chars("karolin"), chars("kathrin"));
    let nd = hamming_normalized_distance(&a, &b, None).unwrap();
    let ns = hamming_normalized_similarity(&a, &b, None).unwrap();
    assert!((nd - 3.0 / 7.0).abs() < 1e-12);
    assert!((nd + ns - 1.0).abs() < 1e-12);
    // empty inputs normalise to zero distance
    assert_eq!(hamming_normalized_distance(&chars(""), &chars(""), None).unwrap(), 0.0);
}
