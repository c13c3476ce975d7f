//! seqfuzz — approximate string-matching metrics.
//!
//! Bit-parallel edit-distance engines (LCS/indel, Levenshtein, OSA,
//! Damerau–Levenshtein), Jaro and Jaro–Winkler similarities, edit-script
//! recovery with Hirschberg splitting, and the fuzzywuzzy-style composite
//! ratios built on top. Engines work on `&[T]` for any [`Element`]
//! (`u8`/`u16`/`u32`/`u64`/`char`); string callers collect `str::chars`
//! once and pass the slice.

pub mod bitutil;
pub mod distance;
pub mod editops;
pub mod fuzz;
pub mod matrix;
pub mod pattern;
pub mod textprep;
pub mod types;

// ─────────────────────────────────────────────────────────────────────────────
// Shared types
// ─────────────────────────────────────────────────────────────────────────────

pub use editops::{editops_apply, opcodes_apply, EditOp, EditType, Editops, Opcode, Opcodes};
pub use types::{Element, LevenshteinWeights, MetricError, ScoreAlignment, StringAffix};

// ─────────────────────────────────────────────────────────────────────────────
// LCS / indel
// ─────────────────────────────────────────────────────────────────────────────

/// `max(|s1|, |s2|) − lcs(s1, s2)`.
pub use distance::lcs_seq::distance as lcs_seq_distance;
/// Length of the longest common subsequence.
pub use distance::lcs_seq::similarity as lcs_seq_similarity;
pub use distance::lcs_seq::normalized_distance as lcs_seq_normalized_distance;
pub use distance::lcs_seq::normalized_similarity as lcs_seq_normalized_similarity;
/// Insert/delete script recovered from the LCS bit matrix.
pub use distance::lcs_seq::editops as lcs_seq_editops;
pub use distance::lcs_seq::CachedLcsSeq;

/// Minimum number of insertions and deletions turning `s1` into `s2`.
pub use distance::indel::distance as indel_distance;
pub use distance::indel::editops as indel_editops;
pub use distance::indel::normalized_distance as indel_normalized_distance;
pub use distance::indel::normalized_similarity as indel_normalized_similarity;
pub use distance::indel::similarity as indel_similarity;
pub use distance::indel::CachedIndel;

// ─────────────────────────────────────────────────────────────────────────────
// Levenshtein
// ─────────────────────────────────────────────────────────────────────────────

/// Weighted Levenshtein distance (`None` weights mean unit costs).
pub use distance::levenshtein::distance as levenshtein_distance;
/// Minimum unit-cost edit script; the optional hint narrows the starting
/// band of the Hirschberg search.
pub use distance::levenshtein::editops as levenshtein_editops;
pub use distance::levenshtein::normalized_distance as levenshtein_normalized_distance;
pub use distance::levenshtein::normalized_similarity as levenshtein_normalized_similarity;
pub use distance::levenshtein::similarity as levenshtein_similarity;
pub use distance::levenshtein::CachedLevenshtein;

// ─────────────────────────────────────────────────────────────────────────────
// OSA / Damerau–Levenshtein / Hamming
// ─────────────────────────────────────────────────────────────────────────────

/// Optimal String Alignment distance (adjacent transpositions, used once).
pub use distance::osa::distance as osa_distance;
pub use distance::osa::normalized_distance as osa_normalized_distance;
pub use distance::osa::normalized_similarity as osa_normalized_similarity;
pub use distance::osa::similarity as osa_similarity;

/// Unrestricted Damerau–Levenshtein distance (uniform costs only).
pub use distance::damerau::distance as damerau_levenshtein_distance;
pub use distance::damerau::normalized_distance as damerau_levenshtein_normalized_distance;
pub use distance::damerau::normalized_similarity as damerau_levenshtein_normalized_similarity;
pub use distance::damerau::similarity as damerau_levenshtein_similarity;

/// Hamming distance; fails on unequal lengths.
pub use distance::hamming::distance as hamming_distance;
pub use distance::hamming::normalized_distance as hamming_normalized_distance;
pub use distance::hamming::normalized_similarity as hamming_normalized_similarity;
pub use distance::hamming::similarity as hamming_similarity;

// ─────────────────────────────────────────────────────────────────────────────
// Jaro / Jaro–Winkler
// ─────────────────────────────────────────────────────────────────────────────

pub use distance::jaro::distance as jaro_distance;
/// Jaro similarity in `[0, 1]`.
pub use distance::jaro::similarity as jaro_similarity;
pub use distance::jaro::winkler_distance as jaro_winkler_distance;
/// Jaro–Winkler similarity (prefix-boosted Jaro) in `[0, 1]`.
pub use distance::jaro::winkler_similarity as jaro_winkler_similarity;
