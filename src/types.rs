//! Shared value types: the [`Element`] trait, edit weights, affix bookkeeping,
//! score alignments and the crate-wide error enum.

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors reported by the fallible operations of this crate.
///
/// Cutoff misses, empty inputs and unknown elements are normal outcomes and
/// are reported through sentinel return values, never through this enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    /// Hamming distance requires both sequences to have the same length.
    #[error("sequences have different lengths ({len1} vs {len2})")]
    LengthMismatch { len1: usize, len2: usize },

    /// Slice step must be a positive integer.
    #[error("invalid slice step {step}")]
    InvalidSlice { step: isize },

    /// An edit script did not satisfy the preconditions of the operation,
    /// or serialised bytes did not describe a valid script.
    #[error("invalid edit operations: {0}")]
    InvalidEditops(&'static str),

    /// A weight parameter lies outside its permitted range.
    #[error("invalid weights: {0}")]
    InvalidWeights(&'static str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Element trait
// ─────────────────────────────────────────────────────────────────────────────

/// The comparable atom of a sequence.
///
/// Elements are opaque integer-like values: the engines only need equality,
/// an ordering (for token sorting), a `u64` key for the probe tables, and
/// the whitespace classification used by the token-based ratios. Values
/// whose key fits into a byte take the direct-array fast path in
/// [`crate::pattern::PatternMatchVector`]; everything else goes through the
/// open-addressed probe table.
pub trait Element: Copy + Eq + Ord + std::fmt::Debug {
    /// The separator used when joining token lists (0x20).
    const SPACE: Self;

    /// Integer identity of the element, used for bitmap and set lookups.
    fn to_key(self) -> u64;

    /// Whitespace classification used by [`crate::textprep::sorted_split`].
    ///
    /// Wide element types use the Unicode space class (0x09–0x0D, 0x1C–0x20,
    /// 0x85, 0xA0, 0x1680, 0x2000–0x200A, 0x2028, 0x2029, 0x202F, 0x205F,
    /// 0x3000); single-byte elements only 0x09–0x0D and 0x1C–0x20.
    fn is_space(self) -> bool;
}

#[inline]
fn is_wide_space(code: u64) -> bool {
    matches!(
        code,
        0x09..=0x0D
            | 0x1C..=0x20
            | 0x85
            | 0xA0
            | 0x1680
            | 0x2000..=0x200A
            | 0x2028
            | 0x2029
            | 0x202F
            | 0x205F
            | 0x3000
    )
}

impl Element for u8 {
    const SPACE: Self = 0x20;

    #[inline]
    fn to_key(self) -> u64 {
        self as u64
    }

    #[inline]
    fn is_space(self) -> bool {
        matches!(self, 0x09..=0x0D | 0x1C..=0x20)
    }
}

impl Element for u16 {
    const SPACE: Self = 0x20;

    #[inline]
    fn to_key(self) -> u64 {
        self as u64
    }

    #[inline]
    fn is_space(self) -> bool {
        is_wide_space(self as u64)
    }
}

impl Element for u32 {
    const SPACE: Self = 0x20;

    #[inline]
    fn to_key(self) -> u64 {
        self as u64
    }

    #[inline]
    fn is_space(self) -> bool {
        is_wide_space(self as u64)
    }
}

impl Element for u64 {
    const SPACE: Self = 0x20;

    #[inline]
    fn to_key(self) -> u64 {
        self
    }

    #[inline]
    fn is_space(self) -> bool {
        is_wide_space(self)
    }
}

impl Element for char {
    const SPACE: Self = ' ';

    #[inline]
    fn to_key(self) -> u64 {
        self as u64
    }

    #[inline]
    fn is_space(self) -> bool {
        is_wide_space(self as u64)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weights
// ─────────────────────────────────────────────────────────────────────────────

/// Operation costs for the weighted Levenshtein distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevenshteinWeights {
    pub insert: usize,
    pub delete: usize,
    pub replace: usize,
}

impl Default for LevenshteinWeights {
    fn default() -> Self {
        LevenshteinWeights { insert: 1, delete: 1, replace: 1 }
    }
}

impl LevenshteinWeights {
    pub const fn new(insert: usize, delete: usize, replace: usize) -> Self {
        LevenshteinWeights { insert, delete, replace }
    }

    /// Uniform unit costs.
    pub const UNIT: Self = LevenshteinWeights::new(1, 1, 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Affix bookkeeping
// ─────────────────────────────────────────────────────────────────────────────

/// Lengths of the common prefix and suffix stripped from a pair of
/// sequences. Engines re-add `prefix_len` when producing edit positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringAffix {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Score alignment
// ─────────────────────────────────────────────────────────────────────────────

/// Best-scoring window found by a partial match, together with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreAlignment {
    pub score: f64,
    pub src_start: usize,
    pub src_end: usize,
    pub dest_start: usize,
    pub dest_end: usize,
}
