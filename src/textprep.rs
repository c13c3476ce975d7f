//! Input preparation shared by the engines and the composite ratios:
//! common-affix stripping, whitespace tokenisation, token-set decomposition
//! and the element membership set used by the partial-match window search.

use std::collections::HashSet;

use crate::types::{Element, StringAffix};

// ─────────────────────────────────────────────────────────────────────────────
// Common affix removal
// ─────────────────────────────────────────────────────────────────────────────

/// Strip the longest common prefix of both slices, returning its length.
pub fn remove_common_prefix<'a, 'b, T: Eq>(s1: &mut &'a [T], s2: &mut &'b [T]) -> usize {
    let prefix = s1.iter().zip(s2.iter()).take_while(|(a, b)| a == b).count();
    *s1 = &s1[prefix..];
    *s2 = &s2[prefix..];
    prefix
}

/// Strip the longest common suffix of both slices, returning its length.
pub fn remove_common_suffix<'a, 'b, T: Eq>(s1: &mut &'a [T], s2: &mut &'b [T]) -> usize {
    let suffix = s1
        .iter()
        .rev()
        .zip(s2.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    *s1 = &s1[..s1.len() - suffix];
    *s2 = &s2[..s2.len() - suffix];
    suffix
}

/// Strip the longest common prefix and suffix. The prefix is removed first,
/// so an overlapping affix is only counted once.
pub fn remove_common_affix<'a, 'b, T: Eq>(s1: &mut &'a [T], s2: &mut &'b [T]) -> StringAffix {
    StringAffix {
        prefix_len: remove_common_prefix(s1, s2),
        suffix_len: remove_common_suffix(s1, s2),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokenisation
// ─────────────────────────────────────────────────────────────────────────────

/// Whitespace-delimited tokens of a sequence, kept as borrowed slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplittedSentence<'a, T> {
    words: Vec<&'a [T]>,
}

impl<'a, T: Element> SplittedSentence<'a, T> {
    /// Wrap an already-sorted word list.
    pub(crate) fn from_words(words: Vec<&'a [T]>) -> Self {
        debug_assert!(words.windows(2).all(|w| w[0] <= w[1]));
        SplittedSentence { words }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[&'a [T]] {
        &self.words
    }

    /// Length of [`join`](Self::join)'s result: the token lengths plus one
    /// separator between each pair of tokens.
    pub fn char_count(&self) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        self.words.iter().map(|w| w.len()).sum::<usize>() + self.words.len() - 1
    }

    /// Remove adjacent duplicate tokens (exhaustive after sorting), returning
    /// how many were dropped.
    pub fn dedupe(&mut self) -> usize {
        let before = self.words.len();
        self.words.dedup();
        before - self.words.len()
    }

    /// Re-serialise with single 0x20 separators.
    pub fn join(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.char_count());
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                out.push(T::SPACE);
            }
            out.extend_from_slice(word);
        }
        out
    }
}

/// Split `s` at whitespace (per [`Element::is_space`]) and sort the resulting
/// tokens lexicographically. Empty tokens are never produced.
pub fn sorted_split<T: Element>(s: &[T]) -> SplittedSentence<'_, T> {
    let mut words: Vec<&[T]> = s.split(|e| e.is_space()).filter(|w| !w.is_empty()).collect();
    words.sort_unstable();
    SplittedSentence { words }
}

// ─────────────────────────────────────────────────────────────────────────────
// Token-set decomposition
// ─────────────────────────────────────────────────────────────────────────────

/// Result of [`set_decomposition`]: the tokens unique to each side and the
/// shared tokens.
pub struct SetDecomposition<'a, T> {
    pub difference_ab: SplittedSentence<'a, T>,
    pub difference_ba: SplittedSentence<'a, T>,
    pub intersection: SplittedSentence<'a, T>,
}

/// Partition two deduplicated token lists into `{A\B, B\A, A∩B}`. The
/// intersection preserves the order of `a`; each shared token is consumed
/// from `b` once.
pub fn set_decomposition<'a, T: Element>(
    mut a: SplittedSentence<'a, T>,
    mut b: SplittedSentence<'a, T>,
) -> SetDecomposition<'a, T> {
    a.dedupe();
    b.dedupe();

    let mut intersection = Vec::new();
    let mut difference_ab = Vec::new();
    let mut difference_ba = b.words.clone();

    for word in &a.words {
        if let Some(pos) = difference_ba.iter().position(|w| w == word) {
            difference_ba.remove(pos);
            intersection.push(*word);
        } else {
            difference_ab.push(*word);
        }
    }

    SetDecomposition {
        difference_ab: SplittedSentence { words: difference_ab },
        difference_ba: SplittedSentence { words: difference_ba },
        intersection: SplittedSentence { words: intersection },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Element membership set
// ─────────────────────────────────────────────────────────────────────────────

/// Which element values occur in a sequence. Byte-ranged keys are answered
/// from a direct array, the rest from a hash set; the partial-match search
/// queries this once per candidate window boundary.
#[derive(Debug, Clone)]
pub struct ElementSet {
    ascii: [bool; 256],
    wide: HashSet<u64>,
}

impl Default for ElementSet {
    fn default() -> Self {
        ElementSet { ascii: [false; 256], wide: HashSet::new() }
    }
}

impl ElementSet {
    pub fn from_slice<T: Element>(s: &[T]) -> Self {
        let mut set = ElementSet { ascii: [false; 256], wide: HashSet::new() };
        for &e in s {
            set.insert(e);
        }
        set
    }

    pub fn insert<T: Element>(&mut self, e: T) {
        let key = e.to_key();
        if key < 256 {
            self.ascii[key as usize] = true;
        } else {
            self.wide.insert(key);
        }
    }

    pub fn contains<T: Element>(&self, e: T) -> bool {
        let key = e.to_key();
        if key < 256 {
            self.ascii[key as usize]
        } else {
            self.wide.contains(&key)
        }
    }
}
