//! Pattern-match bitmaps: for a pattern `P` they answer, per element value
//! `e`, the bitmask whose bit `j` is set iff `P[j] == e`.
//!
//! Every bit-parallel engine consumes one of these. Values whose key fits
//! into a byte are served from a direct 256-entry array; all other values go
//! through [`BitvectorHashmap`], an open-addressed probe table whose lookups
//! compile down to a handful of ALU operations — the inner loops never touch
//! a general-purpose hasher.

use crate::bitutil::ceil_div;
use crate::types::Element;

// ─────────────────────────────────────────────────────────────────────────────
// Open-addressed bitvector hashmap
// ─────────────────────────────────────────────────────────────────────────────

const MIN_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
struct MapElem<V> {
    key: u64,
    value: V,
}

/// Grow-only open-addressed `u64 → V` map with perturbed probing
/// (`i = i*5 + perturb + 1`, `perturb >>= 5`).
///
/// A slot holding `V::default()` is empty, so stored values must never equal
/// the default — the bitmap users OR position bits into a mask (non-zero by
/// construction) and the row-index users store positions offset away from
/// the default. Capacity is a power of two, the table resizes at two-thirds
/// fill and never shrinks, so probing always terminates.
#[derive(Debug, Clone)]
pub struct GrowingHashmap<V> {
    used: usize,
    fill: usize,
    map: Vec<MapElem<V>>,
}

/// Bit-mask specialisation used by the pattern bitmaps.
pub type BitvectorHashmap = GrowingHashmap<u64>;

impl<V: Copy + Default + PartialEq> Default for GrowingHashmap<V> {
    fn default() -> Self {
        GrowingHashmap { used: 0, fill: 0, map: Vec::new() }
    }
}

impl<V: Copy + Default + PartialEq> GrowingHashmap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: u64) -> V {
        if self.map.is_empty() {
            return V::default();
        }
        self.map[self.lookup(key)].value
    }

    /// Mutable access to the value slot for `key`, inserting an empty slot
    /// (and growing the table) when the key is new.
    pub fn value_mut(&mut self, key: u64) -> &mut V {
        if self.map.is_empty() {
            self.map = vec![MapElem::default(); MIN_CAPACITY];
        }

        let mut i = self.lookup(key);
        if self.map[i].value == V::default() {
            // resize when two thirds full
            self.fill += 1;
            if self.fill * 3 >= self.map.len() * 2 {
                self.grow((self.used + 1) * 2);
                i = self.lookup(key);
            }
            self.used += 1;
        }

        self.map[i].key = key;
        &mut self.map[i].value
    }

    fn lookup(&self, key: u64) -> usize {
        let mask = (self.map.len() - 1) as u64;
        let mut i = key & mask;

        if self.map[i as usize].value == V::default() || self.map[i as usize].key == key {
            return i as usize;
        }

        let mut perturb = key;
        loop {
            i = (i.wrapping_mul(5).wrapping_add(perturb).wrapping_add(1)) & mask;
            if self.map[i as usize].value == V::default() || self.map[i as usize].key == key {
                return i as usize;
            }
            perturb >>= 5;
        }
    }

    fn grow(&mut self, min_used: usize) {
        let mut new_size = self.map.len();
        while new_size <= min_used {
            new_size <<= 1;
        }

        let old = std::mem::replace(&mut self.map, vec![MapElem::default(); new_size]);
        self.fill = self.used;

        for elem in old.into_iter().filter(|e| e.value != V::default()) {
            let j = self.lookup(elem.key);
            self.map[j] = elem;
        }
    }
}

/// [`GrowingHashmap`] fronted by a 256-entry direct array for byte-ranged
/// keys, mirroring the fast path of the pattern bitmaps for engines that
/// track per-element state other than a mask.
#[derive(Debug, Clone)]
pub(crate) struct HybridGrowingHashmap<V> {
    ascii: [V; 256],
    map: GrowingHashmap<V>,
}

impl<V: Copy + Default + PartialEq> HybridGrowingHashmap<V> {
    pub fn new() -> Self {
        HybridGrowingHashmap { ascii: [V::default(); 256], map: GrowingHashmap::new() }
    }

    #[inline]
    pub fn get<T: Element>(&self, e: T) -> V {
        let key = e.to_key();
        if key < 256 {
            self.ascii[key as usize]
        } else {
            self.map.get(key)
        }
    }

    #[inline]
    pub fn value_mut<T: Element>(&mut self, e: T) -> &mut V {
        let key = e.to_key();
        if key < 256 {
            &mut self.ascii[key as usize]
        } else {
            self.map.value_mut(key)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bitmap access shared by single-word and blocked forms
// ─────────────────────────────────────────────────────────────────────────────

/// Read access used by the kernels; implemented by both bitmap forms so the
/// block algorithms can run against either.
pub trait PatternBitmap<T: Element> {
    /// Number of 64-bit words per element mask.
    fn word_count(&self) -> usize;

    /// Word `block` of the mask for `e` (0 for unknown elements).
    fn get(&self, block: usize, e: T) -> u64;
}

// ─────────────────────────────────────────────────────────────────────────────
// Single-word form (pattern length ≤ 64)
// ─────────────────────────────────────────────────────────────────────────────

/// Bitmap for patterns of at most 64 elements.
#[derive(Clone)]
pub struct PatternMatchVector {
    extended_ascii: [u64; 256],
    map: BitvectorHashmap,
}

impl PatternMatchVector {
    pub fn new<T: Element>(pattern: &[T]) -> Self {
        debug_assert!(pattern.len() <= 64);
        let mut pmv =
            PatternMatchVector { extended_ascii: [0; 256], map: BitvectorHashmap::new() };
        for (pos, &e) in pattern.iter().enumerate() {
            pmv.insert(e, pos);
        }
        pmv
    }

    /// Set bit `pos` of the mask for `e`.
    pub fn insert<T: Element>(&mut self, e: T, pos: usize) {
        debug_assert!(pos < 64);
        let key = e.to_key();
        let mask = 1u64 << pos;
        if key < 256 {
            self.extended_ascii[key as usize] |= mask;
        } else {
            *self.map.value_mut(key) |= mask;
        }
    }

    /// Mask for `e` (0 when absent from the pattern).
    #[inline]
    pub fn get<T: Element>(&self, e: T) -> u64 {
        let key = e.to_key();
        if key < 256 {
            self.extended_ascii[key as usize]
        } else {
            self.map.get(key)
        }
    }
}

impl<T: Element> PatternBitmap<T> for PatternMatchVector {
    #[inline]
    fn word_count(&self) -> usize {
        1
    }

    #[inline]
    fn get(&self, block: usize, e: T) -> u64 {
        debug_assert_eq!(block, 0);
        PatternMatchVector::get(self, e)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Blocked form (arbitrary pattern length)
// ─────────────────────────────────────────────────────────────────────────────

/// Bitmap for patterns longer than 64 elements: word `k` of `get` covers
/// pattern positions `64k..64k+63`.
#[derive(Clone)]
pub struct BlockPatternMatchVector {
    block_count: usize,
    /// Row-major `256 × block_count` words for byte-keyed elements.
    extended_ascii: Vec<u64>,
    /// One probe table per block; allocated on the first non-byte key.
    map: Option<Vec<BitvectorHashmap>>,
}

impl BlockPatternMatchVector {
    pub fn new<T: Element>(pattern: &[T]) -> Self {
        let block_count = ceil_div(pattern.len(), 64);
        let mut pmv = BlockPatternMatchVector {
            block_count,
            extended_ascii: vec![0; 256 * block_count],
            map: None,
        };
        for (pos, &e) in pattern.iter().enumerate() {
            pmv.insert(pos / 64, e, pos % 64);
        }
        pmv
    }

    /// Set bit `pos` of word `block` of the mask for `e`.
    pub fn insert<T: Element>(&mut self, block: usize, e: T, pos: usize) {
        debug_assert!(block < self.block_count);
        debug_assert!(pos < 64);
        let key = e.to_key();
        let mask = 1u64 << pos;
        if key < 256 {
            self.extended_ascii[key as usize * self.block_count + block] |= mask;
        } else {
            let map = self
                .map
                .get_or_insert_with(|| vec![BitvectorHashmap::new(); self.block_count]);
            *map[block].value_mut(key) |= mask;
        }
    }
}

impl<T: Element> PatternBitmap<T> for BlockPatternMatchVector {
    #[inline]
    fn word_count(&self) -> usize {
        self.block_count
    }

    #[inline]
    fn get(&self, block: usize, e: T) -> u64 {
        debug_assert!(block < self.block_count);
        let key = e.to_key();
        if key < 256 {
            self.extended_ascii[key as usize * self.block_count + block]
        } else {
            match &self.map {
                Some(map) => map[block].get(key),
                None => 0,
            }
        }
    }
}
