//! Edit scripts: the enumerated ([`Editops`]) and run-length ([`Opcodes`])
//! forms of a minimum edit sequence, plus replay and byte serialisation.
//!
//! An edit script transforms a source sequence into a destination sequence.
//! `Editops` lists one operation per edited element, sorted by
//! `(src_pos, dest_pos)`; matches are implicit. `Opcodes` covers both
//! sequences end to end with run-length spans, including the matching runs.
//! The two forms convert losslessly in both directions on canonical input.

use crate::types::{Element, MetricError};

// ─────────────────────────────────────────────────────────────────────────────
// Operation kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EditType {
    /// No change (only used by [`Opcodes`] spans).
    None = 0,
    /// Replace the source element at `src_pos` with the destination element
    /// at `dest_pos`.
    Replace = 1,
    /// Insert the destination element at `dest_pos` before `src_pos`.
    Insert = 2,
    /// Delete the source element at `src_pos`.
    Delete = 3,
}

impl EditType {
    fn from_u8(v: u8) -> Result<Self, MetricError> {
        match v {
            0 => Ok(EditType::None),
            1 => Ok(EditType::Replace),
            2 => Ok(EditType::Insert),
            3 => Ok(EditType::Delete),
            _ => Err(MetricError::InvalidEditops("unknown operation kind")),
        }
    }
}

/// One element-level edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOp {
    pub kind: EditType,
    pub src_pos: usize,
    pub dest_pos: usize,
}

impl EditOp {
    pub const fn new(kind: EditType, src_pos: usize, dest_pos: usize) -> Self {
        EditOp { kind, src_pos, dest_pos }
    }
}

/// One run-length span of an opcode script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub kind: EditType,
    pub src_begin: usize,
    pub src_end: usize,
    pub dest_begin: usize,
    pub dest_end: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Editops
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered list of element-level edit operations plus the lengths of the two
/// sequences it relates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editops {
    pub(crate) ops: Vec<EditOp>,
    pub(crate) src_len: usize,
    pub(crate) dest_len: usize,
}

impl Editops {
    pub fn new(src_len: usize, dest_len: usize) -> Self {
        Editops { ops: Vec::new(), src_len, dest_len }
    }

    pub fn src_len(&self) -> usize {
        self.src_len
    }

    pub fn dest_len(&self) -> usize {
        self.dest_len
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn as_slice(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.ops.iter()
    }

    /// Append an operation. The caller keeps the `(src_pos, dest_pos)`
    /// ordering invariant.
    pub fn push(&mut self, op: EditOp) {
        self.ops.push(op);
    }

    /// Python-style slice of the operation list. Negative `start`/`stop`
    /// index from the end; `step` must be positive.
    pub fn slice(&self, start: isize, stop: isize, step: isize) -> Result<Editops, MetricError> {
        let ops = vector_slice(&self.ops, start, stop, step)?;
        Ok(Editops { ops, src_len: self.src_len, dest_len: self.dest_len })
    }

    /// Script with the order of operations reversed (positions untouched).
    pub fn reverse(&self) -> Editops {
        let mut rev = self.clone();
        rev.ops.reverse();
        rev
    }

    /// Script describing the opposite transformation (destination back into
    /// source): swaps positions and exchanges inserts with deletes.
    pub fn inverse(&self) -> Editops {
        let mut inv = self.clone();
        std::mem::swap(&mut inv.src_len, &mut inv.dest_len);
        for op in &mut inv.ops {
            std::mem::swap(&mut op.src_pos, &mut op.dest_pos);
            op.kind = match op.kind {
                EditType::Delete => EditType::Insert,
                EditType::Insert => EditType::Delete,
                other => other,
            };
        }
        inv
    }

    /// Remove `subsequence` from this script, shifting the source positions
    /// of the remaining operations as if the removed inserts/deletes had
    /// already been applied.
    ///
    /// `subsequence` must be an exact subsequence of the receiver's
    /// operation list (the same `EditOp` values in the same order) — a
    /// rewritten but equivalent script does not qualify.
    pub fn remove_subsequence(&self, subsequence: &Editops) -> Result<Editops, MetricError> {
        if subsequence.len() > self.len() {
            return Err(MetricError::InvalidEditops("not a subsequence"));
        }

        let mut result = Editops::new(self.src_len, self.dest_len);
        result.ops.reserve(self.len() - subsequence.len());

        // offset corrects the source positions of ops kept after removals
        let mut offset: isize = 0;
        let mut iter = self.ops.iter();
        for sop in &subsequence.ops {
            loop {
                match iter.next() {
                    None => return Err(MetricError::InvalidEditops("not a subsequence")),
                    Some(op) if op == sop => break,
                    Some(op) => {
                        let mut kept = *op;
                        kept.src_pos = (kept.src_pos as isize + offset) as usize;
                        result.ops.push(kept);
                    }
                }
            }
            match sop.kind {
                EditType::Insert => offset += 1,
                EditType::Delete => offset -= 1,
                _ => {}
            }
        }
        for op in iter {
            let mut kept = *op;
            kept.src_pos = (kept.src_pos as isize + offset) as usize;
            result.ops.push(kept);
        }

        Ok(result)
    }

    // ── Byte serialisation ───────────────────────────────────────────────────
    //
    // Little-endian, length-prefixed:
    //   count: u64, then per op (kind: u8, src_pos: u64, dest_pos: u64),
    //   then src_len: u64, dest_len: u64.

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.len() * 17 + 16);
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for op in &self.ops {
            out.push(op.kind as u8);
            out.extend_from_slice(&(op.src_pos as u64).to_le_bytes());
            out.extend_from_slice(&(op.dest_pos as u64).to_le_bytes());
        }
        out.extend_from_slice(&(self.src_len as u64).to_le_bytes());
        out.extend_from_slice(&(self.dest_len as u64).to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Editops, MetricError> {
        let mut reader = ByteReader::new(bytes);
        let count = reader.read_u64()? as usize;
        let mut ops = Vec::with_capacity(count.min(bytes.len() / 17));
        for _ in 0..count {
            let kind = EditType::from_u8(reader.read_u8()?)?;
            if kind == EditType::None {
                return Err(MetricError::InvalidEditops("no-op in enumerated script"));
            }
            let src_pos = reader.read_u64()? as usize;
            let dest_pos = reader.read_u64()? as usize;
            ops.push(EditOp::new(kind, src_pos, dest_pos));
        }
        let src_len = reader.read_u64()? as usize;
        let dest_len = reader.read_u64()? as usize;
        reader.finish()?;
        Ok(Editops { ops, src_len, dest_len })
    }
}

impl std::ops::Index<usize> for Editops {
    type Output = EditOp;

    fn index(&self, index: usize) -> &EditOp {
        &self.ops[index]
    }
}

impl<'a> IntoIterator for &'a Editops {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Opcodes
// ─────────────────────────────────────────────────────────────────────────────

/// Run-length edit script covering the full spans of both sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opcodes {
    pub(crate) ops: Vec<Opcode>,
    pub(crate) src_len: usize,
    pub(crate) dest_len: usize,
}

impl Opcodes {
    pub fn new(src_len: usize, dest_len: usize) -> Self {
        Opcodes { ops: Vec::new(), src_len, dest_len }
    }

    pub fn src_len(&self) -> usize {
        self.src_len
    }

    pub fn dest_len(&self) -> usize {
        self.dest_len
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn as_slice(&self) -> &[Opcode] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Opcode> {
        self.ops.iter()
    }

    /// Append a span. The caller keeps the spans contiguous.
    pub fn push(&mut self, op: Opcode) {
        self.ops.push(op);
    }

    /// Script describing the opposite transformation.
    pub fn inverse(&self) -> Opcodes {
        let mut inv = self.clone();
        std::mem::swap(&mut inv.src_len, &mut inv.dest_len);
        for op in &mut inv.ops {
            std::mem::swap(&mut op.src_begin, &mut op.dest_begin);
            std::mem::swap(&mut op.src_end, &mut op.dest_end);
            op.kind = match op.kind {
                EditType::Delete => EditType::Insert,
                EditType::Insert => EditType::Delete,
                other => other,
            };
        }
        inv
    }

    /// Serialisation mirror of [`Editops::to_bytes`] with the four span
    /// fields per record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.len() * 33 + 16);
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for op in &self.ops {
            out.push(op.kind as u8);
            out.extend_from_slice(&(op.src_begin as u64).to_le_bytes());
            out.extend_from_slice(&(op.src_end as u64).to_le_bytes());
            out.extend_from_slice(&(op.dest_begin as u64).to_le_bytes());
            out.extend_from_slice(&(op.dest_end as u64).to_le_bytes());
        }
        out.extend_from_slice(&(self.src_len as u64).to_le_bytes());
        out.extend_from_slice(&(self.dest_len as u64).to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Opcodes, MetricError> {
        let mut reader = ByteReader::new(bytes);
        let count = reader.read_u64()? as usize;
        let mut ops = Vec::with_capacity(count.min(bytes.len() / 33));
        for _ in 0..count {
            let kind = EditType::from_u8(reader.read_u8()?)?;
            let src_begin = reader.read_u64()? as usize;
            let src_end = reader.read_u64()? as usize;
            let dest_begin = reader.read_u64()? as usize;
            let dest_end = reader.read_u64()? as usize;
            ops.push(Opcode { kind, src_begin, src_end, dest_begin, dest_end });
        }
        let src_len = reader.read_u64()? as usize;
        let dest_len = reader.read_u64()? as usize;
        reader.finish()?;
        let opcodes = Opcodes { ops, src_len, dest_len };
        opcodes.validate()?;
        Ok(opcodes)
    }

    fn validate(&self) -> Result<(), MetricError> {
        for op in &self.ops {
            if op.src_end < op.src_begin || op.dest_end < op.dest_begin {
                return Err(MetricError::InvalidEditops("span runs backwards"));
            }
            let src_span = op.src_end - op.src_begin;
            let dest_span = op.dest_end - op.dest_begin;
            let consistent = match op.kind {
                EditType::None | EditType::Replace => src_span == dest_span,
                EditType::Insert => src_span == 0,
                EditType::Delete => dest_span == 0,
            };
            if !consistent {
                return Err(MetricError::InvalidEditops("inconsistent span"));
            }
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for Opcodes {
    type Output = Opcode;

    fn index(&self, index: usize) -> &Opcode {
        &self.ops[index]
    }
}

impl<'a> IntoIterator for &'a Opcodes {
    type Item = &'a Opcode;
    type IntoIter = std::slice::Iter<'a, Opcode>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<&Editops> for Opcodes {
    /// Merge consecutive operations of the same kind into spans and fill the
    /// gaps with matching (`None`) spans.
    fn from(editops: &Editops) -> Opcodes {
        let mut opcodes = Opcodes {
            ops: Vec::new(),
            src_len: editops.src_len,
            dest_len: editops.dest_len,
        };

        let mut src_pos = 0;
        let mut dest_pos = 0;
        let mut i = 0;
        while i < editops.len() {
            let op = editops[i];
            if src_pos < op.src_pos || dest_pos < op.dest_pos {
                opcodes.ops.push(Opcode {
                    kind: EditType::None,
                    src_begin: src_pos,
                    src_end: op.src_pos,
                    dest_begin: dest_pos,
                    dest_end: op.dest_pos,
                });
                src_pos = op.src_pos;
                dest_pos = op.dest_pos;
            }

            let src_begin = src_pos;
            let dest_begin = dest_pos;
            let kind = op.kind;
            loop {
                match kind {
                    EditType::None => {}
                    EditType::Replace => {
                        src_pos += 1;
                        dest_pos += 1;
                    }
                    EditType::Insert => dest_pos += 1,
                    EditType::Delete => src_pos += 1,
                }
                i += 1;
                if i >= editops.len()
                    || editops[i].kind != kind
                    || editops[i].src_pos != src_pos
                    || editops[i].dest_pos != dest_pos
                {
                    break;
                }
            }

            opcodes.ops.push(Opcode {
                kind,
                src_begin,
                src_end: src_pos,
                dest_begin,
                dest_end: dest_pos,
            });
        }

        if src_pos < editops.src_len || dest_pos < editops.dest_len {
            opcodes.ops.push(Opcode {
                kind: EditType::None,
                src_begin: src_pos,
                src_end: editops.src_len,
                dest_begin: dest_pos,
                dest_end: editops.dest_len,
            });
        }

        opcodes
    }
}

impl TryFrom<&Opcodes> for Editops {
    type Error = MetricError;

    /// Expand spans back into element-level operations.
    fn try_from(opcodes: &Opcodes) -> Result<Editops, MetricError> {
        opcodes.validate()?;

        let mut editops = Editops::new(opcodes.src_len, opcodes.dest_len);
        for op in &opcodes.ops {
            match op.kind {
                EditType::None => {}
                EditType::Replace => {
                    for j in 0..op.src_end - op.src_begin {
                        editops.ops.push(EditOp::new(
                            EditType::Replace,
                            op.src_begin + j,
                            op.dest_begin + j,
                        ));
                    }
                }
                EditType::Insert => {
                    for j in 0..op.dest_end - op.dest_begin {
                        editops.ops.push(EditOp::new(
                            EditType::Insert,
                            op.src_begin,
                            op.dest_begin + j,
                        ));
                    }
                }
                EditType::Delete => {
                    for j in 0..op.src_end - op.src_begin {
                        editops.ops.push(EditOp::new(
                            EditType::Delete,
                            op.src_begin + j,
                            op.dest_begin,
                        ));
                    }
                }
            }
        }
        Ok(editops)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Script replay
// ─────────────────────────────────────────────────────────────────────────────

/// Apply an edit script produced for `(s1, s2)` to `s1`, reproducing `s2`.
pub fn editops_apply<T: Element>(ops: &Editops, s1: &[T], s2: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(s1.len() + s2.len());
    let mut src_pos = 0;

    for op in &ops.ops {
        // implicit matches between the previous and the current operation
        while src_pos < op.src_pos {
            out.push(s1[src_pos]);
            src_pos += 1;
        }

        match op.kind {
            EditType::None | EditType::Replace => {
                out.push(s2[op.dest_pos]);
                src_pos += 1;
            }
            EditType::Insert => out.push(s2[op.dest_pos]),
            EditType::Delete => src_pos += 1,
        }
    }

    while src_pos < s1.len() {
        out.push(s1[src_pos]);
        src_pos += 1;
    }

    out
}

/// Apply an opcode script produced for `(s1, s2)` to `s1`, reproducing `s2`.
pub fn opcodes_apply<T: Element>(ops: &Opcodes, s1: &[T], s2: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(s1.len() + s2.len());

    for op in &ops.ops {
        match op.kind {
            EditType::None => out.extend_from_slice(&s1[op.src_begin..op.src_end]),
            EditType::Replace | EditType::Insert => {
                out.extend_from_slice(&s2[op.dest_begin..op.dest_end]);
            }
            EditType::Delete => {}
        }
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn vector_slice(ops: &[EditOp], start: isize, stop: isize, step: isize) -> Result<Vec<EditOp>, MetricError> {
    if step <= 0 {
        return Err(MetricError::InvalidSlice { step });
    }

    let len = ops.len() as isize;
    let clamp = |i: isize| -> isize {
        if i < 0 {
            (i + len).max(0)
        } else {
            i.min(len)
        }
    };
    let start = clamp(start);
    let stop = clamp(stop);

    let mut out = Vec::new();
    let mut i = start;
    while i < stop {
        out.push(ops[i as usize]);
        i += step;
    }
    Ok(out)
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    fn read_u8(&mut self) -> Result<u8, MetricError> {
        let b = self
            .bytes
            .get(self.pos)
            .copied()
            .ok_or(MetricError::InvalidEditops("truncated input"))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_u64(&mut self) -> Result<u64, MetricError> {
        let end = self.pos + 8;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(MetricError::InvalidEditops("truncated input"))?;
        self.pos = end;
        Ok(u64::from_le_bytes(chunk.try_into().expect("8-byte chunk")))
    }

    fn finish(&self) -> Result<(), MetricError> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(MetricError::InvalidEditops("trailing bytes"))
        }
    }
}
