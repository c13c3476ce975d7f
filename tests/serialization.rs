// Byte serialisation of edit scripts: in-memory and file round trips,
// plus rejection of malformed input.

use std::io::{Read, Seek, SeekFrom, Write};

use seqfuzz::{levenshtein_editops, Editops, MetricError, Opcodes};

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

#[test]
fn editops_byte_round_trip() {
    let ops = levenshtein_editops(&chars("qabxcd"), &chars("abycdf"), None);
    let bytes = ops.to_bytes();
    // count + 3 records of 17 bytes + the two lengths
    assert_eq!(bytes.len(), 8 + ops.len() * 17 + 16);
    assert_eq!(Editops::from_bytes(&bytes).unwrap(), ops);
}

#[test]
fn empty_editops_round_trip() {
    let ops = levenshtein_editops(&chars("same"), &chars("same"), None);
    let back = Editops::from_bytes(&ops.to_bytes()).unwrap();
    assert_eq!(back, ops);
    assert_eq!(back.src_len(), 4);
    assert_eq!(back.dest_len(), 4);
}

#[test]
fn opcodes_byte_round_trip() {
    let ops = levenshtein_editops(&chars("kitten"), &chars("sitting"), None);
    let opcodes = Opcodes::from(&ops);
    let back = Opcodes::from_bytes(&opcodes.to_bytes()).unwrap();
    assert_eq!(back, opcodes);
}

#[test]
fn file_round_trip() {
    let ops = levenshtein_editops(&chars("lewenstein"), &chars("levenshtein"), None);
    let mut file = tempfile::tempfile().expect("create temp file");
    file.write_all(&ops.to_bytes()).expect("write script");
    file.seek(SeekFrom::Start(0)).expect("rewind");

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).expect("read script");
    assert_eq!(Editops::from_bytes(&bytes).unwrap(), ops);
}

#[test]
fn truncated_input_is_rejected() {
    let ops = levenshtein_editops(&chars("kitten"), &chars("sitting"), None);
    let bytes = ops.to_bytes();
    for cut in [0, 7, bytes.len() - 1] {
        assert!(matches!(
            Editops::from_bytes(&bytes[..cut]),
            Err(MetricError::InvalidEditops(_))
        ));
    }
}

#[test]
fn trailing_bytes_are_rejected() {
    let ops = levenshtein_editops(&chars("ab"), &chars("ba"), None);
    let mut bytes = ops.to_bytes();
    bytes.push(0);
    assert!(matches!(Editops::from_bytes(&bytes), Err(MetricError::InvalidEditops(_))));
}

#[test]
fn unknown_kind_is_rejected() {
    let ops = levenshtein_editops(&chars("ab"), &chars("ac"), None);
    let mut bytes = ops.to_bytes();
    bytes[8] = 9; // kind byte of the first record
    assert!(matches!(Editops::from_bytes(&bytes), Err(MetricError::InvalidEditops(_))));
}

#[test]
fn opcode_span_consistency_is_checked() {
    let ops = levenshtein_editops(&chars("ab"), &chars("ba"), None);
    let opcodes = Opcodes::from(&ops);
    let mut bytes = opcodes.to_bytes();
    // corrupt the span bounds of the first record
    bytes[9] = 0xFF;
    assert!(Opcodes::from_bytes(&bytes).is_err());
}
