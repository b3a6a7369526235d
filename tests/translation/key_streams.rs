//! Format auto-detection and key conversion streams.

use std::io::Read;

use crate::test_utils::*;
use dutil::{detect_format, peek_format, KeyReader, KeyWriter};

fn read_all(input: &str) -> (KeyFormat, Vec<Key>) {
    let reader = KeyReader::auto(input.as_bytes(), "").unwrap();
    let format = reader.format();
    let keys = reader.collect::<dutil::Result<Vec<_>>>().unwrap();
    (format, keys)
}

#[test]
fn detects_each_format() {
    assert_eq!(detect_format(b"{\"kind\""), KeyFormat::Json);
    assert_eq!(detect_format(b"KEY(A, 1)"), KeyFormat::Literal);
    assert_eq!(detect_format(b"key(A, 1)"), KeyFormat::Literal);
    assert_eq!(detect_format(b"EgcKAUEQAQ"), KeyFormat::Opaque);
    assert_eq!(detect_format(b"ab"), KeyFormat::Opaque);
    assert_eq!(detect_format(b""), KeyFormat::Opaque);
}

#[test]
fn peek_keeps_every_byte() {
    let input = "KEY(Org, 1)\nKEY(Org, 2)\n";
    let (format, mut rest) = peek_format(input.as_bytes()).unwrap();
    assert_eq!(format, KeyFormat::Literal);
    let mut text = String::new();
    rest.read_to_string(&mut text).unwrap();
    assert_eq!(text, input);
}

#[test]
fn peek_short_input() {
    let (format, mut rest) = peek_format(&b"{}"[..]).unwrap();
    assert_eq!(format, KeyFormat::Json);
    let mut text = String::new();
    rest.read_to_string(&mut text).unwrap();
    assert_eq!(text, "{}");
}

#[test]
fn auto_reads_json_stream() {
    let (format, keys) = read_all("{\"kind\":\"A\",\"id\":1}\n{\"kind\":\"B\",\"name\":\"x\"}");
    assert_eq!(format, KeyFormat::Json);
    assert_eq!(keys, vec![Key::with_id("A", 1).unwrap(), Key::with_name("B", "x").unwrap()]);
}

#[test]
fn auto_reads_literal_lines() {
    let (format, keys) = read_all("KEY(A, 1)\n\nKEY(B, 'x')\n");
    assert_eq!(format, KeyFormat::Literal);
    assert_eq!(keys, vec![Key::with_id("A", 1).unwrap(), Key::with_name("B", "x").unwrap()]);
}

#[test]
fn auto_reads_opaque_lines() {
    let first = Key::with_id("A", 1).unwrap();
    let second = Key::with_name("B", "x")
        .unwrap()
        .parent_key(Key::with_id("A", 1).unwrap())
        .unwrap();
    let input = format!("{}\n{}\n", first.encode(), second.encode());
    let (format, keys) = read_all(&input);
    assert_eq!(format, KeyFormat::Opaque);
    assert_eq!(keys, vec![first, second]);
}

#[test]
fn auto_on_empty_input_yields_nothing() {
    let (_, keys) = read_all("");
    assert!(keys.is_empty());
}

#[test]
fn writer_output_reads_back_in_every_format() {
    let keys = vec![
        Key::with_id("A", 1).unwrap().in_namespace("ns"),
        Key::with_name("B", "two words")
            .unwrap()
            .parent_key(Key::with_id("A", 9).unwrap())
            .unwrap(),
    ];
    for format in [KeyFormat::Json, KeyFormat::Literal, KeyFormat::Opaque, KeyFormat::WireProto] {
        let mut writer = KeyWriter::new(format, Vec::new());
        for key in &keys {
            writer.write(key).unwrap();
        }
        writer.flush().unwrap();
        let bytes = writer.into_inner();

        let read: Vec<Key> = KeyReader::new(format, bytes.as_slice(), "")
            .collect::<dutil::Result<_>>()
            .unwrap();
        assert_eq!(read, keys, "format {}", format);
    }
}
