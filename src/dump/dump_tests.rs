use std::io::Cursor;

use crate::dump::{checked_element_count, parse_float, DumpLines, IndexBase};

#[test]
fn test_dump_index_base_to_zero_based() {
    assert_eq!(IndexBase::Zero.to_zero_based(0), Some(0));
    assert_eq!(IndexBase::Zero.to_zero_based(4), Some(4));
    assert_eq!(IndexBase::One.to_zero_based(1), Some(0));
    assert_eq!(IndexBase::One.to_zero_based(4), Some(3));
    assert_eq!(IndexBase::One.to_zero_based(0), None);
    assert_eq!(IndexBase::default(), IndexBase::Zero);
}

#[test]
fn test_dump_parse_float() {
    assert_eq!(parse_float("0.25"), Some(0.25));
    assert_eq!(parse_float("-1.5E-02"), Some(-0.015));
    assert_eq!(parse_float("-1.5D-02"), Some(-0.015));
    assert_eq!(parse_float("2.0d+01"), Some(20.0));
    assert_eq!(parse_float("Block"), None);
    assert_eq!(parse_float(""), None);
}

#[test]
fn test_dump_lines_lookahead() {
    let mut lines = DumpLines::new(Cursor::new("first\nsecond\nthird\n"));
    assert_eq!(lines.line_number(), 0);
    assert_eq!(lines.peek_line().unwrap(), Some("first"));
    assert_eq!(lines.peek_line().unwrap(), Some("first"));
    assert_eq!(lines.line_number(), 0);
    assert_eq!(lines.next_line().unwrap().as_deref(), Some("first"));
    assert_eq!(lines.line_number(), 1);
    assert_eq!(lines.next_line().unwrap().as_deref(), Some("second"));
    assert_eq!(lines.peek_line().unwrap(), Some("third"));
    assert_eq!(lines.next_line().unwrap().as_deref(), Some("third"));
    assert_eq!(lines.line_number(), 3);
    assert_eq!(lines.peek_line().unwrap(), None);
    assert_eq!(lines.next_line().unwrap(), None);
    assert_eq!(lines.line_number(), 3);
}

#[test]
fn test_dump_checked_element_count() {
    assert_eq!(checked_element_count(&[2, 3, 4]), Some(24));
    assert_eq!(checked_element_count(&[]), Some(1));
    assert_eq!(checked_element_count(&[5, 0, 7]), Some(0));
    assert_eq!(checked_element_count(&[4, 4294967296, 4294967296]), None);
    assert_eq!(checked_element_count(&[usize::MAX, 0, 2]), None);
    assert_eq!(checked_element_count(&[1 << 30, 1 << 30, 1 << 3]), None);
    assert_eq!(checked_element_count(&[1 << 20, 1 << 20, 1 << 19]), Some(1 << 59));
}
