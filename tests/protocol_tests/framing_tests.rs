//! Tests for line framing
//!
//! These tests verify:
//! - Requests split on LF, CR, and CRLF
//! - Empty lines are skipped
//! - Lines split across reads are reassembled
//! - Oversized lines are truncated, not split
//! - Responses are framed and read back by the terminator

use std::io::{BufReader, Cursor};

use trainstation::protocol::{
    encode_response, read_response, write_request, write_response, LineSplitter,
    RESPONSE_TERMINATOR,
};
use trainstation::StationError;

// =============================================================================
// Request Splitting
// =============================================================================

#[test]
fn test_split_on_newline() {
    let mut splitter = LineSplitter::new(1023);
    let lines = splitter.push(b"SCHEDULE\nSTATS\n");

    assert_eq!(lines, vec!["SCHEDULE", "STATS"]);
    assert_eq!(splitter.pending(), 0);
}

#[test]
fn test_split_on_carriage_return() {
    let mut splitter = LineSplitter::new(1023);

    assert_eq!(splitter.push(b"UPDATE R101 5\r\n"), vec!["UPDATE R101 5"]);
    assert_eq!(splitter.push(b"STATS\rSCHEDULE\r"), vec!["STATS", "SCHEDULE"]);
}

#[test]
fn test_empty_lines_skipped() {
    let mut splitter = LineSplitter::new(1023);
    let lines = splitter.push(b"\n\r\n\nSTATS\n\n");

    assert_eq!(lines, vec!["STATS"]);
}

#[test]
fn test_line_split_across_reads() {
    let mut splitter = LineSplitter::new(1023);

    assert!(splitter.push(b"UPD").is_empty());
    assert_eq!(splitter.pending(), 3);
    assert!(splitter.push(b"ATE R1").is_empty());
    assert_eq!(splitter.push(b"01 9\nDET"), vec!["UPDATE R101 9"]);
    assert_eq!(splitter.push(b"AILS R101\n"), vec!["DETAILS R101"]);
}

#[test]
fn test_unterminated_line_stays_pending() {
    let mut splitter = LineSplitter::new(1023);
    assert!(splitter.push(b"STATS").is_empty());
    assert_eq!(splitter.pending(), 5);
}

#[test]
fn test_oversized_line_truncated() {
    let mut splitter = LineSplitter::new(8);
    let lines = splitter.push(b"REPORT the heating is broken\nSTATS\n");

    assert_eq!(lines, vec!["REPORT t", "STATS"]);
    assert_eq!(splitter.truncated_bytes(), 20);
}

#[test]
fn test_invalid_utf8_is_replaced() {
    let mut splitter = LineSplitter::new(1023);
    let lines = splitter.push(b"REPORT \xFF broken\n");

    assert_eq!(lines, vec!["REPORT \u{FFFD} broken"]);
}

// =============================================================================
// Response Framing
// =============================================================================

#[test]
fn test_encode_response_appends_terminator() {
    assert_eq!(encode_response("Update successful."), b"Update successful.\n==END==\n");
    assert_eq!(encode_response(""), RESPONSE_TERMINATOR.as_bytes());
}

#[test]
fn test_read_multiline_responses() {
    let mut wire = Vec::new();
    write_response(&mut wire, "\n--- DAILY SCHEDULE ---\nR101 | ...\n").unwrap();
    write_response(&mut wire, "Train not found.").unwrap();

    let mut reader = BufReader::new(Cursor::new(wire));
    assert_eq!(
        read_response(&mut reader).unwrap().as_deref(),
        Some("\n--- DAILY SCHEDULE ---\nR101 | ...\n")
    );
    assert_eq!(
        read_response(&mut reader).unwrap().as_deref(),
        Some("Train not found.")
    );
    assert_eq!(read_response(&mut reader).unwrap(), None);
}

#[test]
fn test_read_response_body_containing_end_marker_text() {
    let mut wire = Vec::new();
    write_response(&mut wire, "==END== is only special after a newline").unwrap();

    let mut reader = BufReader::new(Cursor::new(wire));
    assert_eq!(
        read_response(&mut reader).unwrap().as_deref(),
        Some("==END== is only special after a newline")
    );
}

#[test]
fn test_read_response_partial_is_error() {
    let mut reader = BufReader::new(Cursor::new(b"Update succ".to_vec()));

    assert!(matches!(
        read_response(&mut reader),
        Err(StationError::Protocol(_))
    ));
}

#[test]
fn test_write_request_appends_newline() {
    let mut wire = Vec::new();
    write_request(&mut wire, "STATS").unwrap();
    assert_eq!(wire, b"STATS\n");
}
