// Tests for debug log payload extraction
//
//  Copyright (C) 2026 The ast2dot Authors
//
//  This file is part of ast2dot.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::*;
use std::io::{BufReader, Cursor};

type Sut<R> = StreamFilter<R>;

fn filter_str(input: &str, config: FilterConfig) -> String {
    let mut sut = Sut::with_config(input.as_bytes(), config);
    let mut out = String::new();

    sut.read_to_string(&mut out).expect("filtering failed");
    out
}

/// Read one byte at a time from a source that also yields only `cap`
///   bytes per `fill_buf`,
///     to exercise markers that straddle chunk boundaries.
fn filter_chunked(input: &str, cap: usize, config: FilterConfig) -> String {
    let src = BufReader::with_capacity(cap, Cursor::new(input.to_string()));
    let mut sut = Sut::with_config(src, config);

    let mut out = Vec::new();
    let mut byte = [0u8; 1];

    loop {
        match sut.read(&mut byte).expect("filtering failed") {
            0 => break,
            _ => out.push(byte[0]),
        }
    }

    String::from_utf8(out).expect("invalid UTF-8 from filter")
}

#[test]
fn extracts_payload_between_markers() {
    let input = "parsing...\nfoo.ow AST vvv\n<Root/>\nAST ^^^ trailing";

    assert_eq!(filter_str(input, Default::default()), "<Root/>");
}

#[test]
fn end_marker_with_log_prefix_cuts_at_preceding_newline() {
    let input = "x AST vvv\n<a>\n</a>\n[debug] AST ^^^\nmore log\n";

    assert_eq!(filter_str(input, Default::default()), "<a>\n</a>");
}

// The closest newline wins,
//   not the first one within the window.
#[test]
fn cuts_at_last_newline_within_lookback() {
    let input = "AST vvv\n<R>\n<a/>\n</R>\nAST ^^^";

    assert_eq!(filter_str(input, Default::default()), "<R>\n<a/>\n</R>");
}

#[test]
fn cuts_at_marker_without_newline_in_lookback() {
    let input = "AST vvv\n<a/>\n0123456789AST ^^^";

    assert_eq!(
        filter_str(input, FilterConfig::with_lookback(4)),
        "<a/>\n0123456789",
    );
}

#[test]
fn zero_lookback_cuts_at_marker() {
    let input = "AST vvv\n<a/>\nAST ^^^";

    assert_eq!(filter_str(input, FilterConfig::with_lookback(0)), "<a/>\n");
}

#[test]
fn start_marker_must_end_line() {
    let input = "AST vvv but not yet\n<no/>\nlog AST vvv\n<yes/>\nAST ^^^";

    assert_eq!(filter_str(input, Default::default()), "<yes/>");
}

#[test]
fn start_marker_line_may_end_in_crlf() {
    let input = "AST vvv\r\n<a/>\r\nAST ^^^\r\n";

    assert_eq!(filter_str(input, Default::default()), "<a/>\r");
}

#[test]
fn missing_end_marker_serves_remaining_input() {
    let input = "AST vvv\n<a>\n</a>\n";

    assert_eq!(filter_str(input, Default::default()), "<a>\n</a>\n");
}

#[test]
fn chunking_does_not_affect_output() {
    let input = "log\nAST vvv\n<Root>\n  <child>text</child>\n</Root>\n\
                 [12:00:00] AST ^^^\nafter\n";
    let expected = filter_str(input, Default::default());

    assert_eq!(expected, "<Root>\n  <child>text</child>\n</Root>");

    for cap in [1, 2, 3, 5, 7, 64] {
        assert_eq!(
            filter_chunked(input, cap, Default::default()),
            expected,
            "chunk capacity {cap}",
        );
    }
}

#[test]
fn marker_straddling_chunks_is_found() {
    let input = "AST vvv\n<a/>AST ^^^<b/>";

    assert_eq!(
        filter_chunked(input, 3, FilterConfig::with_lookback(0)),
        "<a/>"
    );
}

#[test]
fn missing_start_marker_is_an_error() {
    let mut sut = Sut::new("no markers\nat all\n".as_bytes());

    match sut.seek() {
        Err(Error::MissingStartMarker(marker)) => {
            assert_eq!(marker, START_MARKER)
        }
        other => panic!("expected MissingStartMarker, got {other:?}"),
    }
}

#[test]
fn missing_start_marker_on_read_is_recoverable_from_io_error() {
    let mut sut = Sut::new("no markers\n".as_bytes());
    let mut out = Vec::new();

    let err = sut.read_to_end(&mut out).expect_err("expected failure");

    assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    assert!(matches!(
        Error::from_filter_io(err),
        Error::MissingStartMarker(_)
    ));
}

#[test]
fn empty_input_is_missing_start_marker() {
    let mut sut = Sut::new("".as_bytes());

    assert!(matches!(sut.seek(), Err(Error::MissingStartMarker(_))));
}

#[test]
fn state_transitions() {
    let mut sut = Sut::new("AST vvv\n<a/>\nAST ^^^\n".as_bytes());
    assert_eq!(sut.state(), FilterState::Seeking);

    sut.seek().expect("seek failed");
    assert_eq!(sut.state(), FilterState::Streaming);

    let mut out = String::new();
    sut.read_to_string(&mut out).expect("read failed");
    assert_eq!(out, "<a/>");
    assert_eq!(sut.state(), FilterState::Closed);

    // Closed stays closed.
    let mut buf = [0u8; 8];
    assert_eq!(sut.read(&mut buf).unwrap(), 0);
    assert_eq!(sut.read(&mut buf).unwrap(), 0);
}

#[test]
fn close_forces_eof() {
    let mut sut = Sut::new("AST vvv\n<a>lots of payload</a>\n".as_bytes());
    sut.seek().expect("seek failed");

    sut.close();
    assert_eq!(sut.state(), FilterState::Closed);

    let mut out = Vec::new();
    assert_eq!(sut.read_to_end(&mut out).unwrap(), 0);

    // Closing again is harmless.
    sut.close();
    assert_eq!(sut.state(), FilterState::Closed);
}

#[test]
fn custom_markers() {
    let config = FilterConfig {
        start_marker: "BEGIN".into(),
        end_marker: "END".into(),
        lookback: 80,
    };

    let input = "noise\n== BEGIN\n<x/>\n== END\n";

    assert_eq!(filter_str(input, config), "<x/>");
}
