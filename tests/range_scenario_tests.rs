//! Fixed scenarios for the range validator and its scalar fallback.

use utf8_range::{
    utf8_naive, utf8_range, validate_utf8, validate_utf8_range, validate_with, Backend,
    Utf8ErrorKind, INVALID, VALID,
};

fn available() -> impl Iterator<Item = Backend> {
    Backend::ALL.into_iter().filter(|b| b.is_available())
}

fn status_everywhere(input: &[u8]) -> i32 {
    let status = utf8_range(input);
    assert_eq!(utf8_naive(input), status, "naive on {:02X?}", input);
    for backend in available() {
        let got = if validate_with(backend, input).is_ok() {
            VALID
        } else {
            INVALID
        };
        assert_eq!(got, status, "{} on {:02X?}", backend, input);
    }
    status
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_empty_is_valid() {
    assert_eq!(status_everywhere(b""), VALID);
}

#[test]
fn test_forty_ascii_bytes() {
    assert_eq!(status_everywhere(&[b'A'; 40]), VALID);
}

#[test]
fn test_smallest_three_byte_code_point() {
    assert_eq!(status_everywhere(&[0xE0, 0xA0, 0x80]), VALID);
}

#[test]
fn test_overlong_three_byte() {
    assert_eq!(status_everywhere(&[0xE0, 0x9F, 0x80]), INVALID);
}

#[test]
fn test_surrogate() {
    assert_eq!(status_everywhere(&[0xED, 0xA0, 0x80]), INVALID);
}

#[test]
fn test_above_u10ffff() {
    assert_eq!(status_everywhere(&[0xF4, 0x90, 0x80, 0x80]), INVALID);
}

#[test]
fn test_truncated_three_byte() {
    assert_eq!(status_everywhere(&[0xE2, 0x82]), INVALID);
}

// ============================================================================
// Block boundary straddling
// ============================================================================

#[test]
fn test_four_byte_at_bytes_30_to_33() {
    let mut input = vec![b'a'; 30];
    input.extend_from_slice(&[0xF0, 0x9F, 0x8E, 0x89]);
    input.extend_from_slice(&[b'b'; 30]);
    assert_eq!(input[30..34], [0xF0, 0x9F, 0x8E, 0x89]);
    assert_eq!(status_everywhere(&input), VALID);
}

#[test]
fn test_bad_second_byte_across_block_boundary() {
    for lead_at in 28..=33 {
        for seq in [
            &[0xE0, 0x9F, 0x80][..],
            &[0xED, 0xA0, 0x80][..],
            &[0xF0, 0x8F, 0x80, 0x80][..],
            &[0xF4, 0x90, 0x80, 0x80][..],
        ] {
            let mut input = vec![b'a'; 80];
            input[lead_at..lead_at + seq.len()].copy_from_slice(seq);
            assert_eq!(status_everywhere(&input), INVALID, "{:02X?} at {}", seq, lead_at);
        }
    }
}

#[test]
fn test_every_code_point_class_at_every_alignment() {
    let samples = [
        '\u{7f}', '\u{80}', '\u{7ff}', '\u{800}', '\u{fff}', '\u{1000}', '\u{d7ff}', '\u{e000}',
        '\u{ffff}', '\u{10000}', '\u{3ffff}', '\u{40000}', '\u{fffff}', '\u{100000}',
        '\u{10ffff}',
    ];
    for ch in samples {
        for prefix in 0..70 {
            let text = format!("{}{}{}", "-".repeat(prefix), ch, "+".repeat(70 - prefix));
            assert_eq!(status_everywhere(text.as_bytes()), VALID, "{:?} at {}", ch, prefix);
        }
    }
}

#[test]
fn test_input_ending_mid_sequence_after_whole_blocks() {
    let emoji = "\u{1f389}".as_bytes();
    for keep in 1..emoji.len() {
        for blocks in 1..4 {
            let mut input = vec![b'z'; blocks * 32 - keep];
            input.extend_from_slice(&emoji[..keep]);
            assert_eq!(input.len() % 32, 0);
            assert_eq!(status_everywhere(&input), INVALID);
        }
    }
}

// ============================================================================
// Diagnostics after fast-path rejection
// ============================================================================

#[test]
fn test_diagnostic_locates_error_in_large_input() {
    let mut text = "Grüße aus Zürich 🎉\n".repeat(200).into_bytes();
    let line_len = "Grüße aus Zürich 🎉\n".len();
    let at = line_len * 150 + 6;
    text[at] = 0xFF;

    assert!(validate_utf8_range(&text).is_err());
    let err = validate_utf8(&text).unwrap_err();
    assert_eq!(err.offset, at);
    assert_eq!(err.line, 151);
    assert_eq!(err.column, 7);
    assert_eq!(err.kind, Utf8ErrorKind::InvalidLeadByte);
}

#[test]
fn test_error_display_is_stable() {
    let err = validate_utf8(b"ok\xF4\x90\x80\x80").unwrap_err();
    assert_eq!(
        err.to_string(),
        "code point above U+10FFFF at byte 2, line 1, column 3"
    );
    assert_eq!(
        validate_utf8_range(b"\xC0").unwrap_err().to_string(),
        "invalid UTF-8 encoding"
    );
}
