//! Property-based testing for the range validator.
//!
//! Every available backend must agree with the scalar state machine and
//! with `core::str::from_utf8` on arbitrary input.

use proptest::prelude::*;
use utf8_range::{utf8_naive, utf8_range, validate_utf8, validate_utf8_naive, validate_with, Backend};

fn backends() -> Vec<Backend> {
    Backend::ALL
        .into_iter()
        .filter(|b| b.is_available())
        .collect()
}

/// Assert every implementation returns `expected` for `input`.
fn check_all(input: &[u8], expected: bool) -> Result<(), TestCaseError> {
    prop_assert_eq!(validate_utf8_naive(input).is_ok(), expected);
    prop_assert_eq!(validate_utf8(input).is_ok(), expected);
    for backend in backends() {
        prop_assert_eq!(
            validate_with(backend, input).is_ok(),
            expected,
            "{} on {:02X?}",
            backend,
            input
        );
    }
    Ok(())
}

// =============================================================================
// GENERATORS
// =============================================================================

/// Fragments that are well-formed on their own, plus every kind of bad
/// fragment. Concatenations hit block boundaries at every alignment.
const FRAGMENTS: &[&[u8]] = &[
    b"a",
    b"hello world ",
    b"\n",
    "\u{e9}".as_bytes(),
    "\u{7ff}".as_bytes(),
    "\u{800}".as_bytes(),
    "\u{20ac}".as_bytes(),
    "\u{d7ff}".as_bytes(),
    "\u{e000}".as_bytes(),
    "\u{ffff}".as_bytes(),
    "\u{10000}".as_bytes(),
    "\u{1f389}".as_bytes(),
    "\u{10ffff}".as_bytes(),
    &[0x80],
    &[0xBF],
    &[0xC0, 0x80],
    &[0xC1, 0xBF],
    &[0xC2],
    &[0xE0, 0x9F, 0x80],
    &[0xE0, 0xA0],
    &[0xED, 0xA0, 0x80],
    &[0xF0, 0x8F, 0xBF, 0xBF],
    &[0xF0, 0x90, 0x80],
    &[0xF4, 0x90, 0x80, 0x80],
    &[0xF5, 0x80, 0x80, 0x80],
    &[0xFF],
];

fn fragment_soup() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..80)
        .prop_map(|parts| parts.concat())
}

fn valid_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..200).prop_map(|chars| chars.into_iter().collect())
}

// =============================================================================
// DIFFERENTIAL PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_random_bytes_match_std(input in prop::collection::vec(any::<u8>(), 0..300)) {
        let expected = core::str::from_utf8(&input).is_ok();
        check_all(&input, expected)?;
        prop_assert_eq!(utf8_range(&input), utf8_naive(&input));
    }

    #[test]
    fn prop_fragment_soup_matches_std(input in fragment_soup()) {
        let expected = core::str::from_utf8(&input).is_ok();
        check_all(&input, expected)?;
    }

    #[test]
    fn prop_valid_strings_accepted(text in valid_text()) {
        check_all(text.as_bytes(), true)?;
    }

    #[test]
    fn prop_ascii_accepted(input in prop::collection::vec(0u8..0x80, 0..300)) {
        check_all(&input, true)?;
    }
}

// =============================================================================
// STRUCTURAL PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_concatenation_of_valid_is_valid(a in valid_text(), b in valid_text()) {
        let joined = [a.as_bytes(), b.as_bytes()].concat();
        check_all(&joined, true)?;
    }

    #[test]
    fn prop_truncated_final_char_rejected(
        text in valid_text(),
        last in any::<char>().prop_filter("multi-byte", |c| c.len_utf8() > 1),
        cut in 1usize..4,
    ) {
        let mut bytes = text.into_bytes();
        let mut buf = [0u8; 4];
        let encoded = last.encode_utf8(&mut buf).as_bytes();
        let keep = cut.min(encoded.len() - 1);
        bytes.extend_from_slice(&encoded[..keep]);
        check_all(&bytes, false)?;
    }

    #[test]
    fn prop_lone_continuation_rejected(
        text in valid_text(),
        at in any::<prop::sample::Index>(),
        cont in 0x80u8..0xC0,
    ) {
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let pos = boundaries[at.index(boundaries.len())];
        let mut bytes = text.into_bytes();
        bytes.insert(pos, cont);
        check_all(&bytes, false)?;
    }

    #[test]
    fn prop_invalid_byte_rejected(
        text in valid_text().prop_filter("non-empty", |t| !t.is_empty()),
        at in any::<prop::sample::Index>(),
        bad in prop::sample::select(vec![0xC0u8, 0xC1, 0xF5, 0xF8, 0xFE, 0xFF]),
    ) {
        let mut bytes = text.into_bytes();
        let pos = at.index(bytes.len());
        bytes[pos] = bad;
        check_all(&bytes, false)?;
    }

    #[test]
    fn prop_multibyte_straddles_any_alignment(
        prefix_len in 0usize..100,
        ch in any::<char>(),
        suffix_len in 0usize..40,
    ) {
        let mut bytes = vec![b'x'; prefix_len];
        let mut buf = [0u8; 4];
        bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        bytes.extend(std::iter::repeat(b'y').take(suffix_len));
        check_all(&bytes, true)?;
    }
}
