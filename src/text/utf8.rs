//! Scalar UTF-8 validation.
//!
//! Two validators live here:
//!
//! - [`validate_utf8_naive`]: a byte-at-a-time state machine that only
//!   answers valid / invalid. It is the reference the range validator is
//!   tested against, and the fallback it uses for short inputs and the
//!   bytes after the last whole block.
//! - [`validate_utf8`]: the diagnostic entry point. It runs the range
//!   validator first and, only when that fails, re-scans with
//!   [`validate_utf8_scalar`] to report where and why.
//!
//! ## UTF-8 Encoding Rules
//!
//! | Bytes | First byte    | Second byte             | Code point range     |
//! |-------|---------------|-------------------------|----------------------|
//! | 1     | `00`-`7F`     | -                       | U+0000 - U+007F      |
//! | 2     | `C2`-`DF`     | `80`-`BF`               | U+0080 - U+07FF      |
//! | 3     | `E0`          | `A0`-`BF`               | U+0800 - U+0FFF      |
//! | 3     | `E1`-`EC`     | `80`-`BF`               | U+1000 - U+CFFF      |
//! | 3     | `ED`          | `80`-`9F`               | U+D000 - U+D7FF      |
//! | 3     | `EE`-`EF`     | `80`-`BF`               | U+E000 - U+FFFF      |
//! | 4     | `F0`          | `90`-`BF`               | U+10000 - U+3FFFF    |
//! | 4     | `F1`-`F3`     | `80`-`BF`               | U+40000 - U+FFFFF    |
//! | 4     | `F4`          | `80`-`8F`               | U+100000 - U+10FFFF  |
//!
//! Every byte after the second is `80`-`BF`.

use crate::text::range::{validate_utf8_range, INVALID, VALID};

/// Input is not well-formed UTF-8.
///
/// Returned by the fast validators, which do not track positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidUtf8;

impl core::fmt::Display for InvalidUtf8 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("invalid UTF-8 encoding")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidUtf8 {}

/// Error information for UTF-8 validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utf8Error {
    /// The byte offset where the error occurred (0-indexed).
    pub offset: usize,
    /// The line number where the error occurred (1-indexed).
    pub line: usize,
    /// The column (byte position within the line, 1-indexed).
    pub column: usize,
    /// The kind of UTF-8 error.
    pub kind: Utf8ErrorKind,
}

impl Utf8Error {
    /// Build an error at `offset`, deriving line and column from `input`.
    fn at(input: &[u8], offset: usize, kind: Utf8ErrorKind) -> Self {
        let before = &input[..offset];
        let line = 1 + before.iter().filter(|&&b| b == b'\n').count();
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        Self {
            offset,
            line,
            column: offset - line_start + 1,
            kind,
        }
    }
}

impl core::fmt::Display for Utf8Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} at byte {}, line {}, column {}",
            self.kind, self.offset, self.line, self.column
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Utf8Error {}

impl From<Utf8Error> for InvalidUtf8 {
    fn from(_: Utf8Error) -> Self {
        InvalidUtf8
    }
}

/// The specific type of UTF-8 validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Utf8ErrorKind {
    /// A byte in the range 0x80-0xBF, or 0xF8-0xFF, appeared where a lead
    /// byte was expected.
    InvalidLeadByte,

    /// A byte outside the range 0x80-0xBF appeared where a continuation byte was expected.
    InvalidContinuationByte,

    /// A character was encoded using more bytes than necessary.
    /// For example, encoding ASCII 'A' (U+0041) as `C1 81` instead of `41`.
    OverlongEncoding,

    /// A surrogate code point (U+D800-U+DFFF) was encoded.
    SurrogateCodepoint,

    /// A code point above U+10FFFF was encoded.
    OutOfRangeCodepoint,

    /// A multi-byte sequence was truncated at the end of input.
    TruncatedSequence,
}

impl core::fmt::Display for Utf8ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLeadByte => write!(f, "invalid UTF-8 lead byte"),
            Self::InvalidContinuationByte => write!(f, "invalid UTF-8 continuation byte"),
            Self::OverlongEncoding => write!(f, "overlong UTF-8 encoding"),
            Self::SurrogateCodepoint => write!(f, "surrogate code point in UTF-8"),
            Self::OutOfRangeCodepoint => write!(f, "code point above U+10FFFF"),
            Self::TruncatedSequence => write!(f, "truncated UTF-8 sequence"),
        }
    }
}

// ============================================================================
// Reference state machine
// ============================================================================

/// State of the reference validator between two bytes.
///
/// `min`/`max` restrict the byte right after the lead (`E0`, `ED`, `F0`,
/// `F4`); every later continuation byte is `80..=BF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarState {
    /// Between sequences.
    ExpectLead,
    /// After a 2-byte lead.
    ExpectCont1Of1,
    /// After a 3-byte lead.
    ExpectCont1Of2 { min: u8, max: u8 },
    /// One continuation of a 3-byte sequence left.
    ExpectCont2Of2,
    /// After a 4-byte lead.
    ExpectCont1Of3 { min: u8, max: u8 },
    /// Two continuations of a 4-byte sequence left.
    ExpectCont2Of3,
    /// One continuation of a 4-byte sequence left.
    ExpectCont3Of3,
    /// Absorbing.
    Error,
}

impl ScalarState {
    /// Consume one byte.
    #[inline]
    pub fn step(self, byte: u8) -> Self {
        use ScalarState::*;

        match self {
            ExpectLead => match byte {
                0x00..=0x7F => ExpectLead,
                0xC2..=0xDF => ExpectCont1Of1,
                0xE0 => ExpectCont1Of2 { min: 0xA0, max: 0xBF },
                0xED => ExpectCont1Of2 { min: 0x80, max: 0x9F },
                0xE1..=0xEF => ExpectCont1Of2 { min: 0x80, max: 0xBF },
                0xF0 => ExpectCont1Of3 { min: 0x90, max: 0xBF },
                0xF4 => ExpectCont1Of3 { min: 0x80, max: 0x8F },
                0xF1..=0xF3 => ExpectCont1Of3 { min: 0x80, max: 0xBF },
                _ => Error,
            },
            ExpectCont1Of2 { min, max } if (min..=max).contains(&byte) => ExpectCont2Of2,
            ExpectCont1Of3 { min, max } if (min..=max).contains(&byte) => ExpectCont2Of3,
            ExpectCont1Of1 | ExpectCont2Of2 | ExpectCont3Of3 if is_continuation_byte(byte) => {
                ExpectLead
            }
            ExpectCont2Of3 if is_continuation_byte(byte) => ExpectCont3Of3,
            _ => Error,
        }
    }

    /// Whether input may end in this state.
    #[inline]
    pub fn is_accepting(self) -> bool {
        self == ScalarState::ExpectLead
    }
}

impl Default for ScalarState {
    fn default() -> Self {
        ScalarState::ExpectLead
    }
}

/// Validate `input` one byte at a time.
///
/// Returns as soon as the machine enters [`ScalarState::Error`]. Input that
/// ends inside a sequence is invalid.
///
/// # Examples
///
/// ```
/// use utf8_range::text::utf8::validate_utf8_naive;
///
/// assert!(validate_utf8_naive("h\u{e9}llo".as_bytes()).is_ok());
/// assert!(validate_utf8_naive(&[0xE2, 0x82]).is_err());
/// ```
pub fn validate_utf8_naive(input: &[u8]) -> Result<(), InvalidUtf8> {
    let mut state = ScalarState::ExpectLead;
    for &byte in input {
        state = state.step(byte);
        if state == ScalarState::Error {
            return Err(InvalidUtf8);
        }
    }

    if state.is_accepting() {
        Ok(())
    } else {
        Err(InvalidUtf8)
    }
}

/// Reference validator with a status code: 0 for valid, -1 for invalid.
#[inline]
pub fn utf8_naive(input: &[u8]) -> i32 {
    match validate_utf8_naive(input) {
        Ok(()) => VALID,
        Err(_) => INVALID,
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Validate that the input is valid UTF-8.
///
/// Returns `Ok(())` if the input is valid UTF-8, or an `Err(Utf8Error)` with
/// detailed information about the first validation error.
///
/// Valid input only ever goes through the range validator; the slower
/// diagnostic scan runs only once the input is known to be bad.
///
/// # Examples
///
/// ```
/// use utf8_range::text::utf8::{validate_utf8, Utf8ErrorKind};
///
/// assert!(validate_utf8(b"Hello, world!").is_ok());
/// assert!(validate_utf8("\u{65e5}\u{672c}\u{8a9e}".as_bytes()).is_ok());
///
/// let err = validate_utf8(b"ok\n\xED\xA0\x80").unwrap_err();
/// assert_eq!(err.kind, Utf8ErrorKind::SurrogateCodepoint);
/// assert_eq!((err.offset, err.line, err.column), (3, 2, 1));
/// ```
pub fn validate_utf8(input: &[u8]) -> Result<(), Utf8Error> {
    match validate_utf8_range(input) {
        Ok(()) => Ok(()),
        Err(_) => {
            log::debug!(
                "range validation rejected {} bytes, locating first error",
                input.len()
            );
            validate_utf8_scalar(input)
        }
    }
}

/// Validate UTF-8 byte by byte, reporting the first error.
///
/// Reports the exact byte offset, line number and column of the error, and
/// which rule it breaks.
pub fn validate_utf8_scalar(input: &[u8]) -> Result<(), Utf8Error> {
    let len = input.len();
    let mut pos = 0;

    while pos < len {
        let lead = input[pos];
        let seq_len = sequence_length(lead);

        if seq_len == 1 {
            pos += 1;
            continue;
        }
        if seq_len == 0 {
            return Err(Utf8Error::at(input, pos, Utf8ErrorKind::InvalidLeadByte));
        }

        for i in 1..seq_len {
            match input.get(pos + i) {
                None => {
                    return Err(Utf8Error::at(input, pos, Utf8ErrorKind::TruncatedSequence));
                }
                Some(&b) if !is_continuation_byte(b) => {
                    return Err(Utf8Error::at(
                        input,
                        pos + i,
                        Utf8ErrorKind::InvalidContinuationByte,
                    ));
                }
                Some(_) => {}
            }
        }

        // continuations are well-formed; only the lead and second byte can
        // still place the code point out of bounds
        let second = input[pos + 1];
        let violation = match (lead, second) {
            (0xC0..=0xC1, _) => Some(Utf8ErrorKind::OverlongEncoding),
            (0xE0, 0x80..=0x9F) => Some(Utf8ErrorKind::OverlongEncoding),
            (0xED, 0xA0..=0xBF) => Some(Utf8ErrorKind::SurrogateCodepoint),
            (0xF0, 0x80..=0x8F) => Some(Utf8ErrorKind::OverlongEncoding),
            (0xF4, 0x90..=0xBF) => Some(Utf8ErrorKind::OutOfRangeCodepoint),
            (0xF5..=0xF7, _) => Some(Utf8ErrorKind::OutOfRangeCodepoint),
            _ => None,
        };
        if let Some(kind) = violation {
            return Err(Utf8Error::at(input, pos, kind));
        }

        pos += seq_len;
    }

    Ok(())
}

/// Check if a byte is a valid UTF-8 continuation byte (0x80-0xBF).
#[inline(always)]
fn is_continuation_byte(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

/// Get the expected sequence length from a lead byte.
/// Returns 0 for invalid lead bytes (continuation bytes or 0xF8+).
#[inline]
pub fn sequence_length(lead_byte: u8) -> usize {
    match lead_byte {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}
