//! Range-table UTF-8 validation.
//!
//! A vectorized validator that classifies every byte into a *range class*
//! and checks it against the legal `[min, max]` interval of that class. It
//! answers only "valid or not": no offset, no violation kind. Use
//! [`validate_utf8`](crate::text::utf8::validate_utf8) when diagnostics are
//! needed.
//!
//! ## Algorithm
//!
//! The input is processed in 32-byte blocks (two 16-byte registers). For
//! each register:
//!
//! 1. **Classify**: the high nibble of each byte gives the number of
//!    continuation bytes it announces (`first_len`) and an initial range
//!    class (0, or 8 for lead bytes).
//! 2. **Propagate**: `first_len` shifted by 1, 2 and 3 lanes (saturating
//!    minus 0, 1 and 2) is OR-ed into the range class, so each continuation
//!    byte learns its distance from the lead. The shifts read the tail of the
//!    previous register, which is the only state carried between blocks.
//! 3. **Adjust**: bytes following `E0`, `ED`, `F0` and `F4` move to one of
//!    four restricted classes (overlong, surrogate and U+10FFFF guards).
//! 4. **Check**: each byte is compared with the interval of its class and
//!    violations are OR-ed into an accumulator that is only inspected after
//!    the last block.
//!
//! A lead byte whose continuations lie past the last whole block cannot be
//! judged by the vector pass. After the pass, the validator steps back over
//! up to three trailing bytes to the start of the last sequence and hands
//! that tail, plus the sub-block remainder, to the scalar state machine.
//!
//! ## Backends
//!
//! | Backend                | Availability                            |
//! |------------------------|-----------------------------------------|
//! | [`Backend::Neon`]      | aarch64                                 |
//! | [`Backend::Ssse3`]     | x86_64 CPUs with SSSE3 (runtime check)  |
//! | [`Backend::Portable`]  | everywhere (`[u8; 16]` lane emulation)  |
//! | [`Backend::Scalar`]    | everywhere (state machine only)         |
//!
//! ```
//! use utf8_range::text::range::{utf8_range, validate_utf8_range, INVALID, VALID};
//!
//! let text = "Grüße, 世界! 🎉 ".repeat(8);
//! assert!(validate_utf8_range(text.as_bytes()).is_ok());
//! assert_eq!(utf8_range(text.as_bytes()), VALID);
//!
//! // U+D800 encoded directly is a surrogate
//! assert_eq!(utf8_range(&[0xED, 0xA0, 0x80]), INVALID);
//! ```

pub mod tables;

pub(crate) mod portable;

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

use super::utf8::{validate_utf8_naive, InvalidUtf8};
use tables::is_continuation;

/// Bytes validated per iteration of the vector pass.
pub const BLOCK_SIZE: usize = 32;

/// Lanes per 128-bit register.
pub(crate) const LANES: usize = 16;

/// Status code for valid input.
pub const VALID: i32 = 0;

/// Status code for invalid input.
pub const INVALID: i32 = -1;

/// Outcome of running a lane backend over every whole block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VectorPass {
    /// Bytes covered by whole blocks.
    pub consumed: usize,
    /// Some byte fell outside the interval of its range class.
    pub error: bool,
    /// Last four raw bytes of the final block.
    pub tail: [u8; 4],
}

/// Implementation used for the vector pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backend {
    /// Scalar state machine over the whole buffer.
    Scalar,
    /// Portable lane emulation.
    Portable,
    /// x86_64 SSSE3 intrinsics.
    Ssse3,
    /// aarch64 NEON intrinsics.
    Neon,
}

impl Backend {
    /// Every backend, in order of increasing speed.
    pub const ALL: [Backend; 4] = [
        Backend::Scalar,
        Backend::Portable,
        Backend::Ssse3,
        Backend::Neon,
    ];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Portable => "portable",
            Self::Ssse3 => "ssse3",
            Self::Neon => "neon",
        }
    }

    /// Whether this backend can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Self::Scalar | Self::Portable => true,
            Self::Ssse3 => ssse3_available(),
            Self::Neon => cfg!(target_arch = "aarch64"),
        }
    }

    /// Best backend for the current CPU, honouring the `scalar-range` and
    /// `portable-range` features.
    pub fn detect() -> Self {
        if cfg!(feature = "scalar-range") {
            Self::Scalar
        } else if cfg!(feature = "portable-range") {
            Self::Portable
        } else if cfg!(target_arch = "aarch64") {
            Self::Neon
        } else if ssse3_available() {
            Self::Ssse3
        } else {
            Self::Portable
        }
    }
}

impl core::fmt::Display for Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownBackend)
    }
}

/// Error returned when parsing an unknown backend name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownBackend;

impl core::fmt::Display for UnknownBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown backend (expected scalar, portable, ssse3 or neon)")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownBackend {}

#[cfg(all(target_arch = "x86_64", feature = "std"))]
#[inline]
fn ssse3_available() -> bool {
    is_x86_feature_detected!("ssse3")
}

#[cfg(all(target_arch = "x86_64", not(feature = "std")))]
#[inline]
fn ssse3_available() -> bool {
    cfg!(target_feature = "ssse3")
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn ssse3_available() -> bool {
    false
}

/// Validate that `input` is well-formed UTF-8.
///
/// Uses the fastest backend available on the current CPU. The error carries
/// no position; see [`validate_utf8`](crate::text::utf8::validate_utf8) for
/// diagnostics.
///
/// # Examples
///
/// ```
/// use utf8_range::text::range::validate_utf8_range;
///
/// assert!(validate_utf8_range(b"").is_ok());
/// assert!(validate_utf8_range(&[b'A'; 40]).is_ok());
/// assert!(validate_utf8_range(&[0xE0, 0xA0, 0x80]).is_ok());
///
/// assert!(validate_utf8_range(&[0xE0, 0x9F, 0x80]).is_err()); // overlong
/// assert!(validate_utf8_range(&[0xF4, 0x90, 0x80, 0x80]).is_err()); // > U+10FFFF
/// assert!(validate_utf8_range(&[0xE2, 0x82]).is_err()); // truncated
/// ```
#[inline]
pub fn validate_utf8_range(input: &[u8]) -> Result<(), InvalidUtf8> {
    validate_with(Backend::detect(), input)
}

/// Validate `input`, returning [`VALID`] (0) or [`INVALID`] (-1).
#[inline]
pub fn utf8_range(input: &[u8]) -> i32 {
    match validate_utf8_range(input) {
        Ok(()) => VALID,
        Err(_) => INVALID,
    }
}

/// Validate `input` with an explicit backend.
///
/// A backend that is not available on the current CPU runs as
/// [`Backend::Portable`].
pub fn validate_with(backend: Backend, input: &[u8]) -> Result<(), InvalidUtf8> {
    if backend == Backend::Scalar || input.len() < BLOCK_SIZE {
        return validate_utf8_naive(input);
    }

    let pass = vector_pass(backend, input);
    resolve_boundary(input, pass)
}

fn vector_pass(backend: Backend, input: &[u8]) -> VectorPass {
    match backend {
        #[cfg(target_arch = "x86_64")]
        Backend::Ssse3 if ssse3_available() => {
            // SAFETY: SSSE3 support was checked above
            unsafe { sse::validate_blocks(input) }
        }
        #[cfg(target_arch = "aarch64")]
        Backend::Neon => {
            // SAFETY: NEON is mandatory on aarch64
            unsafe { neon::validate_blocks(input) }
        }
        _ => portable::validate_blocks(input),
    }
}

/// Number of trailing bytes of the vector pass to re-validate with the
/// scalar state machine.
///
/// Steps back to the last byte among the final three that is not a
/// continuation byte. A trailing sequence that is already complete (or a
/// plain ASCII byte) is simply checked twice.
#[inline]
pub(crate) fn lookahead(tail: [u8; 4]) -> usize {
    if !is_continuation(tail[3]) {
        1
    } else if !is_continuation(tail[2]) {
        2
    } else if !is_continuation(tail[1]) {
        3
    } else {
        0
    }
}

/// Turn a vector pass into the final verdict.
fn resolve_boundary(input: &[u8], pass: VectorPass) -> Result<(), InvalidUtf8> {
    if pass.error {
        return Err(InvalidUtf8);
    }

    let start = if pass.consumed == 0 {
        0
    } else {
        pass.consumed - lookahead(pass.tail)
    };
    validate_utf8_naive(&input[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> impl Iterator<Item = Backend> {
        Backend::ALL.into_iter().filter(|b| b.is_available())
    }

    fn check(input: &[u8]) -> bool {
        let expected = core::str::from_utf8(input).is_ok();
        for backend in backends() {
            assert_eq!(
                validate_with(backend, input).is_ok(),
                expected,
                "{} disagrees on {:02X?}",
                backend,
                input
            );
        }
        expected
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    mod scenarios {
        use super::*;

        #[test]
        fn empty_input() {
            assert!(check(b""));
            assert_eq!(utf8_range(b""), VALID);
        }

        #[test]
        fn ascii_40() {
            assert!(check(&[0x41; 40]));
            assert_eq!(utf8_range(&[0x41; 40]), VALID);
        }

        #[test]
        fn smallest_three_byte() {
            assert!(check(&[0xE0, 0xA0, 0x80]));
            assert!(!check(&[0xE0, 0x9F, 0x80]));
        }

        #[test]
        fn surrogate() {
            assert!(!check(&[0xED, 0xA0, 0x80]));
            assert_eq!(utf8_range(&[0xED, 0xA0, 0x80]), INVALID);
        }

        #[test]
        fn above_max_code_point() {
            assert!(!check(&[0xF4, 0x90, 0x80, 0x80]));
        }

        #[test]
        fn truncated_three_byte() {
            assert!(!check(&[0xE2, 0x82]));
        }

        #[test]
        fn same_scenarios_inside_blocks() {
            let cases: [(&[u8], bool); 5] = [
                (&[0xE0, 0xA0, 0x80], true),
                (&[0xE0, 0x9F, 0x80], false),
                (&[0xED, 0xA0, 0x80], false),
                (&[0xF4, 0x90, 0x80, 0x80], false),
                (&[0xE2, 0x82], false),
            ];
            for (seq, valid) in cases {
                for pos in [0, 13, 29, 30, 31, 32, 45, 60, 62] {
                    let mut input = vec![b'a'; 96];
                    input[pos..pos + seq.len()].copy_from_slice(seq);
                    assert_eq!(check(&input), valid, "{:02X?} at {}", seq, pos);
                }
            }
        }
    }

    // =========================================================================
    // Block boundaries
    // =========================================================================

    mod boundaries {
        use super::*;

        #[test]
        fn four_byte_straddles_block() {
            // bytes 30..34 with a 32-byte block
            let mut input = vec![b'a'; 30];
            input.extend_from_slice("\u{1F389}".as_bytes());
            input.extend_from_slice(&[b'b'; 30]);
            assert!(check(&input));
        }

        #[test]
        fn every_offset_every_length() {
            let chars = ["\u{e9}", "\u{800}", "\u{d7ff}", "\u{e000}", "\u{10000}", "\u{10ffff}"];
            for ch in chars {
                for offset in 0..(2 * BLOCK_SIZE) {
                    let mut input = vec![b'.'; offset];
                    input.extend_from_slice(ch.as_bytes());
                    for tail in [0, 1, 5, 40] {
                        let mut padded = input.clone();
                        padded.extend(core::iter::repeat(b'-').take(tail));
                        assert!(check(&padded), "{:?} at {} + {}", ch, offset, tail);
                    }
                }
            }
        }

        #[test]
        fn truncated_at_end_of_vector_pass() {
            // lead byte in the last lane of the last whole block
            let partial: [&[u8]; 3] = [&[0xC3], &[0xE2, 0x82], &[0xF0, 0x9F, 0x8E]];
            for seq in partial {
                let mut input = vec![b'a'; 64 - seq.len()];
                input.extend_from_slice(seq);
                assert_eq!(input.len(), 64);
                assert!(!check(&input), "{:02X?}", seq);
            }
        }

        #[test]
        fn sequence_completed_by_remainder() {
            for split in 1..4 {
                let emoji = "\u{1F680}".as_bytes();
                let mut input = vec![b'a'; 64 - split];
                input.extend_from_slice(emoji);
                input.extend_from_slice(b"xyz");
                assert!(check(&input), "split {}", split);
            }
        }

        #[test]
        fn stray_continuation_after_complete_block() {
            let mut input = vec![b'a'; 64];
            input.push(0x80);
            assert!(!check(&input));
        }
    }

    // =========================================================================
    // Look-ahead
    // =========================================================================

    mod lookahead_count {
        use super::*;

        #[test]
        fn ascii_tail() {
            assert_eq!(lookahead(*b"abcd"), 1);
        }

        #[test]
        fn lead_in_last_lane() {
            assert_eq!(lookahead([b'a', b'b', b'c', 0xF0]), 1);
        }

        #[test]
        fn lead_two_back() {
            assert_eq!(lookahead([b'a', b'b', 0xE2, 0x82]), 2);
        }

        #[test]
        fn lead_three_back() {
            assert_eq!(lookahead([b'a', 0xF0, 0x9F, 0x8E]), 3);
        }

        #[test]
        fn complete_four_byte() {
            assert_eq!(lookahead([0xF0, 0x9F, 0x8E, 0x89]), 0);
        }
    }

    // =========================================================================
    // Backends
    // =========================================================================

    mod backend {
        use super::*;

        #[test]
        fn portable_and_scalar_always_available() {
            assert!(Backend::Scalar.is_available());
            assert!(Backend::Portable.is_available());
        }

        #[test]
        fn detected_backend_is_available() {
            assert!(Backend::detect().is_available());
        }

        #[test]
        fn parse_names() {
            for b in Backend::ALL {
                assert_eq!(b.name().parse::<Backend>(), Ok(b));
            }
            assert_eq!("SSSE3".parse::<Backend>(), Ok(Backend::Ssse3));
            assert!("avx512".parse::<Backend>().is_err());
        }

        #[test]
        fn unavailable_backend_still_validates() {
            let text = "na\u{ef}ve caf\u{e9} ".repeat(10);
            for b in Backend::ALL {
                assert!(validate_with(b, text.as_bytes()).is_ok());
                assert!(validate_with(b, &[0xFF; 64]).is_err());
            }
        }
    }
}
