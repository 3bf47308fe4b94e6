//! # utf8-range
//!
//! Fast UTF-8 validation using the range algorithm.
//!
//! Each byte is mapped to a *range class* with two 16-entry table lookups,
//! and each class to the legal interval of byte values at that position.
//! The checks run on 128-bit registers (SSSE3 on x86_64, NEON on aarch64,
//! or a portable lane emulation elsewhere), 32 bytes per iteration, with a
//! scalar state machine finishing the tail.
//!
//! ## Module Organization
//!
//! - [`text::range`] - Range-table validator and backend dispatch
//! - [`text::utf8`] - Scalar reference validator and error diagnostics
//!
//! ## Quick Start
//!
//! ```
//! use utf8_range::{utf8_range, validate_utf8, validate_utf8_range};
//!
//! assert!(validate_utf8_range("Hello, \u{4e16}\u{754c}!".as_bytes()).is_ok());
//! assert_eq!(utf8_range(&[0xF4, 0x90, 0x80, 0x80]), -1);
//!
//! // Locate the error when the input is bad
//! let err = validate_utf8(b"abc\xE2\x82").unwrap_err();
//! assert_eq!(err.offset, 3);
//! ```
//!
//! ## Features
//!
//! Backend selection (for benchmarking and testing):
//! - Default: NEON on aarch64, SSSE3 on x86_64 when the CPU supports it,
//!   portable lanes otherwise
//! - `portable-range` - Always use the portable lane emulation
//! - `scalar-range` - Always use the scalar state machine
//!
//! Other features:
//! - `std` - Runtime CPU feature detection and `std::error::Error` impls
//! - `cli` - Build the `utf8-range` command-line tool

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// =============================================================================
// Modules
// =============================================================================

/// UTF-8 validation.
pub mod text;

// =============================================================================
// Public re-exports
// =============================================================================

pub use text::range::{utf8_range, validate_utf8_range, validate_with, Backend, INVALID, VALID};
pub use text::utf8::{
    utf8_naive, validate_utf8, validate_utf8_naive, InvalidUtf8, Utf8Error, Utf8ErrorKind,
};
