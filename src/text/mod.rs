//! UTF-8 validation.
//!
//! - [`range`]: the vectorized range-table validator (valid / invalid only)
//! - [`utf8`]: the scalar reference state machine and the diagnostic
//!   validator that reports offset, line, column and violation kind
//!
//! ```
//! use utf8_range::text::utf8::{validate_utf8, Utf8ErrorKind};
//! use utf8_range::text::range::validate_utf8_range;
//!
//! assert!(validate_utf8_range("\u{65e5}\u{672c}\u{8a9e}".as_bytes()).is_ok());
//!
//! let err = validate_utf8(&[0x80]).unwrap_err();
//! assert_eq!(err.kind, Utf8ErrorKind::InvalidLeadByte);
//! assert_eq!(err.offset, 0);
//! ```

pub mod range;
pub mod utf8;

pub use range::{utf8_range, validate_utf8_range, validate_with, Backend};
pub use utf8::{
    utf8_naive, validate_utf8, validate_utf8_naive, InvalidUtf8, Utf8Error, Utf8ErrorKind,
};
