//! Classification tables for range-based UTF-8 validation.
//!
//! Every byte of the input is assigned a *range class*, and every class maps
//! to one legal `[min, max]` interval of byte values:
//!
//! | Class | Assigned to                          | Min    | Max    |
//! |-------|--------------------------------------|--------|--------|
//! | 0     | bytes outside any sequence (ASCII)   | `0x00` | `0x7F` |
//! | 1-3   | 1st/2nd/3rd continuation byte        | `0x80` | `0xBF` |
//! | 4     | 1st continuation after `E0`          | `0xA0` | `0xBF` |
//! | 5     | 1st continuation after `ED`          | `0x80` | `0x9F` |
//! | 6     | 1st continuation after `F0`          | `0x90` | `0xBF` |
//! | 7     | 1st continuation after `F4`          | `0x80` | `0x8F` |
//! | 8     | lead byte                            | `0xC2` | `0xF4` |
//! | 9-15  | overlapping claims (always invalid)  | `0xFF` | `0x00` |
//!
//! The tables are laid out as 16-byte rows so they can be loaded directly
//! into a 128-bit register and used as shuffle lookup tables.

/// Class assigned to every byte whose high nibble is `0xC`-`0xF`.
pub const LEAD_CLASS: u8 = 8;

/// Base of the key space of [`RANGE_ADJUST_TABLE`].
pub const ADJUST_BASE: u8 = 0xE0;

/// High nibble -> number of continuation bytes the byte announces.
pub static FIRST_LEN_TABLE: [u8; 16] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 0x0-0x7: ASCII
    0, 0, 0, 0, // 0x8-0xB: continuation bytes
    1, 1, // 0xC-0xD: 2-byte lead
    2, // 0xE: 3-byte lead
    3, // 0xF: 4-byte lead
];

/// High nibble -> initial range class.
pub static FIRST_RANGE_TABLE: [u8; 16] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 0x0-0x7
    0, 0, 0, 0, // 0x8-0xB
    LEAD_CLASS, LEAD_CLASS, LEAD_CLASS, LEAD_CLASS, // 0xC-0xF
];

/// Range class -> minimum legal byte value.
#[rustfmt::skip]
pub static RANGE_MIN_TABLE: [u8; 16] = [
    0x00, 0x80, 0x80, 0x80, 0xA0, 0x80, 0x90, 0x80,
    0xC2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Range class -> maximum legal byte value.
#[rustfmt::skip]
pub static RANGE_MAX_TABLE: [u8; 16] = [
    0x7F, 0xBF, 0xBF, 0xBF, 0xBF, 0x9F, 0xBF, 0x8F,
    0xF4, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// `prev_byte - 0xE0` -> delta added to the range class of the next byte.
///
/// Only four lead bytes have a non-zero delta:
/// - `E0` (key 0): class 2 -> 4, second byte `A0..=BF`
/// - `ED` (key 13): class 2 -> 5, second byte `80..=9F`
/// - `F0` (key 16): class 3 -> 6, second byte `90..=BF`
/// - `F4` (key 20): class 3 -> 7, second byte `80..=8F`
///
/// Keys past the end of the table (every byte below `E0` wraps to 32 or
/// more) contribute no delta.
#[rustfmt::skip]
pub static RANGE_ADJUST_TABLE: [u8; 32] = [
    2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, // E0-EF
    3, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // F0-FF
];

/// Number of continuation bytes announced by `byte` (0 for ASCII and
/// continuation bytes).
#[inline(always)]
pub fn first_len(byte: u8) -> u8 {
    FIRST_LEN_TABLE[(byte >> 4) as usize]
}

/// Initial range class of `byte`, before propagation.
#[inline(always)]
pub fn first_range(byte: u8) -> u8 {
    FIRST_RANGE_TABLE[(byte >> 4) as usize]
}

/// Class delta for the byte that follows `prev`.
#[inline(always)]
pub fn range_adjust(prev: u8) -> u8 {
    let key = prev.wrapping_sub(ADJUST_BASE) as usize;
    RANGE_ADJUST_TABLE.get(key).copied().unwrap_or(0)
}

/// Legal `(min, max)` interval for a range class.
#[inline(always)]
pub fn range_bounds(class: u8) -> (u8, u8) {
    let class = (class & 0x0F) as usize;
    (RANGE_MIN_TABLE[class], RANGE_MAX_TABLE[class])
}

/// Returns true if `byte` is a continuation byte (`0x80..=0xBF`).
#[inline(always)]
pub fn is_continuation(byte: u8) -> bool {
    (byte & 0xC0) == 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_len_matches_lead_shape() {
        for byte in 0u8..=0xFF {
            let expected = match byte {
                0xC0..=0xDF => 1,
                0xE0..=0xEF => 2,
                0xF0..=0xFF => 3,
                _ => 0,
            };
            assert_eq!(first_len(byte), expected, "byte 0x{:02X}", byte);
        }
    }

    #[test]
    fn first_range_marks_leads() {
        assert_eq!(first_range(0x41), 0);
        assert_eq!(first_range(0x80), 0);
        assert_eq!(first_range(0xBF), 0);
        assert_eq!(first_range(0xC2), LEAD_CLASS);
        assert_eq!(first_range(0xFF), LEAD_CLASS);
    }

    #[test]
    fn adjust_only_special_leads() {
        for byte in 0u8..=0xFF {
            let expected = match byte {
                0xE0 => 2,
                0xED => 3,
                0xF0 => 3,
                0xF4 => 4,
                _ => 0,
            };
            assert_eq!(range_adjust(byte), expected, "byte 0x{:02X}", byte);
        }
    }

    #[test]
    fn adjusted_classes_select_restricted_ranges() {
        // first continuation after E0/ED is class 2, after F0/F4 class 3
        assert_eq!(range_bounds(2 + range_adjust(0xE0)), (0xA0, 0xBF));
        assert_eq!(range_bounds(2 + range_adjust(0xED)), (0x80, 0x9F));
        assert_eq!(range_bounds(3 + range_adjust(0xF0)), (0x90, 0xBF));
        assert_eq!(range_bounds(3 + range_adjust(0xF4)), (0x80, 0x8F));
    }

    #[test]
    fn largest_class_fits_table() {
        // a lead byte that is also claimed as a 1st continuation after F4
        let worst = (LEAD_CLASS | 3) + 4;
        assert!(worst < 16);
    }

    #[test]
    fn impossible_classes_reject_everything() {
        for class in 9..16u8 {
            let (min, max) = range_bounds(class);
            assert!(min > max, "class {} must be unsatisfiable", class);
        }
    }

    #[test]
    fn continuation_bytes() {
        assert!(is_continuation(0x80));
        assert!(is_continuation(0xBF));
        assert!(!is_continuation(0x7F));
        assert!(!is_continuation(0xC0));
    }
}
