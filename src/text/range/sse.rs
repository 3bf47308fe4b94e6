//! SSSE3 lane backend for x86_64.
//!
//! Processes each 32-byte block as two 128-bit registers. `pshufb` provides
//! the 16-entry table lookups and `palignr` the cross-register shifts.
//!
//! ## Target specific intrinsics used:
//! ### SSE2
//! * _mm_add_epi8, _mm_sub_epi8
//! * _mm_adds_epu8, _mm_subs_epu8
//! * _mm_and_si128, _mm_or_si128
//! * _mm_cmpeq_epi8, _mm_movemask_epi8
//! * _mm_loadu_si128, _mm_storeu_si128
//! * _mm_set1_epi8, _mm_setzero_si128
//! * _mm_srli_epi16
//!
//! ### SSSE3
//! * _mm_alignr_epi8
//! * _mm_shuffle_epi8

use core::arch::x86_64::*;

use super::tables::{
    ADJUST_BASE, FIRST_LEN_TABLE, FIRST_RANGE_TABLE, RANGE_ADJUST_TABLE, RANGE_MAX_TABLE,
    RANGE_MIN_TABLE,
};
use super::{VectorPass, BLOCK_SIZE, LANES};

/// Lookup tables and constants, loaded once per call.
struct Tables {
    first_len: __m128i,
    first_range: __m128i,
    range_min: __m128i,
    range_max: __m128i,
    /// Adjustment deltas for keys 0..16 (`E0`-`EF`).
    adjust_lo: __m128i,
    /// Adjustment deltas for keys 16..32 (`F0`-`FF`).
    adjust_hi: __m128i,
    nibble_mask: __m128i,
    adjust_base: __m128i,
    one: __m128i,
    two: __m128i,
    sixteen: __m128i,
    /// Pushes shuffle indices >= 16 past 0x80 so `pshufb` zeroes them.
    index_guard: __m128i,
}

impl Tables {
    #[target_feature(enable = "ssse3")]
    unsafe fn load() -> Self {
        unsafe {
            Self {
                first_len: load16(&FIRST_LEN_TABLE),
                first_range: load16(&FIRST_RANGE_TABLE),
                range_min: load16(&RANGE_MIN_TABLE),
                range_max: load16(&RANGE_MAX_TABLE),
                adjust_lo: _mm_loadu_si128(RANGE_ADJUST_TABLE.as_ptr() as *const __m128i),
                adjust_hi: _mm_loadu_si128(RANGE_ADJUST_TABLE.as_ptr().add(LANES) as *const __m128i),
                nibble_mask: _mm_set1_epi8(0x0F),
                adjust_base: _mm_set1_epi8(ADJUST_BASE as i8),
                one: _mm_set1_epi8(1),
                two: _mm_set1_epi8(2),
                sixteen: _mm_set1_epi8(16),
                index_guard: _mm_set1_epi8(0x70),
            }
        }
    }
}

#[inline(always)]
unsafe fn load16(table: &[u8; 16]) -> __m128i {
    unsafe { _mm_loadu_si128(table.as_ptr() as *const __m128i) }
}

/// Stage 2: high nibble -> (lead length, initial range class).
#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn classify(input: __m128i, t: &Tables) -> (__m128i, __m128i) {
    let high_nibbles = _mm_and_si128(_mm_srli_epi16(input, 4), t.nibble_mask);
    let first_len = _mm_shuffle_epi8(t.first_len, high_nibbles);
    let range = _mm_shuffle_epi8(t.first_range, high_nibbles);
    (first_len, range)
}

/// Stage 3: OR in the lead lengths of the 1, 2 and 3 preceding bytes.
#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn propagate(
    range: __m128i,
    first_len: __m128i,
    prev_first_len: __m128i,
    t: &Tables,
) -> __m128i {
    let range = _mm_or_si128(range, _mm_alignr_epi8(first_len, prev_first_len, 15));

    let tmp1 = _mm_alignr_epi8(first_len, prev_first_len, 14);
    let range = _mm_or_si128(range, _mm_subs_epu8(tmp1, t.one));

    let tmp2 = _mm_alignr_epi8(first_len, prev_first_len, 13);
    _mm_or_si128(range, _mm_subs_epu8(tmp2, t.two))
}

/// Stage 4: steer first continuations after E0/ED/F0/F4 to their classes.
#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn adjust(range: __m128i, input: __m128i, prev_input: __m128i, t: &Tables) -> __m128i {
    let shift1 = _mm_alignr_epi8(input, prev_input, 15);
    let pos = _mm_sub_epi8(shift1, t.adjust_base);

    // pos < 16 lands on 0x70..=0x7F (low nibble = pos), everything else
    // saturates into 0x80..=0xFF and reads as zero.
    let lo_index = _mm_adds_epu8(pos, t.index_guard);
    let hi_index = _mm_adds_epu8(_mm_sub_epi8(pos, t.sixteen), t.index_guard);

    let delta = _mm_add_epi8(
        _mm_shuffle_epi8(t.adjust_lo, lo_index),
        _mm_shuffle_epi8(t.adjust_hi, hi_index),
    );
    _mm_add_epi8(range, delta)
}

/// Stage 5: non-zero lanes fell outside their class interval.
#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn check_bounds(input: __m128i, range: __m128i, t: &Tables) -> __m128i {
    let minv = _mm_shuffle_epi8(t.range_min, range);
    let maxv = _mm_shuffle_epi8(t.range_max, range);
    _mm_or_si128(_mm_subs_epu8(minv, input), _mm_subs_epu8(input, maxv))
}

#[target_feature(enable = "ssse3")]
#[inline]
unsafe fn check_lanes(
    input: __m128i,
    prev_input: __m128i,
    prev_first_len: __m128i,
    t: &Tables,
    error: &mut __m128i,
) -> __m128i {
    let (first_len, range) = classify(input, t);
    let range = propagate(range, first_len, prev_first_len, t);
    let range = adjust(range, input, prev_input, t);
    *error = _mm_or_si128(*error, check_bounds(input, range, t));
    first_len
}

/// Validate every whole 32-byte block of `input`.
///
/// # Safety
///
/// The CPU must support SSSE3 (caller should check).
#[target_feature(enable = "ssse3")]
pub(crate) unsafe fn validate_blocks(input: &[u8]) -> VectorPass {
    let t = Tables::load();

    let mut prev_input = _mm_setzero_si128();
    let mut prev_first_len = _mm_setzero_si128();
    let mut error = _mm_setzero_si128();

    let mut offset = 0;
    while offset + BLOCK_SIZE <= input.len() {
        let ptr = input.as_ptr().add(offset) as *const __m128i;
        let input_a = _mm_loadu_si128(ptr);
        let input_b = _mm_loadu_si128(ptr.add(1));

        let first_len_a = check_lanes(input_a, prev_input, prev_first_len, &t, &mut error);
        let first_len_b = check_lanes(input_b, input_a, first_len_a, &t, &mut error);

        prev_input = input_b;
        prev_first_len = first_len_b;
        offset += BLOCK_SIZE;
    }

    let zero_lanes = _mm_movemask_epi8(_mm_cmpeq_epi8(error, _mm_setzero_si128()));

    let mut last = [0u8; LANES];
    _mm_storeu_si128(last.as_mut_ptr() as *mut __m128i, prev_input);
    let mut tail = [0u8; 4];
    tail.copy_from_slice(&last[LANES - 4..]);

    VectorPass {
        consumed: offset,
        error: zero_lanes != 0xFFFF,
        tail,
    }
}
