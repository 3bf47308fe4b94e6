//! NEON lane backend for aarch64.
//!
//! Uses 128-bit NEON vectors: `tbl` for the table lookups, `ext` for the
//! cross-register shifts and saturating `uqsub` for the lead-length decay.

use core::arch::aarch64::*;

use super::tables::{
    ADJUST_BASE, FIRST_LEN_TABLE, FIRST_RANGE_TABLE, RANGE_ADJUST_TABLE, RANGE_MAX_TABLE,
    RANGE_MIN_TABLE,
};
use super::{VectorPass, BLOCK_SIZE, LANES};

struct Tables {
    first_len: uint8x16_t,
    first_range: uint8x16_t,
    range_min: uint8x16_t,
    range_max: uint8x16_t,
    range_adjust: uint8x16x2_t,
    adjust_base: uint8x16_t,
    one: uint8x16_t,
    two: uint8x16_t,
}

impl Tables {
    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn load() -> Self {
        Self {
            first_len: vld1q_u8(FIRST_LEN_TABLE.as_ptr()),
            first_range: vld1q_u8(FIRST_RANGE_TABLE.as_ptr()),
            range_min: vld1q_u8(RANGE_MIN_TABLE.as_ptr()),
            range_max: vld1q_u8(RANGE_MAX_TABLE.as_ptr()),
            range_adjust: uint8x16x2_t(
                vld1q_u8(RANGE_ADJUST_TABLE.as_ptr()),
                vld1q_u8(RANGE_ADJUST_TABLE.as_ptr().add(LANES)),
            ),
            adjust_base: vdupq_n_u8(ADJUST_BASE),
            one: vdupq_n_u8(1),
            two: vdupq_n_u8(2),
        }
    }
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn classify(input: uint8x16_t, t: &Tables) -> (uint8x16_t, uint8x16_t) {
    let high_nibbles = vshrq_n_u8::<4>(input);
    (
        vqtbl1q_u8(t.first_len, high_nibbles),
        vqtbl1q_u8(t.first_range, high_nibbles),
    )
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn propagate(
    range: uint8x16_t,
    first_len: uint8x16_t,
    prev_first_len: uint8x16_t,
    t: &Tables,
) -> uint8x16_t {
    let range = vorrq_u8(range, vextq_u8::<15>(prev_first_len, first_len));

    let tmp1 = vqsubq_u8(vextq_u8::<14>(prev_first_len, first_len), t.one);
    let range = vorrq_u8(range, tmp1);

    let tmp2 = vqsubq_u8(vextq_u8::<13>(prev_first_len, first_len), t.two);
    vorrq_u8(range, tmp2)
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn adjust(
    range: uint8x16_t,
    input: uint8x16_t,
    prev_input: uint8x16_t,
    t: &Tables,
) -> uint8x16_t {
    let shift1 = vextq_u8::<15>(prev_input, input);
    // tbl returns zero for indices >= 32
    let pos = vsubq_u8(shift1, t.adjust_base);
    vaddq_u8(range, vqtbl2q_u8(t.range_adjust, pos))
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn check_bounds(input: uint8x16_t, range: uint8x16_t, t: &Tables) -> uint8x16_t {
    let minv = vqtbl1q_u8(t.range_min, range);
    let maxv = vqtbl1q_u8(t.range_max, range);
    vorrq_u8(vcltq_u8(input, minv), vcgtq_u8(input, maxv))
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn check_lanes(
    input: uint8x16_t,
    prev_input: uint8x16_t,
    prev_first_len: uint8x16_t,
    t: &Tables,
    error: &mut uint8x16_t,
) -> uint8x16_t {
    let (first_len, range) = classify(input, t);
    let range = propagate(range, first_len, prev_first_len, t);
    let range = adjust(range, input, prev_input, t);
    *error = vorrq_u8(*error, check_bounds(input, range, t));
    first_len
}

/// Validate every whole 32-byte block of `input`.
///
/// # Safety
///
/// NEON is part of the aarch64 baseline; the function is `unsafe` only
/// because of the raw loads.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn validate_blocks(input: &[u8]) -> VectorPass {
    let t = Tables::load();

    let mut prev_input = vdupq_n_u8(0);
    let mut prev_first_len = vdupq_n_u8(0);
    let mut error = vdupq_n_u8(0);

    let mut offset = 0;
    while offset + BLOCK_SIZE <= input.len() {
        let ptr = input.as_ptr().add(offset);
        let input_a = vld1q_u8(ptr);
        let input_b = vld1q_u8(ptr.add(LANES));

        let first_len_a = check_lanes(input_a, prev_input, prev_first_len, &t, &mut error);
        let first_len_b = check_lanes(input_b, input_a, first_len_a, &t, &mut error);

        prev_input = input_b;
        prev_first_len = first_len_b;
        offset += BLOCK_SIZE;
    }

    let mut last = [0u8; LANES];
    vst1q_u8(last.as_mut_ptr(), prev_input);
    let mut tail = [0u8; 4];
    tail.copy_from_slice(&last[LANES - 4..]);

    VectorPass {
        consumed: offset,
        error: vmaxvq_u8(error) != 0,
        tail,
    }
}
