//! Portable lane backend.
//!
//! Emulates the 128-bit register operations with `[u8; 16]` arrays so the
//! range algorithm runs (and is testable) on every target. The stages map
//! one to one onto the NEON and SSSE3 backends.

use super::tables::{first_len, first_range, range_adjust, range_bounds};
use super::{VectorPass, BLOCK_SIZE, LANES};

type Lanes = [u8; LANES];

/// State carried from one 16-byte vector to the next.
#[derive(Clone, Copy, Default)]
struct Carry {
    prev_input: Lanes,
    prev_first_len: Lanes,
}

/// Concatenate the last `n` lanes of `prev` with the first `16 - n` lanes of
/// `cur` (the `vextq_u8` / `_mm_alignr_epi8` shape).
#[inline(always)]
fn shift_in(prev: &Lanes, cur: &Lanes, n: usize) -> Lanes {
    let mut out = [0u8; LANES];
    for (i, lane) in out.iter_mut().enumerate() {
        *lane = if i < n { prev[LANES - n + i] } else { cur[i - n] };
    }
    out
}

#[inline(always)]
fn classify(input: &Lanes) -> (Lanes, Lanes) {
    let mut len = [0u8; LANES];
    let mut range = [0u8; LANES];
    for i in 0..LANES {
        len[i] = first_len(input[i]);
        range[i] = first_range(input[i]);
    }
    (len, range)
}

#[inline(always)]
fn propagate(range: &mut Lanes, len: &Lanes, prev_len: &Lanes) {
    let len1 = shift_in(prev_len, len, 1);
    let len2 = shift_in(prev_len, len, 2);
    let len3 = shift_in(prev_len, len, 3);
    for i in 0..LANES {
        range[i] |= len1[i] | len2[i].saturating_sub(1) | len3[i].saturating_sub(2);
    }
}

#[inline(always)]
fn adjust(range: &mut Lanes, input: &Lanes, prev_input: &Lanes) {
    let prev1 = shift_in(prev_input, input, 1);
    for i in 0..LANES {
        range[i] = range[i].wrapping_add(range_adjust(prev1[i]));
    }
}

#[inline(always)]
fn check_bounds(input: &Lanes, range: &Lanes) -> u8 {
    let mut error = 0u8;
    for i in 0..LANES {
        let (min, max) = range_bounds(range[i]);
        error |= (input[i] < min) as u8 | (input[i] > max) as u8;
    }
    error
}

/// Run stages 2-5 on one 16-byte vector, returning its lead-length lanes.
#[inline(always)]
fn check_lanes(input: &Lanes, carry: &Carry, error: &mut u8) -> Lanes {
    let (len, mut range) = classify(input);
    propagate(&mut range, &len, &carry.prev_first_len);
    adjust(&mut range, input, &carry.prev_input);
    *error |= check_bounds(input, &range);
    len
}

/// Validate every whole 32-byte block of `input`.
pub(crate) fn validate_blocks(input: &[u8]) -> VectorPass {
    let mut carry = Carry::default();
    let mut error = 0u8;

    let mut blocks = input.chunks_exact(BLOCK_SIZE);
    for block in &mut blocks {
        let mut input_a = [0u8; LANES];
        let mut input_b = [0u8; LANES];
        input_a.copy_from_slice(&block[..LANES]);
        input_b.copy_from_slice(&block[LANES..]);

        let len_a = check_lanes(&input_a, &carry, &mut error);
        carry = Carry {
            prev_input: input_a,
            prev_first_len: len_a,
        };
        let len_b = check_lanes(&input_b, &carry, &mut error);
        carry = Carry {
            prev_input: input_b,
            prev_first_len: len_b,
        };
    }

    let mut tail = [0u8; 4];
    tail.copy_from_slice(&carry.prev_input[LANES - 4..]);

    VectorPass {
        consumed: input.len() - blocks.remainder().len(),
        error: error != 0,
        tail,
    }
}
