//! Slim Teddy: 16 positions per iteration, 8 buckets, SSSE3 `pshufb`

#![allow(unsafe_code)]
#![allow(clippy::multiple_unsafe_ops_per_block)]

use super::masks::MAX_MASKS;
use super::{Match, Teddy};
use crate::cpu::CpuFeatures;
use std::arch::x86_64::{
    __m128i, _mm_and_si128, _mm_cmpeq_epi8, _mm_loadu_si128, _mm_movemask_epi8, _mm_set1_epi8,
    _mm_setzero_si128, _mm_shuffle_epi8, _mm_srli_epi16, _mm_storeu_si128,
};

const LANES: usize = 16;

pub(super) fn find(teddy: &Teddy, haystack: &[u8], start: usize) -> Option<Match> {
    if !CpuFeatures::detect().ssse3 {
        return teddy.find_scalar(haystack, start);
    }
    // SAFETY: the CPU reports SSSE3.
    unsafe { find_ssse3(teddy, haystack, start) }
}

#[target_feature(enable = "ssse3")]
unsafe fn find_ssse3(teddy: &Teddy, haystack: &[u8], start: usize) -> Option<Match> {
    let masks = &teddy.masks;
    let count = masks.count;
    let ptr = haystack.as_ptr();
    let mut pos = start;

    // SAFETY: the table loads read 16 of the 32 bytes of each table. Chunk `k`
    // reads `ptr + pos + k .. ptr + pos + k + 16` with `k < count`, and the
    // loop keeps `pos + count - 1 + 16 <= haystack.len()`.
    unsafe {
        let nibble = _mm_set1_epi8(0x0f);
        let zero = _mm_setzero_si128();
        let mut lo = [zero; MAX_MASKS];
        let mut hi = [zero; MAX_MASKS];
        for ((l, h), (table_lo, table_hi)) in lo
            .iter_mut()
            .zip(hi.iter_mut())
            .zip(masks.lo.iter().zip(masks.hi.iter()))
            .take(count)
        {
            *l = _mm_loadu_si128(table_lo.as_ptr().cast::<__m128i>());
            *h = _mm_loadu_si128(table_hi.as_ptr().cast::<__m128i>());
        }

        while pos + count - 1 + LANES <= haystack.len() {
            let mut res = _mm_set1_epi8(-1);
            for (k, (l, h)) in lo.iter().zip(hi.iter()).take(count).enumerate() {
                let chunk = _mm_loadu_si128(ptr.add(pos + k).cast::<__m128i>());
                let chunk_lo = _mm_and_si128(chunk, nibble);
                let chunk_hi = _mm_and_si128(_mm_srli_epi16(chunk, 4), nibble);
                let hit = _mm_and_si128(
                    _mm_shuffle_epi8(*l, chunk_lo),
                    _mm_shuffle_epi8(*h, chunk_hi),
                );
                res = _mm_and_si128(res, hit);
            }

            let empty = _mm_movemask_epi8(_mm_cmpeq_epi8(res, zero)) as u32;
            let mut live = !empty & 0xffff;
            if live != 0 {
                let mut lanes = [0u8; LANES];
                _mm_storeu_si128(lanes.as_mut_ptr().cast::<__m128i>(), res);
                while live != 0 {
                    let j = live.trailing_zeros() as usize;
                    live &= live - 1;
                    let bits = u16::from(lanes.get(j).copied().unwrap_or(0));
                    if let Some(m) = teddy.verify(haystack, pos + j, bits) {
                        return Some(m);
                    }
                }
            }
            pos += LANES;
        }
    }

    teddy.find_scalar(haystack, pos)
}
