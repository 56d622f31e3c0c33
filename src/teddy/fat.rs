//! Fat Teddy: 16 positions per iteration, 16 buckets, AVX2
//!
//! Each 16-byte chunk is broadcast to both 128-bit lanes; the low lane is
//! shuffled through the tables for buckets 0..8, the high lane through those
//! for buckets 8..16.

#![allow(unsafe_code)]
#![allow(clippy::multiple_unsafe_ops_per_block)]

use super::masks::MAX_MASKS;
use super::{Match, Teddy};
use crate::cpu::CpuFeatures;
use std::arch::x86_64::{
    __m128i, __m256i, _mm_loadu_si128, _mm256_and_si256, _mm256_broadcastsi128_si256,
    _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_movemask_epi8, _mm256_set1_epi8,
    _mm256_setzero_si256, _mm256_shuffle_epi8, _mm256_srli_epi16, _mm256_storeu_si256,
};

const LANES: usize = 16;

pub(super) fn find(teddy: &Teddy, haystack: &[u8], start: usize) -> Option<Match> {
    if !CpuFeatures::detect().avx2 {
        return teddy.find_scalar(haystack, start);
    }
    // SAFETY: the CPU reports AVX2.
    unsafe { find_avx2(teddy, haystack, start) }
}

#[target_feature(enable = "avx2")]
unsafe fn find_avx2(teddy: &Teddy, haystack: &[u8], start: usize) -> Option<Match> {
    let masks = &teddy.masks;
    let count = masks.count;
    let ptr = haystack.as_ptr();
    let mut pos = start;

    // SAFETY: table loads read exactly the 32 bytes of each table. Chunk `k`
    // reads `ptr + pos + k .. ptr + pos + k + 16` with `k < count`, and the
    // loop keeps `pos + count - 1 + 16 <= haystack.len()`.
    unsafe {
        let nibble = _mm256_set1_epi8(0x0f);
        let zero = _mm256_setzero_si256();
        let mut lo = [zero; MAX_MASKS];
        let mut hi = [zero; MAX_MASKS];
        for ((l, h), (table_lo, table_hi)) in lo
            .iter_mut()
            .zip(hi.iter_mut())
            .zip(masks.lo.iter().zip(masks.hi.iter()))
            .take(count)
        {
            *l = _mm256_loadu_si256(table_lo.as_ptr().cast::<__m256i>());
            *h = _mm256_loadu_si256(table_hi.as_ptr().cast::<__m256i>());
        }

        while pos + count - 1 + LANES <= haystack.len() {
            let mut res = _mm256_set1_epi8(-1);
            for (k, (l, h)) in lo.iter().zip(hi.iter()).take(count).enumerate() {
                let chunk = _mm256_broadcastsi128_si256(_mm_loadu_si128(
                    ptr.add(pos + k).cast::<__m128i>(),
                ));
                let chunk_lo = _mm256_and_si256(chunk, nibble);
                let chunk_hi = _mm256_and_si256(_mm256_srli_epi16(chunk, 4), nibble);
                let hit = _mm256_and_si256(
                    _mm256_shuffle_epi8(*l, chunk_lo),
                    _mm256_shuffle_epi8(*h, chunk_hi),
                );
                res = _mm256_and_si256(res, hit);
            }

            let live_lanes = !(_mm256_movemask_epi8(_mm256_cmpeq_epi8(res, zero)) as u32);
            let mut live = (live_lanes | (live_lanes >> 16)) & 0xffff;
            if live != 0 {
                let mut lanes = [0u8; 2 * LANES];
                _mm256_storeu_si256(lanes.as_mut_ptr().cast::<__m256i>(), res);
                while live != 0 {
                    let j = live.trailing_zeros() as usize;
                    live &= live - 1;
                    let low = lanes.get(j).copied().unwrap_or(0);
                    let high = lanes.get(j + LANES).copied().unwrap_or(0);
                    let bits = u16::from_le_bytes([low, high]);
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
