//! AVX2 kernels, 32 haystack bytes per iteration
//!
//! Substring search compares two needle bytes (the anchors) against two
//! overlapping blocks, ANDs the equality masks and verifies every surviving
//! candidate. Anything left after the last full block goes to the scalar
//! kernels.

#![allow(unsafe_code)]
#![allow(clippy::multiple_unsafe_ops_per_block)]

use super::scalar;
use crate::cpu::CpuFeatures;
use std::arch::x86_64::{
    __m256i, _mm256_and_si256, _mm256_cmpeq_epi8, _mm256_loadu_si256, _mm256_movemask_epi8,
    _mm256_or_si256, _mm256_set1_epi8,
};

const LANES: usize = 32;

fn supported() -> bool {
    CpuFeatures::detect().avx2
}

fn splat_byte(byte: u8) -> i8 {
    i8::from_ne_bytes([byte])
}

pub(crate) fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    if !supported() {
        return scalar::find_byte(haystack, byte);
    }
    // SAFETY: the CPU reports AVX2.
    unsafe { find_byte_avx2(haystack, byte, byte) }
}

pub(crate) fn find_byte_ignore_case(haystack: &[u8], byte: u8) -> Option<usize> {
    let lower = byte.to_ascii_lowercase();
    let upper = byte.to_ascii_uppercase();
    if lower == upper {
        return find_byte(haystack, byte);
    }
    if !supported() {
        return scalar::find_byte_ignore_case(haystack, byte);
    }
    // SAFETY: the CPU reports AVX2.
    unsafe { find_byte_avx2(haystack, lower, upper) }
}

/// Leftmost occurrence of `needle`, filtering on the bytes at `first` and
/// `second`.
///
/// Callers guarantee `1 <= needle.len() <= haystack.len()` and both anchors
/// inside the needle.
pub(crate) fn find_anchored(
    haystack: &[u8],
    needle: &[u8],
    first: usize,
    second: usize,
    fold: bool,
) -> Option<usize> {
    if !supported() || first >= needle.len() || second >= needle.len() {
        return scalar::find(haystack, needle, fold);
    }
    // SAFETY: the CPU reports AVX2 and both anchors index into `needle`.
    unsafe { find_anchored_avx2(haystack, needle, first, second, fold) }
}

/// First position holding `a` or `b`.
#[target_feature(enable = "avx2")]
unsafe fn find_byte_avx2(haystack: &[u8], a: u8, b: u8) -> Option<usize> {
    let ptr = haystack.as_ptr();
    let mut i = 0;
    // SAFETY: every load reads `ptr + i .. ptr + i + 32`, and the loop keeps
    // `i + 32 <= haystack.len()`.
    unsafe {
        let va = _mm256_set1_epi8(splat_byte(a));
        let vb = _mm256_set1_epi8(splat_byte(b));
        while i + LANES <= haystack.len() {
            let block = _mm256_loadu_si256(ptr.add(i).cast::<__m256i>());
            let eq = _mm256_or_si256(_mm256_cmpeq_epi8(block, va), _mm256_cmpeq_epi8(block, vb));
            let mask = _mm256_movemask_epi8(eq) as u32;
            if mask != 0 {
                return Some(i + mask.trailing_zeros() as usize);
            }
            i += LANES;
        }
    }
    let tail = haystack.get(i..)?;
    tail.iter().position(|&c| c == a || c == b).map(|p| p + i)
}

#[target_feature(enable = "avx2")]
unsafe fn find_anchored_avx2(
    haystack: &[u8],
    needle: &[u8],
    first: usize,
    second: usize,
    fold: bool,
) -> Option<usize> {
    let n = needle.len();
    let (&b1, &b2) = (needle.get(first)?, needle.get(second)?);
    let (lo1, up1) = case_pair(b1, fold);
    let (lo2, up2) = case_pair(b2, fold);
    let ptr = haystack.as_ptr();
    let mut i = 0;

    // SAFETY: both loads end at most at `ptr + i + (n - 1) + 32`, and the loop
    // keeps `i + n - 1 + 32 <= haystack.len()`.
    unsafe {
        let v_lo1 = _mm256_set1_epi8(splat_byte(lo1));
        let v_up1 = _mm256_set1_epi8(splat_byte(up1));
        let v_lo2 = _mm256_set1_epi8(splat_byte(lo2));
        let v_up2 = _mm256_set1_epi8(splat_byte(up2));

        while i + n - 1 + LANES <= haystack.len() {
            let block1 = _mm256_loadu_si256(ptr.add(i + first).cast::<__m256i>());
            let block2 = _mm256_loadu_si256(ptr.add(i + second).cast::<__m256i>());

            let eq1 = _mm256_or_si256(
                _mm256_cmpeq_epi8(block1, v_lo1),
                _mm256_cmpeq_epi8(block1, v_up1),
            );
            let eq2 = _mm256_or_si256(
                _mm256_cmpeq_epi8(block2, v_lo2),
                _mm256_cmpeq_epi8(block2, v_up2),
            );
            let mut mask = _mm256_movemask_epi8(_mm256_and_si256(eq1, eq2)) as u32;

            while mask != 0 {
                let start = i + mask.trailing_zeros() as usize;
                if scalar::matches_at(haystack, start, needle, fold) {
                    return Some(start);
                }
                mask &= mask - 1;
            }
            i += LANES;
        }
    }

    scalar::find(haystack.get(i..)?, needle, fold).map(|p| p + i)
}

fn case_pair(byte: u8, fold: bool) -> (u8, u8) {
    if fold {
        (byte.to_ascii_lowercase(), byte.to_ascii_uppercase())
    } else {
        (byte, byte)
    }
}
