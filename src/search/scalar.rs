//! Portable kernels
//!
//! Reference behavior for every SIMD kernel, and the tail loop after the last
//! full vector.

pub(crate) fn find_byte(haystack: &[u8], byte: u8) -> Option<usize> {
    haystack.iter().position(|&b| b == byte)
}

pub(crate) fn find_byte_ignore_case(haystack: &[u8], byte: u8) -> Option<usize> {
    let lower = byte.to_ascii_lowercase();
    let upper = byte.to_ascii_uppercase();
    haystack.iter().position(|&b| b == lower || b == upper)
}

/// Leftmost occurrence of `needle`, optionally ASCII case-folded.
pub(crate) fn find(haystack: &[u8], needle: &[u8], fold: bool) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if fold {
        haystack
            .windows(needle.len())
            .position(|w| w.eq_ignore_ascii_case(needle))
    } else {
        haystack.windows(needle.len()).position(|w| w == needle)
    }
}

/// Whether `needle` occurs at `start`.
#[cfg_attr(not(target_arch = "x86_64"), allow(dead_code))]
pub(crate) fn matches_at(haystack: &[u8], start: usize, needle: &[u8], fold: bool) -> bool {
    haystack
        .get(start..start + needle.len())
        .is_some_and(|w| if fold { w.eq_ignore_ascii_case(needle) } else { w == needle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_search() {
        assert_eq!(find_byte(b"hello", b'l'), Some(2));
        assert_eq!(find_byte(b"hello", b'z'), None);
        assert_eq!(find_byte(b"", b'a'), None);
    }

    #[test]
    fn byte_search_folds_ascii_only() {
        assert_eq!(find_byte_ignore_case(b"xxAbc", b'a'), Some(2));
        assert_eq!(find_byte_ignore_case(b"xxabc", b'A'), Some(2));
        assert_eq!(find_byte_ignore_case(b"x-y", b'-'), Some(1));
    }

    #[test]
    fn substring_search() {
        assert_eq!(find(b"abcabd", b"abd", false), Some(3));
        assert_eq!(find(b"abcabd", b"ABD", false), None);
        assert_eq!(find(b"abcabd", b"ABD", true), Some(3));
        assert_eq!(find(b"ab", b"abc", false), None);
        assert_eq!(find(b"ab", b"", false), Some(0));
    }

    #[test]
    fn match_at_checks_bounds() {
        assert!(matches_at(b"foobar", 3, b"bar", false));
        assert!(!matches_at(b"foobar", 4, b"bar", false));
        assert!(matches_at(b"fooBAR", 3, b"bar", true));
    }
}
