use simdstr::{Backend, Flavor, Teddy, TeddyOptions};

const BACKENDS: [Backend; 2] = [Backend::Scalar, Backend::Avx2];
const FLAVORS: [Flavor; 2] = [Flavor::Slim, Flavor::Fat];

/// Small deterministic xorshift generator
struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn bytes(&mut self, len: usize, alphabet: &[u8]) -> Vec<u8> {
        (0..len)
            .map(|_| *alphabet.get(self.below(alphabet.len())).unwrap())
            .collect()
    }
}

/// Leftmost match, lowest pattern id among those starting there
fn naive_find(patterns: &[Vec<u8>], haystack: &[u8], start: usize) -> Option<(usize, usize, usize)> {
    (start..haystack.len()).find_map(|pos| {
        let rest = haystack.get(pos..)?;
        patterns
            .iter()
            .position(|p| rest.starts_with(p))
            .map(|id| (id, pos, pos + patterns.get(id).map_or(0, Vec::len)))
    })
}

fn naive_all(patterns: &[Vec<u8>], haystack: &[u8]) -> Vec<(usize, usize, usize)> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(m) = naive_find(patterns, haystack, pos) {
        pos = m.2;
        found.push(m);
    }
    found
}

fn teddy_all(teddy: &Teddy, haystack: &[u8]) -> Vec<(usize, usize, usize)> {
    teddy
        .find_iter(haystack)
        .map(|m| (m.pattern(), m.start(), m.end()))
        .collect()
}

#[test]
fn agrees_with_reference_for_every_configuration() {
    let mut rng = Rng(0x0123_4567_89ab_cdef);
    for backend in BACKENDS {
        for flavor in FLAVORS {
            for masks in 1..=4 {
                for _ in 0..15 {
                    let count = 1 + rng.below(12);
                    let patterns: Vec<Vec<u8>> = (0..count)
                        .map(|_| {
                            let len = masks + rng.below(3);
                            rng.bytes(len, b"abcd")
                        })
                        .collect();
                    let options = TeddyOptions {
                        flavor,
                        masks: Some(masks),
                        backend,
                    };
                    let teddy = Teddy::with_options(&patterns, options).unwrap();

                    let len = rng.below(200);
                    let haystack = rng.bytes(len, b"abcde");
                    assert_eq!(
                        teddy_all(&teddy, &haystack),
                        naive_all(&patterns, &haystack),
                        "{backend} {flavor} masks {masks} patterns {patterns:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn large_pattern_sets_fill_every_fat_bucket() {
    let mut rng = Rng(0x5151_a5a5_0f0f_7777);
    let alphabet = [b'a', b'b', b'c', 0x00, 0x80, 0xff];
    for backend in BACKENDS {
        for flavor in [Flavor::Auto, Flavor::Fat] {
            for _ in 0..20 {
                let count = 33 + rng.below(224);
                let patterns: Vec<Vec<u8>> = (0..count)
                    .map(|_| {
                        let len = 2 + rng.below(4);
                        rng.bytes(len, &alphabet)
                    })
                    .collect();
                let options = TeddyOptions {
                    flavor,
                    masks: None,
                    backend,
                };
                let teddy = Teddy::with_options(&patterns, options).unwrap();
                assert_eq!(teddy.flavor(), Flavor::Fat);

                let len = rng.below(300);
                let haystack = rng.bytes(len, &alphabet);
                assert_eq!(
                    teddy_all(&teddy, &haystack),
                    naive_all(&patterns, &haystack),
                    "{backend} {flavor} {count} patterns"
                );
            }
        }
    }
}

#[test]
fn haystacks_around_vector_boundaries() {
    let patterns = vec![b"needle".to_vec(), b"nee".to_vec(), b"haystack".to_vec()];
    for backend in BACKENDS {
        for flavor in FLAVORS {
            let teddy = Teddy::with_options(
                &patterns,
                TeddyOptions {
                    flavor,
                    masks: None,
                    backend,
                },
            )
            .unwrap();
            for len in [0, 3, 15, 16, 17, 18, 31, 32, 33, 34, 47, 48, 49, 64, 65] {
                for at in 0..len {
                    let mut haystack = vec![b'.'; len];
                    let tail = haystack.get_mut(at..).unwrap();
                    let n = tail.len().min(6);
                    tail.get_mut(..n)
                        .unwrap()
                        .copy_from_slice(b"needle".get(..n).unwrap());
                    assert_eq!(
                        teddy
                            .find(&haystack)
                            .map(|m| (m.pattern(), m.start(), m.end())),
                        naive_find(&patterns, &haystack, 0),
                        "{backend} {flavor} len {len} at {at}"
                    );
                }
            }
        }
    }
}

#[test]
fn many_patterns_use_fat_buckets() {
    let patterns: Vec<Vec<u8>> = (0..200u32)
        .map(|i| format!("k{i:03}x").into_bytes())
        .collect();
    let mut haystack = b"nothing to see here, ".repeat(10);
    haystack.extend_from_slice(b"k150x then k007x and k199x");

    for backend in BACKENDS {
        let teddy = Teddy::with_options(
            &patterns,
            TeddyOptions {
                flavor: Flavor::Auto,
                masks: None,
                backend,
            },
        )
        .unwrap();
        assert_eq!(teddy.flavor(), Flavor::Fat);
        assert_eq!(teddy_all(&teddy, &haystack), naive_all(&patterns, &haystack));
        let ids: Vec<usize> = teddy.find_iter(&haystack).map(|m| m.pattern()).collect();
        assert_eq!(ids, vec![150, 7, 199]);
    }
}

#[test]
fn find_at_skips_earlier_matches() {
    let patterns = vec![b"ab".to_vec(), b"cd".to_vec()];
    let haystack = b"ab cd ab cd ab cd ab cd ab cd ab cd ab cd";
    for backend in BACKENDS {
        for flavor in FLAVORS {
            let teddy = Teddy::with_options(
                &patterns,
                TeddyOptions {
                    flavor,
                    masks: Some(2),
                    backend,
                },
            )
            .unwrap();
            for start in 0..=haystack.len() {
                assert_eq!(
                    teddy
                        .find_at(haystack, start)
                        .map(|m| (m.pattern(), m.start(), m.end())),
                    naive_find(&patterns, haystack, start),
                    "start {start}"
                );
            }
        }
    }
}
