//! Sample input for `roundtrip` and `selftest` runs without `--in`.
//!
//! The generated data is a sequence of segments, each of a different kind,
//! so that one buffer exercises the tree in several regimes:
//! - byte runs: one leaf dominates, codes shrink to a single bit
//! - word text: a skewed alphabet with recurring multi-byte units
//! - motifs: short byte patterns that repeat at a fixed stride, which
//!   wider symbol sizes can pick up as whole symbols
//! - noise: uniform bytes, every symbol new, literals dominate

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WORDS: &[&[u8]] = &[
    b"the", b"tree", b"leaf", b"node", b"weight", b"code", b"swap", b"block", b"root", b"bit",
    b"and", b"of", b"a", b"stream", b"symbol",
];

/// Longest single segment
const MAX_SEGMENT: usize = 4096;

/// Generate `size_bytes` of mixed-regime sample data, fully determined by `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);

    while data.len() < size_bytes {
        let remaining = size_bytes - data.len();
        let len = rng.gen_range(1..=MAX_SEGMENT).min(remaining);

        match rng.gen_range(0..10u8) {
            0..=1 => {
                let byte: u8 = rng.gen();
                data.resize(data.len() + len, byte);
            }
            2..=5 => push_words(&mut rng, &mut data, len),
            6..=7 => push_motif(&mut rng, &mut data, len),
            _ => data.extend((0..len).map(|_| rng.gen::<u8>())),
        }
    }

    data.truncate(size_bytes);
    data
}

fn push_words(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize) {
    let end = data.len() + len;
    while data.len() < end {
        if let Some(word) = WORDS.choose(rng) {
            data.extend_from_slice(word);
        }
        data.push(if rng.gen_ratio(1, 12) { b'\n' } else { b' ' });
    }
    data.truncate(end);
}

fn push_motif(rng: &mut ChaCha8Rng, data: &mut Vec<u8>, len: usize) {
    let motif: Vec<u8> = (0..rng.gen_range(2..=8)).map(|_| rng.gen()).collect();
    data.extend(motif.iter().copied().cycle().take(len));
}
