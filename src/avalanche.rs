//! Avalanche statistics for the keyed hash.
//!
//! For each input bit (of the key or of the message) we flip it, rehash, and
//! count how often each of the 64 digest bits changes.  A well-mixed hash
//! flips every output bit about half the time.

use std::{fs::File, path::Path};

use log::debug;
use nanorand::{Rng, WyRand};

use crate::siphash::{self, Key, DIGEST_SIZE_BYTES, KEY_SIZE_BYTES};

const DIGEST_BIT_LEN: usize = DIGEST_SIZE_BYTES * 8;

pub struct AvalancheChart {
    pub input_bit_len: usize,

    // The number of samples accumulated.  Or put another way, the number of
    // rounds used to generate the chart.
    pub sample_count: usize,

    // `input_bit_len * DIGEST_BIT_LEN` long.  Each element counts the flips
    // of one digest bit caused by flipping one input bit.
    pub chart: Vec<u32>,
}

impl AvalancheChart {
    pub fn new(input_bit_len: usize) -> Self {
        Self {
            input_bit_len: input_bit_len,
            sample_count: 0,
            chart: vec![0; input_bit_len * DIGEST_BIT_LEN],
        }
    }

    pub fn output_bit_len(&self) -> usize {
        DIGEST_BIT_LEN
    }

    /// Records one input-bit flip, given the digest before and after.
    pub fn accumulate(&mut self, in_bit: usize, flipped: u64) {
        for (out_bit, count) in self.get_row_mut(in_bit).iter_mut().enumerate() {
            *count += ((flipped >> out_bit) & 1) as u32;
        }
    }

    pub fn get(&self, in_bit: usize, out_bit: usize) -> u32 {
        self.chart[in_bit * DIGEST_BIT_LEN + out_bit]
    }

    pub fn get_row(&self, in_bit: usize) -> &[u32] {
        let start = in_bit * DIGEST_BIT_LEN;
        &self.chart[start..(start + DIGEST_BIT_LEN)]
    }

    fn get_row_mut(&mut self, in_bit: usize) -> &mut [u32] {
        let start = in_bit * DIGEST_BIT_LEN;
        &mut self.chart[start..(start + DIGEST_BIT_LEN)]
    }

    // Zero with no samples, so an empty chart reports full bias and no
    // diffusion rather than NaN.
    fn norm(&self) -> f64 {
        if self.sample_count == 0 {
            0.0
        } else {
            1.0 / self.sample_count as f64
        }
    }

    /// Effective number of digest bits an input bit influences.
    pub fn row_diffusion(&self, in_bit: usize) -> f64 {
        let norm = self.norm();
        self.get_row(in_bit)
            .iter()
            .map(|&flips| 1.0 - p_to_bias(flips as f64 * norm))
            .sum()
    }

    pub fn row_entropy(&self, in_bit: usize) -> f64 {
        let norm = self.norm();
        self.get_row(in_bit)
            .iter()
            .map(|&flips| p_to_entropy(flips as f64 * norm))
            .sum()
    }

    pub fn average_bias(&self) -> f64 {
        let norm = self.norm();

        let bias_sum: f64 = self
            .chart
            .iter()
            .map(|&flips| p_to_bias(flips as f64 * norm))
            .sum();
        bias_sum / self.chart.len().max(1) as f64
    }

    pub fn max_bias(&self) -> f64 {
        let norm = self.norm();
        self.chart
            .iter()
            .map(|&flips| p_to_bias(flips as f64 * norm))
            .fold(0.0, f64::max)
    }

    pub fn min_input_bit_diffusion(&self) -> f64 {
        (0..self.input_bit_len)
            .map(|i| self.row_diffusion(i))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn avg_input_bit_diffusion(&self) -> f64 {
        let sum: f64 = (0..self.input_bit_len).map(|i| self.row_diffusion(i)).sum();
        sum / self.input_bit_len.max(1) as f64
    }

    pub fn max_input_bit_diffusion(&self) -> f64 {
        (0..self.input_bit_len)
            .map(|i| self.row_diffusion(i))
            .fold(0.0, f64::max)
    }

    pub fn min_input_bit_entropy(&self) -> f64 {
        (0..self.input_bit_len)
            .map(|i| self.row_entropy(i))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn avg_input_bit_entropy(&self) -> f64 {
        let sum: f64 = (0..self.input_bit_len).map(|i| self.row_entropy(i)).sum();
        sum / self.input_bit_len.max(1) as f64
    }

    pub fn max_input_bit_entropy(&self) -> f64 {
        (0..self.input_bit_len)
            .map(|i| self.row_entropy(i))
            .fold(0.0, f64::max)
    }

    pub fn print_report(&self) {
        if self.sample_count == 0 || self.input_bit_len == 0 {
            println!("    No samples.");
            return;
        }

        println!(
            "    Bias:
        Avg: {:0.3}
        Max: {:0.3}
    Input Bit Diffusion (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits
        Max: {:0.1} bits
    Input Bit Diffusion Entropy (digest size = {} bits):
        Min: {:0.1} bits
        Avg: {:0.1} bits
        Max: {:0.1} bits",
            self.average_bias(),
            self.max_bias(),
            DIGEST_BIT_LEN,
            self.min_input_bit_diffusion(),
            self.avg_input_bit_diffusion(),
            self.max_input_bit_diffusion(),
            DIGEST_BIT_LEN,
            self.min_input_bit_entropy(),
            self.avg_input_bit_entropy(),
            self.max_input_bit_entropy(),
        );
    }

    /// Writes the chart as a grayscale image: one row per input bit, one
    /// column per digest bit, brighter for more flips.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut pixels = Vec::with_capacity(self.chart.len() * 4);

        for flips in self.chart.iter().copied() {
            let v = (flips as u64 * 255 / self.sample_count.max(1) as u64).min(255) as u8;
            pixels.extend_from_slice(&[v, v, v, 255]);
        }

        png_encode_mini::write_rgba_from_u8(
            &mut File::create(path.as_ref())?,
            &pixels,
            DIGEST_BIT_LEN as u32,
            self.input_bit_len as u32,
        )
    }
}

/// Computes an avalanche chart for `hash`, an arbitrary function of an
/// `input_size`-byte input.
///
/// `generate_input` fills the input for each round from the round index,
/// which starts at zero and increments.  It must be deterministic.
pub fn compute_avalanche_chart<F1, F2>(
    generate_input: F1,
    hash: F2,
    input_size: usize,
    rounds: usize,
) -> AvalancheChart
where
    F1: Fn(usize, &mut [u8]),
    F2: Fn(&[u8]) -> u64,
{
    let mut chart = AvalancheChart::new(input_size * 8);

    let mut input = vec![0u8; input_size];
    let mut input_tweaked = vec![0u8; input_size];

    for round in 0..rounds {
        generate_input(round, &mut input[..]);

        let digest = hash(&input[..]);
        for in_bit_idx in 0..(input_size * 8) {
            input_tweaked.copy_from_slice(&input[..]);
            input_tweaked[in_bit_idx / 8] ^= 1 << (in_bit_idx % 8);

            chart.accumulate(in_bit_idx, digest ^ hash(&input_tweaked[..]));
        }

        chart.sample_count += 1;
    }

    debug!(
        "avalanche chart: {} input bits, {} rounds",
        chart.input_bit_len, chart.sample_count
    );

    chart
}

/// Avalanche chart over the 128 key bits, hashing a fixed message under
/// random keys.
pub fn key_sensitivity(message: &[u8], rounds: usize) -> AvalancheChart {
    compute_avalanche_chart(
        generate_random,
        |key| siphash::digest(&to_key(key), message),
        KEY_SIZE_BYTES,
        rounds,
    )
}

/// Avalanche chart over the bits of a `message_len`-byte message, hashed
/// under a fixed key.
pub fn message_sensitivity(
    key: &Key,
    message_len: usize,
    generate_input: &dyn Fn(usize, &mut [u8]),
    rounds: usize,
) -> AvalancheChart {
    compute_avalanche_chart(
        generate_input,
        |message| siphash::digest(key, message),
        message_len,
        rounds,
    )
}

/// Histogram of digest Hamming distances under single key-bit flips.
/// `counts[d]` is the number of flips that changed exactly `d` digest bits.
pub struct DistanceHistogram {
    pub counts: [u64; DIGEST_BIT_LEN + 1],
}

impl DistanceHistogram {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Mean distance, or zero for an empty histogram.
    pub fn mean(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = self
            .counts
            .iter()
            .enumerate()
            .map(|(d, &n)| d as u64 * n)
            .sum();
        weighted as f64 / total as f64
    }

    pub fn print_report(&self) {
        if self.total() == 0 {
            println!("    No samples.");
            return;
        }

        let peak = self.counts.iter().copied().max().unwrap_or(0).max(1);
        println!("    Hamming distance histogram (mean {:0.2}):", self.mean());
        for (d, &n) in self.counts.iter().enumerate().filter(|&(_, &n)| n > 0) {
            let bar = "*".repeat((n * 50 / peak) as usize);
            println!("        {:2}: {:6} {}", d, n, bar);
        }
    }
}

/// Flips every key bit under `rounds` random keys, hashing `message`, and
/// tallies how many digest bits changed each time.
pub fn key_flip_distances(message: &[u8], rounds: usize) -> DistanceHistogram {
    let mut histogram = DistanceHistogram {
        counts: [0; DIGEST_BIT_LEN + 1],
    };

    let mut key = [0u8; KEY_SIZE_BYTES];
    for round in 0..rounds {
        generate_random(round, &mut key);
        let digest = siphash::digest(&key, message);

        for bit in 0..(KEY_SIZE_BYTES * 8) {
            let mut tweaked = key;
            tweaked[bit / 8] ^= 1 << (bit % 8);
            let distance = (digest ^ siphash::digest(&tweaked, message)).count_ones();
            histogram.counts[distance as usize] += 1;
        }
    }

    histogram
}

fn to_key(bytes: &[u8]) -> Key {
    let mut key = [0u8; KEY_SIZE_BYTES];
    key.copy_from_slice(bytes);
    key
}

pub fn p_to_bias(p: f64) -> f64 {
    (p * 2.0 - 1.0).abs()
}

/// Shannon entropy in bits of a digest bit that flips with probability `p`.
pub fn p_to_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        0.0
    } else {
        let q = 1.0 - p;
        -(p * p.log2()) - (q * q.log2())
    }
}

//-------------------------------------------------------------

/// Generates a random byte stream.
pub fn generate_random(seed: usize, bytes: &mut [u8]) {
    let mut rng = WyRand::new_seed(mix64(seed as u64));
    rng.fill_bytes(bytes);
}

/// Generates a byte stream with all zero bits except one.
pub fn generate_single_1_bit(seed: usize, bytes: &mut [u8]) {
    bytes.fill(0);
    if bytes.is_empty() {
        return;
    }
    let bit_idx = seed % (bytes.len() * 8);
    bytes[bit_idx / 8] = 1 << (bit_idx % 8);
}

/// Generates a byte stream with the lowest bits simply counting up as an
/// incrementing integer.
pub fn generate_counting(seed: usize, bytes: &mut [u8]) {
    let counter = u64::to_le_bytes(seed as u64);
    let n = bytes.len().min(counter.len());
    bytes[..n].copy_from_slice(&counter[..n]);
    bytes[n..].fill(0);
}

/// 64-bit bijective bit mixer.
fn mix64(mut n: u64) -> u64 {
    // Break zero sensitivity.
    n ^= 0x7be355f7c2e736d2;

    // http://zimbry.blogspot.ch/2011/09/better-bit-mixing-improving-on.html
    // (variant "Mix13")
    n ^= n >> 30;
    n = n.wrapping_mul(0xbf58476d1ce4e5b9);
    n ^= n >> 27;
    n = n.wrapping_mul(0x94d049bb133111eb);
    n ^= n >> 31;

    n
}
