//! SipHash-2-4: a keyed 64-bit hash built from add-rotate-xor rounds over
//! four 64-bit state words.
//!
//! This is the one-shot form: the whole message is hashed in a single call.
//! Output must stay bit-for-bit identical to the reference construction,
//! since identicons generated elsewhere are compared against it.

use crate::error::{IdenticonError, Result};

pub const KEY_SIZE_BYTES: usize = 128 / 8;
pub const DIGEST_SIZE_BYTES: usize = 64 / 8;

/// A 128-bit SipHash key.
pub type Key = [u8; KEY_SIZE_BYTES];

const BLOCK_SIZE_BYTES: usize = 8;

// Compression rounds per message block, and at finalization.
const C_ROUNDS: usize = 2;
const D_ROUNDS: usize = 4;

const INIT: [u64; 4] = [
    0x736f6d6570736575, // "somepseu"
    0x646f72616e646f6d, // "dorandom"
    0x6c7967656e657261, // "lygenera"
    0x7465646279746573, // "tedbytes"
];

/// Takes the first 16 bytes of `bytes` as a key.  Anything past that is
/// ignored.
pub fn key_from_slice(bytes: &[u8]) -> Result<Key> {
    bytes
        .get(..KEY_SIZE_BYTES)
        .and_then(|k| k.try_into().ok())
        .ok_or(IdenticonError::InvalidKey { len: bytes.len() })
}

/// Computes the SipHash-2-4 digest of `message` under `key`.
pub fn digest(key: &Key, message: &[u8]) -> u64 {
    let k0 = u64::from_le_bytes(key[0..8].try_into().unwrap());
    let k1 = u64::from_le_bytes(key[8..16].try_into().unwrap());

    let mut state = [INIT[0] ^ k0, INIT[1] ^ k1, INIT[2] ^ k0, INIT[3] ^ k1];

    let mut blocks = message.chunks_exact(BLOCK_SIZE_BYTES);
    for block in &mut blocks {
        absorb(&mut state, u64::from_le_bytes(block.try_into().unwrap()));
    }
    absorb(&mut state, last_block(blocks.remainder(), message.len()));

    state[2] ^= 0xff;
    for _ in 0..D_ROUNDS {
        compress(&mut state);
    }

    state[0] ^ state[1] ^ state[2] ^ state[3]
}

/// Packs the 0-7 trailing bytes into the low bytes of a word, with the low
/// byte of the total message length in the top byte.
fn last_block(tail: &[u8], message_len: usize) -> u64 {
    debug_assert!(tail.len() < BLOCK_SIZE_BYTES);

    let mut bytes = [0u8; BLOCK_SIZE_BYTES];
    bytes[..tail.len()].copy_from_slice(tail);
    bytes[BLOCK_SIZE_BYTES - 1] = message_len as u8;

    u64::from_le_bytes(bytes)
}

fn absorb(state: &mut [u64; 4], m: u64) {
    state[3] ^= m;
    for _ in 0..C_ROUNDS {
        compress(state);
    }
    state[0] ^= m;
}

/// One SipRound.
#[inline(always)]
fn compress(state: &mut [u64; 4]) {
    let [mut v0, mut v1, mut v2, mut v3] = *state;

    v0 = v0.wrapping_add(v1);
    v2 = v2.wrapping_add(v3);
    v1 = v1.rotate_left(13);
    v3 = v3.rotate_left(16);
    v1 ^= v0;
    v3 ^= v2;
    v0 = v0.rotate_left(32);

    v2 = v2.wrapping_add(v1);
    v0 = v0.wrapping_add(v3);
    v1 = v1.rotate_left(17);
    v3 = v3.rotate_left(21);
    v1 ^= v2;
    v3 ^= v0;
    v2 = v2.rotate_left(32);

    *state = [v0, v1, v2, v3];
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENTIAL_KEY: Key = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];

    const DEFAULT_KEY: Key = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];

    fn sequential_message(len: usize) -> Vec<u8> {
        (0..len).map(|i| i as u8).collect()
    }

    #[test]
    fn reference_vectors() {
        // From the SipHash paper's test vector set: key 00..0f, message
        // 00..(len - 1).
        let vectors: &[(usize, u64)] = &[
            (0, 0x726fdb47dd0e0e31),
            (1, 0x74f839c593dc67fd),
            (7, 0xab0200f58b01d137),
            (8, 0x93f5f5799a932462),
            (9, 0x9e0082df0ba9e4b0),
            (15, 0xa129ca6149be45e5),
            (16, 0x3f2acc7f57c29bdb),
            (63, 0x958a324ceb064572),
        ];

        for &(len, expected) in vectors {
            assert_eq!(
                digest(&SEQUENTIAL_KEY, &sequential_message(len)),
                expected,
                "message length {}",
                len
            );
        }
    }

    #[test]
    fn block_boundaries() {
        assert_eq!(
            digest(&SEQUENTIAL_KEY, &sequential_message(64)),
            0xacd2c40b8502cad8
        );
        assert_eq!(
            digest(&SEQUENTIAL_KEY, &sequential_message(65)),
            0x36b6bedb91a25924
        );
    }

    #[test]
    fn default_key_empty_message() {
        assert_eq!(digest(&DEFAULT_KEY, b""), 0x75f56ec2d23160b5);
    }

    #[test]
    fn default_key_titles() {
        assert_eq!(digest(&DEFAULT_KEY, b"RubyIdenticon"), 0xfa539ce35cb75aa8);
        assert_eq!(
            digest(&DEFAULT_KEY, b"identicons are great!"),
            0xc68e064b827d4591
        );
    }

    #[test]
    fn deterministic() {
        let message = sequential_message(100);
        let first = digest(&DEFAULT_KEY, &message);
        for _ in 0..8 {
            assert_eq!(digest(&DEFAULT_KEY, &message), first);
        }
    }

    #[test]
    fn length_tag_wraps_at_256() {
        // Two messages whose lengths differ by 256 only differ in the
        // absorbed blocks, not in the length byte.  Both must still hash.
        let short = vec![0u8; 3];
        let long = vec![0u8; 3 + 256];
        assert_eq!(last_block(&short, short.len()), last_block(&short, long.len()));
        assert_ne!(digest(&DEFAULT_KEY, &short), digest(&DEFAULT_KEY, &long));
    }

    #[test]
    fn last_block_layout() {
        assert_eq!(last_block(&[], 0), 0);
        assert_eq!(last_block(&[], 8), 0x08 << 56);
        assert_eq!(
            last_block(&[0x01, 0x02, 0x03], 11),
            0x0b00_0000_0003_0201
        );
        assert_eq!(
            last_block(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x11], 7),
            0x0711_ffee_ddcc_bbaa
        );
    }

    #[test]
    fn key_from_slice_lengths() {
        assert!(matches!(
            key_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44]),
            Err(IdenticonError::InvalidKey { len: 5 })
        ));
        assert!(matches!(
            key_from_slice(&[]),
            Err(IdenticonError::InvalidKey { len: 0 })
        ));
        assert_eq!(key_from_slice(&DEFAULT_KEY).unwrap(), DEFAULT_KEY);

        let mut long = DEFAULT_KEY.to_vec();
        long.extend_from_slice(b"ignored");
        assert_eq!(key_from_slice(&long).unwrap(), DEFAULT_KEY);
    }
}
