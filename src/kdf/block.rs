// ============================================================================
// src/kdf/block.rs – single PBKDF2 block: T_i = U_1 ^ U_2 ^ ... ^ U_c
// ============================================================================

use crate::prf::Prf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the block index is appended to the salt to form a block's seed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum BlockIndexEncoding {
    /// One-based 32-bit big-endian counter (RFC 8018). Interoperable.
    #[default]
    Rfc8018,
    /// Zero-based 16-bit little-endian index.
    Le16,
    /// Zero-based 64-bit little-endian index.
    Le64,
}

impl BlockIndexEncoding {
    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            BlockIndexEncoding::Rfc8018 => 4,
            BlockIndexEncoding::Le16 => 2,
            BlockIndexEncoding::Le64 => 8,
        }
    }

    /// Largest number of blocks whose indices all fit the encoding.
    pub fn max_blocks(self) -> u64 {
        match self {
            BlockIndexEncoding::Rfc8018 => u64::from(u32::MAX),
            BlockIndexEncoding::Le16 => u64::from(u16::MAX) + 1,
            BlockIndexEncoding::Le64 => u64::MAX,
        }
    }

    /// Append the encoded `index` to `seed`. `index` must be below
    /// [`max_blocks`](Self::max_blocks).
    pub fn append(self, index: u64, seed: &mut Vec<u8>) {
        debug_assert!(index < self.max_blocks());
        match self {
            BlockIndexEncoding::Rfc8018 => seed.extend_from_slice(&((index + 1) as u32).to_be_bytes()),
            BlockIndexEncoding::Le16 => seed.extend_from_slice(&(index as u16).to_le_bytes()),
            BlockIndexEncoding::Le64 => seed.extend_from_slice(&index.to_le_bytes()),
        }
    }

    pub fn encode(self, index: u64) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width());
        self.append(index, &mut out);
        out
    }

    /// Inverse of [`encode`](Self::encode). `None` on a width mismatch or a
    /// zero RFC 8018 counter.
    pub fn decode(self, bytes: &[u8]) -> Option<u64> {
        match self {
            BlockIndexEncoding::Rfc8018 => {
                let counter = u32::from_be_bytes(bytes.try_into().ok()?);
                u64::from(counter).checked_sub(1)
            }
            BlockIndexEncoding::Le16 => Some(u64::from(u16::from_le_bytes(bytes.try_into().ok()?))),
            BlockIndexEncoding::Le64 => Some(u64::from_le_bytes(bytes.try_into().ok()?)),
        }
    }
}

impl fmt::Display for BlockIndexEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockIndexEncoding::Rfc8018 => "rfc8018 (u32 big-endian, one-based)",
            BlockIndexEncoding::Le16 => "le16 (u16 little-endian, zero-based)",
            BlockIndexEncoding::Le64 => "le64 (u64 little-endian, zero-based)",
        })
    }
}

/// Everything needed to compute any block of one derivation. Holds only
/// borrowed, immutable inputs so blocks can be produced from several threads.
pub struct BlockGenerator<'a, P: ?Sized> {
    pub prf: &'a P,
    pub h_size: usize,
    pub password: &'a [u8],
    pub salt: &'a [u8],
    pub iterations: u32,
    pub encoding: BlockIndexEncoding,
}

impl<'a, P> BlockGenerator<'a, P>
where
    P: Prf + ?Sized,
{
    /// `S_i = salt || encode(i)`
    pub fn seed(&self, index: u64) -> Vec<u8> {
        let mut seed = Vec::with_capacity(self.salt.len() + self.encoding.width());
        seed.extend_from_slice(self.salt);
        self.encoding.append(index, &mut seed);
        seed
    }

    /// Full `h_size`-byte block for `index`. Calls the PRF exactly
    /// `iterations` times.
    ///
    /// # Panics
    ///
    /// If the PRF returns anything other than `h_size` bytes.
    pub fn block(&self, index: u64) -> Vec<u8> {
        let mut u = self.round(&self.seed(index));
        let mut block = u.clone();

        for _ in 1..self.iterations {
            u = self.round(&u);
            for (b, x) in block.iter_mut().zip(&u) {
                *b ^= x;
            }
        }

        block
    }

    fn round(&self, message: &[u8]) -> Vec<u8> {
        let u = self.prf.compute(self.password, message);
        assert_eq!(
            u.len(),
            self.h_size,
            "PRF returned {} bytes but the hash size is {}",
            u.len(),
            self.h_size
        );
        u
    }

    /// Write the first `out.len()` bytes of block `index` into `out`.
    pub fn fill(&self, index: u64, out: &mut [u8]) {
        let block = self.block(index);
        out.copy_from_slice(&block[..out.len()]);
        tracing::trace!(index, bytes = out.len(), "block derived");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn stub(_: &[u8], _: &[u8]) -> Vec<u8> {
        (0u8..32).collect()
    }

    fn generator<'a, P: Prf + ?Sized>(prf: &'a P, iterations: u32) -> BlockGenerator<'a, P> {
        BlockGenerator {
            prf,
            h_size: 32,
            password: b"password",
            salt: b"salt",
            iterations,
            encoding: BlockIndexEncoding::Rfc8018,
        }
    }

    #[test]
    fn rfc8018_counter_is_one_based_big_endian() {
        assert_eq!(BlockIndexEncoding::Rfc8018.encode(0), vec![0, 0, 0, 1]);
        assert_eq!(BlockIndexEncoding::Rfc8018.encode(0x01_02_03), vec![0, 1, 2, 4]);
    }

    #[test]
    fn legacy_encodings_are_zero_based_little_endian() {
        assert_eq!(BlockIndexEncoding::Le16.encode(0x0102), vec![0x02, 0x01]);
        assert_eq!(BlockIndexEncoding::Le64.encode(1), vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn encodings_round_trip() {
        for encoding in [
            BlockIndexEncoding::Rfc8018,
            BlockIndexEncoding::Le16,
            BlockIndexEncoding::Le64,
        ] {
            for index in [0u64, 1, 255, 256, 65_535] {
                let bytes = encoding.encode(index);
                assert_eq!(bytes.len(), encoding.width());
                assert_eq!(encoding.decode(&bytes), Some(index), "{encoding}");
            }
        }
        assert_eq!(BlockIndexEncoding::Rfc8018.decode(&[0, 0, 0, 0]), None);
        assert_eq!(BlockIndexEncoding::Le64.decode(&[1, 2]), None);
    }

    #[test]
    fn seed_is_salt_followed_by_index() {
        let prf = stub;
        let gen = generator(&prf, 1);
        assert_eq!(gen.seed(2), b"salt\x00\x00\x00\x03".to_vec());
    }

    #[test]
    fn single_iteration_is_first_prf_output() {
        let prf = stub;
        assert_eq!(generator(&prf, 1).block(0), (0u8..32).collect::<Vec<_>>());
    }

    #[test]
    fn prf_called_exactly_iterations_times() {
        let calls = Cell::new(0u32);
        let counting = |_: &[u8], msg: &[u8]| {
            calls.set(calls.get() + 1);
            let mut out = msg.to_vec();
            out.resize(32, 0);
            out.truncate(32);
            out
        };
        for iterations in [1u32, 2, 7, 100] {
            calls.set(0);
            let block = generator(&counting, iterations).block(0);
            assert_eq!(block.len(), 32);
            assert_eq!(calls.get(), iterations);
        }
    }

    #[test]
    fn password_is_key_and_chain_is_message() {
        let seen = std::cell::RefCell::new(Vec::new());
        let recording = |key: &[u8], msg: &[u8]| {
            seen.borrow_mut().push((key.to_vec(), msg.to_vec()));
            vec![msg.len() as u8; 32]
        };
        generator(&recording, 3).block(1);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|(key, _)| key == b"password"));
        assert_eq!(seen[0].1, b"salt\x00\x00\x00\x02".to_vec());
        assert_eq!(seen[1].1, vec![8u8; 32]);
        assert_eq!(seen[2].1, vec![32u8; 32]);
    }

    #[test]
    fn fill_truncates_to_the_output_slice() {
        let prf = stub;
        let mut out = [0xffu8; 5];
        generator(&prf, 1).fill(0, &mut out);
        assert_eq!(out, [0, 1, 2, 3, 4]);
    }

    #[test]
    #[should_panic(expected = "PRF returned 16 bytes but the hash size is 32")]
    fn short_prf_output_is_refused() {
        let short = |_: &[u8], _: &[u8]| vec![0u8; 16];
        generator(&short, 3).block(0);
    }

    #[test]
    #[should_panic(expected = "PRF returned 33 bytes")]
    fn prf_output_length_is_checked_every_round() {
        let calls = Cell::new(0usize);
        let drifting = |_: &[u8], _: &[u8]| {
            calls.set(calls.get() + 1);
            vec![0u8; 31 + calls.get()]
        };
        generator(&drifting, 3).block(0);
    }
}
