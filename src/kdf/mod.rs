// ============================================================================
// src/kdf/mod.rs – PBKDF2 engine: validation, block layout, key assembly
// ============================================================================

//! PBKDF2 (RFC 8018 §5.2) over an arbitrary [`Prf`].
//!
//! ```
//! use pbkdf2_forge::kdf::Pbkdf2;
//! use pbkdf2_forge::prf::HmacSha256;
//!
//! let engine = Pbkdf2::new(HmacSha256::new(), HmacSha256::output_size(), 1, 20).unwrap();
//! let key = engine.derive(b"password", b"salt").unwrap();
//! assert_eq!(hex::encode(key), "120fb6cffcf8b32c43e7225256c4f837a86548c9");
//! ```

pub mod block;
pub mod layout;

pub use block::{BlockGenerator, BlockIndexEncoding};
pub use layout::BlockLayout;

use crate::error::{KdfError, Parameter};
use crate::prf::Prf;
use rayon::prelude::*;
use tracing::debug;

/// Derive `key_size` bytes from `password` and `salt` with the RFC 8018 block
/// index encoding.
///
/// Parameters are checked in order (hash size, iteration count, key size,
/// salt, password) and the first violation is returned before any PRF call.
pub fn derive<P>(
    prf: &P,
    h_size: usize,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_size: usize,
) -> Result<Vec<u8>, KdfError>
where
    P: Prf + ?Sized,
{
    let encoding = BlockIndexEncoding::default();
    let layout = check_config(h_size, iterations, key_size, encoding)?;
    check_inputs(password, salt)?;

    let gen = BlockGenerator {
        prf,
        h_size,
        password,
        salt,
        iterations,
        encoding,
    };
    let mut key = vec![0u8; key_size];
    assemble(&gen, layout, &mut key);
    Ok(key)
}

fn check_config(
    h_size: usize,
    iterations: u32,
    key_size: usize,
    encoding: BlockIndexEncoding,
) -> Result<BlockLayout, KdfError> {
    if h_size == 0 {
        return Err(KdfError::InvalidParameter(Parameter::HashSize));
    }
    if iterations == 0 {
        return Err(KdfError::InvalidParameter(Parameter::IterationCount));
    }
    if key_size == 0 {
        return Err(KdfError::InvalidParameter(Parameter::KeySize));
    }

    let layout = BlockLayout::new(key_size, h_size);
    if layout.blocks > encoding.max_blocks() {
        return Err(KdfError::KeyTooLong {
            blocks: layout.blocks,
            max: encoding.max_blocks(),
        });
    }
    Ok(layout)
}

fn check_inputs(password: &[u8], salt: &[u8]) -> Result<(), KdfError> {
    if salt.is_empty() {
        return Err(KdfError::InvalidParameter(Parameter::Salt));
    }
    if password.is_empty() {
        return Err(KdfError::InvalidParameter(Parameter::Password));
    }
    Ok(())
}

/// Blocks `0..blocks - 1` are copied whole; the last one contributes only
/// `last_block_size` bytes.
fn assemble<P>(gen: &BlockGenerator<'_, P>, layout: BlockLayout, out: &mut [u8])
where
    P: Prf + ?Sized,
{
    debug!(
        h_size = gen.h_size,
        iterations = gen.iterations,
        key_size = out.len(),
        blocks = layout.blocks,
        "deriving key"
    );

    let h_size = gen.h_size;
    let (head, tail) = out.split_at_mut(h_size * layout.full_blocks() as usize);
    for (index, chunk) in head.chunks_exact_mut(h_size).enumerate() {
        gen.fill(index as u64, chunk);
    }
    debug_assert_eq!(tail.len(), layout.last_block_size);
    gen.fill(layout.full_blocks(), tail);
}

/// A configured PBKDF2 instance. Holds no mutable state; one engine may serve
/// any number of derivations, concurrently if the PRF is `Sync`.
#[derive(Debug, Clone)]
pub struct Pbkdf2<P> {
    prf: P,
    h_size: usize,
    iterations: u32,
    key_size: usize,
    encoding: BlockIndexEncoding,
    layout: BlockLayout,
}

impl<P: Prf> Pbkdf2<P> {
    pub fn new(prf: P, h_size: usize, iterations: u32, key_size: usize) -> Result<Self, KdfError> {
        Self::with_encoding(prf, h_size, iterations, key_size, BlockIndexEncoding::default())
    }

    pub fn with_encoding(
        prf: P,
        h_size: usize,
        iterations: u32,
        key_size: usize,
        encoding: BlockIndexEncoding,
    ) -> Result<Self, KdfError> {
        let layout = check_config(h_size, iterations, key_size, encoding)?;
        Ok(Self {
            prf,
            h_size,
            iterations,
            key_size,
            encoding,
            layout,
        })
    }

    pub fn h_size(&self) -> usize {
        self.h_size
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn key_size(&self) -> usize {
        self.key_size
    }

    pub fn encoding(&self) -> BlockIndexEncoding {
        self.encoding
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn prf(&self) -> &P {
        &self.prf
    }

    pub fn derive(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, KdfError> {
        let mut key = vec![0u8; self.key_size];
        self.derive_into(password, salt, &mut key)?;
        Ok(key)
    }

    /// Fill `out` with derived key material. `out` must be exactly
    /// `key_size` bytes long.
    pub fn derive_into(&self, password: &[u8], salt: &[u8], out: &mut [u8]) -> Result<(), KdfError> {
        check_inputs(password, salt)?;
        if out.len() != self.key_size {
            return Err(KdfError::OutputLength {
                expected: self.key_size,
                actual: out.len(),
            });
        }
        assemble(&self.generator(password, salt), self.layout, out);
        Ok(())
    }

    fn generator<'a>(&'a self, password: &'a [u8], salt: &'a [u8]) -> BlockGenerator<'a, P> {
        BlockGenerator {
            prf: &self.prf,
            h_size: self.h_size,
            password,
            salt,
            iterations: self.iterations,
            encoding: self.encoding,
        }
    }
}

impl<P: Prf + Sync> Pbkdf2<P> {
    /// Same output as [`derive`](Self::derive), with blocks computed on the
    /// rayon pool. Each block's iteration chain stays sequential.
    pub fn derive_parallel(&self, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, KdfError> {
        check_inputs(password, salt)?;
        debug!(
            h_size = self.h_size,
            iterations = self.iterations,
            key_size = self.key_size,
            blocks = self.layout.blocks,
            "deriving key in parallel"
        );

        let gen = self.generator(password, salt);
        let mut key = vec![0u8; self.key_size];
        key.par_chunks_mut(self.h_size)
            .enumerate()
            .for_each(|(index, chunk)| gen.fill(index as u64, chunk));
        Ok(key)
    }
}
