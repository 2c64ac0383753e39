// ============================================================================
// src/prf.rs – pseudorandom function capability + built-in HMAC PRFs
// ============================================================================

//! The engine never looks inside a PRF. Anything that maps `(key, message)`
//! to a fixed-size output can drive a derivation: plain functions, closures,
//! the HMAC construction below, or [`PrfKind`] when the choice is made at
//! runtime.

use serde::{Deserialize, Serialize};
use sha2::digest::core_api::BlockSizeUser;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::marker::PhantomData;

/// Keyed pseudorandom function used by PBKDF2.
///
/// Implementations must be deterministic and always return the same number
/// of bytes (the hash size agreed with the engine). Block generation panics
/// on any other output length.
pub trait Prf {
    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8>;
}

impl<F> Prf for F
where
    F: Fn(&[u8], &[u8]) -> Vec<u8>,
{
    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        self(key, message)
    }
}

/// HMAC (RFC 2104) over any block-based digest from `sha2`.
pub struct Hmac<D> {
    _digest: PhantomData<fn() -> D>,
}

pub type HmacSha256 = Hmac<Sha256>;
pub type HmacSha512 = Hmac<Sha512>;

impl<D> Hmac<D>
where
    D: Digest + BlockSizeUser,
{
    pub fn new() -> Self {
        Self {
            _digest: PhantomData,
        }
    }

    /// Output length in bytes; this is the `h_size` to hand the engine.
    pub fn output_size() -> usize {
        <D as Digest>::output_size()
    }

    pub fn mac(key: &[u8], data: &[u8]) -> Vec<u8> {
        let block_size = <D as BlockSizeUser>::block_size();

        let mut key_block = vec![0u8; block_size];
        if key.len() > block_size {
            let digest = D::digest(key);
            key_block[..digest.len()].copy_from_slice(&digest);
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }

        let ipad: Vec<u8> = key_block.iter().map(|b| b ^ 0x36).collect();
        let opad: Vec<u8> = key_block.iter().map(|b| b ^ 0x5c).collect();

        let mut inner = D::new();
        inner.update(&ipad);
        inner.update(data);
        let inner_hash = inner.finalize();

        let mut outer = D::new();
        outer.update(&opad);
        outer.update(&inner_hash);
        outer.finalize().to_vec()
    }
}

impl<D> Prf for Hmac<D>
where
    D: Digest + BlockSizeUser,
{
    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        Self::mac(key, message)
    }
}

impl<D> Default for Hmac<D>
where
    D: Digest + BlockSizeUser,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for Hmac<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for Hmac<D> {}

impl<D> fmt::Debug for Hmac<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hmac<{}>", std::any::type_name::<D>())
    }
}

/// Built-in PRF selectable from configuration or the command line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum PrfKind {
    #[default]
    HmacSha256,
    HmacSha512,
}

impl PrfKind {
    pub fn output_size(self) -> usize {
        match self {
            PrfKind::HmacSha256 => HmacSha256::output_size(),
            PrfKind::HmacSha512 => HmacSha512::output_size(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PrfKind::HmacSha256 => "HMAC-SHA256",
            PrfKind::HmacSha512 => "HMAC-SHA512",
        }
    }
}

impl Prf for PrfKind {
    fn compute(&self, key: &[u8], message: &[u8]) -> Vec<u8> {
        match self {
            PrfKind::HmacSha256 => HmacSha256::mac(key, message),
            PrfKind::HmacSha512 => HmacSha512::mac(key, message),
        }
    }
}

impl fmt::Display for PrfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
