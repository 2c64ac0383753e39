// ============================================================================
// src/lib.rs – PBKDF2 Forge library root
// ============================================================================

//! Password-based key derivation (PBKDF2) over a pluggable pseudorandom
//! function. The engine lives in [`kdf`]; [`prf`] supplies the capability
//! trait and HMAC implementations; [`config`] loads derivation profiles.

pub mod config;
pub mod error;
pub mod kdf;
pub mod prf;

pub use error::{KdfError, Parameter};
pub use kdf::{derive, BlockIndexEncoding, BlockLayout, Pbkdf2};
pub use prf::{Hmac, HmacSha256, HmacSha512, Prf, PrfKind};
