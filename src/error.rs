// ============================================================================
// src/error.rs – parameter validation errors for key derivation
// ============================================================================

use std::fmt;
use thiserror::Error;

/// Derivation input that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    HashSize,
    IterationCount,
    KeySize,
    Salt,
    Password,
}

impl Parameter {
    fn reason(self) -> &'static str {
        match self {
            Parameter::HashSize => "hash size can't be 0",
            Parameter::IterationCount => "iteration number can't be 0",
            Parameter::KeySize => "key size can't be 0",
            Parameter::Salt => "salt can't be empty",
            Parameter::Password => "password can't be empty",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Everything that can go wrong during a derivation. Once parameters are
/// accepted the algorithm itself cannot fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdfError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(Parameter),

    /// The key needs more blocks than the block index encoding can count.
    #[error("invalid parameter: key size needs {blocks} blocks but the block index encoding addresses at most {max}")]
    KeyTooLong { blocks: u64, max: u64 },

    /// `derive_into` was handed a buffer that is not `key_size` bytes long.
    #[error("invalid parameter: output buffer is {actual} bytes but the key size is {expected}")]
    OutputLength { expected: usize, actual: usize },
}

impl KdfError {
    /// The parameter that was rejected.
    pub fn parameter(&self) -> Parameter {
        match self {
            KdfError::InvalidParameter(p) => *p,
            KdfError::KeyTooLong { .. } | KdfError::OutputLength { .. } => Parameter::KeySize,
        }
    }
}
