// ============================================================================
// src/kdf/layout.rs – how many PRF blocks a key needs
// ============================================================================

/// Shape of a derived key in units of PRF output blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub blocks: u64,
    /// Bytes taken from the final block; `h_size` when the key is an exact
    /// multiple of the block size.
    pub last_block_size: usize,
}

impl BlockLayout {
    /// Both arguments must be non-zero; the engine validates before calling.
    pub fn new(key_size: usize, h_size: usize) -> Self {
        debug_assert!(key_size > 0 && h_size > 0);

        let mut blocks = (key_size / h_size) as u64;
        let mut last_block_size = key_size % h_size;

        if last_block_size != 0 {
            blocks += 1;
        } else {
            last_block_size = h_size;
        }

        Self {
            blocks,
            last_block_size,
        }
    }

    pub fn full_blocks(&self) -> u64 {
        self.blocks - 1
    }
}
