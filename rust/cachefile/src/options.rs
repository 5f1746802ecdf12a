use cachefile_common::verify_arg;

/// Default capacity of the cache window, and the alignment used by read-mode seeks.
pub const BLOCK: usize = 4096;

/// Tunables of a buffered handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Capacity of the cache window in bytes. Read-mode seeks align the descriptor
    /// to multiples of this value.
    pub block_size: usize,
}

impl CacheOptions {
    /// Returns options with the given window capacity.
    pub fn with_block_size(block_size: usize) -> crate::Result<CacheOptions> {
        verify_arg!(block_size, block_size > 0);
        Ok(CacheOptions { block_size })
    }

    /// Rounds `pos` down to the nearest multiple of the block size.
    pub fn align_down(&self, pos: u64) -> u64 {
        pos - pos % self.block_size as u64
    }
}

impl Default for CacheOptions {
    fn default() -> CacheOptions {
        CacheOptions { block_size: BLOCK }
    }
}

#[cfg(test)]
mod tests {
    use super::{BLOCK, CacheOptions};

    #[test]
    fn test_default_block_size() {
        assert_eq!(CacheOptions::default().block_size, BLOCK);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert!(CacheOptions::with_block_size(0).is_err());
        assert_eq!(CacheOptions::with_block_size(7).unwrap().block_size, 7);
    }

    #[test]
    fn test_align_down() {
        let options = CacheOptions::default();
        assert_eq!(options.align_down(0), 0);
        assert_eq!(options.align_down(4095), 0);
        assert_eq!(options.align_down(4096), 4096);
        assert_eq!(options.align_down(10_000), 8192);

        let options = CacheOptions::with_block_size(10).unwrap();
        assert_eq!(options.align_down(37), 30);
    }
}
