/// Transient allocator configuration

use crate::error::{Error, Result};

const MIB: u64 = 1024 * 1024;

/// Configuration read once when the `ResourceSystem` is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientAllocatorConfig {
    /// Smallest heap the system creates, in bytes
    pub minimum_heap_size: u64,
    /// Largest heap the system creates, in bytes; bigger requests are rejected
    pub maximum_heap_size: u64,
    /// Base alignment of every heap and every placement (power of two)
    pub heap_alignment: u32,
    /// Collection cycles an idle heap survives, and cache generations an
    /// idle resource survives once its cache is over capacity
    pub garbage_collect_latency: u64,
    /// Soft capacity of each heap's texture cache
    pub texture_cache_size: usize,
    /// Soft capacity of each heap's buffer cache
    pub buffer_cache_size: usize,
    /// Create every heap with `HeapFlags::ALLOW_ALL` instead of the flags of
    /// the request that triggered its creation
    pub universal_heaps: bool,
}

impl Default for TransientAllocatorConfig {
    fn default() -> Self {
        Self {
            minimum_heap_size: 128 * MIB,
            maximum_heap_size: 512 * MIB,
            heap_alignment: 64 * 1024,
            garbage_collect_latency: 16,
            texture_cache_size: 64,
            buffer_cache_size: 64,
            universal_heaps: true,
        }
    }
}

impl TransientAllocatorConfig {
    /// Check the configuration for values the allocator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.minimum_heap_size == 0 {
            return Err(Error::InitializationFailed(
                "minimum_heap_size must be greater than zero".to_string(),
            ));
        }
        if self.minimum_heap_size > self.maximum_heap_size {
            return Err(Error::InitializationFailed(format!(
                "minimum_heap_size ({}) exceeds maximum_heap_size ({})",
                self.minimum_heap_size, self.maximum_heap_size
            )));
        }
        if !self.heap_alignment.is_power_of_two() {
            return Err(Error::InitializationFailed(format!(
                "heap_alignment ({}) is not a power of two",
                self.heap_alignment
            )));
        }
        if self.minimum_heap_size % self.heap_alignment as u64 != 0 {
            return Err(Error::InitializationFailed(format!(
                "minimum_heap_size ({}) is not a multiple of heap_alignment ({})",
                self.minimum_heap_size, self.heap_alignment
            )));
        }
        Ok(())
    }

    /// Size of a heap created for a first allocation of `size` bytes
    ///
    /// The next power of two, clamped to `[minimum_heap_size, maximum_heap_size]`.
    pub fn heap_size_for(&self, size: u64) -> u64 {
        size.checked_next_power_of_two()
            .unwrap_or(u64::MAX)
            .clamp(self.minimum_heap_size, self.maximum_heap_size)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
