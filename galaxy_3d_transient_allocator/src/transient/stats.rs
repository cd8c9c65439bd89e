/// Transient memory statistics
///
/// Sessions count what they allocate; `ResourceAllocator::freeze` folds the
/// session numbers into the `ResourceSystem`, which hands them to an optional
/// `TransientStatsSink` on every garbage-collection cycle.

/// Usage numbers for one resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientMemoryStats {
    /// Number of allocations made
    pub allocation_count: u64,
    /// Bytes requested over all allocations, as if nothing aliased
    pub size: u64,
    /// Bytes currently in use, aliasing taken into account
    pub size_with_aliasing: u64,
    /// Highest value `size_with_aliasing` reached
    pub peak_size_with_aliasing: u64,
}

impl TransientMemoryStats {
    pub(crate) fn record_allocation(&mut self, size: u64) {
        self.allocation_count += 1;
        self.size += size;
        self.size_with_aliasing += size;
        self.peak_size_with_aliasing = self.peak_size_with_aliasing.max(self.size_with_aliasing);
    }

    pub(crate) fn record_deallocation(&mut self, size: u64) {
        self.size_with_aliasing = self.size_with_aliasing.saturating_sub(size);
    }

    /// Fold another set of numbers into this one
    ///
    /// Counts and sizes add up; the peak keeps the highest of the two.
    pub fn accumulate(&mut self, other: &TransientMemoryStats) {
        self.allocation_count += other.allocation_count;
        self.size += other.size;
        self.size_with_aliasing += other.size_with_aliasing;
        self.peak_size_with_aliasing = self.peak_size_with_aliasing.max(other.peak_size_with_aliasing);
    }
}

/// Texture and buffer usage of a session, or of the system between reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientSessionStats {
    pub textures: TransientMemoryStats,
    pub buffers: TransientMemoryStats,
}

impl TransientSessionStats {
    pub fn accumulate(&mut self, other: &TransientSessionStats) {
        self.textures.accumulate(&other.textures);
        self.buffers.accumulate(&other.buffers);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Payload handed to a `TransientStatsSink`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransientStatsReport {
    pub texture_stats: TransientMemoryStats,
    pub buffer_stats: TransientMemoryStats,
    /// Bytes of heap memory alive in the system (idle or held by sessions)
    pub total_memory_used: u64,
}

/// Observer of transient memory usage (profiler, HUD, telemetry)
pub trait TransientStatsSink: Send + Sync {
    fn report_stats(&self, report: &TransientStatsReport);
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
