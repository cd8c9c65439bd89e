/// Process-wide pool of transient heaps.
///
/// The `ResourceSystem` is the only structure shared between allocator
/// sessions. It hands idle heaps out, takes them back when a session
/// freezes, destroys heaps that stayed idle for too long, and aggregates the
/// usage statistics of every session.
///
/// Every entry point takes one lock for its whole duration. A heap is owned
/// by either the idle pool or exactly one session, never both.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use crate::error::{Error, Result};
use crate::graphics_device::HeapFlags;
use super::config::TransientAllocatorConfig;
use super::heap::{Heap, HeapId};
use super::stats::{TransientSessionStats, TransientStatsReport, TransientStatsSink};

const SOURCE: &str = "galaxy3d::transient::ResourceSystem";

struct SystemState {
    /// Idle heaps, smallest first, then most recently used first
    idle_heaps: Vec<Heap>,
    garbage_collect_cycle: u64,
    next_heap_id: u64,
    /// Heaps alive, idle or held by a session
    heap_count: usize,
    /// Capacity of the heaps alive, in bytes
    total_memory_capacity: u64,
    /// Statistics folded in since the last report
    stats: TransientSessionStats,
}

/// Transient heap pool
pub struct ResourceSystem {
    config: TransientAllocatorConfig,
    state: Mutex<SystemState>,
    stats_sink: RwLock<Option<Arc<dyn TransientStatsSink>>>,
}

impl ResourceSystem {
    /// Create an empty heap pool
    ///
    /// # Errors
    ///
    /// Returns `InitializationFailed` if the configuration does not validate.
    pub fn new(config: TransientAllocatorConfig) -> Result<Self> {
        config.validate()?;

        crate::engine_info!(SOURCE,
            "Created (heap size {}..{} bytes, alignment {}, gc latency {})",
            config.minimum_heap_size, config.maximum_heap_size,
            config.heap_alignment, config.garbage_collect_latency);

        Ok(Self {
            config,
            state: Mutex::new(SystemState {
                idle_heaps: Vec::new(),
                garbage_collect_cycle: 0,
                next_heap_id: 0,
                heap_count: 0,
                total_memory_capacity: 0,
                stats: TransientSessionStats::default(),
            }),
            stats_sink: RwLock::new(None),
        })
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SystemState>> {
        self.state.lock()
            .map_err(|_| crate::engine_err!(SOURCE, "ResourceSystem state lock poisoned"))
    }

    /// Read-only access for accessors; a poisoned lock still holds valid counters
    fn read_state(&self) -> MutexGuard<'_, SystemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand a heap able to hold `size` bytes with `flags` to a session
    ///
    /// Reuses the first compatible idle heap. Otherwise creates one sized to
    /// the next power of two of `size`, clamped to the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns `AllocationTooLarge` if `size` exceeds the maximum heap size.
    pub fn acquire_heap(&self, size: u64, flags: HeapFlags) -> Result<Heap> {
        if size > self.config.maximum_heap_size {
            return Err(Error::AllocationTooLarge {
                size,
                max_heap_size: self.config.maximum_heap_size,
            });
        }

        let mut state = self.lock_state()?;

        if let Some(index) = state.idle_heaps.iter()
            .position(|heap| heap.is_allocation_supported(size, flags))
        {
            let heap = state.idle_heaps.remove(index);
            crate::engine_trace!(SOURCE, "Reusing heap {} ({} bytes) for {} bytes",
                heap.id().raw(), heap.capacity(), size);
            return Ok(heap);
        }

        let capacity = self.config.heap_size_for(size);
        let heap_flags = if self.config.universal_heaps { HeapFlags::ALLOW_ALL } else { flags };
        let id = HeapId::new(state.next_heap_id);
        state.next_heap_id += 1;
        state.heap_count += 1;
        state.total_memory_capacity += capacity;

        crate::engine_info!(SOURCE, "Creating heap {} ({} bytes, {:?}), {} heaps alive",
            id.raw(), capacity, heap_flags, state.heap_count);

        Ok(Heap::new(id, capacity, heap_flags, &self.config))
    }

    /// Take heaps back from a finished session
    ///
    /// Each heap's session resources return to its caches, and the heap is
    /// stamped with the current cycle before joining the idle pool.
    pub fn forfeit_heaps(&self, mut heaps: Vec<Heap>) -> Result<()> {
        for heap in &mut heaps {
            heap.forfeit_resources();
        }

        let mut state = self.lock_state()?;
        let cycle = state.garbage_collect_cycle;
        for mut heap in heaps {
            heap.set_last_used_cycle(cycle);
            state.idle_heaps.push(heap);
        }

        state.idle_heaps.sort_by(|a, b| {
            a.capacity().cmp(&b.capacity())
                .then_with(|| b.last_used_cycle().cmp(&a.last_used_cycle()))
        });

        Ok(())
    }

    /// Advance the cycle counter and destroy heaps idle for too long
    ///
    /// A heap goes once `last_used_cycle + garbage_collect_latency` reaches
    /// the new cycle. The statistics accumulated since the previous call are
    /// then reported to the sink and reset.
    pub fn garbage_collect(&self) -> Result<()> {
        let (expired, report) = {
            let mut state = self.lock_state()?;
            state.garbage_collect_cycle += 1;
            let cycle = state.garbage_collect_cycle;
            let latency = self.config.garbage_collect_latency;

            let (expired, kept): (Vec<Heap>, Vec<Heap>) = std::mem::take(&mut state.idle_heaps)
                .into_iter()
                .partition(|heap| heap.last_used_cycle() + latency <= cycle);
            state.idle_heaps = kept;

            for heap in &expired {
                state.heap_count -= 1;
                state.total_memory_capacity -= heap.capacity();
                crate::engine_info!(SOURCE, "Destroying heap {} ({} bytes), idle since cycle {}",
                    heap.id().raw(), heap.capacity(), heap.last_used_cycle());
            }

            if !expired.is_empty() {
                crate::engine_debug!(SOURCE, "Cycle {}: collected {} heaps, {} alive",
                    cycle, expired.len(), state.heap_count);
            }

            let report = TransientStatsReport {
                texture_stats: state.stats.textures,
                buffer_stats: state.stats.buffers,
                total_memory_used: state.total_memory_capacity,
            };
            state.stats = TransientSessionStats::default();

            (expired, report)
        };

        drop(expired);

        let sink = self.stats_sink.read()
            .map_err(|_| crate::engine_err!(SOURCE, "Stats sink lock poisoned"))?
            .clone();
        if let Some(sink) = sink {
            sink.report_stats(&report);
        }

        Ok(())
    }

    /// Fold a session's statistics into the running totals
    pub fn accumulate_stats(&self, stats: &TransientSessionStats) -> Result<()> {
        let mut state = self.lock_state()?;
        state.stats.accumulate(stats);
        Ok(())
    }

    /// Install or remove the statistics observer
    pub fn set_stats_sink(&self, sink: Option<Arc<dyn TransientStatsSink>>) -> Result<()> {
        let mut lock = self.stats_sink.write()
            .map_err(|_| crate::engine_err!(SOURCE, "Stats sink lock poisoned"))?;
        *lock = sink;
        Ok(())
    }

    /// Destroy every idle heap now, returning how many were destroyed
    pub fn release_idle_heaps(&self) -> Result<usize> {
        let released = {
            let mut state = self.lock_state()?;
            let released = std::mem::take(&mut state.idle_heaps);
            for heap in &released {
                state.heap_count -= 1;
                state.total_memory_capacity -= heap.capacity();
            }
            released
        };

        let count = released.len();
        if count > 0 {
            crate::engine_info!(SOURCE, "Released {} idle heaps", count);
        }
        Ok(count)
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &TransientAllocatorConfig {
        &self.config
    }

    /// Heaps alive, idle or held by a session
    pub fn heap_count(&self) -> usize {
        self.read_state().heap_count
    }

    pub fn idle_heap_count(&self) -> usize {
        self.read_state().idle_heaps.len()
    }

    pub fn garbage_collect_cycle(&self) -> u64 {
        self.read_state().garbage_collect_cycle
    }

    /// Bytes of heap memory alive
    pub fn total_memory_capacity(&self) -> u64 {
        self.read_state().total_memory_capacity
    }

    /// Statistics accumulated since the last report
    pub fn stats(&self) -> TransientSessionStats {
        self.read_state().stats
    }

    /// Ids and capacities of the idle heaps, in pool order
    pub fn idle_heaps(&self) -> Vec<(HeapId, u64)> {
        self.read_state().idle_heaps.iter()
            .map(|heap| (heap.id(), heap.capacity()))
            .collect()
    }
}

impl Drop for ResourceSystem {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        let in_use = state.heap_count - state.idle_heaps.len();
        if in_use > 0 {
            crate::engine_warn!(SOURCE,
                "Destroyed while {} heaps are still held by sessions that never froze", in_use);
        }
        crate::engine_debug!(SOURCE, "Destroying {} idle heaps", state.idle_heaps.len());
    }
}

impl std::fmt::Debug for ResourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read_state();
        f.debug_struct("ResourceSystem")
            .field("config", &self.config)
            .field("heap_count", &state.heap_count)
            .field("idle_heaps", &state.idle_heaps.len())
            .field("garbage_collect_cycle", &state.garbage_collect_cycle)
            .finish()
    }
}

#[cfg(test)]
#[path = "resource_system_tests.rs"]
mod tests;
