/// Transient allocation session.
///
/// A `ResourceAllocator` places transient textures and buffers for one unit
/// of work (typically one frame or one pass). It borrows heaps from the
/// `ResourceSystem` as it needs memory, places resources in them with one
/// `HeapAllocator` and one `OverlapTracker` per heap, and returns every heap
/// to the system in `freeze`.
///
/// A session is used from one thread at a time. Resources are addressed by
/// the Copy handles returned from `create_texture` / `create_buffer`; the
/// objects themselves stay owned by the heap that holds them.

use std::sync::Arc;
use slotmap::{new_key_type, SlotMap};
use crate::error::{Error, Result};
use crate::graphics_device::{Buffer, BufferDesc, CommandContext, HeapFlags, Texture, TextureDesc};
use super::heap::Heap;
use super::heap_allocator::{HeapAllocation, HeapAllocator};
use super::overlap_tracker::OverlapTracker;
use super::resource_system::ResourceSystem;
use super::stats::TransientSessionStats;
use super::transient_resource::{
    TransientBuffer, TransientBufferHandle, TransientResourceId, TransientResourceInitializer,
    TransientTexture, TransientTextureHandle,
};

const SOURCE: &str = "galaxy3d::transient::ResourceAllocator";

new_key_type! {
    /// Key of a live allocation in its session
    pub struct AllocationKey;
}

/// A heap borrowed from the system for the duration of the session
struct SessionHeap {
    heap: Heap,
    allocator: HeapAllocator,
    tracker: OverlapTracker,
}

/// A live placement and the resource occupying it
#[derive(Debug, Clone, Copy)]
struct SessionAllocation {
    resource: TransientResourceId,
    allocation: HeapAllocation,
}

/// Transient allocation session
pub struct ResourceAllocator {
    system: Arc<ResourceSystem>,
    /// In acquisition order; the position is the heap index in handles
    heaps: Vec<SessionHeap>,
    allocations: SlotMap<AllocationKey, SessionAllocation>,
    stats: TransientSessionStats,
}

impl ResourceAllocator {
    /// Open a session on `system`
    pub fn new(system: Arc<ResourceSystem>) -> Self {
        Self {
            system,
            heaps: Vec::new(),
            allocations: SlotMap::with_key(),
            stats: TransientSessionStats::default(),
        }
    }

    /// Place a texture of `size` bytes and get a native object for it
    ///
    /// The object comes from the heap's caches when one was created earlier
    /// for the same descriptor at the same offset; otherwise `create_fn`
    /// builds it. The texture is renamed `name` and remembers the resources
    /// whose memory it aliases.
    ///
    /// # Errors
    ///
    /// - `AllocationTooLarge` if `size` exceeds the maximum heap size
    /// - `InvalidResource` if `size` is zero
    /// - `OutOfMemory` if a heap sized for the request cannot place it
    pub fn create_texture<F>(
        &mut self,
        desc: &TextureDesc,
        name: &str,
        size: u64,
        alignment: u32,
        create_fn: F,
    ) -> Result<TransientTextureHandle>
    where
        F: FnOnce(&TransientResourceInitializer<'_, TextureDesc>) -> Box<dyn Texture>,
    {
        let allocation = self.allocate(size, alignment, desc.required_heap_flags())?;
        let heap_index = allocation.heap_index;
        let session_heap = &mut self.heaps[heap_index as usize];

        let resource_index = session_heap.heap.acquire_texture(desc, allocation, create_fn);
        let key = self.allocations.insert_with_key(|key| SessionAllocation {
            resource: TransientTextureHandle::new(heap_index, resource_index, key).into(),
            allocation,
        });
        let handle = TransientTextureHandle::new(heap_index, resource_index, key);
        let id = TransientResourceId::from(handle);

        let mut overlaps = session_heap.tracker.track(id, allocation.offset, allocation.end());
        overlaps.retain(|overlap| !overlap.resource.is_same_object(&id));

        let texture = session_heap.heap.texture_mut(resource_index)
            .ok_or_else(|| crate::engine_err!(SOURCE, "Heap lost texture {}", resource_index))?;
        texture.begin_allocation(name, key, overlaps);

        self.stats.textures.record_allocation(size);

        crate::engine_trace!(SOURCE, "Texture '{}' at heap {} offset {} ({} bytes)",
            name, heap_index, allocation.offset, size);

        Ok(handle)
    }

    /// Place a buffer of `size` bytes and get a native object for it
    ///
    /// Same behavior and errors as `create_texture`.
    pub fn create_buffer<F>(
        &mut self,
        desc: &BufferDesc,
        name: &str,
        size: u64,
        alignment: u32,
        create_fn: F,
    ) -> Result<TransientBufferHandle>
    where
        F: FnOnce(&TransientResourceInitializer<'_, BufferDesc>) -> Box<dyn Buffer>,
    {
        let allocation = self.allocate(size, alignment, desc.required_heap_flags())?;
        let heap_index = allocation.heap_index;
        let session_heap = &mut self.heaps[heap_index as usize];

        let resource_index = session_heap.heap.acquire_buffer(desc, allocation, create_fn);
        let key = self.allocations.insert_with_key(|key| SessionAllocation {
            resource: TransientBufferHandle::new(heap_index, resource_index, key).into(),
            allocation,
        });
        let handle = TransientBufferHandle::new(heap_index, resource_index, key);
        let id = TransientResourceId::from(handle);

        let mut overlaps = session_heap.tracker.track(id, allocation.offset, allocation.end());
        overlaps.retain(|overlap| !overlap.resource.is_same_object(&id));

        let buffer = session_heap.heap.buffer_mut(resource_index)
            .ok_or_else(|| crate::engine_err!(SOURCE, "Heap lost buffer {}", resource_index))?;
        buffer.begin_allocation(name, key, overlaps);

        self.stats.buffers.record_allocation(size);

        crate::engine_trace!(SOURCE, "Buffer '{}' at heap {} offset {} ({} bytes)",
            name, heap_index, allocation.offset, size);

        Ok(handle)
    }

    /// Find a placement in the session's heaps, borrowing a new heap if none fits
    fn allocate(&mut self, size: u64, alignment: u32, flags: HeapFlags) -> Result<HeapAllocation> {
        let max_heap_size = self.system.config().maximum_heap_size;
        if size > max_heap_size {
            crate::engine_warn!(SOURCE,
                "Transient allocation of {} bytes exceeds the maximum heap size ({} bytes)",
                size, max_heap_size);
            return Err(Error::AllocationTooLarge { size, max_heap_size });
        }
        if size == 0 {
            return Err(Error::InvalidResource("zero-sized transient allocation".to_string()));
        }

        for session_heap in &mut self.heaps {
            if !session_heap.heap.is_allocation_supported(size, flags) {
                continue;
            }
            if let Some(allocation) = session_heap.allocator.allocate(size, alignment) {
                return Ok(allocation);
            }
        }

        let heap = self.system.acquire_heap(size, flags)?;
        let heap_index = self.heaps.len() as u32;
        let mut allocator = HeapAllocator::new(heap.capacity(), heap.alignment(), heap_index);
        let allocation = allocator.allocate(size, alignment);

        crate::engine_debug!(SOURCE, "Acquired heap {} ({} bytes) as session heap {}",
            heap.id().raw(), heap.capacity(), heap_index);

        // Keep the heap even on failure so that freeze returns it
        self.heaps.push(SessionHeap { heap, allocator, tracker: OverlapTracker::new() });

        match allocation {
            Some(allocation) => Ok(allocation),
            None => {
                crate::engine_error!(SOURCE,
                    "Fresh heap {} could not place {} bytes (alignment {})",
                    heap_index, size, alignment);
                debug_assert!(false, "fresh transient heap could not place its first allocation");
                Err(Error::OutOfMemory)
            }
        }
    }

    /// Release the memory of a resource created by this session
    ///
    /// The bytes become available to later placements in this session. The
    /// resource object itself stays with its heap until `freeze`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResource` for a handle this session does not know, a
    /// resource that is not currently allocated, or a handle whose allocation
    /// was already released (even if the object was placed again since).
    pub fn deallocate_memory(&mut self, resource: impl Into<TransientResourceId>) -> Result<()> {
        let id = resource.into();
        let key = id.allocation_key();
        if !self.allocations.contains_key(key) {
            return Err(Error::InvalidResource(format!("{:?} is not allocated", id)));
        }

        let ended = match id {
            TransientResourceId::Texture(handle) => self.texture_mut(handle)
                .map(|texture| texture.end_allocation(key)),
            TransientResourceId::Buffer(handle) => self.buffer_mut(handle)
                .map(|buffer| buffer.end_allocation(key)),
        };
        match ended {
            Some(true) => {}
            Some(false) | None => {
                return Err(Error::InvalidResource(format!("{:?} does not belong to this session", id)));
            }
        }

        let entry = self.allocations.remove(key)
            .ok_or_else(|| Error::InvalidResource(format!("{:?} has a stale allocation key", id)))?;

        let session_heap = self.heaps.get_mut(entry.allocation.heap_index as usize)
            .ok_or_else(|| crate::engine_err!(SOURCE,
                "Allocation refers to missing session heap {}", entry.allocation.heap_index))?;
        session_heap.allocator.deallocate(entry.allocation);

        match id {
            TransientResourceId::Texture(_) => self.stats.textures.record_deallocation(entry.allocation.size),
            TransientResourceId::Buffer(_) => self.stats.buffers.record_deallocation(entry.allocation.size),
        }

        Ok(())
    }

    /// End the session and return every heap to the system
    ///
    /// Allocations still live are released first. The session statistics
    /// are folded into the system once `context` runs the enqueued work.
    pub fn freeze(mut self, context: &mut dyn CommandContext) -> Result<()> {
        let mut session_heaps = std::mem::take(&mut self.heaps);

        if !self.allocations.is_empty() {
            crate::engine_debug!(SOURCE, "Freezing with {} live allocations", self.allocations.len());
        }
        for (_, entry) in self.allocations.drain() {
            if let Some(session_heap) = session_heaps.get_mut(entry.allocation.heap_index as usize) {
                session_heap.allocator.deallocate(entry.allocation);
            }
            match entry.resource {
                TransientResourceId::Texture(_) => self.stats.textures.record_deallocation(entry.allocation.size),
                TransientResourceId::Buffer(_) => self.stats.buffers.record_deallocation(entry.allocation.size),
            }
        }

        let heaps: Vec<Heap> = session_heaps.into_iter()
            .map(|session_heap| session_heap.heap)
            .collect();
        let heap_count = heaps.len();
        self.system.forfeit_heaps(heaps)?;

        let system = self.system.clone();
        let stats = self.stats;
        context.enqueue_lambda(Box::new(move || {
            if let Err(e) = system.accumulate_stats(&stats) {
                crate::engine_error!(SOURCE, "Failed to accumulate session stats: {}", e);
            }
        }));

        crate::engine_trace!(SOURCE, "Frozen: {} heaps forfeited, {} textures / {} buffers allocated",
            heap_count, stats.textures.allocation_count, stats.buffers.allocation_count);

        Ok(())
    }

    // ===== RESOURCE ACCESS =====

    pub fn texture(&self, handle: TransientTextureHandle) -> Option<&TransientTexture> {
        self.heaps.get(handle.heap_index() as usize)?
            .heap.texture(handle.resource_index())
    }

    pub fn texture_mut(&mut self, handle: TransientTextureHandle) -> Option<&mut TransientTexture> {
        self.heaps.get_mut(handle.heap_index() as usize)?
            .heap.texture_mut(handle.resource_index())
    }

    pub fn buffer(&self, handle: TransientBufferHandle) -> Option<&TransientBuffer> {
        self.heaps.get(handle.heap_index() as usize)?
            .heap.buffer(handle.resource_index())
    }

    pub fn buffer_mut(&mut self, handle: TransientBufferHandle) -> Option<&mut TransientBuffer> {
        self.heaps.get_mut(handle.heap_index() as usize)?
            .heap.buffer_mut(handle.resource_index())
    }

    // ===== ACCESSORS =====

    pub fn system(&self) -> &Arc<ResourceSystem> {
        &self.system
    }

    /// Heaps borrowed by this session so far
    pub fn heap_count(&self) -> usize {
        self.heaps.len()
    }

    pub fn heap(&self, heap_index: u32) -> Option<&Heap> {
        self.heaps.get(heap_index as usize).map(|session_heap| &session_heap.heap)
    }

    pub fn heap_allocator(&self, heap_index: u32) -> Option<&HeapAllocator> {
        self.heaps.get(heap_index as usize).map(|session_heap| &session_heap.allocator)
    }

    pub fn overlap_tracker(&self, heap_index: u32) -> Option<&OverlapTracker> {
        self.heaps.get(heap_index as usize).map(|session_heap| &session_heap.tracker)
    }

    /// Live allocations
    pub fn allocation_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn stats(&self) -> &TransientSessionStats {
        &self.stats
    }
}

impl Drop for ResourceAllocator {
    fn drop(&mut self) {
        if !self.heaps.is_empty() && !std::thread::panicking() {
            crate::engine_error!(SOURCE,
                "Session dropped without freeze: {} heaps are never returned to the system",
                self.heaps.len());
            debug_assert!(false, "transient allocator session dropped without freeze");
        }
    }
}

impl std::fmt::Debug for ResourceAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceAllocator")
            .field("heaps", &self.heaps.len())
            .field("allocations", &self.allocations.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
#[path = "resource_allocator_tests.rs"]
mod tests;
