/// Transient heap: a fixed-size byte range plus its resource caches.
///
/// A heap is owned by the `ResourceSystem` while idle and by exactly one
/// `ResourceAllocator` session while in use. Resource objects created on the
/// heap stay with it: in the scratch lists while the session runs, in the
/// caches once the session forfeits the heap.

use std::hash::{Hash, Hasher};
use rustc_hash::FxHasher;
use crate::graphics_device::{Buffer, BufferDesc, HeapFlags, Texture, TextureDesc};
use super::config::TransientAllocatorConfig;
use super::heap_allocator::HeapAllocation;
use super::resource_cache::ResourceCache;
use super::transient_resource::{
    TransientBuffer, TransientResource, TransientResourceInitializer, TransientResourceKind,
    TransientTexture,
};

const SOURCE: &str = "galaxy3d::transient::Heap";

/// Unique id of a heap within its resource system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapId(u64);

impl HeapId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Content hash of a resource request: descriptor and heap offset
///
/// The offset is part of the hash so the same shape placed at two offsets
/// maps to two distinct cached objects.
pub fn compute_resource_hash<D: Hash>(desc: &D, heap_offset: u64) -> u64 {
    let mut hasher = FxHasher::default();
    desc.hash(&mut hasher);
    heap_offset.hash(&mut hasher);
    hasher.finish()
}

/// Transient heap
pub struct Heap {
    id: HeapId,
    capacity: u64,
    alignment: u32,
    flags: HeapFlags,
    texture_cache: ResourceCache<TransientTexture>,
    buffer_cache: ResourceCache<TransientBuffer>,
    /// Textures handed out during the current session
    allocated_textures: Vec<TransientTexture>,
    /// Buffers handed out during the current session
    allocated_buffers: Vec<TransientBuffer>,
    /// Garbage-collection cycle of the last forfeit
    last_used_cycle: u64,
}

impl Heap {
    pub(crate) fn new(
        id: HeapId,
        capacity: u64,
        flags: HeapFlags,
        config: &TransientAllocatorConfig,
    ) -> Self {
        Self {
            id,
            capacity,
            alignment: config.heap_alignment,
            flags,
            texture_cache: ResourceCache::new(config.texture_cache_size, config.garbage_collect_latency),
            buffer_cache: ResourceCache::new(config.buffer_cache_size, config.garbage_collect_latency),
            allocated_textures: Vec::new(),
            allocated_buffers: Vec::new(),
            last_used_cycle: 0,
        }
    }

    /// Whether an allocation of `size` bytes needing `flags` may go in this heap
    pub fn is_allocation_supported(&self, size: u64, flags: HeapFlags) -> bool {
        size <= self.capacity && self.flags.contains(flags)
    }

    /// Get a texture object for `desc` placed at `allocation`
    ///
    /// Looks first in this session's scratch list for an idle object with
    /// the same content hash, then in the texture cache, and only calls
    /// `create_fn` on a miss. Returns the texture's index in the scratch list.
    pub fn acquire_texture<F>(&mut self, desc: &TextureDesc, allocation: HeapAllocation, create_fn: F) -> u32
    where
        F: FnOnce(&TransientResourceInitializer<'_, TextureDesc>) -> Box<dyn Texture>,
    {
        acquire_resource(
            self.id,
            &mut self.texture_cache,
            &mut self.allocated_textures,
            desc,
            allocation,
            create_fn,
        )
    }

    /// Get a buffer object for `desc` placed at `allocation`
    ///
    /// Same lookup order as `acquire_texture`.
    pub fn acquire_buffer<F>(&mut self, desc: &BufferDesc, allocation: HeapAllocation, create_fn: F) -> u32
    where
        F: FnOnce(&TransientResourceInitializer<'_, BufferDesc>) -> Box<dyn Buffer>,
    {
        acquire_resource(
            self.id,
            &mut self.buffer_cache,
            &mut self.allocated_buffers,
            desc,
            allocation,
            create_fn,
        )
    }

    /// Return every object handed out this session to the caches
    ///
    /// Called once per session, when the session forfeits the heap.
    pub fn forfeit_resources(&mut self) {
        let texture_count = self.allocated_textures.len();
        let buffer_count = self.allocated_buffers.len();

        let evicted_textures = self.texture_cache.forfeit(
            self.allocated_textures.drain(..).map(|mut texture| {
                texture.reset_session_state();
                texture
            }),
        );
        let evicted_buffers = self.buffer_cache.forfeit(
            self.allocated_buffers.drain(..).map(|mut buffer| {
                buffer.reset_session_state();
                buffer
            }),
        );

        crate::engine_trace!(SOURCE,
            "Heap {} forfeited {} textures / {} buffers, evicted {} / {}",
            self.id.raw(), texture_count, buffer_count, evicted_textures, evicted_buffers);
    }

    // ===== SCRATCH ACCESS =====

    pub fn texture(&self, index: u32) -> Option<&TransientTexture> {
        self.allocated_textures.get(index as usize)
    }

    pub fn texture_mut(&mut self, index: u32) -> Option<&mut TransientTexture> {
        self.allocated_textures.get_mut(index as usize)
    }

    pub fn buffer(&self, index: u32) -> Option<&TransientBuffer> {
        self.allocated_buffers.get(index as usize)
    }

    pub fn buffer_mut(&mut self, index: u32) -> Option<&mut TransientBuffer> {
        self.allocated_buffers.get_mut(index as usize)
    }

    // ===== ACCESSORS =====

    pub fn id(&self) -> HeapId {
        self.id
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    pub fn flags(&self) -> HeapFlags {
        self.flags
    }

    pub fn last_used_cycle(&self) -> u64 {
        self.last_used_cycle
    }

    pub(crate) fn set_last_used_cycle(&mut self, cycle: u64) {
        self.last_used_cycle = cycle;
    }

    pub fn cached_texture_count(&self) -> usize {
        self.texture_cache.len()
    }

    pub fn cached_buffer_count(&self) -> usize {
        self.buffer_cache.len()
    }

    pub fn allocated_texture_count(&self) -> usize {
        self.allocated_textures.len()
    }

    pub fn allocated_buffer_count(&self) -> usize {
        self.allocated_buffers.len()
    }
}

impl std::fmt::Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("flags", &self.flags)
            .field("cached_textures", &self.texture_cache.len())
            .field("cached_buffers", &self.buffer_cache.len())
            .field("last_used_cycle", &self.last_used_cycle)
            .finish()
    }
}

fn acquire_resource<K, F>(
    heap_id: HeapId,
    cache: &mut ResourceCache<TransientResource<K>>,
    allocated: &mut Vec<TransientResource<K>>,
    desc: &K::Desc,
    allocation: HeapAllocation,
    create_fn: F,
) -> u32
where
    K: TransientResourceKind,
    F: FnOnce(&TransientResourceInitializer<'_, K::Desc>) -> Box<K::Native>,
{
    let hash = compute_resource_hash(desc, allocation.offset);

    if let Some(index) = allocated.iter().position(|r| r.hash() == hash && !r.is_allocated()) {
        crate::engine_trace!(SOURCE, "Reusing session {} {:#018x}", K::LABEL, hash);
        return index as u32;
    }

    let initializer = TransientResourceInitializer { desc, heap_id, allocation, hash };
    let resource = cache.acquire(hash, || {
        crate::engine_trace!(SOURCE, "Creating {} {:#018x} at offset {}",
            K::LABEL, hash, allocation.offset);
        TransientResource::new(create_fn(&initializer), &initializer)
    });

    allocated.push(resource);
    (allocated.len() - 1) as u32
}

#[cfg(test)]
#[path = "heap_tests.rs"]
mod tests;
