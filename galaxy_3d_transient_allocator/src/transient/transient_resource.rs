/// Transient texture and buffer wrappers.
///
/// One generic wrapper serves both resource kinds: it owns the native
/// object, remembers the content hash it was created under, and carries the
/// per-session state (debug name, live allocation, aliasing overlaps) plus a
/// cache of views that survives reuse.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use crate::graphics_device::{
    Buffer, BufferDesc, BufferViewDesc, ResourceView, Texture, TextureDesc, TextureViewDesc,
};
use super::heap::HeapId;
use super::heap_allocator::HeapAllocation;
use super::overlap_tracker::AliasingOverlap;
use super::resource_allocator::AllocationKey;
use super::resource_cache::CachedResource;

// ===== RESOURCE KINDS =====

/// Static description of one kind of transient resource
pub trait TransientResourceKind: 'static {
    /// Creation parameters, hashed together with the heap offset
    type Desc: Clone + Eq + Hash + Debug + Send + Sync;
    /// Native object produced by the backend factory
    type Native: ?Sized + Send + Sync;
    /// View creation parameters, compared by value
    type ViewDesc: Clone + PartialEq + Debug + Send + Sync;

    /// Lowercase name used in logs
    const LABEL: &'static str;

    fn set_native_debug_name(native: &mut Self::Native, name: &str);
}

/// Texture resource kind
#[derive(Debug)]
pub enum TextureKind {}

impl TransientResourceKind for TextureKind {
    type Desc = TextureDesc;
    type Native = dyn Texture;
    type ViewDesc = TextureViewDesc;

    const LABEL: &'static str = "texture";

    fn set_native_debug_name(native: &mut Self::Native, name: &str) {
        native.set_debug_name(name);
    }
}

/// Buffer resource kind
#[derive(Debug)]
pub enum BufferKind {}

impl TransientResourceKind for BufferKind {
    type Desc = BufferDesc;
    type Native = dyn Buffer;
    type ViewDesc = BufferViewDesc;

    const LABEL: &'static str = "buffer";

    fn set_native_debug_name(native: &mut Self::Native, name: &str) {
        native.set_debug_name(name);
    }
}

// ===== HANDLES =====

/// Session-local handle to a transient texture
///
/// Carries the key of the allocation it was created for, so a handle kept
/// after `deallocate_memory` never reaches a later placement of the same
/// object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransientTextureHandle {
    heap_index: u32,
    resource_index: u32,
    allocation: AllocationKey,
}

impl TransientTextureHandle {
    pub(crate) fn new(heap_index: u32, resource_index: u32, allocation: AllocationKey) -> Self {
        Self { heap_index, resource_index, allocation }
    }

    /// Index of the heap in the session that created the texture
    pub fn heap_index(&self) -> u32 {
        self.heap_index
    }

    pub fn resource_index(&self) -> u32 {
        self.resource_index
    }
}

/// Session-local handle to a transient buffer
///
/// Carries the key of the allocation it was created for, so a handle kept
/// after `deallocate_memory` never reaches a later placement of the same
/// object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransientBufferHandle {
    heap_index: u32,
    resource_index: u32,
    allocation: AllocationKey,
}

impl TransientBufferHandle {
    pub(crate) fn new(heap_index: u32, resource_index: u32, allocation: AllocationKey) -> Self {
        Self { heap_index, resource_index, allocation }
    }

    /// Index of the heap in the session that created the buffer
    pub fn heap_index(&self) -> u32 {
        self.heap_index
    }

    pub fn resource_index(&self) -> u32 {
        self.resource_index
    }
}

/// Either kind of transient resource handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientResourceId {
    Texture(TransientTextureHandle),
    Buffer(TransientBufferHandle),
}

impl TransientResourceId {
    /// Key of the allocation the handle was created for
    pub(crate) fn allocation_key(&self) -> AllocationKey {
        match self {
            TransientResourceId::Texture(handle) => handle.allocation,
            TransientResourceId::Buffer(handle) => handle.allocation,
        }
    }

    /// Whether both handles address the same object, whatever the placement
    pub fn is_same_object(&self, other: &TransientResourceId) -> bool {
        match (self, other) {
            (TransientResourceId::Texture(a), TransientResourceId::Texture(b)) =>
                (a.heap_index, a.resource_index) == (b.heap_index, b.resource_index),
            (TransientResourceId::Buffer(a), TransientResourceId::Buffer(b)) =>
                (a.heap_index, a.resource_index) == (b.heap_index, b.resource_index),
            _ => false,
        }
    }
}

impl From<TransientTextureHandle> for TransientResourceId {
    fn from(handle: TransientTextureHandle) -> Self {
        TransientResourceId::Texture(handle)
    }
}

impl From<TransientBufferHandle> for TransientResourceId {
    fn from(handle: TransientBufferHandle) -> Self {
        TransientResourceId::Buffer(handle)
    }
}

// ===== INITIALIZER =====

/// Everything a backend factory needs to place a native resource
pub struct TransientResourceInitializer<'a, D> {
    /// Creation parameters of the resource
    pub desc: &'a D,
    /// Heap the resource is placed in
    pub heap_id: HeapId,
    /// Placement inside the heap
    pub allocation: HeapAllocation,
    /// Content hash of `(desc, offset)`
    pub hash: u64,
}

// ===== TRANSIENT RESOURCE =====

/// A native resource placed in a transient heap, plus its session state
pub struct TransientResource<K: TransientResourceKind> {
    native: Box<K::Native>,
    desc: K::Desc,
    hash: u64,
    heap_id: HeapId,
    heap_offset: u64,
    size: u64,
    name: String,
    allocation: Option<AllocationKey>,
    aliasing_overlaps: Vec<AliasingOverlap>,
    views: Vec<(K::ViewDesc, Arc<dyn ResourceView>)>,
    acquire_count: u64,
}

/// Transient texture
pub type TransientTexture = TransientResource<TextureKind>;

/// Transient buffer
pub type TransientBuffer = TransientResource<BufferKind>;

impl<K: TransientResourceKind> TransientResource<K> {
    pub(crate) fn new(
        native: Box<K::Native>,
        initializer: &TransientResourceInitializer<'_, K::Desc>,
    ) -> Self {
        Self {
            native,
            desc: initializer.desc.clone(),
            hash: initializer.hash,
            heap_id: initializer.heap_id,
            heap_offset: initializer.allocation.offset,
            size: initializer.allocation.size,
            name: String::new(),
            allocation: None,
            aliasing_overlaps: Vec::new(),
            views: Vec::new(),
            acquire_count: 0,
        }
    }

    /// Native object created by the backend
    pub fn native(&self) -> &K::Native {
        &*self.native
    }

    pub fn native_mut(&mut self) -> &mut K::Native {
        &mut *self.native
    }

    pub fn desc(&self) -> &K::Desc {
        &self.desc
    }

    /// Content hash of `(desc, heap offset)`
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Debug name given by the last session that used this resource
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn heap_id(&self) -> HeapId {
        self.heap_id
    }

    pub fn heap_offset(&self) -> u64 {
        self.heap_offset
    }

    /// Allocation size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Resources whose memory this one reuses, for the current placement
    pub fn aliasing_overlaps(&self) -> &[AliasingOverlap] {
        &self.aliasing_overlaps
    }

    /// Whether the resource currently holds a live heap allocation
    pub fn is_allocated(&self) -> bool {
        self.allocation.is_some()
    }

    /// Number of times this object was handed out (first creation included)
    pub fn acquire_count(&self) -> u64 {
        self.acquire_count
    }

    /// Get a cached view matching `desc`, or create and cache one
    pub fn get_or_create_view<F>(&mut self, desc: &K::ViewDesc, create_fn: F) -> Arc<dyn ResourceView>
    where
        F: FnOnce(&K::Native, &K::ViewDesc) -> Arc<dyn ResourceView>,
    {
        if let Some((_, view)) = self.views.iter().find(|(cached, _)| cached == desc) {
            return view.clone();
        }

        let view = create_fn(&*self.native, desc);
        self.views.push((desc.clone(), view.clone()));
        view
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    // ===== SESSION STATE (crate internal) =====

    pub(crate) fn allocation_key(&self) -> Option<AllocationKey> {
        self.allocation
    }

    /// Hand the resource to a new placement
    pub(crate) fn begin_allocation(
        &mut self,
        name: &str,
        allocation: AllocationKey,
        aliasing_overlaps: Vec<AliasingOverlap>,
    ) {
        if self.name != name {
            self.name = name.to_string();
            K::set_native_debug_name(&mut *self.native, name);
        }
        self.allocation = Some(allocation);
        self.aliasing_overlaps = aliasing_overlaps;
        self.acquire_count += 1;
    }

    /// Detach the live allocation if it is `key`
    pub(crate) fn end_allocation(&mut self, key: AllocationKey) -> bool {
        if self.allocation != Some(key) {
            return false;
        }
        self.allocation = None;
        true
    }

    /// Drop per-session state before going back to the cache
    pub(crate) fn reset_session_state(&mut self) {
        self.allocation = None;
        self.aliasing_overlaps.clear();
    }
}

impl<K: TransientResourceKind> CachedResource for TransientResource<K> {
    fn cache_hash(&self) -> u64 {
        self.hash
    }
}

impl<K: TransientResourceKind> Debug for TransientResource<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransientResource")
            .field("kind", &K::LABEL)
            .field("name", &self.name)
            .field("desc", &self.desc)
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("heap_id", &self.heap_id)
            .field("heap_offset", &self.heap_offset)
            .field("size", &self.size)
            .field("allocated", &self.allocation.is_some())
            .field("aliasing_overlaps", &self.aliasing_overlaps.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "transient_resource_tests.rs"]
mod tests;
