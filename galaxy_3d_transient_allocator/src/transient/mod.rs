/// Transient module - short-lived GPU textures and buffers carved out of pooled heaps
///
/// `ResourceSystem` pools heaps process-wide, `ResourceAllocator` places
/// resources for one session, `HeapAllocator` and `OverlapTracker` do the
/// per-heap bookkeeping and `ResourceCache` keeps native objects across
/// sessions.

pub mod config;
pub mod heap_allocator;
pub mod overlap_tracker;
pub mod resource_cache;
pub mod transient_resource;
pub mod heap;
pub mod stats;
pub mod resource_system;
pub mod resource_allocator;

pub use config::TransientAllocatorConfig;
pub use heap_allocator::{HeapAllocation, HeapAllocator, FreeRange};
pub use overlap_tracker::{AliasingOverlap, OverlapTracker, TrackedRange};
pub use resource_cache::{CachedResource, ResourceCache};
pub use transient_resource::{
    BufferKind, TextureKind, TransientBuffer, TransientBufferHandle, TransientResource,
    TransientResourceId, TransientResourceInitializer, TransientResourceKind, TransientTexture,
    TransientTextureHandle,
};
pub use heap::{compute_resource_hash, Heap, HeapId};
pub use stats::{TransientMemoryStats, TransientSessionStats, TransientStatsReport, TransientStatsSink};
pub use resource_system::ResourceSystem;
pub use resource_allocator::{AllocationKey, ResourceAllocator};
