/// Tests for TransientResource (texture and buffer wrappers)
///
/// These tests validate session state transitions, debug naming and the
/// per-resource view cache.

use super::*;
use slotmap::SlotMap;
use crate::graphics_device::mock_graphics_device::{MockBuffer, MockCounters, MockTexture, MockView};
use crate::graphics_device::{BufferUsage, TextureFormat, TextureUsage, ViewKind};

fn allocation(offset: u64, size: u64) -> HeapAllocation {
    HeapAllocation { size, offset, alignment_pad: 0, heap_index: 0 }
}

fn make_texture(counters: &Arc<MockCounters>) -> TransientTexture {
    let desc = TextureDesc::new_2d(256, 256, TextureFormat::R8G8B8A8_UNORM, TextureUsage::SAMPLED);
    let initializer = TransientResourceInitializer {
        desc: &desc,
        heap_id: HeapId::new(4),
        allocation: allocation(4096, 1024),
        hash: 0xABCD,
    };
    TransientResource::new(Box::new(MockTexture::new(4096, counters)) as Box<dyn Texture>, &initializer)
}

fn mock_view(desc: &TextureViewDesc) -> Arc<dyn ResourceView> {
    Arc::new(MockView { kind: desc.kind })
}

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_new_texture_remembers_placement() {
    let counters = MockCounters::new();
    let texture = make_texture(&counters);

    assert_eq!(texture.hash(), 0xABCD);
    assert_eq!(texture.heap_id(), HeapId::new(4));
    assert_eq!(texture.heap_offset(), 4096);
    assert_eq!(texture.size(), 1024);
    assert_eq!(texture.desc().width, 256);
    assert_eq!(texture.cache_hash(), 0xABCD);
    assert!(!texture.is_allocated());
    assert_eq!(texture.acquire_count(), 0);
    assert_eq!(counters.created(), 1);
}

#[test]
fn test_new_buffer() {
    let counters = MockCounters::new();
    let desc = BufferDesc::new(512, 16, BufferUsage::STORAGE);
    let initializer = TransientResourceInitializer {
        desc: &desc,
        heap_id: HeapId::new(1),
        allocation: allocation(0, 512),
        hash: 42,
    };
    let buffer: TransientBuffer = TransientResource::new(Box::new(MockBuffer::new(0, &counters)) as Box<dyn Buffer>, &initializer);

    assert_eq!(buffer.desc().size, 512);
    assert_eq!(buffer.hash(), 42);
    assert!(format!("{:?}", buffer).contains("buffer"));
}

#[test]
fn test_dropping_resource_destroys_native() {
    let counters = MockCounters::new();
    let texture = make_texture(&counters);
    drop(texture);
    assert_eq!(counters.alive(), 0);
}

// ============================================================================
// Tests: Session state
// ============================================================================

#[test]
fn test_begin_and_end_allocation() {
    let counters = MockCounters::new();
    let mut keys: SlotMap<AllocationKey, ()> = SlotMap::with_key();
    let key = keys.insert(());
    let mut texture = make_texture(&counters);

    let other = TransientResourceId::Texture(TransientTextureHandle::new(0, 9, AllocationKey::default()));
    texture.begin_allocation("SceneColor", key, vec![AliasingOverlap { resource: other }]);

    assert!(texture.is_allocated());
    assert_eq!(texture.name(), "SceneColor");
    assert_eq!(texture.aliasing_overlaps().len(), 1);
    assert_eq!(texture.acquire_count(), 1);
    assert_eq!(texture.allocation_key(), Some(key));

    assert!(texture.end_allocation(key));
    assert!(!texture.is_allocated());
    assert!(!texture.end_allocation(key));
}

#[test]
fn test_end_allocation_ignores_other_keys() {
    let counters = MockCounters::new();
    let mut keys: SlotMap<AllocationKey, ()> = SlotMap::with_key();
    let released = keys.insert(());
    let live = keys.insert(());
    let mut texture = make_texture(&counters);

    texture.begin_allocation("First", released, Vec::new());
    assert!(texture.end_allocation(released));
    texture.begin_allocation("Second", live, Vec::new());

    assert!(!texture.end_allocation(released));
    assert_eq!(texture.allocation_key(), Some(live));
    assert!(texture.end_allocation(live));
}

#[test]
fn test_reuse_renames_native_object() {
    let counters = MockCounters::new();
    let mut keys: SlotMap<AllocationKey, ()> = SlotMap::with_key();
    let mut texture = make_texture(&counters);

    let first = keys.insert(());
    let second = keys.insert(());
    texture.begin_allocation("GBufferA", first, Vec::new());
    texture.end_allocation(first);
    texture.begin_allocation("Bloom", second, Vec::new());

    assert_eq!(texture.name(), "Bloom");
    assert_eq!(texture.acquire_count(), 2);
    texture.end_allocation(second);
}

#[test]
fn test_reset_session_state_clears_overlaps() {
    let counters = MockCounters::new();
    let mut keys: SlotMap<AllocationKey, ()> = SlotMap::with_key();
    let mut texture = make_texture(&counters);
    let other = TransientResourceId::Buffer(TransientBufferHandle::new(1, 0, AllocationKey::default()));

    texture.begin_allocation("Temp", keys.insert(()), vec![AliasingOverlap { resource: other }]);
    texture.reset_session_state();

    assert!(!texture.is_allocated());
    assert!(texture.aliasing_overlaps().is_empty());
    // Name survives until the next session renames it
    assert_eq!(texture.name(), "Temp");
}

// ============================================================================
// Tests: View cache
// ============================================================================

#[test]
fn test_view_cache_reuses_equal_descs() {
    let counters = MockCounters::new();
    let mut texture = make_texture(&counters);
    let srv = TextureViewDesc::whole(ViewKind::ShaderResource);

    let first = texture.get_or_create_view(&srv, |_, desc| mock_view(desc));
    let second = texture.get_or_create_view(&srv, |_, _| panic!("view must come from the cache"));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(texture.view_count(), 1);
}

#[test]
fn test_view_cache_distinguishes_descs() {
    let counters = MockCounters::new();
    let mut texture = make_texture(&counters);

    let srv = texture.get_or_create_view(&TextureViewDesc::whole(ViewKind::ShaderResource), |_, desc| mock_view(desc));
    let uav = texture.get_or_create_view(&TextureViewDesc::whole(ViewKind::UnorderedAccess), |_, desc| mock_view(desc));
    let mip1 = texture.get_or_create_view(
        &TextureViewDesc { first_mip: 1, ..TextureViewDesc::whole(ViewKind::ShaderResource) },
        |_, desc| mock_view(desc),
    );

    assert_eq!(srv.kind(), ViewKind::ShaderResource);
    assert_eq!(uav.kind(), ViewKind::UnorderedAccess);
    assert_eq!(mip1.kind(), ViewKind::ShaderResource);
    assert_eq!(texture.view_count(), 3);
}

#[test]
fn test_handle_conversions() {
    let texture = TransientTextureHandle::new(2, 5, AllocationKey::default());
    let buffer = TransientBufferHandle::new(3, 1, AllocationKey::default());

    assert_eq!(texture.heap_index(), 2);
    assert_eq!(texture.resource_index(), 5);
    assert_eq!(TransientResourceId::from(texture), TransientResourceId::Texture(texture));
    assert_eq!(TransientResourceId::from(buffer), TransientResourceId::Buffer(buffer));
}

#[test]
fn test_same_object_ignores_allocation_key() {
    let mut keys: SlotMap<AllocationKey, ()> = SlotMap::with_key();
    let first = TransientTextureHandle::new(0, 1, keys.insert(()));
    let second = TransientTextureHandle::new(0, 1, keys.insert(()));
    let id = TransientResourceId::from(first);

    assert_ne!(first, second);
    assert!(id.is_same_object(&second.into()));
    assert!(!id.is_same_object(&TransientTextureHandle::new(0, 2, AllocationKey::default()).into()));
    assert!(!id.is_same_object(&TransientBufferHandle::new(0, 1, AllocationKey::default()).into()));
}
