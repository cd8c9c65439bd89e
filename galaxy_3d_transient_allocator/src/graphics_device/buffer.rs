/// Buffer trait, buffer descriptor and usage flags for transient buffers

use bitflags::bitflags;
use super::heap_flags::HeapFlags;

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const VERTEX = 1 << 0;
        const INDEX = 1 << 1;
        const UNIFORM = 1 << 2;
        /// Read/write storage buffer (unordered access)
        const STORAGE = 1 << 3;
        const INDIRECT = 1 << 4;
    }
}

/// Descriptor for creating a transient buffer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Element stride in bytes (0 for raw buffers)
    pub stride: u32,
    pub usage: BufferUsage,
}

impl BufferDesc {
    pub fn new(size: u64, stride: u32, usage: BufferUsage) -> Self {
        Self { size, stride, usage }
    }

    /// Heap capability needed to place this buffer
    pub fn required_heap_flags(&self) -> HeapFlags {
        HeapFlags::ALLOW_BUFFERS
    }
}

/// Native buffer object created by a platform backend
///
/// The buffer is destroyed when dropped.
pub trait Buffer: Send + Sync {
    /// Rename the native object (called every time the transient buffer is reused)
    fn set_debug_name(&mut self, name: &str);
}
