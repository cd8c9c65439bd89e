/*!
# Galaxy 3D Transient Allocator

Transient GPU memory allocator for the Galaxy 3D engine.

Short-lived textures and buffers (one frame, one pass) are placed in a small
number of large heaps, reused aggressively across frames and tracked so that
resources sharing bytes can be synchronized by the graphics backend.

## Architecture

- **ResourceSystem**: process-wide pool of heaps, garbage collection, statistics
- **ResourceAllocator**: one allocation session, returns its heaps on `freeze`
- **HeapAllocator**: first-fit free list of byte ranges for one heap
- **OverlapTracker**: aliasing bookkeeping for one heap
- **ResourceCache**: generational cache of native objects, shared by textures and buffers

Native textures, buffers and views are created by backend factories passed
in by the caller (see `galaxy3d::render`).
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod transient;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine service registry
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend collaborator types (descriptors, native object traits, command context)
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Transient allocator sub-module
    pub mod transient {
        pub use crate::transient::*;
    }
}
