/// Graphics device module - collaborator types at the transient allocator boundary
///
/// Descriptors, native object traits and the command context used by the
/// transient allocator. Platform backends implement the traits; the allocator
/// only stores the native objects and never inspects them.

pub mod texture;
pub mod buffer;
pub mod view;
pub mod heap_flags;
pub mod command_context;

pub use texture::*;
pub use buffer::*;
pub use view::*;
pub use heap_flags::*;
pub use command_context::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
