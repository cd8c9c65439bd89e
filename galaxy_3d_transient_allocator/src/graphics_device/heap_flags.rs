/// Heap capability flags

use bitflags::bitflags;

bitflags! {
    /// What kind of resources a transient heap may hold
    ///
    /// Some platforms cannot mix buffers, plain textures and render targets
    /// in the same heap, so each heap carries the set it was created for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HeapFlags: u32 {
        /// Buffers
        const ALLOW_BUFFERS = 1 << 0;
        /// Shader-resource / unordered-access textures
        const ALLOW_TEXTURES = 1 << 1;
        /// Render-target and depth-stencil textures
        const ALLOW_RENDER_TARGETS = 1 << 2;
        /// Every capability (universal heap)
        const ALLOW_ALL = Self::ALLOW_BUFFERS.bits()
            | Self::ALLOW_TEXTURES.bits()
            | Self::ALLOW_RENDER_TARGETS.bits();
    }
}
