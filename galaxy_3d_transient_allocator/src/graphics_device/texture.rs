/// Texture trait, texture descriptor and usage flags for transient textures

use bitflags::bitflags;
use super::heap_flags::HeapFlags;

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8_UNORM,
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,
    R11G11B10_UFLOAT,
    R32_UINT,
    R32_SFLOAT,
    R32G32B32A32_SFLOAT,
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

/// Texture dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    Tex2D,
    Tex2DArray,
    Tex3D,
    Cube,
}

bitflags! {
    /// Texture usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Sampled in shaders
        const SAMPLED = 1 << 0;
        /// Written through an unordered-access view
        const STORAGE = 1 << 1;
        /// Color attachment
        const RENDER_TARGET = 1 << 2;
        /// Depth/stencil attachment
        const DEPTH_STENCIL = 1 << 3;
    }
}

/// Descriptor for creating a transient texture
///
/// Part of the content hash used to find cached native textures, so two
/// descriptors that compare equal must describe interchangeable textures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    /// Depth for 3D textures, layer count for arrays and cubes
    pub depth_or_array_layers: u32,
    pub mip_levels: u32,
    pub sample_count: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Simple single-mip 2D texture
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            dimension: TextureDimension::Tex2D,
            width,
            height,
            depth_or_array_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            format,
            usage,
        }
    }

    /// Whether the texture is bound as a color or depth attachment
    pub fn is_render_target(&self) -> bool {
        self.usage.intersects(TextureUsage::RENDER_TARGET | TextureUsage::DEPTH_STENCIL)
    }

    /// Heap capability needed to place this texture
    pub fn required_heap_flags(&self) -> HeapFlags {
        if self.is_render_target() {
            HeapFlags::ALLOW_RENDER_TARGETS
        } else {
            HeapFlags::ALLOW_TEXTURES
        }
    }
}

/// Native texture object created by a platform backend
///
/// Placed in a transient heap by the backend's factory function.
/// The object is destroyed when dropped.
pub trait Texture: Send + Sync {
    /// Rename the native object (called every time the transient texture is reused)
    fn set_debug_name(&mut self, name: &str);
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
