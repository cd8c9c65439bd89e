/// Shader-resource / unordered-access views of transient resources

use super::texture::TextureFormat;

/// Which kind of view a descriptor asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Read-only view
    ShaderResource,
    /// Read-write view
    UnorderedAccess,
}

/// Texture view creation parameters
///
/// Views are cached per transient texture and looked up by value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureViewDesc {
    pub kind: ViewKind,
    /// Reinterpreted format, `None` keeps the texture format
    pub format: Option<TextureFormat>,
    pub first_mip: u32,
    pub mip_count: u32,
    pub first_layer: u32,
    pub layer_count: u32,
}

impl TextureViewDesc {
    /// View of the first mip and first layer with the texture's own format
    pub fn whole(kind: ViewKind) -> Self {
        Self {
            kind,
            format: None,
            first_mip: 0,
            mip_count: 1,
            first_layer: 0,
            layer_count: 1,
        }
    }
}

/// Buffer view creation parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BufferViewDesc {
    pub kind: ViewKind,
    /// Byte offset of the first element
    pub offset: u64,
    /// Number of elements
    pub element_count: u32,
    /// Element stride in bytes (0 for raw views)
    pub stride: u32,
}

/// Native view object created by a platform backend
pub trait ResourceView: Send + Sync {
    fn kind(&self) -> ViewKind;
}
