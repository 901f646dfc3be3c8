//! Pixel formats.

/// Storage format of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Unknown,

    // Block compressed
    Bc1Unorm,
    Bc3Unorm,
    Bc5Unorm,

    // Typeless, viewed through a typed format
    R8Typeless,
    R16Typeless,
    R32Typeless,
    R24G8Typeless,
    R24UnormX8Typeless,

    // One channel
    R8Unorm,
    R16Unorm,
    R16Float,
    R32Float,

    // Two channels
    Rg8Unorm,
    Rg16Unorm,
    Rg16Float,
    Rg32Float,

    // Four channels
    Rgba8Unorm,
    Rgba16Float,
    Rgba32Float,

    // Depth / stencil
    D16Unorm,
    D32Float,
    D24UnormS8Uint,
}

impl PixelFormat {
    /// Bytes per 4×4 block for compressed formats, per pixel otherwise.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::Bc1Unorm => 8,
            Self::Bc3Unorm | Self::Bc5Unorm => 16,
            Self::R8Typeless | Self::R8Unorm => 1,
            Self::R16Typeless | Self::R16Unorm | Self::R16Float | Self::Rg8Unorm | Self::D16Unorm => 2,
            Self::R32Typeless
            | Self::R24G8Typeless
            | Self::R24UnormX8Typeless
            | Self::R32Float
            | Self::Rg16Unorm
            | Self::Rg16Float
            | Self::Rgba8Unorm
            | Self::D32Float
            | Self::D24UnormS8Uint => 4,
            Self::Rg32Float | Self::Rgba16Float => 8,
            Self::Rgba32Float => 16,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::Bc1Unorm | Self::Bc3Unorm | Self::Bc5Unorm)
    }

    #[inline]
    #[must_use]
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::D16Unorm | Self::D32Float | Self::D24UnormS8Uint)
    }

    /// Bytes occupied by one `width × height` image.
    #[must_use]
    pub const fn image_size(self, width: u32, height: u32) -> usize {
        if self.is_compressed() {
            let blocks_w = width.div_ceil(4) as usize;
            let blocks_h = height.div_ceil(4) as usize;
            blocks_w * blocks_h * self.block_size()
        } else {
            width as usize * height as usize * self.block_size()
        }
    }
}
