//! Resource descriptions.
//!
//! Plain data handed to the backend at creation time and kept alongside the
//! native object in the resource record. Every description knows its byte
//! footprint (for allocation tracking) and can check itself for values no
//! backend can honour.

use std::sync::Arc;

use bitflags::bitflags;
use stratum_core::limits::{MAX_CONSTANT_BUFFER_SIZE, MIN_CONSTANT_BUFFER_SIZE};

use super::format::PixelFormat;
use super::shader::{ShaderBindings, ShaderStage};

bitflags! {
    /// Ways a surface can be bound to the pipeline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GpuViews: u8 {
        const SHADER_RESOURCE  = 1;
        const UNORDERED_ACCESS = 1 << 1;
        const RENDER_TARGET    = 1 << 2;
        const DEPTH_STENCIL    = 1 << 3;
    }
}

/// Update frequency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    #[default]
    Static,
    /// Updated frequently, e.g. every frame.
    Dynamic,
}

// ─── Surface ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceType {
    #[default]
    Surface2D,
    Surface2DArray,
    SurfaceCube,
    SurfaceCubeArray,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDesc {
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormat,
    pub gpu_views: GpuViews,
    pub mip_levels: u8,
    pub msaa_levels: u8,
    /// Number of surfaces, only meaningful for array types.
    pub array_count: u8,
    pub surface_type: SurfaceType,
    pub usage: Usage,
}

impl Default for SurfaceDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            pixel_format: PixelFormat::Unknown,
            gpu_views: GpuViews::SHADER_RESOURCE,
            mip_levels: 1,
            msaa_levels: 1,
            array_count: 1,
            surface_type: SurfaceType::Surface2D,
            usage: Usage::Static,
        }
    }
}

impl SurfaceDesc {
    /// A single-sample 2D target usable as render target and shader input.
    #[must_use]
    pub fn render_target(width: u16, height: u16, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            gpu_views: GpuViews::RENDER_TARGET | GpuViews::SHADER_RESOURCE,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn depth_buffer(width: u16, height: u16, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            gpu_views: GpuViews::DEPTH_STENCIL,
            ..Default::default()
        }
    }

    fn faces(&self) -> usize {
        let faces = match self.surface_type {
            SurfaceType::Surface2D | SurfaceType::Surface2DArray => 1,
            SurfaceType::SurfaceCube | SurfaceType::SurfaceCubeArray => 6,
        };
        let layers = match self.surface_type {
            SurfaceType::Surface2DArray | SurfaceType::SurfaceCubeArray => usize::from(self.array_count),
            SurfaceType::Surface2D | SurfaceType::SurfaceCube => 1,
        };
        faces * layers
    }

    pub(crate) fn byte_size(&self) -> usize {
        let mut total = 0;
        let (mut w, mut h) = (u32::from(self.width), u32::from(self.height));
        for _ in 0..self.mip_levels.max(1) {
            total += self.pixel_format.image_size(w, h);
            w = (w / 2).max(1);
            h = (h / 2).max(1);
        }
        total * self.faces() * usize::from(self.msaa_levels.max(1))
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("zero extent {}x{}", self.width, self.height));
        }
        if self.pixel_format == PixelFormat::Unknown {
            return Err("unknown pixel format".into());
        }
        if self.gpu_views.is_empty() {
            return Err("no gpu views enabled".into());
        }
        if self.gpu_views.contains(GpuViews::DEPTH_STENCIL) && !self.pixel_format.is_depth() {
            return Err(format!("{:?} cannot back a depth-stencil view", self.pixel_format));
        }
        if self.gpu_views.contains(GpuViews::RENDER_TARGET) && self.pixel_format.is_compressed() {
            return Err(format!("{:?} cannot back a render-target view", self.pixel_format));
        }
        if self.array_count == 0 {
            return Err("array_count must be at least 1".into());
        }
        Ok(())
    }
}

// ─── Buffers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferType {
    #[default]
    Default,
    Structured,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BufferDesc {
    pub buffer_type: BufferType,
    pub num_elements: u32,
    pub element_size: u32,
    pub usage: Usage,
    pub is_uav: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VertexBufferDesc {
    pub num_elements: u32,
    pub element_size: u32,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexBufferDesc {
    pub num_elements: u32,
    pub usage: Usage,
    /// 32-bit indices when set, 16-bit otherwise.
    pub extended32: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConstantBufferDesc {
    /// Size in bytes, a multiple of 16.
    pub size: u32,
}

fn check_elements(num_elements: u32, element_size: u32) -> Result<(), String> {
    if num_elements == 0 || element_size == 0 {
        return Err(format!("empty buffer ({num_elements} x {element_size} bytes)"));
    }
    Ok(())
}

impl BufferDesc {
    pub(crate) fn byte_size(&self) -> usize {
        self.num_elements as usize * self.element_size as usize
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        check_elements(self.num_elements, self.element_size)
    }
}

impl VertexBufferDesc {
    pub(crate) fn byte_size(&self) -> usize {
        self.num_elements as usize * self.element_size as usize
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        check_elements(self.num_elements, self.element_size)
    }
}

impl IndexBufferDesc {
    #[inline]
    #[must_use]
    pub fn index_size(&self) -> usize {
        if self.extended32 { 4 } else { 2 }
    }

    pub(crate) fn byte_size(&self) -> usize {
        self.num_elements as usize * self.index_size()
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.num_elements == 0 {
            return Err("empty index buffer".into());
        }
        if !self.extended32 && self.num_elements > u32::from(u16::MAX) + 1 {
            return Err(format!("{} indices need 32-bit indices", self.num_elements));
        }
        Ok(())
    }
}

impl ConstantBufferDesc {
    pub(crate) fn byte_size(&self) -> usize {
        self.size as usize
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let size = self.size as usize;
        if size == 0 || size > MAX_CONSTANT_BUFFER_SIZE {
            return Err(format!("size {size} outside 1..={MAX_CONSTANT_BUFFER_SIZE}"));
        }
        if size % MIN_CONSTANT_BUFFER_SIZE != 0 {
            return Err(format!("size {size} is not a multiple of {MIN_CONSTANT_BUFFER_SIZE}"));
        }
        Ok(())
    }
}

// ─── Pipeline states ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Transparent,
    Additive,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlendStateDesc {
    pub mode: BlendMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    #[default]
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    #[default]
    Back,
    Front,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasterizerStateDesc {
    pub fill: FillMode,
    pub cull: CullMode,
    pub front: FrontFace,
    pub depth_bias: i32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
}

impl RasterizerStateDesc {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.depth_bias_clamp.is_finite() || !self.slope_scaled_depth_bias.is_finite() {
            return Err("non-finite depth bias".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunc {
    #[default]
    Less,
    LessEqual,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DepthStencilStateDesc {
    pub depth_func: DepthFunc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    Clamp,
    #[default]
    Wrap,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Point,
    #[default]
    Linear,
    Anisotropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparison {
    #[default]
    Never,
    Less,
    LessEqual,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SamplerDesc {
    pub address: AddressMode,
    pub filter: FilterMode,
    pub comparison: Comparison,
}

// ─── Shaders ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ShaderDesc {
    pub stage: ShaderStage,
    pub bytecode: Arc<[u8]>,
    /// Reflected variables, resolved by name through the resource manager.
    pub bindings: ShaderBindings,
}

impl ShaderDesc {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.bytecode.is_empty() {
            return Err(format!("empty {:?} bytecode", self.stage));
        }
        Ok(())
    }
}

/// Vertex input layout, matched against a vertex shader's bytecode.
#[derive(Debug, Clone, Default)]
pub struct InputSignatureDesc {
    pub bytecode: Arc<[u8]>,
    pub elements: Vec<InputElement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputElementType {
    #[default]
    Float,
    Float2,
    Float3,
    Float4,
    UInt,
    UInt2,
    UInt3,
    UInt4,
    SInt,
    SInt2,
    SInt3,
    SInt4,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputElement {
    pub name: String,
    pub semantic_index: u8,
    pub slot: u8,
    pub is_instanced: bool,
    pub element_type: InputElementType,
}

impl InputSignatureDesc {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.elements.is_empty() {
            return Err("no input elements".into());
        }
        if let Some(element) = self
            .elements
            .iter()
            .find(|element| usize::from(element.slot) >= stratum_core::limits::MAX_VERTEX_BUFFERS)
        {
            return Err(format!("element '{}' uses vertex slot {}", element.name, element.slot));
        }
        Ok(())
    }
}
