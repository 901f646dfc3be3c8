//! Queue items.
//!
//! Plain data recorded by producers and consumed by the backend at
//! dispatch. Items reference resources only through handles, so a queue can
//! be filled without touching the resource manager.

use smallvec::SmallVec;
use stratum_core::limits::{MAX_PARAMETER_BLOCKS, MAX_RENDER_TARGETS, MAX_VERTEX_BUFFERS};

use crate::queue::QueueItem;
use crate::resources::{
    BlendMode, BlendState, Buffer, ConstantBuffer, DepthStencilState, Handle, IndexBuffer,
    InputSignature, RasterizerState, Sampler, Shader, ShaderVariable, Surface, VertexBuffer,
};

// ============================================================================
// Sort key
// ============================================================================

/// Render sort key (pipeline id + material index + depth).
///
/// ```text
///  63  ..  50  49   ..   30  29    ..    0
///  ┌─────────┬─────────────┬──────────────┐
///  │ pipeline│  material   │    depth     │
///  │ 14 bits │   20 bits   │   30 bits    │
///  └─────────┴─────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderKey(u64);

impl RenderKey {
    #[must_use]
    pub fn new(pipeline_id: u16, material_index: u32, depth: f32) -> Self {
        let p_bits = u64::from(pipeline_id & 0x3FFF) << 50;
        let m_bits = u64::from(material_index & 0xF_FFFF) << 30;
        // Positive floats order like their bit patterns.
        let d_u32 = if depth.is_sign_negative() { 0 } else { depth.to_bits() >> 2 };
        let d_bits = u64::from(d_u32) & 0x3FFF_FFFF;
        Self(p_bits | m_bits | d_bits)
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

// ============================================================================
// Draw description
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Default {
        vertex_count: u32,
        vertex_offset: u32,
    },
    Indexed {
        index_count: u32,
        index_offset: u32,
        vertex_offset: i32,
    },
    Instanced {
        vertex_count: u32,
        vertex_offset: u32,
        instance_count: u32,
        instance_offset: u32,
    },
    IndexedInstanced {
        index_count: u32,
        index_offset: u32,
        vertex_offset: i32,
        instance_count: u32,
        instance_offset: u32,
    },
}

impl Default for DrawCall {
    fn default() -> Self {
        Self::Default {
            vertex_count: 0,
            vertex_offset: 0,
        }
    }
}

impl DrawCall {
    #[inline]
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. } | Self::IndexedInstanced { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

/// Shader stages bound for a draw. An invalid handle leaves the stage unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShaderProgram {
    pub vertex: Handle<Shader>,
    pub pixel: Handle<Shader>,
    pub geometry: Handle<Shader>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Output-merger and rasterizer bindings shared by consecutive draws.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommonStates {
    pub render_targets: [Handle<Surface>; MAX_RENDER_TARGETS],
    pub depth_buffer: Handle<Surface>,
    pub rasterizer: Handle<RasterizerState>,
    pub blend: Handle<BlendState>,
    pub depth_stencil: Handle<DepthStencilState>,
    pub input_signature: Handle<InputSignature>,
    pub viewport: Viewport,
}

// ============================================================================
// Parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Raw bytes copied into a cached constant buffer.
    Constants(SmallVec<[u8; 64]>),
    Surface(Handle<Surface>),
    Buffer(Handle<Buffer>),
    Sampler(Handle<Sampler>),
    ConstantBuffer(Handle<ConstantBuffer>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParameter {
    pub variable: ShaderVariable,
    pub value: ParameterValue,
}

/// Bounded set of parameters, keyed by shader variable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterBlock {
    parameters: SmallVec<[PipelineParameter; MAX_PARAMETER_BLOCKS]>,
}

impl ParameterBlock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `variable`, replacing any earlier value for the same
    /// variable. Returns `false` for an invalid variable or a full block.
    pub fn set(&mut self, variable: ShaderVariable, value: ParameterValue) -> bool {
        if !variable.is_valid() {
            log::warn!("ParameterBlock: ignoring invalid shader variable");
            return false;
        }
        if let Some(existing) = self.parameters.iter_mut().find(|p| p.variable == variable) {
            existing.value = value;
            return true;
        }
        if self.parameters.len() == MAX_PARAMETER_BLOCKS {
            log::warn!("ParameterBlock: full ({MAX_PARAMETER_BLOCKS} parameters), dropping {variable:?}");
            return false;
        }
        self.parameters.push(PipelineParameter { variable, value });
        true
    }

    pub fn set_constants(&mut self, variable: ShaderVariable, bytes: &[u8]) -> bool {
        self.set(variable, ParameterValue::Constants(SmallVec::from_slice(bytes)))
    }

    pub fn set_surface(&mut self, variable: ShaderVariable, surface: Handle<Surface>) -> bool {
        self.set(variable, ParameterValue::Surface(surface))
    }

    pub fn set_sampler(&mut self, variable: ShaderVariable, sampler: Handle<Sampler>) -> bool {
        self.set(variable, ParameterValue::Sampler(sampler))
    }

    #[must_use]
    pub fn get(&self, variable: ShaderVariable) -> Option<&ParameterValue> {
        self.parameters
            .iter()
            .find(|p| p.variable == variable)
            .map(|p| &p.value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PipelineParameter> {
        self.parameters.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn clear(&mut self) {
        self.parameters.clear();
    }
}

impl<'a> IntoIterator for &'a ParameterBlock {
    type Item = &'a PipelineParameter;
    type IntoIter = std::slice::Iter<'a, PipelineParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A surface a queue reads that another layer writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dependency {
    pub variable: ShaderVariable,
    pub surface: Handle<Surface>,
}

// ============================================================================
// Items
// ============================================================================

/// One draw.
#[derive(Debug, Clone, Default)]
pub struct RenderItem {
    pub key: RenderKey,
    pub draw: DrawCall,
    pub topology: Topology,
    pub vertex_buffers: [Handle<VertexBuffer>; MAX_VERTEX_BUFFERS],
    pub index_buffer: Handle<IndexBuffer>,
    pub program: ShaderProgram,
    pub states: CommonStates,
    pub parameters: ParameterBlock,
}

impl QueueItem for RenderItem {
    #[inline]
    fn sort_key(&self) -> u64 {
        self.key.bits()
    }
}

/// One compute dispatch.
#[derive(Debug, Clone, Default)]
pub struct ComputeItem {
    pub key: u64,
    /// Thread-group counts per axis.
    pub groups: [u32; 3],
    pub shader: Handle<Shader>,
    pub parameters: ParameterBlock,
}

impl QueueItem for ComputeItem {
    #[inline]
    fn sort_key(&self) -> u64 {
        self.key
    }
}

/// Full-screen pass from `input` to `output`.
#[derive(Debug, Clone, Default)]
pub struct PostProcessItem {
    pub input: Handle<Surface>,
    pub output: Handle<Surface>,
    pub pixel_shader: Handle<Shader>,
    pub blend: BlendMode,
    pub parameters: ParameterBlock,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{BindType, ShaderStage};

    fn var(slot: u32) -> ShaderVariable {
        ShaderVariable::new(BindType::Surface, ShaderStage::Pixel, slot, 0, false)
    }

    #[test]
    fn test_render_key_orders_by_pipeline_then_material_then_depth() {
        let near = RenderKey::new(1, 7, 1.0);
        let far = RenderKey::new(1, 7, 50.0);
        let other_material = RenderKey::new(1, 8, 0.5);
        let other_pipeline = RenderKey::new(2, 0, 0.0);

        assert!(near < far);
        assert!(far < other_material);
        assert!(other_material < other_pipeline);
        assert_eq!(RenderKey::new(0, 0, -3.0).bits(), 0);
    }

    #[test]
    fn test_parameter_block_replaces_same_variable() {
        let mut block = ParameterBlock::new();
        assert!(block.set_surface(var(0), Handle::from_raw(1)));
        assert!(block.set_surface(var(0), Handle::from_raw(2)));
        assert_eq!(block.len(), 1);
        assert_eq!(block.get(var(0)), Some(&ParameterValue::Surface(Handle::from_raw(2))));
    }

    #[test]
    fn test_parameter_block_is_bounded() {
        let mut block = ParameterBlock::new();
        for slot in 0..MAX_PARAMETER_BLOCKS as u32 {
            assert!(block.set_surface(var(slot), Handle::from_raw(slot)));
        }
        assert!(!block.set_surface(var(99), Handle::from_raw(99)));
        assert!(!block.set_surface(ShaderVariable::INVALID, Handle::from_raw(0)));
        assert_eq!(block.len(), MAX_PARAMETER_BLOCKS);
    }
}
