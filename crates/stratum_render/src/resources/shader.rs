//! Shader variables and name lookup.
//!
//! Reflection itself happens outside the render core. What arrives here is a
//! list of `(name, ShaderVariable)` pairs per shader, which
//! [`ShaderBindings`] indexes by name hash.

use std::fmt;

use stratum_core::collections::{IntMap, hash_str};

/// Pipeline stage of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderStage {
    #[default]
    Vertex = 0,
    Geometry = 1,
    Pixel = 2,
    Compute = 3,
}

impl ShaderStage {
    const fn from_bits(bits: u32) -> Self {
        match bits {
            1 => Self::Geometry,
            2 => Self::Pixel,
            3 => Self::Compute,
            _ => Self::Vertex,
        }
    }
}

/// What a shader variable binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    Sampler = 0,
    Surface = 1,
    Buffer = 2,
    ConstantBuffer = 3,
}

impl BindType {
    const fn from_bits(bits: u32) -> Self {
        match bits {
            0 => Self::Sampler,
            1 => Self::Surface,
            2 => Self::Buffer,
            _ => Self::ConstantBuffer,
        }
    }
}

/// A reflected shader binding packed into 32 bits.
///
/// ```text
///  31 30 29  28..26   25 ........ 10  9 ..... 3  2..1  0
///  ┌─────┬───┬───────┬──────────────┬──────────┬─────┬───┐
///  │ pad │uav│ stage │     size     │   slot   │type │ v │
///  └─────┴───┴───────┴──────────────┴──────────┴─────┴───┘
/// ```
///
/// `size` is the byte size for constant buffers and the element count for
/// surface arrays.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ShaderVariable(u32);

impl ShaderVariable {
    const VALID_MASK: u32 = 0b1;
    const TYPE_OFF: u32 = 1;
    const TYPE_MASK: u32 = 0b11 << Self::TYPE_OFF;
    const SLOT_OFF: u32 = 3;
    const SLOT_MASK: u32 = 0x7F << Self::SLOT_OFF;
    const SIZE_OFF: u32 = 10;
    const SIZE_MASK: u32 = 0xFFFF << Self::SIZE_OFF;
    const STAGE_OFF: u32 = 26;
    const STAGE_MASK: u32 = 0b111 << Self::STAGE_OFF;
    const UAV_MASK: u32 = 1 << 29;

    /// Largest slot that fits the packed field.
    pub const MAX_SLOT: u32 = 0x7F;

    /// Returned by failed lookups.
    pub const INVALID: Self = Self(0);

    /// Packs a variable. `slot` is truncated to 7 bits and `size` to 16.
    #[must_use]
    pub const fn new(bind: BindType, stage: ShaderStage, slot: u32, size: u32, uav: bool) -> Self {
        let mut bits = Self::VALID_MASK;
        bits |= ((bind as u32) << Self::TYPE_OFF) & Self::TYPE_MASK;
        bits |= (slot << Self::SLOT_OFF) & Self::SLOT_MASK;
        bits |= (size << Self::SIZE_OFF) & Self::SIZE_MASK;
        bits |= ((stage as u32) << Self::STAGE_OFF) & Self::STAGE_MASK;
        if uav {
            bits |= Self::UAV_MASK;
        }
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 & Self::VALID_MASK != 0
    }

    #[inline]
    #[must_use]
    pub const fn bind_type(self) -> BindType {
        BindType::from_bits((self.0 & Self::TYPE_MASK) >> Self::TYPE_OFF)
    }

    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        (self.0 & Self::SLOT_MASK) >> Self::SLOT_OFF
    }

    #[inline]
    #[must_use]
    pub const fn size(self) -> u32 {
        (self.0 & Self::SIZE_MASK) >> Self::SIZE_OFF
    }

    #[inline]
    #[must_use]
    pub const fn stage(self) -> ShaderStage {
        ShaderStage::from_bits((self.0 & Self::STAGE_MASK) >> Self::STAGE_OFF)
    }

    #[inline]
    #[must_use]
    pub const fn is_uav(self) -> bool {
        self.0 & Self::UAV_MASK != 0
    }
}

impl fmt::Debug for ShaderVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("ShaderVariable(INVALID)");
        }
        f.debug_struct("ShaderVariable")
            .field("bind", &self.bind_type())
            .field("stage", &self.stage())
            .field("slot", &self.slot())
            .field("size", &self.size())
            .field("uav", &self.is_uav())
            .finish()
    }
}

// ─── ShaderBindings ──────────────────────────────────────────────────────────

/// Name → variable table of one shader.
#[derive(Debug, Clone, Default)]
pub struct ShaderBindings {
    map: IntMap,
}

impl ShaderBindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`. Returns `false` if the name (or a colliding hash) is
    /// already present or the variable is invalid.
    pub fn insert(&mut self, name: &str, variable: ShaderVariable) -> bool {
        if !variable.is_valid() {
            log::warn!("ShaderBindings: refusing invalid variable for '{name}'");
            return false;
        }
        self.map.insert(hash_str(name), u64::from(variable.bits()))
    }

    /// Looks up `name`; [`ShaderVariable::INVALID`] when absent.
    #[must_use]
    pub fn find(&self, name: &str) -> ShaderVariable {
        self.map
            .get(hash_str(name))
            .map_or(ShaderVariable::INVALID, |bits| ShaderVariable::from_bits(bits as u32))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, ShaderVariable)> for ShaderBindings {
    fn from_iter<T: IntoIterator<Item = (&'a str, ShaderVariable)>>(iter: T) -> Self {
        let mut bindings = Self::new();
        for (name, variable) in iter {
            bindings.insert(name, variable);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_do_not_overlap() {
        let var = ShaderVariable::new(BindType::ConstantBuffer, ShaderStage::Compute, 127, 0xFFFF, true);
        assert!(var.is_valid());
        assert_eq!(var.bind_type(), BindType::ConstantBuffer);
        assert_eq!(var.stage(), ShaderStage::Compute);
        assert_eq!(var.slot(), 127);
        assert_eq!(var.size(), 0xFFFF);
        assert!(var.is_uav());

        let narrow = ShaderVariable::new(BindType::Sampler, ShaderStage::Vertex, 3, 0, false);
        assert_eq!(narrow.slot(), 3);
        assert_eq!(narrow.size(), 0);
        assert!(!narrow.is_uav());
    }

    #[test]
    fn test_bindings_lookup() {
        let albedo = ShaderVariable::new(BindType::Surface, ShaderStage::Pixel, 0, 0, false);
        let bindings: ShaderBindings = [("albedo", albedo)].into_iter().collect();
        assert_eq!(bindings.find("albedo"), albedo);
        assert!(!bindings.find("normal").is_valid());
    }
}
