//! Resource kinds.
//!
//! Each kind is an uninhabited marker type used as the `R` in
//! [`Handle<R>`](super::Handle) and [`Resource<R>`](super::Resource). The
//! [`ResourceType`] trait ties a marker to its description type and to the
//! runtime [`ResourceKind`] tag the backend sees.

use crate::errors::BackendError;

use super::desc::{
    BlendStateDesc, BufferDesc, ConstantBufferDesc, DepthStencilStateDesc, IndexBufferDesc,
    InputSignatureDesc, RasterizerStateDesc, SamplerDesc, ShaderDesc, SurfaceDesc, VertexBufferDesc,
};

/// Binds a marker type to its description.
pub trait ResourceType: 'static {
    type Desc: std::fmt::Debug + Send + Sync;
    const KIND: ResourceKind;

    fn describe(desc: &Self::Desc) -> ResourceDesc<'_>;
}

macro_rules! resource_kinds {
    ($($kind:ident => $desc:ident),* $(,)?) => {
        /// Runtime tag of a resource kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ResourceKind {
            $($kind,)*
        }

        impl ResourceKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$kind,)*];
        }

        /// Borrowed description of any kind, as passed to the backend.
        #[derive(Debug, Clone, Copy)]
        pub enum ResourceDesc<'a> {
            $($kind(&'a $desc),)*
        }

        impl ResourceDesc<'_> {
            #[must_use]
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(Self::$kind(_) => ResourceKind::$kind,)*
                }
            }
        }

        $(
            #[derive(Debug)]
            pub enum $kind {}

            impl ResourceType for $kind {
                type Desc = $desc;
                const KIND: ResourceKind = ResourceKind::$kind;

                #[inline]
                fn describe(desc: &$desc) -> ResourceDesc<'_> {
                    ResourceDesc::$kind(desc)
                }
            }
        )*
    };
}

resource_kinds! {
    Surface => SurfaceDesc,
    Buffer => BufferDesc,
    VertexBuffer => VertexBufferDesc,
    IndexBuffer => IndexBufferDesc,
    ConstantBuffer => ConstantBufferDesc,
    BlendState => BlendStateDesc,
    RasterizerState => RasterizerStateDesc,
    InputSignature => InputSignatureDesc,
    Sampler => SamplerDesc,
    Shader => ShaderDesc,
    DepthStencilState => DepthStencilStateDesc,
}

/// Nominal footprint of a state object that owns no memory of its own.
const STATE_OBJECT_SIZE: usize = 64;

impl ResourceDesc<'_> {
    /// Approximate GPU memory taken by the object.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        match self {
            Self::Surface(desc) => desc.byte_size(),
            Self::Buffer(desc) => desc.byte_size(),
            Self::VertexBuffer(desc) => desc.byte_size(),
            Self::IndexBuffer(desc) => desc.byte_size(),
            Self::ConstantBuffer(desc) => desc.byte_size(),
            Self::Shader(desc) => desc.bytecode.len(),
            Self::InputSignature(desc) => desc.bytecode.len(),
            Self::BlendState(_)
            | Self::RasterizerState(_)
            | Self::Sampler(_)
            | Self::DepthStencilState(_) => STATE_OBJECT_SIZE,
        }
    }

    /// Rejects descriptions no backend can create.
    pub fn validate(&self) -> Result<(), BackendError> {
        let result = match self {
            Self::Surface(desc) => desc.validate(),
            Self::Buffer(desc) => desc.validate(),
            Self::VertexBuffer(desc) => desc.validate(),
            Self::IndexBuffer(desc) => desc.validate(),
            Self::ConstantBuffer(desc) => desc.validate(),
            Self::RasterizerState(desc) => desc.validate(),
            Self::Shader(desc) => desc.validate(),
            Self::InputSignature(desc) => desc.validate(),
            Self::BlendState(_) | Self::Sampler(_) | Self::DepthStencilState(_) => Ok(()),
        };
        result.map_err(|reason| BackendError::InvalidDescriptor {
            kind: self.kind(),
            reason,
        })
    }
}
