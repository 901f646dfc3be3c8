//! Resource Management
//!
//! Descriptions, typed handles and the [`ResourceManager`] that owns one
//! record per live backend object.
//!
//! | Module      | Contents                                           |
//! |-------------|----------------------------------------------------|
//! | `handle`    | [`Handle<R>`], the typed `u32` pool index          |
//! | `kinds`     | marker types, [`ResourceKind`], [`ResourceDesc`]   |
//! | `desc`      | creation descriptions per kind                     |
//! | `format`    | [`PixelFormat`]                                    |
//! | `shader`    | [`ShaderVariable`] packing and name lookup         |
//! | `manager`   | the per-kind pools                                 |

pub mod desc;
pub mod format;
pub mod handle;
pub mod kinds;
pub mod manager;
pub mod shader;

pub use desc::{
    AddressMode, BlendMode, BlendStateDesc, BufferDesc, BufferType, Comparison, ConstantBufferDesc,
    CullMode, DepthFunc, DepthStencilStateDesc, FillMode, FilterMode, FrontFace, GpuViews,
    IndexBufferDesc, InputElement, InputElementType, InputSignatureDesc, RasterizerStateDesc,
    SamplerDesc, ShaderDesc, SurfaceDesc, SurfaceType, Usage, VertexBufferDesc,
};
pub use format::PixelFormat;
pub use handle::Handle;
pub use kinds::{
    BlendState, Buffer, ConstantBuffer, DepthStencilState, IndexBuffer, InputSignature,
    RasterizerState, ResourceDesc, ResourceKind, ResourceType, Sampler, Shader, Surface,
    VertexBuffer,
};
pub use manager::{AllocationInfo, ManagedResource, Resource, ResourceManager};
pub use shader::{BindType, ShaderBindings, ShaderStage, ShaderVariable};
