//! Handle-based resource manager.
//!
//! One [`Pool`] per resource kind holds the records; handles are pool
//! indices. Because a pool may relocate its records when it grows,
//! references returned by [`ResourceManager::get`] must not be kept across
//! a creation. Keep the handle and resolve it again.
//!
//! # Failure Model
//!
//! | Situation                         | Result                                  |
//! |-----------------------------------|-----------------------------------------|
//! | Backend rejects a description     | `log::error!`, [`Handle::INVALID`]      |
//! | `destroy` with `Handle::INVALID`  | `log::warn!`, no-op                     |
//! | `destroy` with a stale handle     | invariant violation (debug panic)       |
//! | `get` with a stale/invalid handle | panic                                   |
//! | `try_get` with any handle         | `None` when not live                    |
//!
//! The manager is not synchronized. All mutation goes through `&mut self`,
//! so concurrent creation must be serialized by the owner.

use std::panic::Location;
use std::sync::Arc;

use stratum_core::memory::{AllocationId, AllocationTracker, Pool};

use crate::backend::{NativeId, ResourceBackend};

use super::desc::{
    BlendStateDesc, BufferDesc, ConstantBufferDesc, DepthStencilStateDesc, IndexBufferDesc,
    InputSignatureDesc, RasterizerStateDesc, SamplerDesc, ShaderDesc, SurfaceDesc, VertexBufferDesc,
};
use super::handle::Handle;
use super::kinds::{
    BlendState, Buffer, ConstantBuffer, DepthStencilState, IndexBuffer, InputSignature,
    RasterizerState, ResourceType, Sampler, Shader, Surface, VertexBuffer,
};
use super::shader::ShaderVariable;

const DEFAULT_POOL_CAPACITY: usize = 16;

/// Where and under which name a resource was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationInfo {
    pub name: String,
    pub file: &'static str,
    pub line: u32,
}

/// A live resource record.
#[derive(Debug)]
pub struct Resource<R: ResourceType> {
    pub native: NativeId,
    pub desc: R::Desc,
    pub info: AllocationInfo,
    tracking: Option<AllocationId>,
}

/// Resource kinds stored by the [`ResourceManager`].
pub trait ManagedResource: ResourceType + Sized {
    #[doc(hidden)]
    fn pool(resources: &ResourceManager) -> &Pool<Resource<Self>>;
    #[doc(hidden)]
    fn pool_mut(resources: &mut ResourceManager) -> &mut Pool<Resource<Self>>;
}

macro_rules! resource_pools {
    ($($kind:ident => $name:ident),* $(,)?) => {
        paste::paste! {
            /// Owner of every resource record, one pool per kind.
            pub struct ResourceManager {
                $([<$name s>]: Pool<Resource<$kind>>,)*
                tracker: Option<Arc<AllocationTracker>>,
            }

            impl ResourceManager {
                fn with_pools(capacity: usize, tracker: Option<Arc<AllocationTracker>>) -> Self {
                    Self {
                        $([<$name s>]: Pool::with_capacity(capacity),)*
                        tracker,
                    }
                }

                /// Live records across every kind.
                #[must_use]
                pub fn live_resources(&self) -> usize {
                    0 $(+ self.[<$name s>].len())*
                }

                /// Destroys every live resource, logging each one as a leak.
                /// Returns how many were released.
                pub fn release_all<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
                    0 $(+ self.release_kind::<$kind, B>(backend))*
                }

                $(
                    #[track_caller]
                    pub fn [<create_ $name>]<B: ResourceBackend + ?Sized>(
                        &mut self,
                        backend: &mut B,
                        name: &str,
                        desc: [<$kind Desc>],
                    ) -> Handle<$kind> {
                        self.create::<$kind, B>(backend, name, desc)
                    }

                    pub fn [<destroy_ $name>]<B: ResourceBackend + ?Sized>(
                        &mut self,
                        backend: &mut B,
                        handle: Handle<$kind>,
                    ) -> bool {
                        self.destroy::<$kind, B>(backend, handle)
                    }

                    #[must_use]
                    pub fn [<get_ $name>](&self, handle: Handle<$kind>) -> &Resource<$kind> {
                        self.get::<$kind>(handle)
                    }
                )*
            }

            $(
                impl ManagedResource for $kind {
                    #[inline]
                    fn pool(resources: &ResourceManager) -> &Pool<Resource<Self>> {
                        &resources.[<$name s>]
                    }

                    #[inline]
                    fn pool_mut(resources: &mut ResourceManager) -> &mut Pool<Resource<Self>> {
                        &mut resources.[<$name s>]
                    }
                }
            )*
        }
    };
}

resource_pools! {
    Surface => surface,
    Buffer => buffer,
    VertexBuffer => vertex_buffer,
    IndexBuffer => index_buffer,
    ConstantBuffer => constant_buffer,
    BlendState => blend_state,
    RasterizerState => rasterizer_state,
    InputSignature => input_signature,
    Sampler => sampler,
    Shader => shader,
    DepthStencilState => depth_stencil_state,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, None)
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("live_resources", &self.live_resources())
            .field("tracked", &self.tracker.is_some())
            .finish_non_exhaustive()
    }
}

impl ResourceManager {
    /// Creates a manager whose pools start with `pool_capacity` slots.
    /// Creations are reported to `tracker` when one is given.
    #[must_use]
    pub fn new(pool_capacity: usize, tracker: Option<Arc<AllocationTracker>>) -> Self {
        Self::with_pools(pool_capacity, tracker)
    }

    /// Creates the backend object for `desc` and stores its record.
    ///
    /// Returns [`Handle::INVALID`] if the backend rejects the description.
    #[track_caller]
    pub fn create<R: ManagedResource, B: ResourceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        name: &str,
        desc: R::Desc,
    ) -> Handle<R> {
        let location = Location::caller();
        let described = R::describe(&desc);

        let native = match backend.create_resource(described) {
            Ok(native) => native,
            Err(err) => {
                log::error!("Failed to create {:?} '{name}': {err}", R::KIND);
                return Handle::INVALID;
            }
        };

        let tracking = self.tracker.as_ref().and_then(|tracker| {
            tracker.record_at(name, location.file(), location.line(), described.byte_size())
        });

        let index = R::pool_mut(self).allocate(Resource {
            native,
            desc,
            info: AllocationInfo {
                name: name.to_owned(),
                file: location.file(),
                line: location.line(),
            },
            tracking,
        });
        Handle::from_raw(index as u32)
    }

    /// Releases the backend object and recycles the record slot.
    pub fn destroy<R: ManagedResource, B: ResourceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        handle: Handle<R>,
    ) -> bool {
        if !handle.is_valid() {
            log::warn!("Ignoring destroy of an invalid {:?} handle", R::KIND);
            return false;
        }
        let Some(resource) = R::pool_mut(self).deallocate(handle.index()) else {
            return false;
        };
        self.retire(backend, resource);
        true
    }

    /// Resolves a live handle.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is invalid, destroyed or never created.
    #[inline]
    #[must_use]
    pub fn get<R: ManagedResource>(&self, handle: Handle<R>) -> &Resource<R> {
        R::pool(self).get(handle.index())
    }

    #[inline]
    #[must_use]
    pub fn try_get<R: ManagedResource>(&self, handle: Handle<R>) -> Option<&Resource<R>> {
        R::pool(self).try_get(handle.index())
    }

    #[inline]
    #[must_use]
    pub fn is_live<R: ManagedResource>(&self, handle: Handle<R>) -> bool {
        R::pool(self).contains(handle.index())
    }

    #[inline]
    #[must_use]
    pub fn native<R: ManagedResource>(&self, handle: Handle<R>) -> Option<NativeId> {
        self.try_get(handle).map(|resource| resource.native)
    }

    /// Number of live records of kind `R`.
    #[must_use]
    pub fn count<R: ManagedResource>(&self) -> usize {
        R::pool(self).len()
    }

    pub fn iter<R: ManagedResource>(&self) -> impl Iterator<Item = (Handle<R>, &Resource<R>)> {
        R::pool(self)
            .iter()
            .map(|(index, resource)| (Handle::from_raw(index as u32), resource))
    }

    /// Looks up a reflected variable of a shader by name.
    #[must_use]
    pub fn shader_variable(&self, shader: Handle<Shader>, name: &str) -> ShaderVariable {
        match self.try_get(shader) {
            Some(resource) => resource.desc.bindings.find(name),
            None => {
                log::warn!("shader_variable('{name}') on a dead shader handle {shader:?}");
                ShaderVariable::INVALID
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> Option<&Arc<AllocationTracker>> {
        self.tracker.as_ref()
    }

    fn retire<R: ManagedResource, B: ResourceBackend + ?Sized>(&self, backend: &mut B, resource: Resource<R>) {
        backend.destroy_resource(R::KIND, resource.native);
        if let (Some(tracker), Some(id)) = (&self.tracker, resource.tracking) {
            tracker.release(id);
        }
    }

    fn release_kind<R: ManagedResource, B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) -> usize {
        let live: Vec<usize> = R::pool(self).iter().map(|(index, _)| index).collect();
        for &index in &live {
            if let Some(resource) = R::pool_mut(self).deallocate(index) {
                log::warn!(
                    "Releasing {:?} '{}' created at {}:{}",
                    R::KIND,
                    resource.info.name,
                    resource.info.file,
                    resource.info.line
                );
                self.retire(backend, resource);
            }
        }
        live.len()
    }
}
